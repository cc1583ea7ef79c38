//! Column definitions and their SQL fragments.
//!
//! A [`Column`] describes one column of a table: declared type, nullability,
//! default, uniqueness, primary key and foreign key attributes. It renders
//! three kinds of fragment for the owning [`Table`](crate::Table) to
//! compose:
//!
//! - its definition (`name TYPE NOT NULL DEFAULT ... UNIQUE`),
//! - its foreign key clause (`FOREIGN KEY (name) REFERENCES t (c)`),
//! - for auto-updating time columns, a partially-bound trigger expression.
//!
//! Columns are built with per-type constructors and chained configuration:
//!
//! ```
//! use sqlite_tables_core::Column;
//!
//! let name = Column::text("name").not_null().unique();
//! assert_eq!("name TEXT NOT NULL UNIQUE", name.definition_sql().unwrap());
//!
//! let owner = Column::int("owner_id").references("user", "id");
//! assert_eq!(
//!     "FOREIGN KEY (owner_id) REFERENCES user (id)",
//!     owner.foreign_key_sql().unwrap(),
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::template::SqlTemplate;

const COLUMN_DEF_TEMPLATE: &str =
    "$column_name $type $null_constraint $default_constraint $unique_constraint";
const FOREIGN_KEY_TEMPLATE: &str =
    "FOREIGN KEY ($column_name) REFERENCES $table_ref ($col_ref)";
const TRIGGER_EXPRESSION_TEMPLATE: &str = "UPDATE $table_name SET $column_name = \
     $default_for_update WHERE $primary_key_col = old.$primary_key_col";

/// Declared type of a column.
///
/// The declared type selects the SQL type keyword in generated DDL and,
/// for types SQLite has no native representation for ([`Bool`] and
/// [`IntList`]), drives codec dispatch at the driver boundary independent
/// of the runtime value's concrete representation.
///
/// [`Bool`]: ColumnType::Bool
/// [`IntList`]: ColumnType::IntList
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Integer affinity.
    Int,
    /// Text affinity.
    Text,
    /// Floating point affinity.
    Real,
    /// Numeric affinity.
    Numeric,
    /// Raw bytes.
    Blob,
    /// Boolean, stored through the boolean codec.
    Bool,
    /// Ordered integer sequence, stored through the integer-list codec.
    IntList,
}

impl ColumnType {
    /// The type keyword used in generated DDL.
    pub fn sql_keyword(self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Blob => "BLOB",
            ColumnType::Bool => "BOOL",
            ColumnType::IntList => "INTLIST",
        }
    }
}

/// SQLite time keyword substituted by auto-now columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeKeyword {
    /// `CURRENT_TIMESTAMP`
    Timestamp,
    /// `CURRENT_DATE`
    Date,
    /// `CURRENT_TIME`
    Time,
}

impl TimeKeyword {
    /// The literal keyword as it appears in SQL.
    pub fn sql(self) -> &'static str {
        match self {
            TimeKeyword::Timestamp => "CURRENT_TIMESTAMP",
            TimeKeyword::Date => "CURRENT_DATE",
            TimeKeyword::Time => "CURRENT_TIME",
        }
    }
}

/// A column default value, rendered type-appropriately in DDL.
///
/// Numeric variants render verbatim; [`Text`] is wrapped in single quotes
/// exactly once, with the empty string rendering as `''`; [`Bool`] renders
/// as `1`/`0` to match its stored representation; [`Now`] renders the time
/// keyword bare.
///
/// [`Text`]: ColumnDefault::Text
/// [`Bool`]: ColumnDefault::Bool
/// [`Now`]: ColumnDefault::Now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnDefault {
    /// Integer literal, rendered verbatim.
    Integer(i64),
    /// Float literal, rendered verbatim.
    Real(f64),
    /// Text literal, quoted on rendering.
    Text(String),
    /// Boolean literal, rendered as `1` or `0`.
    Bool(bool),
    /// A time keyword such as `CURRENT_TIMESTAMP`, rendered bare.
    Now(TimeKeyword),
}

impl ColumnDefault {
    /// Renders the default as a SQL literal.
    pub fn to_sql_literal(&self) -> String {
        match self {
            ColumnDefault::Integer(value) => value.to_string(),
            ColumnDefault::Real(value) => value.to_string(),
            ColumnDefault::Text(value) => quote_text_literal(value),
            ColumnDefault::Bool(value) => if *value { "1" } else { "0" }.to_string(),
            ColumnDefault::Now(keyword) => keyword.sql().to_string(),
        }
    }
}

impl From<i64> for ColumnDefault {
    fn from(value: i64) -> Self {
        ColumnDefault::Integer(value)
    }
}

impl From<i32> for ColumnDefault {
    fn from(value: i32) -> Self {
        ColumnDefault::Integer(i64::from(value))
    }
}

impl From<f64> for ColumnDefault {
    fn from(value: f64) -> Self {
        ColumnDefault::Real(value)
    }
}

impl From<&str> for ColumnDefault {
    fn from(value: &str) -> Self {
        ColumnDefault::Text(value.to_string())
    }
}

impl From<String> for ColumnDefault {
    fn from(value: String) -> Self {
        ColumnDefault::Text(value)
    }
}

impl From<bool> for ColumnDefault {
    fn from(value: bool) -> Self {
        ColumnDefault::Bool(value)
    }
}

impl From<TimeKeyword> for ColumnDefault {
    fn from(keyword: TimeKeyword) -> Self {
        ColumnDefault::Now(keyword)
    }
}

/// Wraps a text default in single quotes exactly once.
///
/// An already-quoted string is treated as pre-formatted, and the empty
/// string renders as `''` rather than disappearing from the clause.
fn quote_text_literal(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    if !value.starts_with('\'') {
        quoted.push('\'');
    }
    quoted.push_str(value);
    if !value.ends_with('\'') {
        quoted.push('\'');
    }
    quoted
}

/// One column of a table definition.
///
/// Constructed once when defining a schema and immutable thereafter; owned
/// exclusively by the [`Table`](crate::Table) that holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    allow_null: bool,
    default: Option<ColumnDefault>,
    unique: bool,
    primary_key: bool,
    foreign_key: bool,
    fk_table_ref: Option<String>,
    fk_column_ref: Option<String>,
    time_keyword: Option<TimeKeyword>,
    default_for_update: Option<TimeKeyword>,
    invalid_auto_now: bool,
}

impl Column {
    /// Creates a column with the given name and declared type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            allow_null: true,
            default: None,
            unique: false,
            primary_key: false,
            foreign_key: false,
            fk_table_ref: None,
            fk_column_ref: None,
            time_keyword: None,
            default_for_update: None,
            invalid_auto_now: false,
        }
    }

    /// An `INT` column.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Int)
    }

    /// A `TEXT` column.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    /// A `REAL` column.
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Real)
    }

    /// A `NUMERIC` column.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Numeric)
    }

    /// A `BLOB` column.
    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Blob)
    }

    /// A `BOOL` column, stored through the boolean codec.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Bool)
    }

    /// An `INTLIST` column, stored through the integer-list codec.
    pub fn int_list(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::IntList)
    }

    /// A datetime column: `TEXT` affinity with `CURRENT_TIMESTAMP` as its
    /// auto-now keyword.
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::time_flavored(name, TimeKeyword::Timestamp)
    }

    /// A date column: `TEXT` affinity with `CURRENT_DATE` as its auto-now
    /// keyword.
    pub fn date(name: impl Into<String>) -> Self {
        Self::time_flavored(name, TimeKeyword::Date)
    }

    /// A time column: `TEXT` affinity with `CURRENT_TIME` as its auto-now
    /// keyword.
    pub fn time(name: impl Into<String>) -> Self {
        Self::time_flavored(name, TimeKeyword::Time)
    }

    fn time_flavored(name: impl Into<String>, keyword: TimeKeyword) -> Self {
        let mut column = Self::new(name, ColumnType::Text);
        column.time_keyword = Some(keyword);
        column
    }

    /// Adds a `NOT NULL` constraint.
    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, default: impl Into<ColumnDefault>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Adds a `UNIQUE` constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks this column as the table's primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks this column as a foreign key referencing `table (column)`.
    pub fn references(
        self,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.fk_table_ref(table).fk_column_ref(column)
    }

    /// Sets the referenced table of a foreign key column.
    pub fn fk_table_ref(mut self, table: impl Into<String>) -> Self {
        self.foreign_key = true;
        self.fk_table_ref = Some(table.into());
        self
    }

    /// Sets the referenced column of a foreign key column.
    pub fn fk_column_ref(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = true;
        self.fk_column_ref = Some(column.into());
        self
    }

    /// Substitutes the column's time keyword as the insert-time default.
    ///
    /// Only meaningful for [`datetime`](Self::datetime),
    /// [`date`](Self::date), and [`time`](Self::time) columns; requesting
    /// it elsewhere is reported by [`validate`](Self::validate).
    pub fn auto_now_insert(mut self) -> Self {
        match self.time_keyword {
            Some(keyword) => self.default = Some(ColumnDefault::Now(keyword)),
            None => self.invalid_auto_now = true,
        }
        self
    }

    /// Requests an update trigger substituting the column's time keyword on
    /// every row modification.
    ///
    /// Only meaningful for time-flavored columns, like
    /// [`auto_now_insert`](Self::auto_now_insert).
    pub fn auto_now_update(mut self) -> Self {
        match self.time_keyword {
            Some(keyword) => self.default_for_update = Some(keyword),
            None => self.invalid_auto_now = true,
        }
        self
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Whether this column is flagged as the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Whether this column is flagged as a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key
    }

    /// Whether an update trigger must be generated for this column.
    pub fn requires_trigger(&self) -> bool {
        self.default_for_update.is_some()
    }

    /// Checks the column configuration for unsatisfiable combinations.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::PrimaryKeyAndUnique`] if both flags are set.
    /// - [`SchemaError::PrimaryKeyWithDefault`] if a primary key column
    ///   carries a default value.
    /// - [`SchemaError::AutoNowOnNonTimeColumn`] if auto-now behavior was
    ///   requested on a column with no time keyword.
    pub fn validate(&self) -> Result<()> {
        if self.primary_key && self.unique {
            return Err(SchemaError::PrimaryKeyAndUnique(self.name.clone()));
        }
        if self.primary_key && self.default.is_some() {
            return Err(SchemaError::PrimaryKeyWithDefault(self.name.clone()));
        }
        if self.invalid_auto_now {
            return Err(SchemaError::AutoNowOnNonTimeColumn(self.name.clone()));
        }
        Ok(())
    }

    /// Renders the column definition fragment.
    ///
    /// Clause order is fixed: name, type, null constraint, default
    /// constraint, unique/primary-key constraint. Each optional clause is
    /// omitted when not applicable.
    pub fn definition_sql(&self) -> Result<String> {
        self.validate()?;
        let default_clause = self
            .default
            .as_ref()
            .map(|default| format!("DEFAULT {}", default.to_sql_literal()));
        let unique_constraint = if self.primary_key {
            "PRIMARY KEY"
        } else if self.unique {
            "UNIQUE"
        } else {
            ""
        };
        let null_constraint = if self.allow_null { "" } else { "NOT NULL" };
        let mut substitutions = vec![
            ("column_name", self.name.as_str()),
            ("type", self.column_type.sql_keyword()),
            ("null_constraint", null_constraint),
            ("unique_constraint", unique_constraint),
        ];
        if let Some(clause) = default_clause.as_deref() {
            substitutions.push(("default_constraint", clause));
        }
        Ok(SqlTemplate::new(COLUMN_DEF_TEMPLATE).substitute(&substitutions))
    }

    /// Renders the table-level foreign key clause for this column.
    ///
    /// # Errors
    ///
    /// [`SchemaError::MissingForeignKeyRef`] naming the absent field if the
    /// table or column reference was never supplied.
    pub fn foreign_key_sql(&self) -> Result<String> {
        let table_ref = self.fk_table_ref.as_deref().ok_or_else(|| {
            SchemaError::MissingForeignKeyRef {
                column: self.name.clone(),
                field: "fk_table_ref",
            }
        })?;
        let col_ref = self.fk_column_ref.as_deref().ok_or_else(|| {
            SchemaError::MissingForeignKeyRef {
                column: self.name.clone(),
                field: "fk_column_ref",
            }
        })?;
        Ok(SqlTemplate::new(FOREIGN_KEY_TEMPLATE).substitute(&[
            ("column_name", self.name.as_str()),
            ("table_ref", table_ref),
            ("col_ref", col_ref),
        ]))
    }

    /// Builds the partially-bound trigger expression for an auto-updating
    /// column.
    ///
    /// The column binds its own name and update keyword; `$table_name` and
    /// `$primary_key_col` are left for the owning table to resolve, since
    /// a column knows neither its table nor that table's primary key.
    ///
    /// # Errors
    ///
    /// [`SchemaError::NoUpdateDefault`] if the column has no update marker.
    pub fn trigger_expression(&self) -> Result<SqlTemplate> {
        let keyword = self
            .default_for_update
            .ok_or_else(|| SchemaError::NoUpdateDefault(self.name.clone()))?;
        Ok(SqlTemplate::new(TRIGGER_EXPRESSION_TEMPLATE).partial(&[
            ("column_name", self.name.as_str()),
            ("default_for_update", keyword.sql()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_column_type() {
        assert_eq!(ColumnType::Int, Column::int("test_col").column_type());
    }

    #[test]
    fn test_not_null() {
        let col = Column::int("test_col").not_null();
        assert_eq!("test_col INT NOT NULL", col.definition_sql().unwrap());
    }

    #[test]
    fn test_default() {
        let col = Column::int("test_col").not_null().default_value(0);
        assert_eq!(
            "test_col INT NOT NULL DEFAULT 0",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_unique() {
        let col = Column::int("test_col").not_null().unique();
        assert_eq!("test_col INT NOT NULL UNIQUE", col.definition_sql().unwrap());
    }

    #[test]
    fn test_primary_key() {
        let col = Column::int("id").primary_key();
        assert_eq!("id INT PRIMARY KEY", col.definition_sql().unwrap());
    }

    #[test]
    fn test_primary_key_not_null() {
        let col = Column::int("test_col").primary_key().not_null();
        assert_eq!(
            "test_col INT NOT NULL PRIMARY KEY",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_real_column() {
        let col = Column::real("test_col").unique();
        assert_eq!("test_col REAL UNIQUE", col.definition_sql().unwrap());
    }

    #[test]
    fn test_text_column() {
        let col = Column::text("test_col");
        assert_eq!("test_col TEXT", col.definition_sql().unwrap());
    }

    #[test]
    fn test_text_column_wraps_default_value() {
        let col = Column::text("test_col").default_value("test string");
        assert_eq!(
            "test_col TEXT DEFAULT 'test string'",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_text_column_quoted_default_passes_through() {
        let col = Column::text("test_col").default_value("'already quoted'");
        assert_eq!(
            "test_col TEXT DEFAULT 'already quoted'",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_text_column_empty_default_renders_quoted() {
        let col = Column::text("test_col").default_value("");
        assert_eq!("test_col TEXT DEFAULT ''", col.definition_sql().unwrap());
    }

    #[test]
    fn test_numeric_column() {
        let col = Column::numeric("test_col");
        assert_eq!("test_col NUMERIC", col.definition_sql().unwrap());
    }

    #[test]
    fn test_numeric_column_default() {
        let col = Column::numeric("test_col").default_value(1.2);
        assert_eq!("test_col NUMERIC DEFAULT 1.2", col.definition_sql().unwrap());
    }

    #[test]
    fn test_bool_column_default() {
        let col = Column::boolean("active").default_value(true);
        assert_eq!("active BOOL DEFAULT 1", col.definition_sql().unwrap());
    }

    #[test]
    fn test_primary_key_and_unique_rejected() {
        let col = Column::int("test_col").primary_key().unique();
        assert_eq!(
            Err(SchemaError::PrimaryKeyAndUnique("test_col".to_string())),
            col.definition_sql(),
        );
    }

    #[test]
    fn test_primary_key_with_default_rejected() {
        let col = Column::int("test_col").primary_key().default_value(2);
        assert_eq!(
            Err(SchemaError::PrimaryKeyWithDefault("test_col".to_string())),
            col.definition_sql(),
        );
    }

    #[test]
    fn test_datetime_column() {
        let col = Column::datetime("created");
        assert_eq!("created TEXT", col.definition_sql().unwrap());
    }

    #[test]
    fn test_datetime_auto_now_insert() {
        let col = Column::datetime("created").auto_now_insert();
        assert_eq!(
            "created TEXT DEFAULT CURRENT_TIMESTAMP",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_date_auto_now_insert() {
        let col = Column::date("created").auto_now_insert();
        assert_eq!(
            "created TEXT DEFAULT CURRENT_DATE",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_time_auto_now_insert() {
        let col = Column::time("created").auto_now_insert();
        assert_eq!(
            "created TEXT DEFAULT CURRENT_TIME",
            col.definition_sql().unwrap(),
        );
    }

    #[test]
    fn test_auto_now_on_non_time_column_rejected() {
        let col = Column::int("counter").auto_now_update();
        assert_eq!(
            Err(SchemaError::AutoNowOnNonTimeColumn("counter".to_string())),
            col.definition_sql(),
        );
    }

    #[test]
    fn test_foreign_key_sql() {
        let col = Column::int("fk_id").references("other_table", "other_col");
        assert_eq!(
            "FOREIGN KEY (fk_id) REFERENCES other_table (other_col)",
            col.foreign_key_sql().unwrap(),
        );
    }

    #[test]
    fn test_missing_table_ref_names_field() {
        let col = Column::int("fk_id").fk_column_ref("other_col");
        assert_eq!(
            Err(SchemaError::MissingForeignKeyRef {
                column: "fk_id".to_string(),
                field: "fk_table_ref",
            }),
            col.foreign_key_sql(),
        );
    }

    #[test]
    fn test_missing_column_ref_names_field() {
        let col = Column::int("fk_id").fk_table_ref("other_table");
        assert_eq!(
            Err(SchemaError::MissingForeignKeyRef {
                column: "fk_id".to_string(),
                field: "fk_column_ref",
            }),
            col.foreign_key_sql(),
        );
    }

    #[test]
    fn test_requires_trigger() {
        assert!(Column::datetime("updated").auto_now_update().requires_trigger());
        assert!(!Column::datetime("updated").auto_now_insert().requires_trigger());
    }

    #[test]
    fn test_trigger_expression_partially_bound() {
        let col = Column::datetime("updated").auto_now_insert().auto_now_update();
        assert_eq!(
            "UPDATE $table_name SET updated = CURRENT_TIMESTAMP WHERE \
             $primary_key_col = old.$primary_key_col",
            col.trigger_expression().unwrap().text(),
        );
    }

    #[test]
    fn test_trigger_expression_date_keyword() {
        let col = Column::date("date").auto_now_update();
        assert_eq!(
            "UPDATE $table_name SET date = CURRENT_DATE WHERE \
             $primary_key_col = old.$primary_key_col",
            col.trigger_expression().unwrap().text(),
        );
    }

    #[test]
    fn test_trigger_expression_without_marker_rejected() {
        let col = Column::datetime("updated");
        assert_eq!(
            Err(SchemaError::NoUpdateDefault("updated".to_string())),
            col.trigger_expression(),
        );
    }
}
