//! Table definitions and full-statement SQL generation.
//!
//! A [`Table`] owns an insertion-ordered, name-unique set of [`Column`]s
//! plus any unique-together groups, and composes the fragments each column
//! renders into complete `CREATE TABLE` and `CREATE TRIGGER` statements.
//!
//! ```
//! use sqlite_tables_core::{Column, Table};
//!
//! let table = Table::new(
//!     "person",
//!     vec![
//!         Column::int("id").primary_key(),
//!         Column::text("firstname"),
//!         Column::text("lastname"),
//!     ],
//! )
//! .unwrap()
//! .unique_together(["firstname", "lastname"]);
//!
//! assert_eq!(
//!     "CREATE TABLE IF NOT EXISTS person (id INT PRIMARY KEY, \
//!      firstname TEXT, lastname TEXT, UNIQUE (firstname, lastname))",
//!     table.schema_sql().unwrap(),
//! );
//! ```

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{Result, SchemaError};
use crate::template::SqlTemplate;

const SCHEMA_TEMPLATE: &str = "CREATE TABLE $exists $table_name ($column_defs)";
const UNIQUE_TEMPLATE: &str = "UNIQUE ($fields)";
const TRIGGER_TEMPLATE: &str =
    "CREATE TRIGGER $trigger_name AFTER UPDATE ON $table_name BEGIN $expr; END";

/// Name of SQLite's implicit row identity, used when no column is flagged
/// as the primary key.
const ROWID: &str = "rowid";

/// An in-memory table definition.
///
/// Constructed once per schema definition and read-only afterward; SQL text
/// is produced on demand, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: IndexMap<String, Column>,
    unique_together: Vec<Vec<String>>,
    raise_exists_error: bool,
}

impl Table {
    /// Creates a table definition from an ordered column collection.
    ///
    /// Column order is preserved in all generated SQL.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateColumn`] if two columns share a name.
    /// Uniqueness is enforced here, once, rather than silently collapsing
    /// duplicates or deferring detection to schema generation.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        let mut column_map = IndexMap::with_capacity(columns.len());
        for column in columns {
            match column_map.entry(column.name().to_string()) {
                Entry::Occupied(entry) => {
                    return Err(SchemaError::DuplicateColumn {
                        table: name,
                        column: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(column);
                }
            }
        }
        Ok(Self {
            name,
            columns: column_map,
            unique_together: Vec::new(),
            raise_exists_error: false,
        })
    }

    /// Appends one unique-together group.
    ///
    /// Call once for a single group, or repeatedly to declare several; the
    /// generated `UNIQUE (...)` clauses appear in declaration order.
    pub fn unique_together<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_together
            .push(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Omits the `IF NOT EXISTS` guard, so creating an existing table is an
    /// engine error.
    pub fn raise_exists_error(mut self) -> Self {
        self.raise_exists_error = true;
        self
    }

    /// Builds the conventional join table between `table_1` and `table_2`.
    ///
    /// The result has one `<table>_id INT NOT NULL` column per side, each a
    /// foreign key to that table's `id` column, with both columns unique
    /// together.
    pub fn many_to_many(
        join_table_name: impl Into<String>,
        table_1: &str,
        table_2: &str,
    ) -> Result<Self> {
        let ref_1 = format!("{table_1}_id");
        let ref_2 = format!("{table_2}_id");
        let table = Self::new(
            join_table_name,
            vec![
                Column::int(&ref_1).not_null().references(table_1, "id"),
                Column::int(&ref_2).not_null().references(table_2, "id"),
            ],
        )?;
        Ok(table.unique_together([ref_1, ref_2]))
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The columns, in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Name of the column rows are identified by: the first column flagged
    /// primary key, or SQLite's implicit `rowid`.
    pub fn primary_key_name(&self) -> &str {
        self.columns
            .values()
            .find(|column| column.is_primary_key())
            .map(Column::name)
            .unwrap_or(ROWID)
    }

    /// Checks the table configuration.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::NoColumns`] if the table has no columns.
    /// - [`SchemaError::UnknownUniqueColumn`] if a unique-together group
    ///   references a column this table does not have.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns(self.name.clone()));
        }
        for group in &self.unique_together {
            for field in group {
                if !self.columns.contains_key(field.as_str()) {
                    return Err(SchemaError::UnknownUniqueColumn {
                        table: self.name.clone(),
                        column: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Renders the complete `CREATE TABLE` statement.
    ///
    /// Column definitions appear in insertion order, foreign key clauses
    /// follow in column insertion order, and unique-together groups come
    /// last in declaration order. The `IF NOT EXISTS` guard is omitted when
    /// [`raise_exists_error`](Self::raise_exists_error) was requested.
    pub fn schema_sql(&self) -> Result<String> {
        self.validate()?;
        let mut fragments = Vec::with_capacity(self.columns.len());
        for column in self.columns.values() {
            fragments.push(column.definition_sql()?);
        }
        for column in self.columns.values().filter(|c| c.is_foreign_key()) {
            fragments.push(column.foreign_key_sql()?);
        }
        for group in &self.unique_together {
            fragments.push(
                SqlTemplate::new(UNIQUE_TEMPLATE)
                    .substitute(&[("fields", group.join(", ").as_str())]),
            );
        }
        let column_defs = fragments.join(", ");
        let exists = if self.raise_exists_error {
            ""
        } else {
            "IF NOT EXISTS"
        };
        Ok(SqlTemplate::new(SCHEMA_TEMPLATE).substitute(&[
            ("exists", exists),
            ("table_name", self.name.as_str()),
            ("column_defs", column_defs.as_str()),
        ]))
    }

    /// Renders one `CREATE TRIGGER` statement per auto-updating column, in
    /// column insertion order.
    ///
    /// Each column's partially-bound expression is resolved against this
    /// table's name and primary key name.
    pub fn trigger_sql(&self) -> Result<Vec<String>> {
        let primary_key_col = self.primary_key_name();
        let mut triggers = Vec::new();
        for column in self.columns.values().filter(|c| c.requires_trigger()) {
            let expr = column.trigger_expression()?.substitute(&[
                ("table_name", self.name.as_str()),
                ("primary_key_col", primary_key_col),
            ]);
            let trigger_name = format!("{}_{}_update", self.name, column.name());
            triggers.push(SqlTemplate::new(TRIGGER_TEMPLATE).substitute(&[
                ("trigger_name", trigger_name.as_str()),
                ("table_name", self.name.as_str()),
                ("expr", expr.as_str()),
            ]));
        }
        Ok(triggers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_columns_rejected_at_generation() {
        let table = Table::new("test_table", vec![]).unwrap();
        assert_eq!(
            Err(SchemaError::NoColumns("test_table".to_string())),
            table.schema_sql(),
        );
    }

    #[test]
    fn test_duplicate_columns_rejected_at_construction() {
        let result = Table::new(
            "test_table",
            vec![Column::int("new_column"), Column::text("new_column")],
        );
        assert_eq!(
            Err(SchemaError::DuplicateColumn {
                table: "test_table".to_string(),
                column: "new_column".to_string(),
            }),
            result,
        );
    }

    #[test]
    fn test_unique_together() {
        let table = Table::new(
            "test_table",
            vec![Column::text("firstname"), Column::text("lastname")],
        )
        .unwrap()
        .unique_together(["firstname", "lastname"]);
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table \
             (firstname TEXT, lastname TEXT, UNIQUE (firstname, lastname))",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_no_id_column() {
        let table = Table::new(
            "test_table",
            vec![Column::text("firstname"), Column::text("lastname")],
        )
        .unwrap();
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table (firstname TEXT, lastname TEXT)",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_specified_id_column() {
        let table = Table::new(
            "test_table",
            vec![
                Column::int("id").primary_key(),
                Column::text("firstname"),
                Column::text("lastname"),
            ],
        )
        .unwrap();
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table \
             (id INT PRIMARY KEY, firstname TEXT, lastname TEXT)",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_unique_together_and_id() {
        let table = Table::new(
            "test_table",
            vec![
                Column::int("id").primary_key(),
                Column::text("firstname"),
                Column::text("lastname"),
            ],
        )
        .unwrap()
        .unique_together(["firstname", "lastname"]);
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table \
             (id INT PRIMARY KEY, firstname TEXT, lastname TEXT, \
             UNIQUE (firstname, lastname))",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_foreign_key_constraint() {
        let table = Table::new(
            "test_table",
            vec![
                Column::int("id").primary_key(),
                Column::int("fk_col").references("other_table", "id"),
            ],
        )
        .unwrap();
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table \
             (id INT PRIMARY KEY, fk_col INT, \
             FOREIGN KEY (fk_col) REFERENCES other_table (id))",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_foreign_key_and_unique_together() {
        let table = Table::new(
            "test_table",
            vec![
                Column::int("id").primary_key(),
                Column::text("firstname"),
                Column::text("lastname"),
                Column::int("fk_col").references("other_table", "id"),
            ],
        )
        .unwrap()
        .unique_together(["firstname", "lastname"]);
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table \
             (id INT PRIMARY KEY, firstname TEXT, lastname TEXT, fk_col INT, \
             FOREIGN KEY (fk_col) REFERENCES other_table (id), \
             UNIQUE (firstname, lastname))",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_multiple_unique_constraints_in_declaration_order() {
        let table = Table::new(
            "test_table",
            vec![
                Column::int("id").primary_key(),
                Column::text("firstname"),
                Column::text("nickname"),
                Column::text("lastname"),
            ],
        )
        .unwrap()
        .unique_together(["firstname", "lastname"])
        .unique_together(["firstname", "nickname"]);
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS test_table \
             (id INT PRIMARY KEY, firstname TEXT, nickname TEXT, lastname TEXT, \
             UNIQUE (firstname, lastname), UNIQUE (firstname, nickname))",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_unique_together_unknown_column_rejected() {
        let table = Table::new("test_table", vec![Column::text("firstname")])
            .unwrap()
            .unique_together(["firstname", "lastname"]);
        assert_eq!(
            Err(SchemaError::UnknownUniqueColumn {
                table: "test_table".to_string(),
                column: "lastname".to_string(),
            }),
            table.schema_sql(),
        );
    }

    #[test]
    fn test_raise_exists_error_omits_guard() {
        let table = Table::new("test_table", vec![Column::int("id").primary_key()])
            .unwrap()
            .raise_exists_error();
        assert_eq!(
            "CREATE TABLE test_table (id INT PRIMARY KEY)",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_primary_key_name_falls_back_to_rowid() {
        let table = Table::new("test_table", vec![Column::text("name")]).unwrap();
        assert_eq!("rowid", table.primary_key_name());

        let table = Table::new(
            "test_table",
            vec![Column::text("name"), Column::int("id").primary_key()],
        )
        .unwrap();
        assert_eq!("id", table.primary_key_name());
    }

    #[test]
    fn test_datetime_auto_update_trigger() {
        let table = Table::new(
            "test_table",
            vec![Column::datetime("datetime").auto_now_insert().auto_now_update()],
        )
        .unwrap();
        assert_eq!(
            vec![
                "CREATE TRIGGER test_table_datetime_update AFTER UPDATE ON \
                 test_table BEGIN UPDATE test_table SET datetime = \
                 CURRENT_TIMESTAMP WHERE rowid = old.rowid; END"
                    .to_string(),
            ],
            table.trigger_sql().unwrap(),
        );
    }

    #[test]
    fn test_date_auto_update_trigger() {
        let table = Table::new(
            "test_table",
            vec![Column::date("date").auto_now_insert().auto_now_update()],
        )
        .unwrap();
        assert_eq!(
            vec![
                "CREATE TRIGGER test_table_date_update AFTER UPDATE ON test_table \
                 BEGIN UPDATE test_table SET date = CURRENT_DATE WHERE \
                 rowid = old.rowid; END"
                    .to_string(),
            ],
            table.trigger_sql().unwrap(),
        );
    }

    #[test]
    fn test_time_auto_update_trigger() {
        let table = Table::new(
            "test_table",
            vec![Column::time("time").auto_now_insert().auto_now_update()],
        )
        .unwrap();
        assert_eq!(
            vec![
                "CREATE TRIGGER test_table_time_update AFTER UPDATE ON test_table \
                 BEGIN UPDATE test_table SET time = CURRENT_TIME WHERE \
                 rowid = old.rowid; END"
                    .to_string(),
            ],
            table.trigger_sql().unwrap(),
        );
    }

    #[test]
    fn test_trigger_resolves_explicit_primary_key() {
        let table = Table::new(
            "account",
            vec![
                Column::int("id").primary_key(),
                Column::datetime("updated").auto_now_update(),
            ],
        )
        .unwrap();
        assert_eq!(
            vec![
                "CREATE TRIGGER account_updated_update AFTER UPDATE ON account \
                 BEGIN UPDATE account SET updated = CURRENT_TIMESTAMP WHERE \
                 id = old.id; END"
                    .to_string(),
            ],
            table.trigger_sql().unwrap(),
        );
    }

    #[test]
    fn test_no_triggers_without_auto_update_columns() {
        let table = Table::new(
            "test_table",
            vec![Column::datetime("created").auto_now_insert()],
        )
        .unwrap();
        assert!(table.trigger_sql().unwrap().is_empty());
    }

    #[test]
    fn test_many_to_many() {
        let table = Table::many_to_many("campaign_characters", "campaign", "character")
            .unwrap();
        assert_eq!(
            "CREATE TABLE IF NOT EXISTS campaign_characters \
             (campaign_id INT NOT NULL, character_id INT NOT NULL, \
             FOREIGN KEY (campaign_id) REFERENCES campaign (id), \
             FOREIGN KEY (character_id) REFERENCES character (id), \
             UNIQUE (campaign_id, character_id))",
            table.schema_sql().unwrap(),
        );
    }

    #[test]
    fn test_many_to_many_with_self_rejected() {
        assert_eq!(
            Err(SchemaError::DuplicateColumn {
                table: "character_friends".to_string(),
                column: "character_id".to_string(),
            }),
            Table::many_to_many("character_friends", "character", "character"),
        );
    }

    #[test]
    fn test_definition_round_trips_through_serde() {
        let table = Table::new(
            "event",
            vec![
                Column::int("id").primary_key(),
                Column::boolean("all_day").default_value(false),
                Column::datetime("updated").auto_now_insert().auto_now_update(),
            ],
        )
        .unwrap()
        .unique_together(["id", "updated"]);
        let encoded = serde_json::to_string(&table).unwrap();
        let decoded: Table = serde_json::from_str(&encoded).unwrap();
        assert_eq!(table, decoded);
        assert_eq!(table.schema_sql().unwrap(), decoded.schema_sql().unwrap());
    }
}
