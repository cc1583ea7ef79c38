//! Connection-owning database wrapper.
//!
//! [`Database`] ties together a [`rusqlite::Connection`], a set of
//! [`Table`] definitions, and an instance-scoped [`CodecRegistry`]. It
//! applies generated DDL, inserts rows with declared-type value encoding,
//! and reads them back with the matching decoding.
//!
//! Every mutation runs in a scoped transaction: committed on success,
//! rolled back when any statement fails. Statements the engine rejects
//! propagate verbatim; nothing is retried.

use std::path::Path;

use indexmap::IndexMap;
use indexmap::map::Entry;
use rusqlite::{Connection, ToSql, named_params};
use tracing::debug;

use sqlite_tables_core::{Column, SqlTemplate, Table};

use crate::codec::{CodecRegistry, Value};
use crate::error::{DatabaseError, Result};

const INSERT_TEMPLATE: &str =
    "INSERT INTO $table_name ($column_names) VALUES ($value_template)";

/// A SQLite database described by a set of [`Table`] definitions.
///
/// # Examples
///
/// ```no_run
/// use sqlite_tables_core::{Column, Table};
/// use sqlite_tables_db::{Database, Value};
///
/// let campaign = Table::new(
///     "campaign",
///     vec![
///         Column::int("id").primary_key(),
///         Column::text("title").not_null(),
///         Column::boolean("active"),
///     ],
/// )
/// .unwrap();
///
/// let mut db = Database::open("campaigns.db", vec![campaign]).unwrap();
/// db.create_all().unwrap();
/// db.insert(
///     "campaign",
///     &[
///         ("id", Value::Integer(1)),
///         ("title", "Sunless Citadel".into()),
///         ("active", true.into()),
///     ],
/// )
/// .unwrap();
/// ```
pub struct Database {
    conn: Connection,
    tables: IndexMap<String, Table>,
    codecs: CodecRegistry,
}

impl Database {
    /// Opens (or creates) a database file and attaches the table
    /// definitions.
    pub fn open(path: impl AsRef<Path>, tables: Vec<Table>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?, tables)
    }

    /// Opens an in-memory database with the table definitions attached.
    pub fn open_in_memory(tables: Vec<Table>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, tables)
    }

    /// Wraps an existing connection.
    ///
    /// Enables foreign key enforcement and installs the default codec
    /// registry (boolean and integer-list codecs).
    ///
    /// # Errors
    ///
    /// [`DatabaseError::DuplicateTable`] if two definitions share a name.
    pub fn from_connection(conn: Connection, tables: Vec<Table>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut table_map = IndexMap::with_capacity(tables.len());
        for table in tables {
            match table_map.entry(table.name().to_string()) {
                Entry::Occupied(entry) => {
                    return Err(DatabaseError::DuplicateTable(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(table);
                }
            }
        }
        Ok(Self {
            conn,
            tables: table_map,
            codecs: CodecRegistry::with_defaults(),
        })
    }

    /// Replaces the codec registry, for callers extending or overriding the
    /// default codecs. Scoped to this instance only.
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// The table definition with the given name, if attached.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// The attached table definitions, in attachment order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// A reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the database and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Applies every table's schema and trigger statements.
    ///
    /// Runs in a single transaction: either every table and trigger is
    /// created or none are. With the default `IF NOT EXISTS` guard this is
    /// safe to call repeatedly; tables built with
    /// [`raise_exists_error`](Table::raise_exists_error) make a second call
    /// an engine error.
    pub fn create_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for table in self.tables.values() {
            let schema = table.schema_sql()?;
            debug!(table = table.name(), "applying schema");
            tx.execute_batch(&schema)?;
            for trigger in table.trigger_sql()? {
                tx.execute_batch(&trigger)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Inserts one row, encoding each value for its column's declared type.
    ///
    /// The statement uses named parameters, one per supplied column, in the
    /// order given.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::UnknownTable`] or [`DatabaseError::UnknownColumn`]
    /// if the target does not exist in the attached definitions;
    /// [`DatabaseError::Codec`] if a value cannot be encoded; engine
    /// rejections propagate verbatim.
    pub fn insert(&mut self, table_name: &str, values: &[(&str, Value)]) -> Result<()> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| DatabaseError::UnknownTable(table_name.to_string()))?;
        let mut parameters = Vec::with_capacity(values.len());
        for (column_name, value) in values {
            let column = table.column(column_name).ok_or_else(|| {
                DatabaseError::UnknownColumn {
                    table: table_name.to_string(),
                    column: column_name.to_string(),
                }
            })?;
            let stored = self.codecs.encode(column.column_type(), value)?;
            parameters.push((format!(":{column_name}"), stored));
        }
        let column_names = values
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let value_template = values
            .iter()
            .map(|(name, _)| format!(":{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = SqlTemplate::new(INSERT_TEMPLATE).substitute(&[
            ("table_name", table_name),
            ("column_names", column_names.as_str()),
            ("value_template", value_template.as_str()),
        ]);
        debug!(table = table_name, "inserting row");
        let bound: Vec<(&str, &dyn ToSql)> = parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();
        let tx = self.conn.transaction()?;
        tx.execute(&statement, bound.as_slice())?;
        tx.commit()?;
        Ok(())
    }

    /// Reads every row of a table, decoding each column through the codec
    /// registry keyed on its declared type.
    ///
    /// Columns appear in definition order in each returned row map.
    pub fn fetch_all(&self, table_name: &str) -> Result<Vec<IndexMap<String, Value>>> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| DatabaseError::UnknownTable(table_name.to_string()))?;
        let column_names = table.columns().map(Column::name).collect::<Vec<_>>();
        let query = format!("SELECT {} FROM {}", column_names.join(", "), table.name());
        let mut stmt = self.conn.prepare(&query)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = IndexMap::with_capacity(column_names.len());
            for (index, column) in table.columns().enumerate() {
                let stored: rusqlite::types::Value = row.get(index)?;
                let value = self.codecs.decode(column.column_type(), stored)?;
                record.insert(column.name().to_string(), value);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Enumerates table names present in the database file itself.
    pub fn existing_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = :type_arg")?;
        let names = stmt
            .query_map(named_params! {":type_arg": "table"}, |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}
