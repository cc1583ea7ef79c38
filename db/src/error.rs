//! Error types for database operations.
//!
//! Configuration mistakes (unknown tables or columns, duplicate table
//! names, codec misuse) get their own variants; anything the engine itself
//! rejects propagates verbatim as [`DatabaseError::Database`].

use thiserror::Error;

use sqlite_tables_core::SchemaError;

/// Errors that can occur while applying schemas or moving values across the
/// driver boundary.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unsatisfiable schema configuration, raised before any SQL is
    /// emitted.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// SQLite rejected a statement; not translated by this crate.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Two table definitions share a name.
    #[error("duplicate table name '{0}'")]
    DuplicateTable(String),

    /// The database has no table with the given name.
    #[error("database has no table '{0}'")]
    UnknownTable(String),

    /// The named table has no column with the given name.
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn {
        /// Name of the table the insert targeted.
        table: String,
        /// The unresolved column name.
        column: String,
    },

    /// A value could not be encoded or decoded for its declared type.
    #[error("codec error: {0}")]
    Codec(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
