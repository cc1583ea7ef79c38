//! Error types for schema definition and SQL generation.
//!
//! Every generator validates its own invariants before emitting text, so a
//! caller never receives partially-built SQL. Each variant names the exact
//! constraint that was violated.

use thiserror::Error;

/// Errors raised for unsatisfiable schema configurations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A column was flagged both PRIMARY KEY and UNIQUE.
    #[error("column '{0}' should be either primary key or unique, not both")]
    PrimaryKeyAndUnique(String),

    /// A primary key column carried a default value.
    #[error("column '{0}': default values cannot be specified for primary key columns")]
    PrimaryKeyWithDefault(String),

    /// Auto-now behavior was requested on a column with no time keyword.
    #[error("column '{0}': auto-now is only valid for date, time, and datetime columns")]
    AutoNowOnNonTimeColumn(String),

    /// A foreign key column is missing one of its references.
    #[error("column '{column}': {field} cannot be empty for foreign key columns")]
    MissingForeignKeyRef {
        /// Name of the misconfigured column.
        column: String,
        /// Which reference is absent (`fk_table_ref` or `fk_column_ref`).
        field: &'static str,
    },

    /// A trigger expression was requested from a column with no update marker.
    #[error("column '{0}' has no auto-update default, no trigger expression to build")]
    NoUpdateDefault(String),

    /// A table was defined with no columns.
    #[error("cannot create table '{0}' without columns")]
    NoColumns(String),

    /// Two columns in the same table share a name.
    #[error("duplicate column name '{column}' in table '{table}'")]
    DuplicateColumn {
        /// Name of the table being defined.
        table: String,
        /// The repeated column name.
        column: String,
    },

    /// A unique-together group references a column the table does not have.
    #[error("unique constraint on table '{table}' references unknown column '{column}'")]
    UnknownUniqueColumn {
        /// Name of the table being defined.
        table: String,
        /// The unresolved column name.
        column: String,
    },
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
