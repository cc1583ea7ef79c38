//! Schema definition model and SQL text generation for SQLite tables.
//!
//! This crate is the pure, driver-free half of `sqlite-tables`: callers
//! describe tables and columns as in-memory objects, and the model derives
//! the DDL text for the engine to execute.
//!
//! - [`Column`] — one column's declared type, nullability, default,
//!   uniqueness, primary key and foreign key attributes, rendered as
//!   definition, foreign key, and trigger-expression fragments.
//! - [`Table`] — an ordered, name-unique column collection with
//!   unique-together groups, composed into `CREATE TABLE` and
//!   `CREATE TRIGGER` statements.
//! - [`SqlTemplate`] — the `$name` substitution engine every statement
//!   shape is rendered through.
//! - [`SchemaError`] — configuration errors, raised eagerly so a caller
//!   never receives partially-built SQL.
//!
//! # Example
//!
//! ```
//! use sqlite_tables_core::{Column, Table};
//!
//! let campaign = Table::new(
//!     "campaign",
//!     vec![
//!         Column::int("id").primary_key(),
//!         Column::text("title").not_null(),
//!         Column::text("notes"),
//!         Column::datetime("created").auto_now_insert(),
//!         Column::datetime("updated").auto_now_insert().auto_now_update(),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     "CREATE TABLE IF NOT EXISTS campaign (id INT PRIMARY KEY, \
//!      title TEXT NOT NULL, notes TEXT, \
//!      created TEXT DEFAULT CURRENT_TIMESTAMP, \
//!      updated TEXT DEFAULT CURRENT_TIMESTAMP)",
//!     campaign.schema_sql().unwrap(),
//! );
//!
//! // One trigger per auto-updating column, bound to this table's identity.
//! let triggers = campaign.trigger_sql().unwrap();
//! assert_eq!(1, triggers.len());
//! assert!(triggers[0].starts_with("CREATE TRIGGER campaign_updated_update"));
//! ```

mod column;
mod error;
mod table;
mod template;

pub use column::{Column, ColumnDefault, ColumnType, TimeKeyword};
pub use error::{Result, SchemaError};
pub use table::Table;
pub use template::SqlTemplate;
