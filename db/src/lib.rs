//! SQLite driver glue for `sqlite-tables` schema definitions.
//!
//! Pairs the pure SQL generation of
//! [`sqlite_tables_core`] with a [`rusqlite`] connection:
//!
//! - **`database`** — [`Database`]: applies `CREATE TABLE` / `CREATE
//!   TRIGGER` statements, inserts rows with named parameters, reads them
//!   back, all inside scoped transactions.
//! - **`codec`** — [`Value`], the codec functions, and the instance-scoped
//!   [`CodecRegistry`] translating booleans and integer lists to and from
//!   their storage representations, keyed by declared column type.
//!
//! # Quick start
//!
//! ```no_run
//! use sqlite_tables_core::{Column, Table};
//! use sqlite_tables_db::{Database, Value};
//!
//! let inventory = Table::new(
//!     "inventory",
//!     vec![
//!         Column::int("id").primary_key(),
//!         Column::text("label").not_null(),
//!         Column::int_list("quantities"),
//!     ],
//! )
//! .unwrap();
//!
//! let mut db = Database::open("inventory.db", vec![inventory]).unwrap();
//! db.create_all().unwrap();
//! db.insert(
//!     "inventory",
//!     &[
//!         ("id", Value::Integer(1)),
//!         ("label", "arrows".into()),
//!         ("quantities", vec![20, 20, 10].into()),
//!     ],
//! )
//! .unwrap();
//!
//! let rows = db.fetch_all("inventory").unwrap();
//! assert_eq!(Some(&Value::IntList(vec![20, 20, 10])), rows[0].get("quantities"));
//! ```

mod codec;
mod database;
mod error;

pub use codec::{
    Codec, CodecRegistry, Value, decode_bool, decode_int_list, encode_bool,
    encode_int_list,
};
pub use database::Database;
pub use error::{DatabaseError, Result};
