//! Typed tables and structured CRUD over a single SQLite file.
//!
//! # Intention
//!
//! - Let callers declare tables with typed columns and then insert, update,
//!   delete and select with column/value mappings instead of SQL strings.
//! - Coerce every value to its column's declared type before any statement
//!   is submitted, and bind every value as a parameter.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No relations, joins, migrations or query planning.
//!
//! ```no_run
//! use nano_sqlite::{Database, Predicate, Record};
//!
//! # fn main() -> nano_sqlite::Result<()> {
//! let db = Database::open("people")?;
//! db.create_table(
//!     "people",
//!     [("id", "INTEGER PRIMARY KEY AUTOINCREMENT"), ("name", "TEXT"), ("is_cool", "BOOLEAN")],
//! )?;
//! db.insert("people", &Record::new().with_value("name", "John").with_value("is_cool", "true"))?;
//! let john = db.select_first("people", &["id", "name"], &Predicate::new().with_condition("name", "John"))?;
//! assert!(john.is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod row;
pub mod schema;
pub mod sqlite;
pub mod types;
pub mod value;

pub use config::DatabaseConfig;
pub use error::{Error, Result};
pub use query::{CrudOperation, CrudOutcome, Predicate, Record, SqlStatement};
pub use row::Row;
pub use schema::{ColumnDefinition, SchemaRegistry, TableDefinition};
pub use sqlite::Database;
pub use types::ColumnType;
pub use value::Value;
