//! Error taxonomy for the database handle.
//!
//! Every failure is returned to the immediate caller. Validation, conversion
//! and lookup failures are raised before any statement reaches SQLite.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ColumnType;
use crate::value::Value;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{op}: {message}")]
    Validation { op: &'static str, message: String },

    #[error("conversion of {value} to {column_type} failed")]
    TypeConversion { value: Value, column_type: ColumnType },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("failed to open database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database is closed")]
    Closed,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn validation(op: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            op,
            message: message.into(),
        }
    }

    pub(crate) fn conversion(value: &Value, column_type: &ColumnType) -> Self {
        Error::TypeConversion {
            value: value.clone(),
            column_type: column_type.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
