//! Column type tags and value coercion.
//!
//! A column's declaration (`"INTEGER PRIMARY KEY AUTOINCREMENT"`) is reduced to
//! its leading token, which picks the coercion rule applied to every value
//! written to or matched against that column. Unrecognized tags pass values
//! through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Boolean,
    Integer,
    Real,
    Blob,
    Text,
    /// Any tag outside the five above, kept verbatim (upper-cased).
    Other(String),
}

impl ColumnType {
    /// Pick the tag from a raw column declaration.
    ///
    /// Only the leading token counts; modifiers such as `PRIMARY KEY` and
    /// length suffixes like `VARCHAR(20)` are left for SQLite to interpret.
    pub fn from_declaration(declaration: &str) -> Self {
        let tag = declaration
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        match tag.as_str() {
            "BOOLEAN" => ColumnType::Boolean,
            "INTEGER" => ColumnType::Integer,
            "REAL" => ColumnType::Real,
            "BLOB" => ColumnType::Blob,
            "TEXT" => ColumnType::Text,
            _ => ColumnType::Other(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Blob => "BLOB",
            ColumnType::Text => "TEXT",
            ColumnType::Other(tag) => tag,
        }
    }

    /// Coerce `value` into the native form for this tag.
    ///
    /// `Null` is accepted by every tag. Any rejection surfaces as
    /// [`Error::TypeConversion`] carrying the offending value and this tag.
    pub fn coerce(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let converted = match self {
            ColumnType::Boolean => to_boolean(value),
            ColumnType::Integer => to_integer(value),
            ColumnType::Real => to_real(value),
            ColumnType::Text => to_text(value),
            ColumnType::Blob => to_blob(value),
            ColumnType::Other(_) => Some(value.clone()),
        };

        converted.ok_or_else(|| Error::conversion(value, self))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_boolean(value: &Value) -> Option<Value> {
    let b = match value {
        Value::Boolean(b) => *b,
        Value::Text(s) => match s.to_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return None,
        },
        Value::Integer(1) => true,
        Value::Integer(0) => false,
        Value::Real(f) if *f == 1.0 => true,
        Value::Real(f) if *f == 0.0 => false,
        _ => return None,
    };
    Some(Value::Boolean(b))
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Integer(i) => Some(Value::Integer(*i)),
        Value::Boolean(b) => Some(Value::Integer(i64::from(*b))),
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        Value::Real(f)
            if f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
        {
            Some(Value::Integer(*f as i64))
        }
        Value::Text(s) => s.trim().parse::<i64>().ok().map(Value::Integer),
        _ => None,
    }
}

fn to_real(value: &Value) -> Option<Value> {
    match value {
        Value::Real(f) => Some(Value::Real(*f)),
        Value::Integer(i) => Some(Value::Real(*i as f64)),
        Value::Boolean(b) => Some(Value::Real(if *b { 1.0 } else { 0.0 })),
        Value::Text(s) => s.trim().parse::<f64>().ok().map(Value::Real),
        _ => None,
    }
}

fn to_text(value: &Value) -> Option<Value> {
    match value {
        Value::Text(s) => Some(Value::Text(s.clone())),
        Value::Blob(b) => String::from_utf8(b.clone()).ok().map(Value::Text),
        other => Some(Value::Text(other.to_string())),
    }
}

fn to_blob(value: &Value) -> Option<Value> {
    match value {
        Value::Blob(b) => Some(Value::Blob(b.clone())),
        Value::Text(s) => Some(Value::Blob(s.clone().into_bytes())),
        other => Some(Value::Blob(other.to_string().into_bytes())),
    }
}
