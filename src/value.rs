use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert from a rusqlite `ValueRef`. Booleans come back as integers.
    pub fn from_value_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use rusqlite::types::Value as Owned;
        match self {
            Value::Null => Ok(ToSqlOutput::Owned(Owned::Null)),
            Value::Integer(i) => Ok(ToSqlOutput::Owned(Owned::Integer(*i))),
            Value::Real(f) => Ok(ToSqlOutput::Owned(Owned::Real(*f))),
            Value::Text(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            Value::Blob(b) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(b))),
            Value::Boolean(b) => Ok(ToSqlOutput::Owned(Owned::Integer(i64::from(*b)))),
        }
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(Value::from_value_ref(value))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_binds_as_integer() {
        let out = Value::Boolean(true).to_sql().unwrap();
        assert_eq!(
            out,
            ToSqlOutput::Owned(rusqlite::types::Value::Integer(1))
        );
        let out = Value::Boolean(false).to_sql().unwrap();
        assert_eq!(
            out,
            ToSqlOutput::Owned(rusqlite::types::Value::Integer(0))
        );
    }

    #[test]
    fn test_from_value_ref() {
        assert_eq!(Value::from_value_ref(ValueRef::Null), Value::Null);
        assert_eq!(
            Value::from_value_ref(ValueRef::Text(b"hello")),
            Value::Text("hello".to_string())
        );
        assert_eq!(
            Value::from_value_ref(ValueRef::Blob(&[1, 2, 3])),
            Value::Blob(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(20), Value::Integer(20));
        assert_eq!(Value::from(1.8), Value::Real(1.8));
        assert_eq!(Value::from("John"), Value::Text("John".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Boolean(true));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Integer(42).as_f64(), Some(42.0));
        assert_eq!(Value::Boolean(true).as_i64(), Some(1));
        assert_eq!(Value::Text("x".into()).as_i64(), None);
        assert!(Value::Null.is_null());
        assert_eq!(Value::Blob(vec![0; 4]).to_string(), "<4 bytes>");
    }
}
