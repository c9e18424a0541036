//! Structured CRUD arguments and the SQL they render to.
//!
//! Identifiers (table and column names, declarations) are caller-trusted and
//! written into the statement text verbatim. Values never are: every value,
//! whether data or predicate, becomes a `?` placeholder bound at execution.

use serde::{Deserialize, Serialize};

use crate::schema::TableDefinition;
use crate::value::Value;

fn upsert(entries: &mut Vec<(String, Value)>, column: String, value: Value) {
    match entries.iter_mut().find(|(name, _)| *name == column) {
        Some(entry) => entry.1 = value,
        None => entries.push((column, value)),
    }
}

/// Column values for insert and update.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, column: &str, value: impl Into<Value>) -> Self {
        upsert(&mut self.values, column.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            upsert(&mut record.values, k.into(), v.into());
        }
        record
    }
}

/// Equality conditions joined with `AND`. Empty means no filter.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate {
    conditions: Vec<(String, Value)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, column: &str, value: impl Into<Value>) -> Self {
        upsert(&mut self.conditions, column.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut predicate = Predicate::new();
        for (k, v) in iter {
            upsert(&mut predicate.conditions, k.into(), v.into());
        }
        predicate
    }
}

/// SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn create_table(table: &TableDefinition, if_not_exists: bool) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.declaration))
            .collect::<Vec<_>>()
            .join(", ");
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        Self::new(format!("CREATE TABLE {}{} ({})", guard, table.name, columns))
    }

    pub fn drop_table(name: &str) -> Self {
        Self::new(format!("DROP TABLE {}", name))
    }

    pub fn insert(table: &str, values: Vec<(String, Value)>) -> Self {
        let (columns, params): (Vec<String>, Vec<Value>) = values.into_iter().unzip();
        let placeholders = vec!["?"; params.len()].join(", ");
        Self::new(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ))
        .with_params(params)
    }

    pub fn update(table: &str, values: Vec<(String, Value)>, filter: Vec<(String, Value)>) -> Self {
        let mut params = Vec::with_capacity(values.len() + filter.len());
        let assignments = values
            .into_iter()
            .map(|(column, value)| {
                params.push(value);
                format!("{} = ?", column)
            })
            .collect::<Vec<_>>()
            .join(", ");
        let clause = where_clause(filter, &mut params);
        Self::new(format!("UPDATE {} SET {}{}", table, assignments, clause)).with_params(params)
    }

    pub fn delete(table: &str, filter: Vec<(String, Value)>) -> Self {
        let mut params = Vec::with_capacity(filter.len());
        let clause = where_clause(filter, &mut params);
        Self::new(format!("DELETE FROM {}{}", table, clause)).with_params(params)
    }

    pub fn select(table: &str, columns: &[&str], filter: Vec<(String, Value)>) -> Self {
        let mut params = Vec::with_capacity(filter.len());
        let clause = where_clause(filter, &mut params);
        Self::new(format!("SELECT {} FROM {}{}", columns.join(", "), table, clause))
            .with_params(params)
    }
}

fn where_clause(filter: Vec<(String, Value)>, params: &mut Vec<Value>) -> String {
    if filter.is_empty() {
        return String::new();
    }
    let conditions = filter
        .into_iter()
        .map(|(column, value)| {
            params.push(value);
            format!("{} = ?", column)
        })
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(" WHERE {}", conditions)
}

/// A CRUD request as plain data, dispatched by `Database::execute_crud`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrudOperation {
    Create {
        table: String,
        data: Record,
    },
    Read {
        table: String,
        columns: Vec<String>,
        #[serde(default)]
        predicate: Predicate,
    },
    Update {
        table: String,
        data: Record,
        #[serde(default)]
        predicate: Predicate,
    },
    Delete {
        table: String,
        predicate: Predicate,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrudOutcome {
    /// Rows changed by a create, update or delete.
    Affected(usize),
    /// Rows read; `None` when nothing matched.
    Rows(Option<Vec<crate::row::Row>>),
}
