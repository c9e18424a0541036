//! Table declarations and the per-handle schema registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ColumnType;
use crate::value::Value;

/// A declared column: its name and the raw declaration passed to SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub declaration: String,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, declaration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaration: declaration.into(),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_declaration(&self.declaration)
    }
}

/// A table and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column. A repeated name replaces the earlier declaration in place.
    pub fn with_column(mut self, name: impl Into<String>, declaration: impl Into<String>) -> Self {
        let column = ColumnDefinition::new(name, declaration);
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Coerce one value under the named column's tag.
    pub fn coerce(&self, column: &str, value: &Value) -> Result<Value> {
        let definition = self.column(column).ok_or_else(|| Error::UnknownColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })?;
        definition.column_type().coerce(value)
    }

    /// Coerce every pair, failing on the first column that does not convert.
    pub fn coerce_all<'a, I>(&self, pairs: I) -> Result<Vec<(String, Value)>>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        pairs
            .into_iter()
            .map(|(column, value)| Ok((column.to_string(), self.coerce(column, value)?)))
            .collect()
    }
}

/// Tables declared through one handle, keyed by name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: TableDefinition) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn remove(&mut self, name: &str) -> Result<TableDefinition> {
        self.tables
            .remove(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&TableDefinition> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered table names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> TableDefinition {
        TableDefinition::new("people")
            .with_column("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
            .with_column("name", "TEXT")
            .with_column("is_cool", "BOOLEAN")
    }

    #[test]
    fn test_columns_keep_declaration_order() {
        let table = people().with_column("name", "TEXT NOT NULL");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "is_cool"]);
        assert_eq!(table.column("name").unwrap().declaration, "TEXT NOT NULL");
    }

    #[test]
    fn test_coerce_unknown_column() {
        let err = people().coerce("age", &Value::Integer(1)).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { ref column, .. } if column == "age"));
    }

    #[test]
    fn test_coerce_all_stops_on_bad_value() {
        let name = Value::from("John");
        let cool = Value::from("bool");
        let err = people()
            .coerce_all([("name", &name), ("is_cool", &cool)])
            .unwrap_err();
        assert!(matches!(err, Error::TypeConversion { .. }));
    }

    #[test]
    fn test_registry_lookup_and_removal() {
        let mut registry = SchemaRegistry::new();
        registry.register(people());
        assert!(registry.contains("people"));
        assert_eq!(registry.names(), vec!["people".to_string()]);

        registry.remove("people").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.remove("people"),
            Err(Error::UnknownTable(name)) if name == "people"
        ));
        assert!(matches!(registry.get("people"), Err(Error::UnknownTable(_))));
    }
}
