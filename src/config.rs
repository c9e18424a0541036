use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schema::TableDefinition;

pub const MEMORY: &str = ":memory:";

/// Database handle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name as given by the caller, or `:memory:`
    pub name: String,
    /// Extension appended when `name` lacks a recognized one
    #[serde(default = "default_extension")]
    pub default_extension: String,
    #[serde(default = "recognized_extensions")]
    pub recognized_extensions: Vec<String>,
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
    #[serde(default)]
    pub foreign_keys: bool,
    /// Tables created (if missing) and registered when the handle opens
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

fn default_extension() -> String {
    "sqlite".to_string()
}

fn recognized_extensions() -> Vec<String> {
    vec!["sqlite".to_string(), "db".to_string()]
}

impl DatabaseConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_extension: default_extension(),
            recognized_extensions: recognized_extensions(),
            busy_timeout_ms: None,
            foreign_keys: false,
            tables: Vec::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MEMORY)
    }

    pub fn with_busy_timeout_ms(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = Some(millis);
        self
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn with_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    pub fn is_memory(&self) -> bool {
        self.name == MEMORY
    }

    /// The file the handle opens: `name` itself when it ends in a recognized
    /// extension, otherwise `name.<default_extension>`.
    pub fn resolve_path(&self) -> PathBuf {
        if self.is_memory() {
            return PathBuf::from(MEMORY);
        }
        // Suffix match on the file name, so dotfiles like `.sqlite` count too.
        let recognized = Path::new(&self.name)
            .file_name()
            .and_then(|file| file.to_str())
            .is_some_and(|file| {
                self.recognized_extensions
                    .iter()
                    .any(|ext| file.ends_with(&format!(".{}", ext)))
            });
        if recognized {
            PathBuf::from(&self.name)
        } else {
            PathBuf::from(format!("{}.{}", self.name, self.default_extension))
        }
    }
}
