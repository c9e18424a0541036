//! The database handle.
//!
//! One [`Database`] owns one SQLite connection and the schemas of the tables
//! declared through it. Both live behind a single mutex, so statements are
//! submitted one at a time no matter how many threads share the handle, and
//! each statement runs in its own transaction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::query::{CrudOperation, CrudOutcome, Predicate, Record, SqlStatement};
use crate::row::Row;
use crate::schema::{SchemaRegistry, TableDefinition};
use crate::value::Value;

struct State {
    connection: Option<Connection>,
    tables: SchemaRegistry,
}

impl State {
    fn connection(&mut self) -> Result<&mut Connection> {
        self.connection.as_mut().ok_or(Error::Closed)
    }

    /// Run one statement in its own transaction; rolls back when it fails.
    fn execute(&mut self, statement: &SqlStatement) -> Result<usize> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        let tx = self.connection()?.transaction()?;
        let changed = tx.execute(&statement.sql, params_from_iter(statement.params.iter()))?;
        tx.commit()?;
        Ok(changed)
    }

    /// Run one statement in autocommit mode, outside any explicit transaction.
    fn execute_autocommit(&mut self, statement: &SqlStatement) -> Result<usize> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute_autocommit");
        let changed = self
            .connection()?
            .execute(&statement.sql, params_from_iter(statement.params.iter()))?;
        Ok(changed)
    }

    fn query(&mut self, statement: &SqlStatement, limit: Option<usize>) -> Result<Vec<Row>> {
        debug!(sql = %statement.sql, params = statement.params.len(), "query");
        let tx = self.connection()?.transaction()?;
        let rows = read_rows(&tx, statement, limit)?;
        tx.commit()?;
        Ok(rows)
    }
}

fn read_rows(conn: &Connection, statement: &SqlStatement, limit: Option<usize>) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&statement.sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut out = Row::new();
        for (i, name) in columns.iter().enumerate() {
            out.push(name.as_str(), Value::from_value_ref(row.get_ref(i)?));
        }
        result.push(out);
        if limit.is_some_and(|n| result.len() >= n) {
            break;
        }
    }
    Ok(result)
}

fn configure(connection: &Connection, config: &DatabaseConfig) -> Result<()> {
    if let Some(millis) = config.busy_timeout_ms {
        connection.busy_timeout(Duration::from_millis(millis))?;
    }
    connection.pragma_update(None, "foreign_keys", config.foreign_keys)?;
    Ok(())
}

fn non_empty(rows: Vec<Row>) -> Option<Vec<Row>> {
    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

/// A handle to one SQLite database file.
pub struct Database {
    config: DatabaseConfig,
    path: PathBuf,
    state: Mutex<State>,
}

impl Database {
    /// Open (or create) the database `name`, appending `.sqlite` when the
    /// name carries no recognized extension.
    pub fn open(name: &str) -> Result<Self> {
        Self::open_with_config(DatabaseConfig::new(name))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open_with_config(DatabaseConfig::in_memory())
    }

    pub fn open_with_config(config: DatabaseConfig) -> Result<Self> {
        let path = config.resolve_path();
        let connection = if config.is_memory() {
            Connection::open_in_memory()
        } else {
            Connection::open(&path)
        }
        .map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        configure(&connection, &config)?;

        let mut state = State {
            connection: Some(connection),
            tables: SchemaRegistry::new(),
        };
        for table in &config.tables {
            validate_columns(table)?;
            state.execute(&SqlStatement::create_table(table, true))?;
            state.tables.register(table.clone());
        }

        info!(path = %path.display(), tables = config.tables.len(), "opened database");
        Ok(Self {
            config,
            path,
            state: Mutex::new(state),
        })
    }

    /// Release the connection. Closing a closed handle is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        let Some(connection) = state.connection.take() else {
            return Ok(());
        };
        if let Err((connection, err)) = connection.close() {
            state.connection = Some(connection);
            return Err(err.into());
        }
        info!(path = %self.path.display(), "closed database");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().connection.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Names of the tables declared through this handle.
    pub fn tables(&self) -> Vec<String> {
        self.state.lock().tables.names()
    }

    pub fn table(&self, name: &str) -> Option<TableDefinition> {
        self.state.lock().tables.get(name).ok().cloned()
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state.lock();
        state.connection()?;
        Ok(state)
    }

    /// `CREATE TABLE name (col decl, ...)` with columns in the given order.
    ///
    /// An existing table of the same name is reported by SQLite, not checked
    /// beforehand.
    pub fn create_table<I, K, D>(&self, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        let table = columns
            .into_iter()
            .fold(TableDefinition::new(name), |table, (column, declaration)| {
                table.with_column(column, declaration)
            });
        self.create_table_from(table)
    }

    pub fn create_table_from(&self, table: TableDefinition) -> Result<()> {
        validate_columns(&table)?;
        let mut state = self.lock_open()?;
        state.execute(&SqlStatement::create_table(&table, false))?;
        debug!(table = %table.name, columns = table.columns.len(), "registered table");
        state.tables.register(table);
        Ok(())
    }

    /// `DROP TABLE name`; the table must have been declared through this handle.
    pub fn delete_table(&self, name: &str) -> Result<()> {
        let mut state = self.lock_open()?;
        state.tables.get(name)?;
        state.execute(&SqlStatement::drop_table(name))?;
        state.tables.remove(name)?;
        Ok(())
    }

    /// Insert one row. Every value must coerce under its column's type or
    /// nothing is written. Omitted columns take SQLite's default.
    pub fn insert(&self, table: &str, data: &Record) -> Result<usize> {
        if data.is_empty() {
            return Err(Error::validation("insert", "at least one column must be specified"));
        }
        let mut state = self.lock_open()?;
        let values = state.tables.get(table)?.coerce_all(data.iter())?;
        state.execute(&SqlStatement::insert(table, values))
    }

    /// Update matching rows. An empty predicate updates every row.
    pub fn update(&self, table: &str, data: &Record, predicate: &Predicate) -> Result<usize> {
        if data.is_empty() {
            return Err(Error::validation("update", "at least one column must be specified"));
        }
        let mut state = self.lock_open()?;
        let schema = state.tables.get(table)?;
        let values = schema.coerce_all(data.iter())?;
        let filter = schema.coerce_all(predicate.iter())?;
        state.execute(&SqlStatement::update(table, values, filter))
    }

    /// Delete matching rows. An empty predicate is refused.
    pub fn delete(&self, table: &str, predicate: &Predicate) -> Result<usize> {
        if predicate.is_empty() {
            return Err(Error::validation("delete", "at least one condition must be specified"));
        }
        let mut state = self.lock_open()?;
        let filter = state.tables.get(table)?.coerce_all(predicate.iter())?;
        state.execute(&SqlStatement::delete(table, filter))
    }

    /// Rows matching `predicate`, or `None` when nothing matched.
    pub fn select(
        &self,
        table: &str,
        columns: &[&str],
        predicate: &Predicate,
    ) -> Result<Option<Vec<Row>>> {
        require_columns("select", columns)?;
        let mut state = self.lock_open()?;
        let statement = select_statement(&state, table, columns, predicate)?;
        let rows = state.query(&statement, None)?;
        Ok(non_empty(rows))
    }

    /// The first row matching `predicate`, or `None`.
    pub fn select_first(
        &self,
        table: &str,
        columns: &[&str],
        predicate: &Predicate,
    ) -> Result<Option<Row>> {
        require_columns("select_first", columns)?;
        let mut state = self.lock_open()?;
        let statement = select_statement(&state, table, columns, predicate)?;
        let rows = state.query(&statement, Some(1))?;
        Ok(rows.into_iter().next())
    }

    /// Every column of every row, or `None` for an empty table.
    pub fn select_all(&self, table: &str) -> Result<Option<Vec<Row>>> {
        let mut state = self.lock_open()?;
        let statement = select_statement(&state, table, &["*"], &Predicate::new())?;
        let rows = state.query(&statement, None)?;
        Ok(non_empty(rows))
    }

    /// Run a raw statement under the handle's lock.
    ///
    /// Unlike the structured operations it is not wrapped in a transaction,
    /// so statements SQLite refuses inside one, such as `VACUUM`, work here.
    /// A single statement is still atomic on its own.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let statement = SqlStatement::new(sql).with_params(params.to_vec());
        self.lock_open()?.execute_autocommit(&statement)
    }

    /// Run a raw query under the handle's lock and transaction.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let statement = SqlStatement::new(sql).with_params(params.to_vec());
        self.lock_open()?.query(&statement, None)
    }

    /// Perform a CRUD operation described as data.
    pub fn execute_crud(&self, op: &CrudOperation) -> Result<CrudOutcome> {
        match op {
            CrudOperation::Create { table, data } => {
                self.insert(table, data).map(CrudOutcome::Affected)
            }
            CrudOperation::Read {
                table,
                columns,
                predicate,
            } => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                self.select(table, &columns, predicate).map(CrudOutcome::Rows)
            }
            CrudOperation::Update {
                table,
                data,
                predicate,
            } => self.update(table, data, predicate).map(CrudOutcome::Affected),
            CrudOperation::Delete { table, predicate } => {
                self.delete(table, predicate).map(CrudOutcome::Affected)
            }
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(path = %self.path.display(), error = %err, "failed to close database");
        }
    }
}

fn select_statement(
    state: &State,
    table: &str,
    columns: &[&str],
    predicate: &Predicate,
) -> Result<SqlStatement> {
    let filter = state.tables.get(table)?.coerce_all(predicate.iter())?;
    Ok(SqlStatement::select(table, columns, filter))
}

fn require_columns(op: &'static str, columns: &[&str]) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::validation(op, "at least one column must be specified"));
    }
    Ok(())
}

fn validate_columns(table: &TableDefinition) -> Result<()> {
    if table.columns.is_empty() {
        return Err(Error::validation(
            "create_table",
            "at least one column must be specified",
        ));
    }
    Ok(())
}
