//! Contract with the underlying query-execution engine.
//!
//! ormkit never builds SQL. It hands opaque [`Statement`]s to an [`Engine`]
//! and only relies on three capabilities: open a transaction, run a
//! statement, and finish the transaction.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;

/// A result row: column name to value.
pub type Row = serde_json::Map<String, Value>;

/// Rows returned by a statement.
pub type ResultSet = Vec<Row>;

/// A statement for the engine to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Engine-native query text with positional parameters.
    Raw {
        /// Query text.
        sql: String,
        /// Positional parameters.
        params: Vec<Value>,
    },
    /// Insert a row, replacing any row with the same key value.
    Upsert {
        /// Target table.
        table: String,
        /// Key column identifying the row.
        key: String,
        /// Row data; must contain the key column.
        row: Row,
    },
    /// Delete the rows whose key column equals `value`.
    Delete {
        /// Target table.
        table: String,
        /// Key column.
        key: String,
        /// Key value.
        value: Value,
    },
    /// Select rows matching every column/value pair of `filter`.
    Select {
        /// Source table.
        table: String,
        /// Equality filter; empty selects every row.
        filter: Vec<(String, Value)>,
    },
}

impl Statement {
    /// Create a raw statement.
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Statement::Raw {
            sql: sql.into(),
            params,
        }
    }

    /// Create an upsert statement.
    pub fn upsert(table: impl Into<String>, key: impl Into<String>, row: Row) -> Self {
        Statement::Upsert {
            table: table.into(),
            key: key.into(),
            row,
        }
    }

    /// Create a delete statement.
    pub fn delete(table: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Statement::Delete {
            table: table.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a select statement over a whole table.
    pub fn select(table: impl Into<String>) -> Self {
        Statement::Select {
            table: table.into(),
            filter: Vec::new(),
        }
    }

    /// Add an equality condition to a select statement.
    ///
    /// Has no effect on other statement kinds.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Statement::Select { filter, .. } = &mut self {
            filter.push((column.into(), value.into()));
        }
        self
    }

    /// Table touched by the statement, if known.
    pub fn table(&self) -> Option<&str> {
        match self {
            Statement::Raw { .. } => None,
            Statement::Upsert { table, .. }
            | Statement::Delete { table, .. }
            | Statement::Select { table, .. } => Some(table),
        }
    }

    /// Check if the statement modifies data.
    pub fn is_write(&self) -> bool {
        matches!(self, Statement::Upsert { .. } | Statement::Delete { .. })
    }
}

/// A transaction handle owned by the engine.
///
/// After `commit` or `rollback` the handle is finished and every further
/// call fails with [`Error::TransactionClosed`].
#[async_trait]
pub trait Transaction: Send {
    /// Engine-assigned transaction id.
    fn id(&self) -> u64;

    /// Check if the transaction can still run statements.
    fn is_active(&self) -> bool;

    /// Run a statement inside the transaction.
    async fn execute(&mut self, statement: Statement) -> Result<ResultSet, Error>;

    /// Make the transaction's writes durable.
    async fn commit(&mut self) -> Result<(), Error>;

    /// Discard the transaction's writes.
    async fn rollback(&mut self) -> Result<(), Error>;
}

/// An underlying query-execution engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>, Error>;

    /// Run a statement outside any caller transaction.
    async fn execute(&self, statement: Statement) -> Result<ResultSet, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statement_builders() {
        let select = Statement::select("items").filter("order_id", 7);
        assert_eq!(select.table(), Some("items"));
        assert!(!select.is_write());
        assert_eq!(
            select,
            Statement::Select {
                table: "items".into(),
                filter: vec![("order_id".into(), json!(7))],
            }
        );

        let delete = Statement::delete("items", "id", 3).filter("ignored", 1);
        assert!(delete.is_write());
        assert_eq!(delete, Statement::delete("items", "id", 3));

        let raw = Statement::raw("select 1", vec![]);
        assert_eq!(raw.table(), None);
    }
}
