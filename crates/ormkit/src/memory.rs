//! In-memory engine.
//!
//! Transactions stage their writes and apply them atomically on commit.
//! Reads inside a transaction see committed rows overlaid with the
//! transaction's own staged writes.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::engine::{Engine, ResultSet, Row, Statement, Transaction};
use crate::error::Error;

/// Rows of one table keyed by key column and the canonical form of its value.
type Table = BTreeMap<String, Row>;

/// Transaction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Transactions opened.
    pub begun: u64,
    /// Transactions committed.
    pub committed: u64,
    /// Transactions rolled back explicitly.
    pub rolled_back: u64,
    /// Transactions dropped while still active.
    pub abandoned: u64,
}

#[derive(Default)]
struct Shared {
    tables: Mutex<HashMap<String, Table>>,
    next_tx_id: AtomicU64,
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    abandoned: AtomicU64,
}

/// An engine keeping every table in memory.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    shared: Arc<Shared>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the transaction counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            begun: self.shared.begun.load(Ordering::SeqCst),
            committed: self.shared.committed.load(Ordering::SeqCst),
            rolled_back: self.shared.rolled_back.load(Ordering::SeqCst),
            abandoned: self.shared.abandoned.load(Ordering::SeqCst),
        }
    }

    /// Committed rows of a table, ordered by key.
    pub fn rows(&self, table: &str) -> ResultSet {
        self.shared
            .tables
            .lock()
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("stats", &self.stats())
            .finish()
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    async fn begin(&self) -> Result<Box<dyn Transaction>, Error> {
        let id = self.shared.next_tx_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.begun.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(tx = id, "memory transaction opened");

        Ok(Box::new(MemoryTransaction {
            id,
            shared: Arc::clone(&self.shared),
            ops: Vec::new(),
            state: TxState::Active,
        }))
    }

    async fn execute(&self, statement: Statement) -> Result<ResultSet, Error> {
        match stage(statement)? {
            Staged::Write(op) => {
                let mut tables = self.shared.tables.lock();
                let table = tables.entry(op.table().to_string()).or_default();
                op.apply(table);
                Ok(ResultSet::new())
            }
            Staged::Read { table, filter } => {
                let tables = self.shared.tables.lock();
                Ok(tables
                    .get(&table)
                    .map(|rows| select(rows, &filter))
                    .unwrap_or_default())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
}

/// A pending write.
#[derive(Debug, Clone)]
enum WriteOp {
    Upsert {
        table: String,
        slot: String,
        row: Row,
    },
    Delete {
        table: String,
        key: String,
        value: Value,
    },
}

impl WriteOp {
    fn table(&self) -> &str {
        match self {
            WriteOp::Upsert { table, .. } | WriteOp::Delete { table, .. } => table,
        }
    }

    fn apply(&self, rows: &mut Table) {
        match self {
            WriteOp::Upsert { slot, row, .. } => {
                rows.insert(slot.clone(), row.clone());
            }
            WriteOp::Delete { key, value, .. } => {
                rows.retain(|_, row| row.get(key) != Some(value));
            }
        }
    }
}

enum Staged {
    Write(WriteOp),
    Read {
        table: String,
        filter: Vec<(String, Value)>,
    },
}

fn stage(statement: Statement) -> Result<Staged, Error> {
    match statement {
        Statement::Raw { sql, .. } => Err(Error::Unsupported(format!(
            "memory engine cannot run raw query [{sql}]"
        ))),
        Statement::Upsert { table, key, row } => {
            let slot = row
                .get(&key)
                .filter(|value| !value.is_null())
                .map(|value| format!("{key}={value}"))
                .ok_or_else(|| {
                    Error::Engine(format!("row for [{table}] has no value for key [{key}]"))
                })?;
            Ok(Staged::Write(WriteOp::Upsert { table, slot, row }))
        }
        Statement::Delete { table, key, value } => {
            Ok(Staged::Write(WriteOp::Delete { table, key, value }))
        }
        Statement::Select { table, filter } => Ok(Staged::Read { table, filter }),
    }
}

fn select(rows: &Table, filter: &[(String, Value)]) -> ResultSet {
    rows.values()
        .filter(|row| {
            filter
                .iter()
                .all(|(column, value)| row.get(column) == Some(value))
        })
        .cloned()
        .collect()
}

/// A transaction on a [`MemoryEngine`].
pub struct MemoryTransaction {
    id: u64,
    shared: Arc<Shared>,
    ops: Vec<WriteOp>,
    state: TxState,
}

impl MemoryTransaction {
    fn ensure_active(&self) -> Result<(), Error> {
        if self.state == TxState::Active {
            Ok(())
        } else {
            Err(Error::TransactionClosed(self.id))
        }
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn id(&self) -> u64 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.state == TxState::Active
    }

    async fn execute(&mut self, statement: Statement) -> Result<ResultSet, Error> {
        self.ensure_active()?;

        match stage(statement)? {
            Staged::Write(op) => {
                self.ops.push(op);
                Ok(ResultSet::new())
            }
            Staged::Read { table, filter } => {
                let mut rows = self
                    .shared
                    .tables
                    .lock()
                    .get(&table)
                    .cloned()
                    .unwrap_or_default();
                for op in self.ops.iter().filter(|op| op.table() == table) {
                    op.apply(&mut rows);
                }
                Ok(select(&rows, &filter))
            }
        }
    }

    async fn commit(&mut self) -> Result<(), Error> {
        self.ensure_active()?;

        {
            let mut tables = self.shared.tables.lock();
            for op in self.ops.drain(..) {
                let table = tables.entry(op.table().to_string()).or_default();
                op.apply(table);
            }
        }

        self.state = TxState::Committed;
        self.shared.committed.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(tx = self.id, "memory transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), Error> {
        self.ensure_active()?;

        self.ops.clear();
        self.state = TxState::RolledBack;
        self.shared.rolled_back.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(tx = self.id, "memory transaction rolled back");
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if self.state == TxState::Active {
            self.shared.abandoned.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                tx = self.id,
                pending = self.ops.len(),
                "memory transaction dropped while active, discarding writes"
            );
        }
    }
}
