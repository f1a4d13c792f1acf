//! Transactional batch persistence.
//!
//! A batch runs the `save` or `delete` of several model instances as one
//! atomic unit. Instances are processed strictly in input order, each one
//! finishing before the next starts, so callers can rely on parents being
//! written before their children.

use std::fmt;

use async_trait::async_trait;
use ormkit_core::ModelRegistry;

use crate::engine::{Engine, Transaction};
use crate::error::Error;

/// A model instance that knows how to persist itself.
#[async_trait]
pub trait Persistable: Send + Sync {
    /// Registry name of the instance's model.
    fn model_name(&self) -> &str;

    /// Write the instance inside `tx`.
    async fn save(&mut self, tx: &mut dyn Transaction) -> Result<(), Error>;

    /// Remove the instance inside `tx`.
    async fn delete(&mut self, tx: &mut dyn Transaction) -> Result<(), Error>;
}

/// The per-instance operation of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    /// Call [`Persistable::save`].
    Save,
    /// Call [`Persistable::delete`].
    Delete,
}

impl fmt::Display for BatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOp::Save => f.write_str("save"),
            BatchOp::Delete => f.write_str("delete"),
        }
    }
}

/// Runs batches of instance operations inside a transaction.
pub struct BatchCoordinator<'a> {
    registry: &'a ModelRegistry,
    engine: &'a dyn Engine,
}

impl<'a> BatchCoordinator<'a> {
    /// Create a coordinator over a registry and engine.
    pub fn new(registry: &'a ModelRegistry, engine: &'a dyn Engine) -> Self {
        Self { registry, engine }
    }

    /// Save every registered-model instance.
    pub async fn save_all(
        &self,
        instances: &mut [&mut dyn Persistable],
        transaction: Option<&mut dyn Transaction>,
    ) -> Result<(), Error> {
        self.run(BatchOp::Save, instances, transaction).await
    }

    /// Delete every registered-model instance.
    pub async fn delete_all(
        &self,
        instances: &mut [&mut dyn Persistable],
        transaction: Option<&mut dyn Transaction>,
    ) -> Result<(), Error> {
        self.run(BatchOp::Delete, instances, transaction).await
    }

    /// Run `op` on every registered-model instance.
    ///
    /// Instances whose model is not registered are skipped. With a caller
    /// transaction the work runs against it and the caller stays
    /// responsible for finishing it. Without one a transaction is opened,
    /// committed once after the last instance, and rolled back if any
    /// instance fails. When nothing qualifies no transaction is opened.
    pub async fn run(
        &self,
        op: BatchOp,
        instances: &mut [&mut dyn Persistable],
        transaction: Option<&mut dyn Transaction>,
    ) -> Result<(), Error> {
        let mut qualified: Vec<&mut dyn Persistable> = Vec::with_capacity(instances.len());
        for instance in instances.iter_mut() {
            if self.registry.contains(instance.model_name()) {
                qualified.push(&mut **instance);
            } else {
                tracing::debug!(
                    model = instance.model_name(),
                    %op,
                    "skipping instance of unregistered model"
                );
            }
        }

        if qualified.is_empty() {
            return Ok(());
        }

        match transaction {
            Some(tx) => {
                tracing::debug!(%op, count = qualified.len(), tx = tx.id(), "running batch in caller transaction");
                apply(op, &mut qualified, tx).await
            }
            None => {
                let mut tx = self.engine.begin().await?;
                let tx_id = tx.id();
                tracing::debug!(%op, count = qualified.len(), tx = tx_id, "running batch in owned transaction");

                let outcome = match apply(op, &mut qualified, tx.as_mut()).await {
                    Ok(()) => tx.commit().await,
                    Err(err) => Err(err),
                };

                match outcome {
                    Ok(()) => {
                        tracing::debug!(%op, tx = tx_id, "batch committed");
                        Ok(())
                    }
                    Err(err) => {
                        // A commit that failed part-way may leave the handle open.
                        if let Err(rollback_err) = tx.rollback().await {
                            tracing::warn!(
                                %op,
                                tx = tx_id,
                                error = %rollback_err,
                                "rollback after failed batch also failed"
                            );
                        } else {
                            tracing::debug!(%op, tx = tx_id, error = %err, "batch rolled back");
                        }
                        Err(err)
                    }
                }
            }
        }
    }
}

async fn apply(
    op: BatchOp,
    instances: &mut [&mut dyn Persistable],
    tx: &mut dyn Transaction,
) -> Result<(), Error> {
    for instance in instances.iter_mut() {
        match op {
            BatchOp::Save => instance.save(tx).await?,
            BatchOp::Delete => instance.delete(tx).await?,
        }
    }
    Ok(())
}
