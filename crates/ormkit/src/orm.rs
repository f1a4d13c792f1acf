//! The `Orm` handle: registry, engine, and hooks wired together.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use ormkit_core::{Model, ModelDef, ModelRegistry, ResolveError, ThroughRelationship};

use crate::batch::{BatchCoordinator, Persistable};
use crate::config::OrmConfig;
use crate::engine::{Engine, Statement, Transaction};
use crate::error::Error;
use crate::hooks::{post_process, DebugHook, Processed, QueryContext};

/// Entry point of an application's ORM layer.
///
/// Owns a shared [`ModelRegistry`] and the engine every query and batch runs
/// on. Results of queries run through the `Orm` are post-processed with the
/// supplied [`QueryContext`].
pub struct Orm {
    config: OrmConfig,
    registry: Arc<ModelRegistry>,
    engine: Arc<dyn Engine>,
    debug: DebugHook,
}

impl Orm {
    /// Create an ORM with an empty registry.
    pub fn new(engine: Arc<dyn Engine>, config: OrmConfig) -> Self {
        Self::with_registry(engine, Arc::new(ModelRegistry::new()), config)
    }

    /// Create an ORM over an existing registry.
    pub fn with_registry(
        engine: Arc<dyn Engine>,
        registry: Arc<ModelRegistry>,
        config: OrmConfig,
    ) -> Self {
        tracing::debug!(name = %config.name, debug = config.debug, "orm initialized");
        Self {
            debug: DebugHook::new(config.debug),
            config,
            registry,
            engine,
        }
    }

    /// The configuration this ORM was built with.
    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// The model registry.
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Register a model definition.
    pub fn register(&self, def: ModelDef) -> Result<Arc<ModelDef>, Error> {
        self.registry.register(def).map_err(|e| self.report(e.into()))
    }

    /// Register a statically declared model type.
    pub fn register_model<M: Model>(&self) -> Result<Arc<ModelDef>, Error> {
        self.registry
            .register_model::<M>()
            .map_err(|e| self.report(e.into()))
    }

    /// Resolve `parent.through.target` against the registry.
    pub fn through_relationship(
        &self,
        parent: &str,
        through: &str,
        target: &str,
    ) -> Result<ThroughRelationship, ResolveError> {
        self.registry.resolve_through(parent, through, target)
    }

    /// Save instances as one atomic batch.
    pub async fn save_all(
        &self,
        instances: &mut [&mut dyn Persistable],
        transaction: Option<&mut dyn Transaction>,
    ) -> Result<(), Error> {
        self.coordinator()
            .save_all(instances, transaction)
            .await
            .map_err(|e| self.report(e))
    }

    /// Delete instances as one atomic batch.
    pub async fn delete_all(
        &self,
        instances: &mut [&mut dyn Persistable],
        transaction: Option<&mut dyn Transaction>,
    ) -> Result<(), Error> {
        self.coordinator()
            .delete_all(instances, transaction)
            .await
            .map_err(|e| self.report(e))
    }

    /// A batch coordinator over this ORM's registry and engine.
    pub fn coordinator(&self) -> BatchCoordinator<'_> {
        BatchCoordinator::new(&self.registry, self.engine.as_ref())
    }

    /// Open a transaction on the engine.
    pub async fn begin(&self) -> Result<Box<dyn Transaction>, Error> {
        self.engine.begin().await.map_err(|e| self.report(e))
    }

    /// Run `callback` inside a new transaction.
    ///
    /// The transaction is committed when the callback succeeds and rolled
    /// back when it fails, unless the callback already finished it.
    pub async fn transaction<T, F>(&self, callback: F) -> Result<T, Error>
    where
        F: for<'t> FnOnce(&'t mut dyn Transaction) -> BoxFuture<'t, Result<T, Error>>,
    {
        let mut tx = self.begin().await?;
        let result = callback(tx.as_mut()).await;

        if !tx.is_active() {
            return result.map_err(|e| self.report(e));
        }

        match result {
            Ok(value) => {
                tx.commit().await.map_err(|e| self.report(e))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(tx = tx.id(), error = %rollback_err, "rollback failed");
                }
                Err(self.report(err))
            }
        }
    }

    /// Run a statement outside any transaction and post-process its rows.
    pub async fn query<T>(
        &self,
        statement: Statement,
        context: &QueryContext<T>,
    ) -> Result<Processed<T>, Error> {
        let rows = self
            .engine
            .execute(statement)
            .await
            .map_err(|e| self.report(e))?;
        post_process(rows, context).map_err(|e| self.report(e))
    }

    /// Run a statement inside `tx` and post-process its rows.
    pub async fn query_in<T>(
        &self,
        tx: &mut dyn Transaction,
        statement: Statement,
        context: &QueryContext<T>,
    ) -> Result<Processed<T>, Error> {
        let rows = tx.execute(statement).await.map_err(|e| self.report(e))?;
        post_process(rows, context).map_err(|e| self.report(e))
    }

    /// Route a diagnostic value to the debug hook.
    pub fn debug(&self, value: &dyn fmt::Debug) -> bool {
        self.debug.report(value)
    }

    /// Enable or disable the debug hook.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    /// Check if the debug hook is enabled.
    pub fn is_debug(&self) -> bool {
        self.debug.is_enabled()
    }

    fn report(&self, err: Error) -> Error {
        self.debug.report(&err);
        err
    }
}

impl fmt::Debug for Orm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orm")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
