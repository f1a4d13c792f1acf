//! Model registry shared by resolvers and batch coordinators.

use super::model::{Model, ModelDef};
use crate::error::Error;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The registry of model definitions.
///
/// Populated during application bootstrap and read concurrently afterwards.
/// Entries are inserted or overwritten, never removed. Lookups hand out
/// `Arc`s to the registered definitions, so every reader sees the exact
/// object that was registered.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<ModelDef>>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a model definition.
    ///
    /// A definition with the same name replaces the previous one.
    pub fn register(&self, def: ModelDef) -> Result<Arc<ModelDef>, Error> {
        def.validate()?;

        let def = Arc::new(def);
        let previous = self
            .models
            .write()
            .insert(def.name.clone(), Arc::clone(&def));

        if previous.is_some() {
            tracing::debug!(model = %def.name, table = %def.table, "model definition replaced");
        } else {
            tracing::debug!(model = %def.name, table = %def.table, "model registered");
        }

        Ok(def)
    }

    /// Register a statically declared model type.
    pub fn register_model<M: Model>(&self) -> Result<Arc<ModelDef>, Error> {
        let def = M::definition();
        if def.name != M::NAME {
            return Err(Error::InvalidModel(format!(
                "definition name [{}] does not match model [{}]",
                def.name,
                M::NAME
            )));
        }
        self.register(def)
    }

    /// Register every definition in a JSON array.
    ///
    /// Definitions are validated up front; nothing is registered unless all
    /// of them are valid.
    pub fn load_json(&self, json: &str) -> Result<Vec<Arc<ModelDef>>, Error> {
        let defs: Vec<ModelDef> = serde_json::from_str(json)?;
        for def in &defs {
            def.validate()?;
        }
        defs.into_iter().map(|def| self.register(def)).collect()
    }

    /// Get a model definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<ModelDef>> {
        self.models.read().get(name).cloned()
    }

    /// Check if a model is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    /// List all registered model names, sorted.
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    /// Check if no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.model_names())
            .finish()
    }
}
