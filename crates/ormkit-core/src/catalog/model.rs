//! Model definitions.

use super::attribute::AttributeDef;
use super::relation::{RelationDef, RelationKind, Relations};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A model definition (table mapping plus relationships).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Model name (unique within a registry).
    pub name: String,
    /// Backing table name.
    #[serde(default)]
    pub table: String,
    /// Column descriptors keyed by column name.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDef>,
    /// Declared relationships.
    #[serde(flatten)]
    pub relations: Relations,
    /// Keys in a parsed definition that match no known field.
    #[serde(flatten, skip_serializing)]
    unknown: BTreeMap<String, serde_json::Value>,
}

/// A statically declared model type.
///
/// Implemented by application types so they can be registered by type
/// instead of by hand-built definition.
pub trait Model {
    /// Registry name of the model.
    const NAME: &'static str;

    /// Build the model definition.
    fn definition() -> ModelDef;
}

impl ModelDef {
    /// Create a new model definition with no columns or relations.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            attributes: BTreeMap::new(),
            relations: Relations::new(),
            unknown: BTreeMap::new(),
        }
    }

    /// Add a column.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: AttributeDef) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Declare a relation of the given kind.
    pub fn with_relation(
        mut self,
        kind: RelationKind,
        name: impl Into<String>,
        model: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.relations
            .insert(kind, name, RelationDef::new(model, key));
        self
    }

    /// Declare a belongs-to relation.
    pub fn belongs_to(
        self,
        name: impl Into<String>,
        model: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.with_relation(RelationKind::BelongsTo, name, model, key)
    }

    /// Declare a has-many relation.
    pub fn has_many(
        self,
        name: impl Into<String>,
        model: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.with_relation(RelationKind::HasMany, name, model, key)
    }

    /// Declare a has-one relation.
    pub fn has_one(
        self,
        name: impl Into<String>,
        model: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.with_relation(RelationKind::HasOne, name, model, key)
    }

    /// Declare a has-many-through relation.
    pub fn has_many_through(
        self,
        name: impl Into<String>,
        model: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.with_relation(RelationKind::HasManyThrough, name, model, key)
    }

    /// Get a column by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    /// Names of the primary key columns.
    pub fn primary_key(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.primary_key)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Check the definition is complete enough to be registered.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidModel("model name is empty".into()));
        }
        if self.table.trim().is_empty() {
            return Err(Error::InvalidModel(format!(
                "model [{}] has no table name",
                self.name
            )));
        }
        if !self.unknown.is_empty() {
            let keys: Vec<&str> = self.unknown.keys().map(String::as_str).collect();
            return Err(Error::InvalidModel(format!(
                "model [{}] has unknown key(s) [{}]",
                self.name,
                keys.join(", ")
            )));
        }
        if self.attributes.is_empty() {
            return Err(Error::InvalidModel(format!(
                "model [{}] declares no attributes",
                self.name
            )));
        }
        if self.attributes.keys().any(|column| column.trim().is_empty()) {
            return Err(Error::InvalidModel(format!(
                "model [{}] has an attribute with an empty column name",
                self.name
            )));
        }

        for (kind, name, def) in self.relations.iter() {
            if name.trim().is_empty() {
                return Err(Error::InvalidModel(format!(
                    "model [{}] has an unnamed {} relation",
                    self.name, kind
                )));
            }
            if def.model.trim().is_empty() || def.key.trim().is_empty() {
                return Err(Error::InvalidModel(format!(
                    "relation [{}.{}] must name a model and a key",
                    self.name, name
                )));
            }
        }

        let collisions = self.relations.colliding_names();
        if !collisions.is_empty() {
            return Err(Error::InvalidModel(format!(
                "model [{}] declares relation(s) [{}] under more than one kind",
                self.name,
                collisions.join(", ")
            )));
        }

        Ok(())
    }

    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the definition to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
