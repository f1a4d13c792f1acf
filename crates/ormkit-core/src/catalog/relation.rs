//! Relationship declarations between models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a declared relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    /// The model holds the foreign key of a single related row.
    BelongsTo,
    /// Many related rows hold this model's key.
    HasMany,
    /// A single related row holds this model's key.
    HasOne,
    /// Many related rows reached through an intermediate model.
    HasManyThrough,
}

impl RelationKind {
    /// All kinds, in declaration order.
    pub const ALL: [RelationKind; 4] = [
        RelationKind::BelongsTo,
        RelationKind::HasMany,
        RelationKind::HasOne,
        RelationKind::HasManyThrough,
    ];

    /// Kinds that may serve as one hop of a through-relationship, in scan order.
    ///
    /// `HasManyThrough` is excluded: a through-relationship is built from
    /// direct hops only.
    pub const DIRECT: [RelationKind; 3] = [
        RelationKind::BelongsTo,
        RelationKind::HasMany,
        RelationKind::HasOne,
    ];

    /// The tag used in combination strings and JSON definitions.
    pub fn tag(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::HasMany => "hasMany",
            RelationKind::HasOne => "hasOne",
            RelationKind::HasManyThrough => "hasManyThrough",
        }
    }

    /// Check if this kind can be used as a hop.
    pub fn is_direct(&self) -> bool {
        !matches!(self, RelationKind::HasManyThrough)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A relationship descriptor: the referenced model and the join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Name of the referenced model.
    pub model: String,
    /// Join column or key name.
    pub key: String,
}

impl RelationDef {
    /// Create a new relation descriptor.
    pub fn new(model: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            key: key.into(),
        }
    }
}

/// The relationship mappings of a model, one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relations {
    #[serde(rename = "belongsTo", default, skip_serializing_if = "BTreeMap::is_empty")]
    belongs_to: BTreeMap<String, RelationDef>,
    #[serde(rename = "hasMany", default, skip_serializing_if = "BTreeMap::is_empty")]
    has_many: BTreeMap<String, RelationDef>,
    #[serde(rename = "hasOne", default, skip_serializing_if = "BTreeMap::is_empty")]
    has_one: BTreeMap<String, RelationDef>,
    #[serde(rename = "hasManyThrough", default, skip_serializing_if = "BTreeMap::is_empty")]
    has_many_through: BTreeMap<String, RelationDef>,
}

impl Relations {
    /// Create an empty set of relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping for a given kind.
    pub fn of_kind(&self, kind: RelationKind) -> &BTreeMap<String, RelationDef> {
        match kind {
            RelationKind::BelongsTo => &self.belongs_to,
            RelationKind::HasMany => &self.has_many,
            RelationKind::HasOne => &self.has_one,
            RelationKind::HasManyThrough => &self.has_many_through,
        }
    }

    fn of_kind_mut(&mut self, kind: RelationKind) -> &mut BTreeMap<String, RelationDef> {
        match kind {
            RelationKind::BelongsTo => &mut self.belongs_to,
            RelationKind::HasMany => &mut self.has_many,
            RelationKind::HasOne => &mut self.has_one,
            RelationKind::HasManyThrough => &mut self.has_many_through,
        }
    }

    /// Declare a relation, replacing any previous one of the same kind and name.
    pub fn insert(&mut self, kind: RelationKind, name: impl Into<String>, def: RelationDef) {
        self.of_kind_mut(kind).insert(name.into(), def);
    }

    /// Look up a relation of a specific kind.
    pub fn get(&self, kind: RelationKind, name: &str) -> Option<&RelationDef> {
        self.of_kind(kind).get(name)
    }

    /// Find a direct (hop-capable) relation by name, scanning in
    /// [`RelationKind::DIRECT`] order.
    pub fn find_direct(&self, name: &str) -> Option<(RelationKind, &RelationDef)> {
        RelationKind::DIRECT
            .iter()
            .find_map(|kind| self.get(*kind, name).map(|def| (*kind, def)))
    }

    /// Iterate over every declared relation.
    pub fn iter(&self) -> impl Iterator<Item = (RelationKind, &str, &RelationDef)> {
        RelationKind::ALL.into_iter().flat_map(move |kind| {
            self.of_kind(kind)
                .iter()
                .map(move |(name, def)| (kind, name.as_str(), def))
        })
    }

    /// Names declared under more than one kind.
    pub fn colliding_names(&self) -> Vec<&str> {
        let mut seen = BTreeMap::<&str, usize>::new();
        for (_, name, _) in self.iter() {
            *seen.entry(name).or_default() += 1;
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect()
    }

    /// Total number of declared relations.
    pub fn len(&self) -> usize {
        RelationKind::ALL
            .iter()
            .map(|kind| self.of_kind(*kind).len())
            .sum()
    }

    /// Check if no relation is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(RelationKind::BelongsTo.tag(), "belongsTo");
        assert_eq!(RelationKind::HasManyThrough.to_string(), "hasManyThrough");
        assert!(!RelationKind::HasManyThrough.is_direct());
        assert!(!RelationKind::DIRECT.contains(&RelationKind::HasManyThrough));
    }

    #[test]
    fn test_find_direct_skips_has_many_through() {
        let mut relations = Relations::new();
        relations.insert(
            RelationKind::HasManyThrough,
            "suppliers",
            RelationDef::new("Supplier", "supplier_id"),
        );
        relations.insert(
            RelationKind::HasMany,
            "items",
            RelationDef::new("Item", "order_id"),
        );

        assert!(relations.find_direct("suppliers").is_none());
        let (kind, def) = relations.find_direct("items").unwrap();
        assert_eq!(kind, RelationKind::HasMany);
        assert_eq!(def.model, "Item");
        assert_eq!(relations.len(), 2);
    }

    #[test]
    fn test_colliding_names() {
        let mut relations = Relations::new();
        relations.insert(
            RelationKind::BelongsTo,
            "owner",
            RelationDef::new("User", "owner_id"),
        );
        relations.insert(
            RelationKind::HasOne,
            "owner",
            RelationDef::new("User", "account_id"),
        );
        relations.insert(
            RelationKind::HasMany,
            "posts",
            RelationDef::new("Post", "account_id"),
        );

        assert_eq!(relations.colliding_names(), vec!["owner"]);
    }

    #[test]
    fn test_relations_json_keys() {
        let relations: Relations = serde_json::from_str(
            r#"{"hasMany": {"items": {"model": "Item", "key": "order_id"}}}"#,
        )
        .unwrap();

        assert_eq!(
            relations.get(RelationKind::HasMany, "items"),
            Some(&RelationDef::new("Item", "order_id"))
        );
        assert!(relations.of_kind(RelationKind::BelongsTo).is_empty());
    }
}
