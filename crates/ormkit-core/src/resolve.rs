//! Through-relationship resolution.
//!
//! A through-relationship is a two-hop path `parent -> through -> target`
//! built from direct relations only. The resolver replaces model names with
//! the registered definitions so query builders can pick a join strategy
//! from the resolved kinds.

use crate::catalog::{ModelDef, ModelRegistry, RelationDef, RelationKind};
use crate::error::ResolveError;
use std::sync::Arc;

/// Separator between the two kind tags of a combination string.
pub const COMBINATION_SEPARATOR: &str = "-";

/// A fully resolved two-hop relationship.
#[derive(Debug, Clone)]
pub struct ThroughRelationship {
    /// Kind of the parent -> through hop.
    pub through_kind: RelationKind,
    /// Registered definition of the through model.
    pub through_model: Arc<ModelDef>,
    /// Join key of the parent -> through hop.
    pub through_key: String,
    /// Kind of the through -> target hop.
    pub target_kind: RelationKind,
    /// Registered definition of the target model.
    pub target_model: Arc<ModelDef>,
    /// Join key of the through -> target hop.
    pub target_key: String,
    /// Both kind tags joined by [`COMBINATION_SEPARATOR`], e.g. `hasMany-belongsTo`.
    pub combination: String,
}

/// One join of a resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    /// Kind of the hop.
    pub kind: RelationKind,
    /// Table joined by this hop.
    pub table: String,
    /// Join key of this hop.
    pub key: String,
}

impl ThroughRelationship {
    /// The two hop kinds.
    pub fn kinds(&self) -> (RelationKind, RelationKind) {
        (self.through_kind, self.target_kind)
    }

    /// The joins needed to reach the target from the parent, in order.
    pub fn join_path(&self) -> [JoinStep; 2] {
        [
            JoinStep {
                kind: self.through_kind,
                table: self.through_model.table.clone(),
                key: self.through_key.clone(),
            },
            JoinStep {
                kind: self.target_kind,
                table: self.target_model.table.clone(),
                key: self.target_key.clone(),
            },
        ]
    }
}

/// Build the combination string for a pair of hop kinds.
pub fn combination(through: RelationKind, target: RelationKind) -> String {
    format!("{}{}{}", through.tag(), COMBINATION_SEPARATOR, target.tag())
}

impl ModelRegistry {
    /// Resolve `parent.through.target` into a [`ThroughRelationship`].
    pub fn resolve_through(
        &self,
        parent: &str,
        through: &str,
        target: &str,
    ) -> Result<ThroughRelationship, ResolveError> {
        let parent_model = self.get(parent).ok_or_else(|| {
            tracing::debug!(parent, "through resolution failed: unknown parent");
            ResolveError::InvalidParentModel(parent.to_string())
        })?;

        let (through_kind, through_rel) = find_hop(&parent_model, through)
            .ok_or_else(|| ResolveError::InvalidThroughRelation(through.to_string()))?;
        let through_model = self
            .get(&through_rel.model)
            .ok_or_else(|| ResolveError::InvalidThroughModel(through_rel.model.clone()))?;
        tracing::trace!(
            parent,
            relation = through,
            kind = %through_kind,
            model = %through_model.name,
            "resolved through hop"
        );

        let (target_kind, target_rel) = find_hop(&through_model, target)
            .ok_or_else(|| ResolveError::InvalidTargetRelation(target.to_string()))?;
        let target_model = self
            .get(&target_rel.model)
            .ok_or_else(|| ResolveError::InvalidTargetModel(target_rel.model.clone()))?;
        tracing::trace!(
            through = %through_model.name,
            relation = target,
            kind = %target_kind,
            model = %target_model.name,
            "resolved target hop"
        );

        Ok(ThroughRelationship {
            through_kind,
            through_key: through_rel.key.clone(),
            target_kind,
            target_key: target_rel.key.clone(),
            combination: combination(through_kind, target_kind),
            through_model,
            target_model,
        })
    }
}

fn find_hop<'a>(model: &'a ModelDef, relation: &str) -> Option<(RelationKind, &'a RelationDef)> {
    let found = model.relations.find_direct(relation);
    if found.is_none() {
        tracing::debug!(model = %model.name, relation, "no direct relation with this name");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDef, ColumnType};

    fn id() -> AttributeDef {
        AttributeDef::primary_key(ColumnType::Int64)
    }

    fn registry() -> ModelRegistry {
        let registry = ModelRegistry::new();
        registry
            .register(
                ModelDef::new("Order", "orders")
                    .with_attribute("id", id())
                    .has_many("items", "Item", "order_id")
                    .has_one("invoice", "Invoice", "order_id")
                    .has_many_through("suppliers", "Supplier", "supplier_id"),
            )
            .unwrap();
        registry
            .register(
                ModelDef::new("Item", "items")
                    .with_attribute("id", id())
                    .belongs_to("supplier", "Supplier", "supplier_id")
                    .belongs_to("warehouse", "Warehouse", "warehouse_id"),
            )
            .unwrap();
        registry
            .register(ModelDef::new("Supplier", "suppliers").with_attribute("id", id()))
            .unwrap();
        registry
    }

    #[test]
    fn test_combination() {
        assert_eq!(
            combination(RelationKind::HasOne, RelationKind::HasMany),
            "hasOne-hasMany"
        );
    }

    #[test]
    fn test_resolve_has_many_belongs_to() {
        let registry = registry();
        let resolved = registry.resolve_through("Order", "items", "supplier").unwrap();

        assert_eq!(resolved.through_kind, RelationKind::HasMany);
        assert_eq!(resolved.through_key, "order_id");
        assert_eq!(resolved.target_kind, RelationKind::BelongsTo);
        assert_eq!(resolved.target_key, "supplier_id");
        assert_eq!(resolved.combination, "hasMany-belongsTo");
        assert!(Arc::ptr_eq(
            &resolved.through_model,
            &registry.get("Item").unwrap()
        ));
        assert!(Arc::ptr_eq(
            &resolved.target_model,
            &registry.get("Supplier").unwrap()
        ));
    }

    #[test]
    fn test_join_path() {
        let resolved = registry().resolve_through("Order", "items", "supplier").unwrap();
        let [first, second] = resolved.join_path();

        assert_eq!(first.table, "items");
        assert_eq!(first.key, "order_id");
        assert_eq!(second.kind, RelationKind::BelongsTo);
        assert_eq!(second.table, "suppliers");
        assert_eq!(
            resolved.kinds(),
            (RelationKind::HasMany, RelationKind::BelongsTo)
        );
    }

    #[test]
    fn test_unknown_parent() {
        let err = registry().resolve_through("Customer", "items", "supplier").unwrap_err();
        assert_eq!(err, ResolveError::InvalidParentModel("Customer".into()));
        assert_eq!(err.to_string(), "invalid parent model");
    }

    #[test]
    fn test_unknown_through_relation() {
        let err = registry().resolve_through("Order", "lines", "supplier").unwrap_err();
        assert_eq!(err.to_string(), "invalid through relation [lines]");
    }

    #[test]
    fn test_has_many_through_is_not_a_hop() {
        let err = registry()
            .resolve_through("Order", "suppliers", "supplier")
            .unwrap_err();
        assert_eq!(err, ResolveError::InvalidThroughRelation("suppliers".into()));
    }

    #[test]
    fn test_unregistered_through_model() {
        let err = registry().resolve_through("Order", "invoice", "supplier").unwrap_err();
        assert_eq!(err.to_string(), "invalid through model [Invoice]");
    }

    #[test]
    fn test_unknown_target_relation() {
        let err = registry().resolve_through("Order", "items", "order").unwrap_err();
        assert_eq!(err, ResolveError::InvalidTargetRelation("order".into()));
    }

    #[test]
    fn test_unregistered_target_model() {
        let err = registry().resolve_through("Order", "items", "warehouse").unwrap_err();
        assert_eq!(err.to_string(), "invalid target model [Warehouse]");
    }

    #[test]
    fn test_target_registered_later() {
        let registry = registry();
        assert!(registry.resolve_through("Order", "items", "warehouse").is_err());

        registry
            .register(ModelDef::new("Warehouse", "warehouses").with_attribute("id", id()))
            .unwrap();
        let resolved = registry.resolve_through("Order", "items", "warehouse").unwrap();
        assert_eq!(resolved.target_model.table, "warehouses");
    }
}
