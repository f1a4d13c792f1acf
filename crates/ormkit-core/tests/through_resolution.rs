//! Integration tests for model registration and through-relationship resolution.

use std::sync::Arc;
use std::thread;

use ormkit_core::{Error, ModelRegistry, RelationKind, ResolveError};

const ORDER_MODELS: &str = r#"[
    {
        "name": "Order",
        "table": "orders",
        "attributes": {
            "id": {"type": "int64", "primaryKey": true},
            "customer_id": {"type": "int64"}
        },
        "belongsTo": {"customer": {"model": "Customer", "key": "customer_id"}},
        "hasMany": {"items": {"model": "Item", "key": "order_id"}}
    },
    {
        "name": "Item",
        "table": "items",
        "attributes": {
            "id": {"type": "int64", "primaryKey": true},
            "order_id": {"type": "int64"},
            "supplier_id": {"type": "int64"}
        },
        "belongsTo": {
            "order": {"model": "Order", "key": "order_id"},
            "supplier": {"model": "Supplier", "key": "supplier_id"}
        }
    },
    {
        "name": "Supplier",
        "table": "suppliers",
        "attributes": {"id": {"type": "int64", "primaryKey": true}},
        "hasMany": {"items": {"model": "Item", "key": "supplier_id"}}
    },
    {
        "name": "Customer",
        "table": "customers",
        "attributes": {"id": {"type": "int64", "primaryKey": true}},
        "hasMany": {"orders": {"model": "Order", "key": "customer_id"}}
    }
]"#;

fn setup() -> Arc<ModelRegistry> {
    let registry = Arc::new(ModelRegistry::new());
    registry.load_json(ORDER_MODELS).unwrap();
    registry
}

#[test]
fn test_order_items_supplier() {
    let registry = setup();
    let resolved = registry.resolve_through("Order", "items", "supplier").unwrap();

    assert_eq!(resolved.through_kind, RelationKind::HasMany);
    assert_eq!(resolved.through_key, "order_id");
    assert_eq!(resolved.target_kind, RelationKind::BelongsTo);
    assert_eq!(resolved.target_key, "supplier_id");
    assert_eq!(resolved.combination, "hasMany-belongsTo");
    assert_eq!(*resolved.through_model, *registry.get("Item").unwrap());
    assert!(Arc::ptr_eq(
        &resolved.target_model,
        &registry.get("Supplier").unwrap()
    ));
}

#[test]
fn test_customer_orders_items() {
    let registry = setup();
    let resolved = registry.resolve_through("Customer", "orders", "items").unwrap();

    assert_eq!(resolved.combination, "hasMany-hasMany");
    assert_eq!(resolved.target_model.name, "Item");
}

#[test]
fn test_belongs_to_belongs_to() {
    let registry = setup();
    let resolved = registry.resolve_through("Item", "order", "customer").unwrap();

    assert_eq!(resolved.combination, "belongsTo-belongsTo");
    assert_eq!(resolved.through_key, "order_id");
    assert_eq!(resolved.target_key, "customer_id");
}

#[test]
fn test_failures_name_the_queried_relation() {
    let registry = setup();

    for name in ["lines", "Items", ""] {
        let err = registry.resolve_through("Order", name, "supplier").unwrap_err();
        assert_eq!(err, ResolveError::InvalidThroughRelation(name.to_string()));
        assert_eq!(err.to_string(), format!("invalid through relation [{name}]"));
    }
}

#[test]
fn test_unknown_parent_short_circuits() {
    let registry = setup();
    let err = registry.resolve_through("Invoice", "anything", "at_all").unwrap_err();
    assert!(matches!(err, ResolveError::InvalidParentModel(_)));

    let err: Error = err.into();
    assert!(matches!(err, Error::Resolve(_)));
}

#[test]
fn test_concurrent_readers() {
    let registry = setup();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..100 {
                    let resolved = registry.resolve_through("Order", "items", "supplier").unwrap();
                    assert_eq!(resolved.combination, "hasMany-belongsTo");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
