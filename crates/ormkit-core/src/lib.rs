//! ormkit Core - Model catalog, registry, and relationship resolution.
//!
//! This crate holds the metadata side of ormkit: model definitions, the
//! registry they are published into, and the resolver that walks declared
//! relationships to describe two-hop joins.

pub mod catalog;
pub mod error;
pub mod resolve;

pub use catalog::{
    AttributeDef, ColumnType, Model, ModelDef, ModelRegistry, RelationDef, RelationKind,
    Relations,
};
pub use error::{Error, ResolveError};
pub use resolve::{JoinStep, ThroughRelationship, COMBINATION_SEPARATOR};
