//! Model catalog for ormkit.
//!
//! The catalog stores metadata about models: their tables, columns, and the
//! relationships declared between them.

mod attribute;
mod model;
mod registry;
mod relation;

pub use attribute::{AttributeDef, ColumnType};
pub use model::{Model, ModelDef};
pub use registry::ModelRegistry;
pub use relation::{RelationDef, RelationKind, Relations};
