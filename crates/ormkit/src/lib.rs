//! ormkit - A thin ORM layer over a pluggable query engine.
//!
//! `ormkit` registers model definitions, resolves two-hop relationships
//! between them, and persists collections of model instances atomically.
//! Statement execution is delegated to an [`Engine`]; an in-memory engine is
//! included for embedded use and tests.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ormkit::{MemoryEngine, Orm, OrmConfig};
//!
//! let orm = Orm::new(Arc::new(MemoryEngine::new()), OrmConfig::from_env());
//! orm.registry().load_json(include_str!("models.json"))?;
//!
//! let path = orm.through_relationship("Order", "items", "supplier")?;
//! println!("join strategy: {}", path.combination);
//!
//! orm.save_all(&mut [&mut order, &mut item], None).await?;
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod memory;
pub mod orm;

pub use batch::{BatchCoordinator, BatchOp, Persistable};
pub use config::OrmConfig;
pub use engine::{Engine, ResultSet, Row, Statement, Transaction};
pub use error::Error;
pub use hooks::{post_process, DebugHook, Processed, QueryContext, RowTransform};
pub use memory::{EngineStats, MemoryEngine, MemoryTransaction};
pub use orm::Orm;

/// Re-export core types.
pub use ormkit_core as core;
pub use ormkit_core::{
    AttributeDef, ColumnType, Model, ModelDef, ModelRegistry, RelationDef, RelationKind,
    ResolveError, ThroughRelationship,
};
