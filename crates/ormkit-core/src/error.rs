//! Core error types.

use thiserror::Error;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A model definition failed validation at registration time.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Relationship resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Model definitions could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Reasons a through-relationship could not be resolved.
///
/// These are ordinary outcomes of a lookup, not faults: callers branch on
/// them when choosing a join strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The parent model is not registered.
    #[error("invalid parent model")]
    InvalidParentModel(String),

    /// The parent declares no direct relation with this name.
    #[error("invalid through relation [{0}]")]
    InvalidThroughRelation(String),

    /// The through relation points at an unregistered model.
    #[error("invalid through model [{0}]")]
    InvalidThroughModel(String),

    /// The through model declares no direct relation with this name.
    #[error("invalid target relation [{0}]")]
    InvalidTargetRelation(String),

    /// The target relation points at an unregistered model.
    #[error("invalid target model [{0}]")]
    InvalidTargetModel(String),
}
