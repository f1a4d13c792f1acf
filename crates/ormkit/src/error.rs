//! ormkit error types.

use thiserror::Error;

/// ormkit errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog or resolution error.
    #[error(transparent)]
    Core(#[from] ormkit_core::Error),

    /// Error reported by the underlying engine.
    #[error("engine error: {0}")]
    Engine(String),

    /// The transaction was already committed or rolled back.
    #[error("transaction {0} is no longer active")]
    TransactionClosed(u64),

    /// The engine cannot run this kind of statement.
    #[error("unsupported statement: {0}")]
    Unsupported(String),

    /// A row transform failed.
    #[error("row transform failed: {0}")]
    Transform(String),

    /// A model instance failed to persist itself.
    #[error("failed to persist {model}: {reason}")]
    Persist {
        /// Model name of the failing instance.
        model: String,
        /// Failure description.
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ormkit_core::ResolveError> for Error {
    fn from(err: ormkit_core::ResolveError) -> Self {
        Error::Core(err.into())
    }
}

impl Error {
    /// Build a persistence error for a model instance.
    pub fn persist(model: impl Into<String>, reason: impl ToString) -> Self {
        Error::Persist {
            model: model.into(),
            reason: reason.to_string(),
        }
    }
}
