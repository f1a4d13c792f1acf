//! Result post-processing and the debug hook.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::engine::{ResultSet, Row};
use crate::error::Error;

/// Transform applied to each result row.
pub type RowTransform<T> = Arc<dyn Fn(Row) -> Result<T, Error> + Send + Sync>;

/// How the rows of a query should be post-processed.
pub struct QueryContext<T> {
    transform: Option<RowTransform<T>>,
    single: bool,
}

impl<T> QueryContext<T> {
    /// A context that leaves rows untouched.
    pub fn raw() -> Self {
        Self {
            transform: None,
            single: false,
        }
    }

    /// A context that maps every row through `transform`.
    pub fn with_transform<F>(transform: F) -> Self
    where
        F: Fn(Row) -> Result<T, Error> + Send + Sync + 'static,
    {
        Self {
            transform: Some(Arc::new(transform)),
            single: false,
        }
    }

    /// Collapse the transformed rows to the first one.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Check if single-object mode is requested.
    pub fn is_single(&self) -> bool {
        self.single
    }

    /// Check if a transform is attached.
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }
}

impl<T: DeserializeOwned> QueryContext<T> {
    /// A context that deserializes every row into `T`.
    pub fn deserialize() -> Self {
        Self::with_transform(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| Error::Transform(e.to_string()))
        })
    }
}

impl<T> Clone for QueryContext<T> {
    fn clone(&self) -> Self {
        Self {
            transform: self.transform.clone(),
            single: self.single,
        }
    }
}

impl<T> Default for QueryContext<T> {
    fn default() -> Self {
        Self::raw()
    }
}

impl<T> fmt::Debug for QueryContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("transform", &self.transform.is_some())
            .field("single", &self.single)
            .finish()
    }
}

/// Post-processed query output.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed<T> {
    /// Rows passed through unchanged.
    Rows(ResultSet),
    /// Every row transformed.
    Many(Vec<T>),
    /// First transformed row, or `None` for an empty result.
    One(Option<T>),
}

impl<T> Processed<T> {
    /// The untouched rows, if no transform was applied.
    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            Processed::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// The transformed objects, flattening single-object mode.
    pub fn into_objects(self) -> Vec<T> {
        match self {
            Processed::Rows(_) => Vec::new(),
            Processed::Many(objects) => objects,
            Processed::One(object) => object.into_iter().collect(),
        }
    }

    /// The single object, if single-object mode was used.
    pub fn into_one(self) -> Option<T> {
        match self {
            Processed::One(object) => object,
            _ => None,
        }
    }
}

/// Apply a query context to a raw result set.
///
/// Without a transform the rows pass through unchanged and the single flag
/// is ignored. With a transform every row is converted; in single-object
/// mode only the first row is converted.
pub fn post_process<T>(rows: ResultSet, context: &QueryContext<T>) -> Result<Processed<T>, Error> {
    let Some(transform) = &context.transform else {
        return Ok(Processed::Rows(rows));
    };

    if context.single {
        return rows
            .into_iter()
            .next()
            .map(|row| transform(row))
            .transpose()
            .map(Processed::One);
    }

    rows.into_iter()
        .map(|row| transform(row))
        .collect::<Result<Vec<_>, _>>()
        .map(Processed::Many)
}

/// A toggleable sink for diagnostics.
///
/// When enabled, reported values are emitted as `tracing` events under the
/// `ormkit::debug` target; when disabled they are dropped.
#[derive(Debug, Default)]
pub struct DebugHook {
    enabled: AtomicBool,
}

impl DebugHook {
    /// Create a hook in the given state.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Check if the hook is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable the hook.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Report a diagnostic value. Returns whether it was emitted.
    pub fn report(&self, value: &dyn fmt::Debug) -> bool {
        if !self.is_enabled() {
            return false;
        }
        tracing::info!(target: "ormkit::debug", value = ?value, "diagnostic");
        true
    }
}
