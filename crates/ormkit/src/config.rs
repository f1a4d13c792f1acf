//! ORM configuration.

use crate::error::Error;

/// Default instance name used in log output.
pub const DEFAULT_NAME: &str = "ormkit";

/// Environment variable enabling the debug hook.
pub const DEBUG_ENV: &str = "ORMKIT_DEBUG";

/// Environment variable overriding the instance name.
pub const NAME_ENV: &str = "ORMKIT_NAME";

/// ORM configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrmConfig {
    /// Instance name, attached to log events.
    pub name: String,

    /// Route diagnostics through the debug hook.
    pub debug: bool,
}

impl OrmConfig {
    /// Create a configuration with the given instance name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            debug: false,
        }
    }

    /// Build a configuration from `ORMKIT_DEBUG` and `ORMKIT_NAME`.
    ///
    /// Unset variables fall back to the defaults; an unrecognised
    /// `ORMKIT_DEBUG` value is treated as disabled.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from `ORMKIT_DEBUG` and `ORMKIT_NAME`, rejecting
    /// malformed values.
    pub fn try_from_env() -> Result<Self, Error> {
        Self::try_from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(name) = lookup(NAME_ENV).filter(|n| !n.trim().is_empty()) {
            config.name = name;
        }
        config.debug = lookup(DEBUG_ENV)
            .and_then(|value| parse_flag(&value))
            .unwrap_or(false);
        config
    }

    fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        if let Some(value) = lookup(DEBUG_ENV) {
            if parse_flag(&value).is_none() {
                return Err(Error::Config(format!(
                    "{DEBUG_ENV} must be a boolean flag, got [{value}]"
                )));
            }
        }
        Ok(Self::from_lookup(lookup))
    }

    /// Enable or disable the debug hook.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the instance name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
