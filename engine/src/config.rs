//! Engine configuration module.
//!
//! This module provides configuration loading for the query engine from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `ENGINE_REORDER_BY_COST`: Sort query patterns by their cost hint before
//!   joining (default: `false`)
//! - `ENGINE_USE_STORE_HOOKS`: Use the store's optimized hooks; when `false`,
//!   every request is answered by scanning `each()` (default: `true`)
//!
//! Booleans accept `true`/`false`, `1`/`0` and `yes`/`no`, in any case.
//!
//! # Invariants
//!
//! - Neither setting changes a result set, only how it is computed.

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Stable-sort query patterns by their cost hint before joining.
    pub reorder_by_cost: bool,
    /// Dispatch through the store's optimized hooks.
    /// Turn off to rule out a faulty hook when results look wrong.
    pub use_store_hooks: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reorder_by_cost: Self::DEFAULT_REORDER_BY_COST,
            use_store_hooks: Self::DEFAULT_USE_STORE_HOOKS,
        }
    }
}

impl EngineConfig {
    /// Default for `ENGINE_REORDER_BY_COST`.
    pub const DEFAULT_REORDER_BY_COST: bool = false;
    /// Default for `ENGINE_USE_STORE_HOOKS`.
    pub const DEFAULT_USE_STORE_HOOKS: bool = true;

    const REORDER_BY_COST_VAR: &'static str = "ENGINE_REORDER_BY_COST";
    const USE_STORE_HOOKS_VAR: &'static str = "ENGINE_USE_STORE_HOOKS";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Unset variables take their default.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let reorder_by_cost = Self::load_reorder_by_cost(&lookup)?;
        let use_store_hooks = Self::load_use_store_hooks(&lookup)?;

        Ok(Self {
            reorder_by_cost,
            use_store_hooks,
        })
    }

    /// Load the reorder flag.
    ///
    /// Returns the default if not set.
    fn load_reorder_by_cost(lookup: &impl Fn(&str) -> Option<String>) -> Result<bool, ConfigError> {
        lookup(Self::REORDER_BY_COST_VAR).map_or(Ok(Self::DEFAULT_REORDER_BY_COST), |value| {
            parse_bool(Self::REORDER_BY_COST_VAR, &value)
        })
    }

    /// Load the store hooks flag.
    ///
    /// Returns the default if not set.
    fn load_use_store_hooks(lookup: &impl Fn(&str) -> Option<String>) -> Result<bool, ConfigError> {
        lookup(Self::USE_STORE_HOOKS_VAR).map_or(Ok(Self::DEFAULT_USE_STORE_HOOKS), |value| {
            parse_bool(Self::USE_STORE_HOOKS_VAR, &value)
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_owned(),
            message: format!("'{value}' is not a boolean (expected true/false, 1/0 or yes/no)"),
        }),
    }
}
