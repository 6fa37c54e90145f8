//! Errors raised by the query engine.
//!
//! Non-matches are never errors: a pattern that matches nothing, an
//! incompatible merge, or unequal literals all produce empty results.

use super::store::StoreError;

/// Errors that can occur during query execution.
#[derive(Debug)]
pub enum QueryError {
    /// The store failed while being iterated.
    Store(StoreError),
    /// A pattern slot holds a value of the wrong kind.
    InvalidPattern(String),
    /// A projection was requested with no variable names.
    EmptyProjection,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::InvalidPattern(pattern) => write!(f, "invalid pattern: {pattern}"),
            Self::EmptyProjection => write!(f, "projection requires at least one variable"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::InvalidPattern(_) | Self::EmptyProjection => None,
        }
    }
}

impl From<StoreError> for QueryError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
