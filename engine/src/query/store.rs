//! The storage collaborator interface.
//!
//! A store only has to iterate its statements. Everything else has a
//! default built on `each()`, which a store overrides when it can answer
//! faster (an index lookup, a hash probe, a native join).
//!
//! Every hook must return the same statements as its default: the engine
//! picks between them purely on cost.

use super::bgp::Query;
use super::error::QueryError;
use super::pattern::Pattern;
use super::solution::Solution;
use super::solutions::Solutions;
use crate::types::Statement;

/// A lazily pulled sequence of statements.
pub type StatementIter<'a> = Box<dyn Iterator<Item = Result<Statement, StoreError>> + 'a>;

/// Errors raised by a store while it is iterated.
///
/// The engine passes these through unchanged and never retries.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O failure.
    Io(std::io::Error),
    /// Any other backend failure.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Backend(message) => write!(f, "backend error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Backend(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A pattern-queryable collection of statements.
pub trait Queryable {
    /// Iterate every statement in the store.
    fn each(&self) -> StatementIter<'_>;

    /// Iterate the statements matching a pattern.
    ///
    /// The default scans `each()` and applies `Pattern::matches`. Store
    /// errors are passed through, not filtered out.
    fn query_pattern(&self, pattern: Pattern) -> StatementIter<'_> {
        scan_pattern(self, pattern)
    }

    /// Execute a whole basic graph pattern.
    ///
    /// The default is the left-deep nested-loop join of `Query::execute`.
    fn query_execute(&self, query: &Query, bindings: &Solution) -> Result<Solutions, QueryError> {
        query.execute(self, bindings)
    }

    /// Check if the store contains a statement.
    ///
    /// The default scans `each()`.
    fn has_statement(&self, statement: &Statement) -> Result<bool, StoreError> {
        scan_contains(self, statement)
    }
}

/// Scan `each()` for the statements matching a pattern.
///
/// This is the fallback behind `Queryable::query_pattern`.
pub fn scan_pattern<S: Queryable + ?Sized>(store: &S, pattern: Pattern) -> StatementIter<'_> {
    Box::new(store.each().filter(move |item| match item {
        Ok(statement) => pattern.matches(statement),
        Err(_) => true,
    }))
}

/// Scan `each()` for a statement.
///
/// This is the fallback behind `Queryable::has_statement`.
///
/// # Errors
///
/// Returns the first error the store raises before the statement is found.
pub fn scan_contains<S: Queryable + ?Sized>(
    store: &S,
    statement: &Statement,
) -> Result<bool, StoreError> {
    for item in store.each() {
        if item? == *statement {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A view of a store that only exposes `each()`, so every request takes
/// the scanning fallbacks.
pub struct ScanOnly<'a, S: ?Sized>(pub &'a S);

impl<S: Queryable + ?Sized> Queryable for ScanOnly<'_, S> {
    fn each(&self) -> StatementIter<'_> {
        self.0.each()
    }
}

impl<T: Queryable + ?Sized> Queryable for &T {
    fn each(&self) -> StatementIter<'_> {
        (**self).each()
    }

    fn query_pattern(&self, pattern: Pattern) -> StatementIter<'_> {
        (**self).query_pattern(pattern)
    }

    fn query_execute(&self, query: &Query, bindings: &Solution) -> Result<Solutions, QueryError> {
        (**self).query_execute(query, bindings)
    }

    fn has_statement(&self, statement: &Statement) -> Result<bool, StoreError> {
        (**self).has_statement(statement)
    }
}

/// A slice of statements is a scan-only store.
impl Queryable for [Statement] {
    fn each(&self) -> StatementIter<'_> {
        Box::new(self.iter().map(|statement| Ok(statement.clone_value())))
    }
}

impl Queryable for Vec<Statement> {
    fn each(&self) -> StatementIter<'_> {
        self.as_slice().each()
    }
}
