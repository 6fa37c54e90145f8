//! In-memory stores for tests and embedding.
//!
//! - `MemoryStore` keeps per-position indexes and answers every optional
//!   hook, counting how often each one is used.
//! - `FailingStore` yields a fixed number of statements and then fails.
//!
//! `Vec<Statement>` and `[Statement]` are also stores: scan-only ones.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::query::{
    Pattern, PatternElement, Query, QueryError, Queryable, Solution, Solutions, StatementIter,
    StoreError,
};
use crate::types::{Statement, Term};

/// How often each store entry point has been called.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HookCalls {
    pub each: usize,
    pub query_pattern: usize,
    pub query_execute: usize,
    pub has_statement: usize,
}

#[derive(Debug, Default)]
struct HookCounters {
    each: AtomicUsize,
    query_pattern: AtomicUsize,
    query_execute: AtomicUsize,
    has_statement: AtomicUsize,
}

impl HookCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HookCalls {
        HookCalls {
            each: self.each.load(Ordering::Relaxed),
            query_pattern: self.query_pattern.load(Ordering::Relaxed),
            query_execute: self.query_execute.load(Ordering::Relaxed),
            has_statement: self.has_statement.load(Ordering::Relaxed),
        }
    }
}

/// An indexed in-memory statement store.
///
/// Statements are kept in insertion order; duplicates are ignored.
#[derive(Debug, Default)]
pub struct MemoryStore {
    statements: Vec<Statement>,
    members: HashSet<Statement>,
    by_subject: HashMap<Term, Vec<usize>>,
    by_predicate: HashMap<Term, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
    calls: HookCounters,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement. Returns false if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if self.members.contains(&statement) {
            return false;
        }
        let index = self.statements.len();
        for (map, term) in [
            (&mut self.by_subject, &statement.subject),
            (&mut self.by_predicate, &statement.predicate),
            (&mut self.by_object, &statement.object),
        ] {
            map.entry(term.clone_value()).or_default().push(index);
        }
        self.members.insert(statement.clone_value());
        self.statements.push(statement);
        true
    }

    /// Get the number of statements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.statements.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// How often each entry point has been called so far.
    #[must_use]
    pub fn hook_calls(&self) -> HookCalls {
        self.calls.snapshot()
    }

    /// The shortest index list covering a pattern's fixed slots, or `None`
    /// when no slot is fixed.
    fn candidates(&self, pattern: &Pattern) -> Option<&[usize]> {
        fn lookup<'m>(
            map: &'m HashMap<Term, Vec<usize>>,
            element: Option<&PatternElement>,
        ) -> Option<&'m [usize]> {
            element
                .and_then(PatternElement::constant)
                .map(|term| map.get(term).map_or(&[][..], Vec::as_slice))
        }

        [
            lookup(&self.by_subject, pattern.subject.as_ref()),
            lookup(&self.by_predicate, pattern.predicate.as_ref()),
            lookup(&self.by_object, pattern.object.as_ref()),
        ]
        .into_iter()
        .flatten()
        .min_by_key(|indexes| indexes.len())
    }
}

impl FromIterator<Statement> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        let mut store = Self::new();
        for statement in iter {
            store.insert(statement);
        }
        store
    }
}

impl Queryable for MemoryStore {
    fn each(&self) -> StatementIter<'_> {
        HookCounters::bump(&self.calls.each);
        Box::new(self.statements.iter().map(|statement| Ok(statement.clone_value())))
    }

    fn query_pattern(&self, pattern: Pattern) -> StatementIter<'_> {
        HookCounters::bump(&self.calls.query_pattern);
        match self.candidates(&pattern) {
            Some(indexes) => Box::new(
                indexes
                    .iter()
                    .filter_map(|index| self.statements.get(*index))
                    .filter(move |statement| pattern.matches(statement))
                    .map(|statement| Ok(statement.clone_value())),
            ),
            None => Box::new(
                self.statements
                    .iter()
                    .filter(move |statement| pattern.matches(statement))
                    .map(|statement| Ok(statement.clone_value())),
            ),
        }
    }

    fn query_execute(&self, query: &Query, bindings: &Solution) -> Result<Solutions, QueryError> {
        HookCounters::bump(&self.calls.query_execute);
        tracing::trace!("memory store executing {query}");
        query.execute(self, bindings)
    }

    fn has_statement(&self, statement: &Statement) -> Result<bool, StoreError> {
        HookCounters::bump(&self.calls.has_statement);
        Ok(self.members.contains(statement))
    }
}

/// A scan-only store that fails after yielding a fixed number of
/// statements.
#[derive(Debug)]
pub struct FailingStore {
    statements: Vec<Statement>,
    fail_after: usize,
}

impl FailingStore {
    /// Create a store that yields `fail_after` statements, then an error.
    #[must_use]
    pub const fn new(statements: Vec<Statement>, fail_after: usize) -> Self {
        Self {
            statements,
            fail_after,
        }
    }
}

impl Queryable for FailingStore {
    fn each(&self) -> StatementIter<'_> {
        let good = self
            .statements
            .iter()
            .take(self.fail_after)
            .map(|statement| Ok(statement.clone_value()));
        let failure = std::iter::once_with(|| {
            Err(StoreError::Backend("injected failure".to_owned()))
        });
        Box::new(good.chain(failure))
    }
}

/// Initialize tracing output for a test run.
///
/// Honors `RUST_LOG`, defaulting to `engine=debug`. Safe to call from every
/// test; only the first call installs the subscriber.
#[cfg(test)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("engine=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
