//! Query dispatch.
//!
//! The `QueryEngine` is the single entry point for running requests against
//! a store. A request is classified once:
//! - A `Query` runs as a basic graph pattern join and yields solutions.
//! - A single pattern is classified by `Pattern::shape`:
//!   - blank: every statement, straight from `each()`
//!   - constant: a membership probe through `has_statement`
//!   - variable: the store's pattern hook, with the self-join check
//!
//! Every branch returns the same statements the scanning fallback would;
//! the classification only picks the cheapest route.

use super::bgp::Query;
use super::error::QueryError;
use super::pattern::{Pattern, PatternElement, PatternShape};
use super::solution::Solution;
use super::solutions::Solutions;
use super::store::{Queryable, ScanOnly, StatementIter, scan_contains, scan_pattern};
use crate::config::EngineConfig;
use crate::types::{Literal, Statement, Term};

/// A request accepted by `QueryEngine::execute`.
#[derive(Debug)]
pub enum Request {
    /// A single statement pattern.
    Pattern(Pattern),
    /// A basic graph pattern.
    Query(Query),
}

impl From<Pattern> for Request {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Statement> for Request {
    fn from(statement: Statement) -> Self {
        Self::Pattern(statement.into())
    }
}

impl From<Query> for Request {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl<S, P, O> From<(S, P, O)> for Request
where
    S: Into<PatternElement>,
    P: Into<PatternElement>,
    O: Into<PatternElement>,
{
    fn from(triple: (S, P, O)) -> Self {
        Self::Pattern(triple.into())
    }
}

/// A single streamed result.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryItem {
    /// A statement matching a pattern request.
    Statement(Statement),
    /// A solution of a query request.
    Solution(Solution),
}

/// The collected results of a request.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryResponse {
    /// Statements matching a pattern request.
    Statements(Vec<Statement>),
    /// Solutions of a query request.
    Solutions(Solutions),
}

impl QueryResponse {
    /// Get the statements, if this answers a pattern request.
    #[must_use]
    pub fn statements(&self) -> Option<&[Statement]> {
        match self {
            Self::Statements(statements) => Some(statements),
            Self::Solutions(_) => None,
        }
    }

    /// Get the solutions, if this answers a query request.
    #[must_use]
    pub const fn solutions(&self) -> Option<&Solutions> {
        match self {
            Self::Solutions(solutions) => Some(solutions),
            Self::Statements(_) => None,
        }
    }

    /// Get the number of results.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Statements(statements) => statements.len(),
            Self::Solutions(solutions) => solutions.len(),
        }
    }

    /// Check if there are no results.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The query engine dispatches requests against a store.
pub struct QueryEngine<'a, S: Queryable + ?Sized> {
    store: &'a S,
    config: EngineConfig,
}

impl<'a, S: Queryable + ?Sized> QueryEngine<'a, S> {
    /// Create a new query engine with the default configuration.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create a new query engine with a configuration.
    #[must_use]
    pub const fn with_config(store: &'a S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute a request and collect its results.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` for a malformed pattern and
    /// `QueryError::Store` if the store fails.
    pub fn execute(&self, request: impl Into<Request>) -> Result<QueryResponse, QueryError> {
        match request.into() {
            Request::Pattern(pattern) => {
                let statements = self
                    .statements(pattern)?
                    .collect::<Result<Vec<_>, _>>()?;
                tracing::debug!("pattern request: {} statements", statements.len());
                Ok(QueryResponse::Statements(statements))
            }
            Request::Query(query) => Ok(QueryResponse::Solutions(self.solutions(&query)?)),
        }
    }

    /// Execute a request, handing each result to `on_result` as it is
    /// produced. Returns the number of results.
    ///
    /// Statements are streamed as the store yields them. Query solutions
    /// are only available once the join is complete.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` for a malformed pattern and
    /// `QueryError::Store` if the store fails. Results handed out before a
    /// store failure are not taken back.
    pub fn execute_with(
        &self,
        request: impl Into<Request>,
        mut on_result: impl FnMut(QueryItem),
    ) -> Result<usize, QueryError> {
        let mut count = 0;
        match request.into() {
            Request::Pattern(pattern) => {
                for statement in self.statements(pattern)? {
                    on_result(QueryItem::Statement(statement?));
                    count += 1;
                }
            }
            Request::Query(query) => {
                for solution in self.solutions(&query)? {
                    on_result(QueryItem::Solution(solution));
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Stream the statements matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` for a malformed pattern and
    /// `QueryError::Store` if a membership probe fails. Failures while
    /// scanning surface as items of the returned iterator.
    pub fn statements(&self, pattern: Pattern) -> Result<StatementIter<'a>, QueryError> {
        if !pattern.is_valid() {
            tracing::warn!("rejecting invalid pattern: {pattern}");
            return Err(QueryError::InvalidPattern(pattern.to_string()));
        }

        let store = self.store;
        let hooks = self.config.use_store_hooks;
        match pattern.shape() {
            PatternShape::Blank => {
                tracing::trace!("dispatch: blank pattern, iterating every statement");
                Ok(store.each())
            }
            PatternShape::Constant(statement) => {
                tracing::trace!("dispatch: constant pattern, probing {statement}");
                let found = if hooks {
                    store.has_statement(&statement)?
                } else {
                    scan_contains(store, &statement)?
                };
                Ok(Box::new(found.then_some(Ok(statement)).into_iter()))
            }
            PatternShape::Variable => {
                tracing::trace!("dispatch: variable pattern {pattern}");
                if hooks {
                    pattern.execute(store, &Solution::new())
                } else {
                    pattern.execute_with(&Solution::new(), |request| scan_pattern(store, request))
                }
            }
        }
    }

    /// Run a query as a join.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` for a malformed pattern and
    /// `QueryError::Store` if the store fails.
    pub fn solutions(&self, query: &Query) -> Result<Solutions, QueryError> {
        if !query.is_valid() {
            tracing::warn!("rejecting invalid query: {query}");
            return Err(QueryError::InvalidPattern(query.to_string()));
        }

        let reordered;
        let query = if self.config.reorder_by_cost {
            reordered = query.optimize();
            &reordered
        } else {
            query
        };

        let solutions = if self.config.use_store_hooks {
            self.store.query_execute(query, &Solution::new())?
        } else {
            query.execute(&ScanOnly(self.store), &Solution::new())?
        };
        tracing::debug!(
            "query request ({} patterns): {} solutions",
            query.len(),
            solutions.len()
        );
        Ok(solutions)
    }

    /// The first statement matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as `statements`, or if the
    /// store fails before the first match.
    pub fn first(&self, pattern: impl Into<Pattern>) -> Result<Option<Statement>, QueryError> {
        Ok(self.statements(pattern.into())?.next().transpose()?)
    }

    /// The subject of the first statement matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as `first`.
    pub fn first_subject(&self, pattern: impl Into<Pattern>) -> Result<Option<Term>, QueryError> {
        Ok(self.first(pattern)?.map(|statement| statement.subject))
    }

    /// The object of the first statement matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as `first`.
    pub fn first_object(&self, pattern: impl Into<Pattern>) -> Result<Option<Term>, QueryError> {
        Ok(self.first(pattern)?.map(|statement| statement.object))
    }

    /// The first literal object among the statements matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as `statements`, or if the
    /// store fails before a literal is found.
    pub fn first_literal(
        &self,
        pattern: impl Into<Pattern>,
    ) -> Result<Option<Literal>, QueryError> {
        for statement in self.statements(pattern.into())? {
            if let Term::Literal(literal) = statement?.object {
                return Ok(Some(literal));
            }
        }
        Ok(None)
    }

    /// Check if the store contains a statement.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if the store fails.
    pub fn has_statement(&self, statement: &Statement) -> Result<bool, QueryError> {
        let found = if self.config.use_store_hooks {
            self.store.has_statement(statement)?
        } else {
            scan_contains(self.store, statement)?
        };
        Ok(found)
    }
}
