//! Basic graph patterns.
//!
//! A `Query` is an ordered list of patterns joined left to right: a
//! left-deep nested-loop join seeded with the caller's bindings. The order
//! of required patterns only affects cost; optional patterns are left
//! joins and keep their place.

use std::collections::BTreeMap;
use std::fmt;

use super::error::QueryError;
use super::pattern::{Pattern, PatternElement, index_variables};
use super::solution::Solution;
use super::solutions::Solutions;
use super::store::Queryable;
use super::variable::Variable;

/// A basic graph pattern.
#[derive(Debug, Default, PartialEq)]
pub struct Query {
    /// Patterns in join order.
    pub patterns: Vec<Pattern>,
    /// Graph applied to every pattern that names no graph of its own.
    pub graph_name: Option<PatternElement>,
}

impl Query {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add an optional pattern (left outer join).
    #[must_use]
    pub fn optional(mut self, pattern: impl Into<Pattern>) -> Self {
        self.patterns.push(pattern.into().into_optional());
        self
    }

    /// Scope the query to a graph.
    #[must_use]
    pub fn with_graph(mut self, graph_name: impl Into<PatternElement>) -> Self {
        self.graph_name = Some(graph_name.into());
        self
    }

    /// Append a pattern.
    pub fn push(&mut self, pattern: impl Into<Pattern>) {
        self.patterns.push(pattern.into());
    }

    /// Get the number of patterns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the query has no patterns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The variables mentioned by any pattern or the query graph, keyed by
    /// name. When a name appears more than once, the first occurrence wins,
    /// except that a distinguished occurrence beats a non-distinguished one.
    #[must_use]
    pub fn variables(&self) -> BTreeMap<&str, &Variable> {
        let graph = self
            .graph_name
            .as_ref()
            .and_then(PatternElement::as_variable);
        index_variables(
            self.patterns
                .iter()
                .flat_map(|pattern| pattern.variables().into_values())
                .chain(graph),
        )
    }

    /// The number of distinct variable names.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables().len()
    }

    /// Check if a variable is mentioned anywhere in the query.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().contains_key(name)
    }

    /// Check if every pattern is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let graph_valid = self.graph_name.as_ref().is_none_or(|graph_name| {
            Pattern::blank()
                .with_graph(graph_name.clone_value())
                .is_valid()
        });
        graph_valid && self.patterns.iter().all(Pattern::is_valid)
    }

    /// Check if any pattern holds a blank node term.
    #[must_use]
    pub fn has_blank_nodes(&self) -> bool {
        self.patterns.iter().any(Pattern::has_blank_nodes)
    }

    /// Create a new query with blank node terms replaced by
    /// non-distinguished variables.
    #[must_use]
    pub fn with_blank_nodes_as_variables(&self) -> Self {
        Self {
            patterns: self
                .patterns
                .iter()
                .map(|pattern| pattern.clone_value().with_blank_nodes_as_variables())
                .collect(),
            graph_name: self.graph_name.as_ref().map(PatternElement::clone_value),
        }
    }

    /// Create a new query with patterns stably sorted by their cost hint.
    ///
    /// Patterns without a hint keep their relative order after the hinted
    /// ones. Optional patterns stay where they are and required patterns
    /// never move across them, since a left join does not commute.
    #[must_use]
    pub fn optimize(&self) -> Self {
        let mut optimized = self.clone_value();
        for run in optimized
            .patterns
            .split_mut(|pattern| pattern.optional)
        {
            run.sort_by(|a, b| match (a.cost, b.cost) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        optimized
    }

    /// Execute the join against a store.
    ///
    /// Starts from `bindings` as the single seed solution, so an empty query
    /// yields exactly the seed. For each pattern, every partial solution is
    /// extended with each compatible match; an optional pattern keeps
    /// partial solutions it cannot extend. When the query mentions at least
    /// one distinguished variable, non-distinguished ones are removed from
    /// the final solutions.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` if any pattern or the query
    /// graph is malformed, before the store is touched, and
    /// `QueryError::Store` if the store fails while being iterated.
    pub fn execute<S: Queryable + ?Sized>(
        &self,
        store: &S,
        bindings: &Solution,
    ) -> Result<Solutions, QueryError> {
        if !self.is_valid() {
            tracing::warn!("rejecting invalid query: {self}");
            return Err(QueryError::InvalidPattern(self.to_string()));
        }

        let mut solutions = Solutions::from(vec![bindings.clone_value()]);

        for (index, template) in self.patterns.iter().enumerate() {
            let scoped;
            let pattern = match (&self.graph_name, &template.graph_name) {
                (Some(graph_name), None) => {
                    scoped = template.clone_value().with_graph(graph_name.clone_value());
                    &scoped
                }
                _ => template,
            };

            let mut extended = Solutions::new();
            for partial in &solutions {
                let before = extended.len();
                for statement in pattern.execute(store, partial)? {
                    let extension = pattern.solution(&statement?);
                    if partial.is_compatible(&extension) {
                        extended.push(partial.merge(&extension));
                    }
                }
                if pattern.optional && extended.len() == before {
                    tracing::trace!("optional pattern {index} unmatched, keeping {partial}");
                    extended.push(partial.clone_value());
                }
            }

            tracing::debug!(
                "pattern {index} ({pattern}): {} -> {} solutions",
                solutions.len(),
                extended.len()
            );
            solutions = extended;
            if solutions.is_empty() {
                break;
            }
        }

        Ok(self.strip_non_distinguished(solutions))
    }

    fn strip_non_distinguished(&self, solutions: Solutions) -> Solutions {
        let variables = self.variables();
        if !variables.values().any(|var| var.is_distinguished()) {
            return solutions;
        }
        let hidden: Vec<&str> = variables
            .iter()
            .filter(|(_, var)| !var.is_distinguished())
            .map(|(name, _)| *name)
            .collect();
        if hidden.is_empty() {
            return solutions;
        }
        solutions
            .into_iter()
            .map(|mut solution| {
                solution.retain(|name, _| !hidden.contains(&name));
                solution
            })
            .collect()
    }

    /// Create a copy of this query.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            patterns: self.patterns.iter().map(Pattern::clone_value).collect(),
            graph_name: self.graph_name.as_ref().map(PatternElement::clone_value),
        }
    }
}

impl FromIterator<Pattern> for Query {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
            graph_name: None,
        }
    }
}

impl From<Vec<Pattern>> for Query {
    fn from(patterns: Vec<Pattern>) -> Self {
        Self {
            patterns,
            graph_name: None,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(graph_name) = &self.graph_name {
            write!(f, "GRAPH {graph_name} ")?;
        }
        write!(f, "{{")?;
        for pattern in &self.patterns {
            write!(f, " {pattern}")?;
        }
        write!(f, " }}")
    }
}
