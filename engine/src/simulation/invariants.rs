//! Invariant checking for deterministic simulation testing.
//!
//! Every answer the engine gives is compared against a naive evaluator
//! that only uses `Pattern::matches` and `Solutions::merge`.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use std::collections::HashMap;
use std::hash::Hash;

use crate::config::EngineConfig;
use crate::query::{
    Pattern, PatternElement, Query, QueryEngine, QueryError, QueryResponse, Queryable, Solution,
    Solutions,
};
use crate::testing::{FailingStore, MemoryStore};
use crate::types::{Position, Statement};

/// A detected invariant violation.
#[derive(Debug)]
pub struct InvariantViolation {
    /// The seed of the run that found it.
    pub seed: u64,
    /// The iteration that found it.
    pub iteration: usize,
    /// Which invariant failed.
    pub invariant: &'static str,
    /// What was being checked.
    pub detail: String,
}

/// Checks engine answers against naive evaluation.
#[derive(Debug)]
pub struct InvariantChecker {
    seed: u64,
    iteration: usize,
    checks_run: u64,
    violations: Vec<InvariantViolation>,
}

fn multiset<T: Eq + Hash>(items: impl IntoIterator<Item = T>) -> HashMap<T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// The solution a statement gives a pattern, or `None` when a repeated
/// variable would need two values.
fn naive_solution(pattern: &Pattern, statement: &Statement) -> Option<Solution> {
    if !pattern.matches(statement) {
        return None;
    }
    let mut solution = Solution::new();
    for position in Position::ALL {
        if let (Some(PatternElement::Variable(var)), Some(value)) =
            (pattern.get(position), statement.get(position))
        {
            match solution.get(&var.name) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => {
                    solution.insert(var.name.as_str(), value.clone_value());
                }
            }
        }
    }
    Some(solution)
}

fn naive_statements(statements: &[Statement], pattern: &Pattern) -> Vec<Statement> {
    statements
        .iter()
        .filter(|statement| naive_solution(pattern, statement).is_some())
        .map(Statement::clone_value)
        .collect()
}

fn naive_join(statements: &[Statement], query: &Query) -> Solutions {
    let mut solutions = Solutions::unit();
    for pattern in &query.patterns {
        let matches: Solutions = statements
            .iter()
            .filter_map(|statement| naive_solution(pattern, statement))
            .collect();
        solutions = if pattern.optional {
            let mut extended = Solutions::new();
            for partial in &solutions {
                let joined = Solutions::from(vec![partial.clone_value()]).merge(&matches);
                if joined.is_empty() {
                    extended.push(partial.clone_value());
                } else {
                    for solution in joined {
                        extended.push(solution);
                    }
                }
            }
            extended
        } else {
            solutions.merge(&matches)
        };
    }
    solutions
}

impl InvariantChecker {
    /// Create a new checker for a run.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            iteration: 0,
            checks_run: 0,
            violations: Vec::new(),
        }
    }

    /// Set the iteration recorded with violations.
    pub const fn set_iteration(&mut self, iteration: usize) {
        self.iteration = iteration;
    }

    fn check(&mut self, holds: bool, invariant: &'static str, detail: impl FnOnce() -> String) {
        self.checks_run += 1;
        if !holds {
            self.violations.push(InvariantViolation {
                seed: self.seed,
                iteration: self.iteration,
                invariant,
                detail: detail(),
            });
        }
    }

    /// All three dispatch routes and the naive scan agree on a pattern.
    pub fn check_dispatch(&mut self, store: &MemoryStore, pattern: &Pattern) {
        let statements: Vec<Statement> = store.each().filter_map(Result::ok).collect();
        let naive = naive_statements(&statements, pattern);
        let expected = multiset(naive.iter());

        let hooked = QueryEngine::new(store).execute(pattern.clone_value());
        let scanning = QueryEngine::with_config(
            store,
            EngineConfig {
                use_store_hooks: false,
                ..EngineConfig::default()
            },
        )
        .execute(pattern.clone_value());

        for (route, response) in [("hooked", hooked), ("scanning", scanning)] {
            let holds = match &response {
                Ok(QueryResponse::Statements(found)) => multiset(found.iter()) == expected,
                _ => false,
            };
            self.check(holds, "dispatch_matches_naive", || {
                format!("{route} dispatch of {pattern}: {response:?}")
            });
        }
    }

    /// The join agrees with a naive natural join. Returns the solutions.
    pub fn check_join(&mut self, store: &MemoryStore, query: &Query) -> Solutions {
        let statements: Vec<Statement> = store.each().filter_map(Result::ok).collect();
        let expected = naive_join(&statements, query);

        let solutions = match query.execute(store, &Solution::new()) {
            Ok(solutions) => solutions,
            Err(e) => {
                self.check(false, "join_succeeds", || format!("{query}: {e}"));
                return Solutions::new();
            }
        };
        self.check(
            multiset(solutions.iter()) == multiset(expected.iter()),
            "join_matches_naive",
            || {
                format!(
                    "{query}: got {} solutions, expected {}",
                    solutions.len(),
                    expected.len()
                )
            },
        );

        let reordered = query.optimize().execute(store, &Solution::new());
        self.check(
            reordered
                .is_ok_and(|reordered| multiset(reordered.iter()) == multiset(solutions.iter())),
            "optimize_preserves_solutions",
            || format!("{query}"),
        );

        solutions
    }

    /// Algebra laws over a solution sequence.
    pub fn check_algebra(&mut self, solutions: &Solutions) {
        // Only bindingless solutions survive: they share no variable
        self.check(
            solutions.minus(solutions).iter().all(Solution::is_empty),
            "minus_self_empty",
            || format!("{} solutions", solutions.len()),
        );

        let distinct = solutions.distinct();
        let unique = multiset(distinct.iter());
        self.check(
            unique.values().all(|count| *count == 1)
                && unique.len() == multiset(solutions.iter()).len(),
            "distinct_removes_only_duplicates",
            || format!("{} -> {}", solutions.len(), distinct.len()),
        );

        for s in solutions {
            for t in solutions {
                self.check(
                    s.is_compatible(t) == t.is_compatible(s) && s.is_compatible(s),
                    "compatibility_symmetric_reflexive",
                    || format!("{s} / {t}"),
                );
                self.check(
                    !s.is_disjoint(t) || s.is_compatible(t),
                    "disjoint_implies_compatible",
                    || format!("{s} / {t}"),
                );
            }
        }

        let names = solutions.variable_names();
        if let Some(name) = names.first().map(String::as_str) {
            let once = solutions.project(&[name]);
            let twice = once.as_ref().ok().map(|once| once.project(&[name]));
            self.check(
                matches!((&once, &twice), (Ok(once), Some(Ok(twice))) if once == twice),
                "projection_idempotent",
                || format!("project({name})"),
            );
        }

        let page = solutions.offset(1).limit(2);
        let expected: Vec<&Solution> = solutions.iter().skip(1).take(2).collect();
        self.check(
            page.iter().collect::<Vec<_>>() == expected,
            "offset_limit_slice",
            || format!("{} solutions", solutions.len()),
        );
    }

    /// A store failure surfaces as an error, never as a partial answer.
    pub fn check_failure(&mut self, store: &FailingStore, query: &Query) {
        let result = query.execute(store, &Solution::new());
        self.check(
            query.is_empty() || matches!(result, Err(QueryError::Store(_))),
            "store_failure_propagates",
            || format!("{query}: {result:?}"),
        );
    }

    /// Number of checks performed.
    #[must_use]
    pub const fn checks_run(&self) -> u64 {
        self.checks_run
    }

    /// Violations found so far.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Take the violations found so far.
    #[must_use]
    pub fn into_violations(self) -> Vec<InvariantViolation> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Term;

    fn st(s: &str, p: &str, o: &str) -> Statement {
        Statement::new(Term::iri(s), Term::iri(p), Term::iri(o))
    }

    #[test]
    fn test_naive_solution_rejects_disagreeing_repeat() {
        let pattern = Pattern::new("?x", Term::iri("same"), "?x");
        assert!(naive_solution(&pattern, &st("n1", "same", "n1")).is_some());
        assert!(naive_solution(&pattern, &st("n1", "same", "n2")).is_none());
    }

    #[test]
    fn test_checker_records_violation() {
        let mut checker = InvariantChecker::new(1);
        checker.set_iteration(3);
        checker.check(false, "always_fails", || "detail".to_owned());
        assert_eq!(checker.checks_run(), 1);
        assert_eq!(checker.violations().len(), 1);
        assert_eq!(checker.violations()[0].iteration, 3);
    }

    #[test]
    fn test_fixed_store_passes() {
        let store: MemoryStore = [st("a", "p", "1"), st("a", "q", "2"), st("b", "p", "1")]
            .into_iter()
            .collect();
        let query = Query::new()
            .pattern(("?s", Term::iri("p"), Term::iri("1")))
            .pattern(("?s", Term::iri("q"), Term::iri("2")));
        let mut checker = InvariantChecker::new(0);
        let solutions = checker.check_join(&store, &query);
        checker.check_algebra(&solutions);
        checker.check_dispatch(&store, &Pattern::new("?s", Term::iri("p"), "?o"));
        assert!(checker.violations().is_empty(), "{:?}", checker.violations());
        assert_eq!(solutions.len(), 1);
    }
}
