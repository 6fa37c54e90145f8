//! Solution sequences and their algebra.
//!
//! `Solutions` holds its solutions eagerly; build one from any iterator,
//! lazy or not. Every operator is pure and returns a new, fully
//! materialized value: none of them stream, including `filter`, `offset`
//! and `limit`. `order`, `distinct`, `merge` and `minus` additionally need
//! the whole of at least one input side in memory.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use regex::Regex;
use serde::ser::{Serialize, Serializer};

use super::error::QueryError;
use super::solution::Solution;
use crate::types::Term;

/// A condition on the value bound to one variable.
#[derive(Debug)]
pub enum Criterion {
    /// The value equals this term.
    Equals(Term),
    /// The value equals any of these terms.
    AnyOf(Vec<Term>),
    /// The stringified value matches this regex.
    Matches(Regex),
}

impl Criterion {
    /// Check a bound value against this criterion.
    #[must_use]
    pub fn accepts(&self, value: &Term) -> bool {
        match self {
            Self::Equals(term) => term == value,
            Self::AnyOf(terms) => terms.contains(value),
            Self::Matches(regex) => regex.is_match(value.as_str()),
        }
    }
}

impl From<Term> for Criterion {
    fn from(term: Term) -> Self {
        Self::Equals(term)
    }
}

impl From<Vec<Term>> for Criterion {
    fn from(terms: Vec<Term>) -> Self {
        Self::AnyOf(terms)
    }
}

impl From<Regex> for Criterion {
    fn from(regex: Regex) -> Self {
        Self::Matches(regex)
    }
}

/// Comparator used by `OrderKey::Compare`.
pub type SolutionComparator = Box<dyn Fn(&Solution, &Solution) -> Ordering>;

/// One sort key for `Solutions::order`.
pub enum OrderKey {
    /// Ascending by the term bound to a variable. Unbound sorts first.
    Asc(String),
    /// Descending by the term bound to a variable. Unbound sorts last.
    Desc(String),
    /// A caller-supplied comparator.
    Compare(SolutionComparator),
}

impl OrderKey {
    /// Ascending key on a variable.
    #[must_use]
    pub fn asc(name: impl Into<String>) -> Self {
        Self::Asc(name.into())
    }

    /// Descending key on a variable.
    #[must_use]
    pub fn desc(name: impl Into<String>) -> Self {
        Self::Desc(name.into())
    }

    /// Key from a comparator.
    #[must_use]
    pub fn by(compare: impl Fn(&Solution, &Solution) -> Ordering + 'static) -> Self {
        Self::Compare(Box::new(compare))
    }

    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        match self {
            Self::Asc(name) => a.get(name).cmp(&b.get(name)),
            Self::Desc(name) => b.get(name).cmp(&a.get(name)),
            Self::Compare(compare) => compare(a, b),
        }
    }
}

impl fmt::Debug for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc(name) => write!(f, "Asc({name})"),
            Self::Desc(name) => write!(f, "Desc({name})"),
            Self::Compare(_) => write!(f, "Compare(..)"),
        }
    }
}

/// An ordered sequence of solutions.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Solutions {
    solutions: Vec<Solution>,
}

impl Solutions {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence holding one empty solution, the identity of `merge`.
    #[must_use]
    pub fn unit() -> Self {
        Self {
            solutions: vec![Solution::new()],
        }
    }

    /// Get the number of solutions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Check if there are no solutions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Iterate over the solutions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    /// Get a solution by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Solution> {
        self.solutions.get(index)
    }

    /// Append a solution.
    pub fn push(&mut self, solution: Solution) {
        self.solutions.push(solution);
    }

    /// Take the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Solution> {
        self.solutions
    }

    /// Keep the solutions that satisfy every criterion.
    ///
    /// A solution that leaves a criterion's variable unbound is dropped.
    #[must_use]
    pub fn filter(&self, criteria: &[(&str, Criterion)]) -> Self {
        self.filter_by(|solution| {
            criteria.iter().all(|(name, criterion)| {
                solution
                    .get(name)
                    .is_some_and(|value| criterion.accepts(value))
            })
        })
    }

    /// Keep the solutions for which `predicate` returns true.
    #[must_use]
    pub fn filter_by(&self, mut predicate: impl FnMut(&Solution) -> bool) -> Self {
        self.iter()
            .filter(|solution| predicate(solution))
            .map(Solution::clone_value)
            .collect()
    }

    /// SPARQL MINUS: drop every solution that is compatible with, and
    /// shares at least one variable with, some solution of `other`.
    #[must_use]
    pub fn minus(&self, other: &Self) -> Self {
        self.filter_by(|solution| {
            !other
                .iter()
                .any(|theirs| solution.is_compatible(theirs) && !solution.is_disjoint(theirs))
        })
    }

    /// Natural join: the union of every compatible pair across both
    /// sequences, in `self`-major order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = Self::new();
        for ours in self {
            for theirs in other {
                if ours.is_compatible(theirs) {
                    merged.push(ours.merge(theirs));
                }
            }
        }
        merged
    }

    /// Sort by successive keys; the first key that does not compare equal
    /// decides.
    ///
    /// The sort is stable: solutions that compare equal on every key keep
    /// their relative order.
    #[must_use]
    pub fn order(&self, keys: &[OrderKey]) -> Self {
        let mut sorted = self.clone_value();
        sorted.solutions.sort_by(|a, b| {
            keys.iter()
                .map(|key| key.compare(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    /// Keep only the named bindings in each solution.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyProjection` if `names` is empty.
    pub fn project(&self, names: &[&str]) -> Result<Self, QueryError> {
        if names.is_empty() {
            return Err(QueryError::EmptyProjection);
        }
        Ok(self.iter().map(|solution| solution.project(names)).collect())
    }

    /// Alias for `project`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyProjection` if `names` is empty.
    pub fn select(&self, names: &[&str]) -> Result<Self, QueryError> {
        self.project(names)
    }

    /// Alias for `filter_by`.
    #[must_use]
    pub fn select_by(&self, predicate: impl FnMut(&Solution) -> bool) -> Self {
        self.filter_by(predicate)
    }

    /// Drop repeated solutions, keeping the first occurrence of each.
    #[must_use]
    pub fn distinct(&self) -> Self {
        let mut seen = HashSet::new();
        self.filter_by(|solution| seen.insert(solution.clone_value()))
    }

    /// Same as `distinct`; duplicates are always removed.
    #[must_use]
    pub fn reduced(&self) -> Self {
        self.distinct()
    }

    /// Skip the first `count` solutions.
    #[must_use]
    pub fn offset(&self, count: usize) -> Self {
        self.iter().skip(count).map(Solution::clone_value).collect()
    }

    /// Keep at most the first `count` solutions.
    #[must_use]
    pub fn limit(&self, count: usize) -> Self {
        self.iter().take(count).map(Solution::clone_value).collect()
    }

    /// Every value bound to each name, in solution order. Repeats are kept.
    #[must_use]
    pub fn bindings(&self) -> BTreeMap<String, Vec<Term>> {
        let mut bindings: BTreeMap<String, Vec<Term>> = BTreeMap::new();
        for (name, value) in self.iter().flat_map(Solution::iter) {
            bindings
                .entry(name.to_owned())
                .or_default()
                .push(value.clone_value());
        }
        bindings
    }

    /// The distinct names bound anywhere in the sequence, in first-seen
    /// order.
    #[must_use]
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.iter().flat_map(Solution::names) {
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_owned());
            }
        }
        names
    }

    /// Count the solutions for which `predicate` returns true.
    #[must_use]
    pub fn count_by(&self, mut predicate: impl FnMut(&Solution) -> bool) -> usize {
        self.iter().filter(|solution| predicate(solution)).count()
    }

    /// Check if every name is bound in at least one solution.
    #[must_use]
    pub fn has_variables(&self, names: &[&str]) -> bool {
        names
            .iter()
            .all(|name| self.iter().any(|solution| solution.is_bound(name)))
    }

    /// Create a copy of this sequence.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        self.iter().map(Solution::clone_value).collect()
    }
}

impl FromIterator<Solution> for Solutions {
    fn from_iter<I: IntoIterator<Item = Solution>>(iter: I) -> Self {
        Self {
            solutions: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Solution>> for Solutions {
    fn from(solutions: Vec<Solution>) -> Self {
        Self { solutions }
    }
}

impl IntoIterator for Solutions {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

impl<'a> IntoIterator for &'a Solutions {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

impl Serialize for Solutions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.solutions)
    }
}
