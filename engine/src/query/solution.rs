//! A single solution: a mapping from variable names to terms.
//!
//! Solutions are produced by pattern matching and extended during joins.
//! Bindings keep their insertion order, but equality and hashing only look
//! at the binding set, so `{a: 1, b: 2}` equals `{b: 2, a: 1}`.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::variable::Variable;
use crate::types::Term;

/// A mapping from variable names to bound terms.
#[derive(Debug, Default)]
pub struct Solution {
    /// Bindings in insertion order. Names are unique.
    bindings: Vec<(String, Term)>,
}

impl Solution {
    /// Create a new empty solution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value bound to a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// Bind a name to a value, returning the previous value.
    ///
    /// Rebinding keeps the name's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: Term) -> Option<Term> {
        let name = name.into();
        if let Some((_, slot)) = self.bindings.iter_mut().find(|(bound, _)| *bound == name) {
            return Some(std::mem::replace(slot, value));
        }
        self.bindings.push((name, value));
        None
    }

    /// Remove a binding.
    pub fn remove(&mut self, name: &str) -> Option<Term> {
        let index = self.bindings.iter().position(|(bound, _)| bound == name)?;
        Some(self.bindings.remove(index).1)
    }

    /// Check if a name is bound.
    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.iter().any(|(bound, _)| bound == name)
    }

    /// Check if a name is unbound.
    #[must_use]
    pub fn is_unbound(&self, name: &str) -> bool {
        !self.is_bound(name)
    }

    /// Get the number of bindings.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the solution has no bindings.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate over bound names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over bound values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Term> {
        self.bindings.iter().map(|(_, value)| value)
    }

    /// One bound `Variable` per binding, in insertion order.
    ///
    /// Each name is read through the variable naming convention, so a key
    /// of `??c` yields a non-distinguished variable named `c`.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.bindings
            .iter()
            .map(|(name, value)| Variable::with_value(name, value.clone_value()))
            .collect()
    }

    /// Check if every name bound in both solutions has equal values.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.bindings
            .iter()
            .all(|(name, value)| other.get(name).is_none_or(|theirs| theirs == value))
    }

    /// Check if the solutions bind no common name.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.bindings.iter().any(|(name, _)| other.is_bound(name))
    }

    /// Create a new solution with the bindings of both.
    ///
    /// Bindings from `other` override existing bindings. Check
    /// `is_compatible` first when overriding must not happen.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone_value();
        for (name, value) in &other.bindings {
            merged.insert(name.as_str(), value.clone_value());
        }
        merged
    }

    /// Create a new solution keeping only the named bindings.
    #[must_use]
    pub fn project(&self, names: &[&str]) -> Self {
        Self {
            bindings: self
                .bindings
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .map(|(name, value)| (name.as_str().to_owned(), value.clone_value()))
                .collect(),
        }
    }

    /// Keep only the bindings for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Term) -> bool) {
        self.bindings.retain(|(name, value)| keep(name, value));
    }

    /// Create a copy of this solution.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            bindings: self
                .bindings
                .iter()
                .map(|(name, value)| (name.as_str().to_owned(), value.clone_value()))
                .collect(),
        }
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .bindings
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sorted: Vec<&(String, Term)> = self.bindings.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted.len().hash(state);
        for (name, value) in sorted {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl<N: Into<String>> FromIterator<(N, Term)> for Solution {
    fn from_iter<I: IntoIterator<Item = (N, Term)>>(iter: I) -> Self {
        let mut solution = Self::new();
        for (name, value) in iter {
            solution.insert(name, value);
        }
        solution
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Solution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for (name, value) in &self.bindings {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
