//! Query variables.
//!
//! A variable's flavor is read from its name prefix at construction:
//!
//! | prefix | existential | distinguished |
//! |--------|-------------|---------------|
//! | none   | false       | true          |
//! | `?`    | false       | true          |
//! | `??`   | false       | false         |
//! | `$`    | true        | true          |
//! | `$$`   | true        | false         |
//!
//! The prefix is stripped from the stored name, so `?x`, `??x` and `x` all
//! name the variable `x`.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use super::solution::Solution;
use crate::types::Term;

/// Counter for naming anonymous variables.
static ANONYMOUS_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A query variable, optionally pre-bound to a value.
///
/// Two variables are equal when they have the same name and the same value.
#[derive(Debug)]
pub struct Variable {
    /// The variable name, without prefix.
    pub name: String,
    value: Option<Term>,
    distinguished: bool,
    existential: bool,
}

/// Split a raw variable name into `(name, existential, distinguished)`.
fn parse_name(raw: &str) -> (&str, bool, bool) {
    if let Some(rest) = raw.strip_prefix("??") {
        (rest, false, false)
    } else if let Some(rest) = raw.strip_prefix('?') {
        (rest, false, true)
    } else if let Some(rest) = raw.strip_prefix("$$") {
        (rest, true, false)
    } else if let Some(rest) = raw.strip_prefix('$') {
        (rest, true, true)
    } else {
        (raw, false, true)
    }
}

impl Variable {
    /// Create a new unbound variable.
    ///
    /// An empty name (after the prefix) gets a generated one.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        let (name, existential, distinguished) = parse_name(name.as_ref());
        let name = if name.is_empty() {
            format!("g{}", ANONYMOUS_COUNTER.fetch_add(1, Ordering::Relaxed))
        } else {
            name.to_owned()
        };
        Self {
            name,
            value: None,
            distinguished,
            existential,
        }
    }

    /// Create a new variable bound to a value.
    #[must_use]
    pub fn with_value(name: impl AsRef<str>, value: Term) -> Self {
        let mut variable = Self::new(name);
        variable.value = Some(value);
        variable
    }

    /// Create an unbound variable with explicit flags.
    ///
    /// Any prefix on `name` is stripped and its flags are overridden.
    #[must_use]
    pub fn with_flags(name: impl AsRef<str>, existential: bool, distinguished: bool) -> Self {
        let mut variable = Self::new(name);
        variable.existential = existential;
        variable.distinguished = distinguished;
        variable
    }

    /// The bound value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Term> {
        self.value.as_ref()
    }

    /// Check if the variable has a value.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.value.is_some()
    }

    /// Check if the variable has no value.
    #[must_use]
    pub const fn is_unbound(&self) -> bool {
        self.value.is_none()
    }

    /// Check if the variable is answer-relevant.
    #[must_use]
    pub const fn is_distinguished(&self) -> bool {
        self.distinguished
    }

    /// Change whether the variable is answer-relevant.
    pub const fn set_distinguished(&mut self, distinguished: bool) {
        self.distinguished = distinguished;
    }

    /// Check if the variable was introduced by derivation rather than
    /// appearing literally in a query.
    #[must_use]
    pub const fn is_existential(&self) -> bool {
        self.existential
    }

    /// Bind the variable to a value, returning the previous one.
    pub fn bind(&mut self, value: Term) -> Option<Term> {
        self.value.replace(value)
    }

    /// Unbind the variable, returning the previous value.
    pub fn unbind(&mut self) -> Option<Term> {
        self.value.take()
    }

    /// The variable's binding as a solution: `{name: value}` if bound,
    /// empty otherwise.
    #[must_use]
    pub fn bindings(&self) -> Solution {
        let mut solution = Solution::new();
        if let Some(value) = &self.value {
            solution.insert(self.name.as_str(), value.clone_value());
        }
        solution
    }

    /// The variables mentioned by this variable: itself.
    #[must_use]
    pub fn variables(&self) -> BTreeMap<&str, &Self> {
        BTreeMap::from([(self.name.as_str(), self)])
    }

    /// Case-match: an unbound variable matches any term, a bound one
    /// matches terms equal to its value.
    #[must_use]
    pub fn matches(&self, term: &Term) -> bool {
        self.value.as_ref().is_none_or(|value| value == term)
    }

    /// Create a copy of this variable.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            name: self.name.as_str().to_owned(),
            value: self.value.as_ref().map(Term::clone_value),
            distinguished: self.distinguished,
            existential: self.existential,
        }
    }

    const fn prefix(&self) -> &'static str {
        match (self.existential, self.distinguished) {
            (false, true) => "?",
            (false, false) => "??",
            (true, true) => "$",
            (true, false) => "$$",
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}{}={value}", self.prefix(), self.name),
            None => write!(f, "{}{}", self.prefix(), self.name),
        }
    }
}
