//! Statements: complete triples or quads.

use std::fmt;

use super::term::Term;

/// A slot position within a statement or pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    GraphName,
}

impl Position {
    /// All positions in statement order.
    pub const ALL: [Self; 4] = [Self::Subject, Self::Predicate, Self::Object, Self::GraphName];
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => write!(f, "subject"),
            Self::Predicate => write!(f, "predicate"),
            Self::Object => write!(f, "object"),
            Self::GraphName => write!(f, "graph name"),
        }
    }
}

/// A statement, readonly.
///
/// `graph_name` of `None` places the statement in the default graph.
///
/// INVARIANT (when `is_valid()`): the subject is a resource and the
/// predicate is an IRI.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph_name: Option<Term>,
}

impl Statement {
    /// Create a statement in the default graph.
    #[must_use]
    pub const fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph_name: None,
        }
    }

    /// Move this statement into a named graph.
    #[must_use]
    pub fn in_graph(mut self, graph_name: Term) -> Self {
        self.graph_name = Some(graph_name);
        self
    }

    /// Get the term at a position.
    ///
    /// Returns `None` only for the graph name of a default-graph statement.
    #[must_use]
    pub const fn get(&self, position: Position) -> Option<&Term> {
        match position {
            Position::Subject => Some(&self.subject),
            Position::Predicate => Some(&self.predicate),
            Position::Object => Some(&self.object),
            Position::GraphName => self.graph_name.as_ref(),
        }
    }

    /// Check the per-slot term types.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.subject.is_resource()
            && self.predicate.is_iri()
            && self.graph_name.as_ref().is_none_or(Term::is_resource)
    }

    /// Create a copy of this statement.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            subject: self.subject.clone_value(),
            predicate: self.predicate.clone_value(),
            object: self.object.clone_value(),
            graph_name: self.graph_name.as_ref().map(Term::clone_value),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph_name) = &self.graph_name {
            write!(f, " {graph_name}")?;
        }
        write!(f, " .")
    }
}
