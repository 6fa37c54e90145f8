//! Statement patterns.
//!
//! A pattern is a statement template: each of the four slots holds a
//! constant term, a variable, or nothing (a wildcard). The graph slot also
//! accepts `PatternElement::DefaultGraph`, which only matches statements in
//! the default graph.
//!
//! | graph slot      | matches                          |
//! |-----------------|----------------------------------|
//! | absent          | any graph                        |
//! | `DefaultGraph`  | the default graph only           |
//! | term            | exactly that named graph         |
//! | variable        | any named graph                  |

use std::collections::BTreeMap;
use std::fmt;

use super::error::QueryError;
use super::solution::Solution;
use super::store::{Queryable, StatementIter};
use super::variable::Variable;
use crate::types::{Position, Statement, Term};

/// A pattern element - a concrete term, a variable, or the default graph.
#[derive(Debug, PartialEq, Eq)]
pub enum PatternElement {
    /// A concrete term.
    Term(Term),
    /// A variable to be bound.
    Variable(Variable),
    /// Only valid in the graph slot: match the default graph.
    DefaultGraph,
}

impl PatternElement {
    /// Create a variable pattern element.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Variable(Variable::new(name))
    }

    /// Check if this is a variable.
    #[must_use]
    pub const fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Get the variable if this is one.
    #[must_use]
    pub const fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// The term this element is fixed to: a constant, or the value of a
    /// pre-bound variable.
    #[must_use]
    pub const fn constant(&self) -> Option<&Term> {
        match self {
            Self::Term(term) => Some(term),
            Self::Variable(var) => var.value(),
            Self::DefaultGraph => None,
        }
    }

    /// Case-match against the value a statement holds in this slot.
    ///
    /// `value` is `None` only for the graph name of a default-graph
    /// statement, which only `DefaultGraph` matches.
    fn matches(&self, value: Option<&Term>) -> bool {
        match (self, value) {
            (Self::Term(term), Some(value)) => term == value,
            (Self::Variable(var), Some(value)) => var.matches(value),
            (Self::DefaultGraph, None) => true,
            _ => false,
        }
    }

    /// Create a copy of this element.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        match self {
            Self::Term(term) => Self::Term(term.clone_value()),
            Self::Variable(var) => Self::Variable(var.clone_value()),
            Self::DefaultGraph => Self::DefaultGraph,
        }
    }
}

impl From<Term> for PatternElement {
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

impl From<Variable> for PatternElement {
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

/// A bare name is variable-shaped: `"?x"`, `"??x"`, `"$x"` and `"x"` all
/// become variables.
impl From<&str> for PatternElement {
    fn from(name: &str) -> Self {
        Self::var(name)
    }
}

impl From<String> for PatternElement {
    fn from(name: String) -> Self {
        Self::var(&name)
    }
}

impl fmt::Display for PatternElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(term) => write!(f, "{term}"),
            Self::Variable(var) => write!(f, "{var}"),
            Self::DefaultGraph => write!(f, "DEFAULT"),
        }
    }
}

/// The shape of a single-pattern request, decided once at dispatch.
#[derive(Debug, PartialEq, Eq)]
pub enum PatternShape {
    /// Every slot is absent: the request is "every statement".
    Blank,
    /// No variables and no wildcards: the request is a membership test.
    Constant(Statement),
    /// Anything else: needs pattern matching.
    Variable,
}

/// A query pattern - a statement where any slot can be a variable or absent.
#[derive(Debug, Default, PartialEq)]
pub struct Pattern {
    pub subject: Option<PatternElement>,
    pub predicate: Option<PatternElement>,
    pub object: Option<PatternElement>,
    pub graph_name: Option<PatternElement>,
    /// When set, a failure to match must not eliminate the outer solution.
    pub optional: bool,
    /// Caller-supplied ordering hint; lower runs earlier when a query is
    /// optimized. Never computed here.
    pub cost: Option<f64>,
}

/// Key variables by name. The first occurrence of a name wins, unless it
/// is non-distinguished and a later one is distinguished.
pub(crate) fn index_variables<'a>(
    variables: impl IntoIterator<Item = &'a Variable>,
) -> BTreeMap<&'a str, &'a Variable> {
    let mut index: BTreeMap<&str, &Variable> = BTreeMap::new();
    for var in variables {
        index
            .entry(var.name.as_str())
            .and_modify(|kept| {
                if !kept.is_distinguished() && var.is_distinguished() {
                    *kept = var;
                }
            })
            .or_insert(var);
    }
    index
}

impl Pattern {
    /// Create a new triple pattern (any graph).
    #[must_use]
    pub fn new(
        subject: impl Into<PatternElement>,
        predicate: impl Into<PatternElement>,
        object: impl Into<PatternElement>,
    ) -> Self {
        Self {
            subject: Some(subject.into()),
            predicate: Some(predicate.into()),
            object: Some(object.into()),
            ..Self::default()
        }
    }

    /// Create a pattern with all slots absent.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Set the subject slot.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<PatternElement>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the predicate slot.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<PatternElement>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Set the object slot.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<PatternElement>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Set the graph slot.
    #[must_use]
    pub fn with_graph(mut self, graph_name: impl Into<PatternElement>) -> Self {
        self.graph_name = Some(graph_name.into());
        self
    }

    /// Restrict the pattern to the default graph.
    #[must_use]
    pub fn in_default_graph(mut self) -> Self {
        self.graph_name = Some(PatternElement::DefaultGraph);
        self
    }

    /// Mark the pattern optional.
    #[must_use]
    pub const fn into_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach a cost hint.
    #[must_use]
    pub const fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Get the element at a slot.
    #[must_use]
    pub const fn get(&self, position: Position) -> Option<&PatternElement> {
        match position {
            Position::Subject => self.subject.as_ref(),
            Position::Predicate => self.predicate.as_ref(),
            Position::Object => self.object.as_ref(),
            Position::GraphName => self.graph_name.as_ref(),
        }
    }

    const fn get_mut(&mut self, position: Position) -> &mut Option<PatternElement> {
        match position {
            Position::Subject => &mut self.subject,
            Position::Predicate => &mut self.predicate,
            Position::Object => &mut self.object,
            Position::GraphName => &mut self.graph_name,
        }
    }

    /// Iterate over present slots in statement order.
    pub fn slots(&self) -> impl Iterator<Item = (Position, &PatternElement)> {
        Position::ALL
            .into_iter()
            .filter_map(|position| self.get(position).map(|element| (position, element)))
    }

    /// Iterate over the variables in slot order, repeats included.
    fn variable_slots_iter(&self) -> impl Iterator<Item = (Position, &Variable)> {
        self.slots()
            .filter_map(|(position, element)| element.as_variable().map(|var| (position, var)))
    }

    /// Check if all four slots are absent.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
            && self.graph_name.is_none()
    }

    /// Check if any slot holds a variable.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.variable_slots_iter().next().is_some()
    }

    /// Check if any slot holds a blank node term.
    #[must_use]
    pub fn has_blank_nodes(&self) -> bool {
        self.slots()
            .any(|(_, element)| matches!(element, PatternElement::Term(Term::BlankNode(_))))
    }

    /// The number of slots holding a variable. A variable repeated in two
    /// slots counts twice.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variable_slots_iter().count()
    }

    /// The variables in this pattern, keyed by name.
    ///
    /// `?x` and `??x` share the name `x`; the name is distinguished if any
    /// occurrence is.
    #[must_use]
    pub fn variables(&self) -> BTreeMap<&str, &Variable> {
        index_variables(self.variable_slots_iter().map(|(_, var)| var))
    }

    /// The variables carrying a pre-bound value.
    #[must_use]
    pub fn bound_variables(&self) -> BTreeMap<&str, &Variable> {
        let mut variables = self.variables();
        variables.retain(|_, var| var.is_bound());
        variables
    }

    /// The variables without a value.
    #[must_use]
    pub fn unbound_variables(&self) -> BTreeMap<&str, &Variable> {
        let mut variables = self.variables();
        variables.retain(|_, var| var.is_unbound());
        variables
    }

    /// The values of pre-bound variables.
    #[must_use]
    pub fn bindings(&self) -> Solution {
        self.variable_slots_iter()
            .filter_map(|(_, var)| var.value().map(|value| (var.name.as_str(), value.clone_value())))
            .collect()
    }

    /// The slots holding the named variable.
    #[must_use]
    pub fn variable_slots(&self, name: &str) -> Vec<Position> {
        self.variable_slots_iter()
            .filter(|(_, var)| var.name == name)
            .map(|(position, _)| position)
            .collect()
    }

    /// Check the per-slot element kinds.
    ///
    /// Subject: resource or variable. Predicate: IRI or variable. Object:
    /// any term or variable. Graph: resource, variable, or `DefaultGraph`.
    /// Never errors; a malformed slot simply makes the pattern invalid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.slots().all(|(position, element)| match (position, element) {
            (_, PatternElement::Variable(_)) => true,
            (Position::GraphName, PatternElement::DefaultGraph) => true,
            (_, PatternElement::DefaultGraph) => false,
            (Position::Subject | Position::GraphName, PatternElement::Term(term)) => {
                term.is_resource()
            }
            (Position::Predicate, PatternElement::Term(term)) => term.is_iri(),
            (Position::Object, PatternElement::Term(_)) => true,
        })
    }

    /// Classify this pattern for dispatch.
    ///
    /// A pattern with no variables but a wildcard slot is `Variable`: a
    /// membership probe cannot express "any subject". An absent graph is
    /// such a wildcard too.
    #[must_use]
    pub fn shape(&self) -> PatternShape {
        if self.is_blank() {
            return PatternShape::Blank;
        }
        let constant = |element: Option<&PatternElement>| match element {
            Some(PatternElement::Term(term)) => Some(term.clone_value()),
            _ => None,
        };
        let graph_name = match &self.graph_name {
            Some(PatternElement::DefaultGraph) => None,
            Some(PatternElement::Term(term)) => Some(term.clone_value()),
            _ => return PatternShape::Variable,
        };
        match (
            constant(self.subject.as_ref()),
            constant(self.predicate.as_ref()),
            constant(self.object.as_ref()),
        ) {
            (Some(subject), Some(predicate), Some(object)) => PatternShape::Constant(Statement {
                subject,
                predicate,
                object,
                graph_name,
            }),
            _ => PatternShape::Variable,
        }
    }

    /// Case-match a statement against this pattern.
    ///
    /// Absent slots match anything. Repeated variables are not checked
    /// against each other here; `execute` does that.
    #[must_use]
    pub fn matches(&self, statement: &Statement) -> bool {
        self.slots()
            .all(|(position, element)| element.matches(statement.get(position)))
    }

    /// Create a new pattern with every variable bound in `solution`
    /// replaced by its value.
    ///
    /// The template is left untouched, so it can be reused across solutions.
    #[must_use]
    pub fn bind(&self, solution: &Solution) -> Self {
        let mut bound = self.clone_value();
        bound.bind_in_place(solution);
        bound
    }

    /// Replace, in place, every variable slot bound in `solution` with its
    /// value.
    ///
    /// This mutates the pattern. Callers that still need the template must
    /// use `bind` or clone first.
    pub fn bind_in_place(&mut self, solution: &Solution) -> &mut Self {
        for position in Position::ALL {
            let slot = self.get_mut(position);
            let value = match slot {
                Some(PatternElement::Variable(var)) => solution.get(&var.name),
                _ => None,
            };
            if let Some(value) = value {
                *slot = Some(PatternElement::Term(value.clone_value()));
            }
        }
        self
    }

    /// Extract the bindings a matched statement gives this pattern's
    /// variables.
    ///
    /// A graph variable matched against a default-graph statement stays
    /// unbound.
    #[must_use]
    pub fn solution(&self, statement: &Statement) -> Solution {
        let mut solution = Solution::new();
        for (position, var) in self.variable_slots_iter() {
            if let Some(value) = statement.get(position) {
                solution.insert(var.name.as_str(), value.clone_value());
            }
        }
        solution
    }

    /// Execute this pattern against a store.
    ///
    /// Variables bound in `bindings` are substituted before the store is
    /// asked. When a variable appears in more than one slot (`?x <p> ?x`),
    /// the store is asked for the relaxed pattern and candidates whose
    /// repeated slots disagree are rejected here.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` if `is_valid` is false. Store
    /// errors surface as items of the returned iterator.
    pub fn execute<'s, S: Queryable + ?Sized>(
        &self,
        store: &'s S,
        bindings: &Solution,
    ) -> Result<StatementIter<'s>, QueryError> {
        self.execute_with(bindings, |request| store.query_pattern(request))
    }

    /// Execute this pattern, fetching candidates with `fetch` instead of a
    /// store's pattern hook.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` if `is_valid` is false.
    pub fn execute_with<'s>(
        &self,
        bindings: &Solution,
        fetch: impl FnOnce(Self) -> StatementIter<'s>,
    ) -> Result<StatementIter<'s>, QueryError> {
        if !self.is_valid() {
            tracing::warn!("rejecting invalid pattern: {self}");
            return Err(QueryError::InvalidPattern(self.to_string()));
        }

        let request = self.bind(bindings);
        let repeated = request.repeated_variable_slots();
        if repeated.is_empty() {
            return Ok(fetch(request));
        }

        tracing::trace!("self-join check on {} repeated variables", repeated.len());
        let candidates = fetch(request);
        Ok(Box::new(candidates.filter(move |item| match item {
            Ok(statement) => repeated.iter().all(|positions| {
                let first = statement.get(positions[0]);
                positions[1..]
                    .iter()
                    .all(|position| statement.get(*position) == first)
            }),
            Err(_) => true,
        })))
    }

    /// Slot groups sharing a variable name, for names used more than once.
    fn repeated_variable_slots(&self) -> Vec<Vec<Position>> {
        if self.variable_count() == self.variables().len() {
            return Vec::new();
        }
        self.variables()
            .keys()
            .map(|name| self.variable_slots(name))
            .filter(|positions| positions.len() > 1)
            .collect()
    }

    /// Create a new pattern with blank node terms in the subject, object
    /// and graph slots replaced by non-distinguished variables.
    ///
    /// Blank nodes in a query are unlabeled structural positions, not
    /// references to a particular node in the store.
    #[must_use]
    pub fn with_blank_nodes_as_variables(mut self) -> Self {
        for position in [Position::Subject, Position::Object, Position::GraphName] {
            let slot = self.get_mut(position);
            if let Some(PatternElement::Term(Term::BlankNode(label))) = slot {
                let var = Variable::new(format!("??{label}"));
                *slot = Some(PatternElement::Variable(var));
            }
        }
        self
    }

    /// Create a copy of this pattern.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            subject: self.subject.as_ref().map(PatternElement::clone_value),
            predicate: self.predicate.as_ref().map(PatternElement::clone_value),
            object: self.object.as_ref().map(PatternElement::clone_value),
            graph_name: self.graph_name.as_ref().map(PatternElement::clone_value),
            optional: self.optional,
            cost: self.cost,
        }
    }
}

impl From<Statement> for Pattern {
    fn from(statement: Statement) -> Self {
        Self {
            subject: Some(statement.subject.into()),
            predicate: Some(statement.predicate.into()),
            object: Some(statement.object.into()),
            graph_name: Some(
                statement
                    .graph_name
                    .map_or(PatternElement::DefaultGraph, PatternElement::Term),
            ),
            ..Self::default()
        }
    }
}

impl<S, P, O> From<(S, P, O)> for Pattern
where
    S: Into<PatternElement>,
    P: Into<PatternElement>,
    O: Into<PatternElement>,
{
    fn from((subject, predicate, object): (S, P, O)) -> Self {
        Self::new(subject, predicate, object)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "OPTIONAL ")?;
        }
        for position in [Position::Subject, Position::Predicate, Position::Object] {
            match self.get(position) {
                Some(element) => write!(f, "{element} ")?,
                None => write!(f, "* ")?,
            }
        }
        if let Some(graph_name) = &self.graph_name {
            write!(f, "{graph_name} ")?;
        }
        write!(f, ".")
    }
}
