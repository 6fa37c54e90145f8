//! Pattern queries over a statement store.
//!
//! This module matches statement patterns against a pluggable store and
//! computes solution sequences. It supports:
//! - Pattern matching with variables, including self-joins (`?x <p> ?x`)
//! - Basic graph patterns (left-deep nested-loop join)
//! - OPTIONAL patterns (left outer join)
//! - Solution algebra: filter, minus, merge, order, project, distinct, slicing
//!
//! # Example
//!
//! ```ignore
//! use engine::query::{Query, QueryEngine};
//! use engine::types::Term;
//!
//! let store: Vec<Statement> = load_statements()?;
//! let engine = QueryEngine::new(&store);
//!
//! let query = Query::new()
//!     .pattern(("?person", Term::iri("http://xmlns.com/foaf/0.1/name"), "?name"))
//!     .optional(("?person", Term::iri("http://xmlns.com/foaf/0.1/mbox"), "?mbox"));
//!
//! let response = engine.execute(query)?;
//! for solution in response.solutions().into_iter().flatten() {
//!     println!("{solution}");
//! }
//! ```

pub mod bgp;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod solution;
pub mod solutions;
pub mod store;
pub mod variable;

pub use bgp::Query;
pub use engine::{QueryEngine, QueryItem, QueryResponse, Request};
pub use error::QueryError;
pub use pattern::{Pattern, PatternElement, PatternShape};
pub use solution::Solution;
pub use solutions::{Criterion, OrderKey, SolutionComparator, Solutions};
pub use store::{Queryable, ScanOnly, StatementIter, StoreError, scan_contains, scan_pattern};
pub use variable::Variable;
