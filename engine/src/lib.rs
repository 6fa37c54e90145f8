#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Life of a request:
// 1. A pattern, statement, shorthand triple or query comes in
// 2. Classify it once:
//     - Query: left-deep join over the patterns, seeded with the bindings
//     - Blank pattern: iterate every statement
//     - Constant pattern: membership probe
//     - Variable pattern: store pattern hook, then the self-join check
// 3. Stream results to the caller, or collect them
//
// System components:
//  - Terms and statements (`types`)
//  - Patterns, solutions and the join (`query`)
//  - The store interface with scanning fallbacks (`query::store`)
//  - Environment configuration (`config`)

pub mod config;
pub mod query;
pub mod testing;
pub mod types;


pub use config::{ConfigError, EngineConfig};
pub use query::{
    Pattern, PatternElement, Query, QueryEngine, QueryError, Queryable, Solution, Solutions,
    StoreError, Variable,
};
pub use types::{Literal, Statement, Term};
