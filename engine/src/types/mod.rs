pub mod statement;
pub mod term;

pub use statement::{Position, Statement};
pub use term::{Literal, LiteralAnnotation, Term, XSD_STRING};
