//! RDF term types.
//!
//! Provides the `Term` enum (IRI, blank node, literal) and the `Literal`
//! value it wraps. Terms are compared by value and are safe to use as map
//! keys.
//!
//! # Invariants
//!
//! - A literal carries a language tag or a datatype, never both.
//! - Language tags are stored lowercased.
//! - A literal typed `xsd:string` is stored as a simple literal.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// The `xsd:string` datatype IRI.
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// A literal annotation: nothing, a language tag, or a datatype IRI.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralAnnotation {
    /// A plain literal.
    None,
    /// A language-tagged string.
    Language(String),
    /// A typed literal.
    Datatype(String),
}

/// A literal value.
///
/// Equality is structural: two literals are equal iff their lexical forms
/// and annotations are equal. Value-space equality (e.g. `"01"^^xsd:integer`
/// vs `"1"^^xsd:integer`) belongs to the literal type system and is not
/// modelled here, so such pairs are simply a non-match.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    annotation: LiteralAnnotation,
}

impl Literal {
    /// Create a plain literal.
    #[must_use]
    pub fn simple(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            annotation: LiteralAnnotation::None,
        }
    }

    /// Create a language-tagged literal.
    #[must_use]
    pub fn with_language(lexical: impl Into<String>, language: &str) -> Self {
        Self {
            lexical: lexical.into(),
            annotation: LiteralAnnotation::Language(language.to_ascii_lowercase()),
        }
    }

    /// Create a typed literal.
    ///
    /// `xsd:string` is normalized to a plain literal.
    #[must_use]
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        let annotation = if datatype == XSD_STRING {
            LiteralAnnotation::None
        } else {
            LiteralAnnotation::Datatype(datatype)
        };
        Self {
            lexical: lexical.into(),
            annotation,
        }
    }

    /// The lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match &self.annotation {
            LiteralAnnotation::Language(language) => Some(language),
            _ => None,
        }
    }

    /// The datatype IRI, if any.
    #[must_use]
    pub fn datatype(&self) -> Option<&str> {
        match &self.annotation {
            LiteralAnnotation::Datatype(datatype) => Some(datatype),
            _ => None,
        }
    }

    /// Create a copy of this literal.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        let annotation = match &self.annotation {
            LiteralAnnotation::None => LiteralAnnotation::None,
            LiteralAnnotation::Language(l) => LiteralAnnotation::Language(l.as_str().to_owned()),
            LiteralAnnotation::Datatype(d) => LiteralAnnotation::Datatype(d.as_str().to_owned()),
        };
        Self {
            lexical: self.lexical.as_str().to_owned(),
            annotation,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.lexical.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                _ => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")?;
        match &self.annotation {
            LiteralAnnotation::None => Ok(()),
            LiteralAnnotation::Language(language) => write!(f, "@{language}"),
            LiteralAnnotation::Datatype(datatype) => write!(f, "^^<{datatype}>"),
        }
    }
}

/// An RDF term.
///
/// Variant order defines the total order used for sorting: blank nodes,
/// then IRIs, then literals, each compared by their string content.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A blank node, identified by a locally scoped label.
    BlankNode(String),
    /// An IRI (absolute or relative reference).
    Iri(String),
    /// A literal.
    Literal(Literal),
}

impl Term {
    /// Create an IRI term.
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Create a blank node term.
    #[must_use]
    pub fn blank(label: impl Into<String>) -> Self {
        Self::BlankNode(label.into())
    }

    /// Create a plain literal term.
    #[must_use]
    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal::simple(lexical))
    }

    /// Check if this is an IRI.
    #[must_use]
    pub const fn is_iri(&self) -> bool {
        matches!(self, Self::Iri(_))
    }

    /// Check if this is a blank node.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }

    /// Check if this is a literal.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Check if this is a resource (IRI or blank node).
    #[must_use]
    pub const fn is_resource(&self) -> bool {
        !self.is_literal()
    }

    /// Get the literal if this is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// The stringified value: the IRI, the blank node label, or the
    /// literal's lexical form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::BlankNode(label) => label,
            Self::Literal(literal) => literal.lexical(),
        }
    }

    /// Create a copy of this term.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        match self {
            Self::BlankNode(label) => Self::BlankNode(label.as_str().to_owned()),
            Self::Iri(iri) => Self::Iri(iri.as_str().to_owned()),
            Self::Literal(literal) => Self::Literal(literal.clone_value()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankNode(label) => write!(f, "_:{label}"),
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// Serializes using the SPARQL 1.1 JSON results term encoding.
impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Iri(iri) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "uri")?;
                map.serialize_entry("value", iri)?;
                map.end()
            }
            Self::BlankNode(label) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "bnode")?;
                map.serialize_entry("value", label)?;
                map.end()
            }
            Self::Literal(literal) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "literal")?;
                map.serialize_entry("value", literal.lexical())?;
                if let Some(language) = literal.language() {
                    map.serialize_entry("xml:lang", language)?;
                }
                if let Some(datatype) = literal.datatype() {
                    map.serialize_entry("datatype", datatype)?;
                }
                map.end()
            }
        }
    }
}
