//! OPTIONAL patterns keep partial solutions they cannot extend.

use crate::e2e_tests::helpers::{FOAF_MBOX, FOAF_NAME, ex, fixture_store};
use crate::query::{Query, QueryEngine};
use crate::testing::MemoryStore;
use crate::types::Term;

#[test]
fn test_optional_extends_only_where_it_matches() {
    let store = fixture_store();
    let query = Query::new()
        .pattern(("?person", Term::iri(FOAF_NAME), "?name"))
        .optional(("?person", Term::iri(FOAF_MBOX), "?mbox"));

    let solutions = QueryEngine::new(&store).solutions(&query).unwrap();

    assert_eq!(solutions.len(), 3);
    assert_eq!(solutions.count_by(|s| s.is_bound("mbox")), 1);
    let alice = solutions
        .iter()
        .find(|s| s.get("person") == Some(&ex("alice")))
        .unwrap();
    assert_eq!(
        alice.get("mbox"),
        Some(&Term::iri("mailto:alice@example.org"))
    );
    let bob = solutions
        .iter()
        .find(|s| s.get("person") == Some(&ex("bob")))
        .unwrap();
    assert!(bob.is_unbound("mbox"));
    assert_eq!(bob.len(), 2);
}

#[test]
fn test_optional_without_any_match_keeps_everything() {
    let store = fixture_store();
    let query = Query::new()
        .pattern(("?person", Term::iri(FOAF_NAME), "?name"))
        .optional(("?person", ex("nickname"), "?nick"));

    let solutions = QueryEngine::new(&store).solutions(&query).unwrap();

    assert_eq!(solutions.len(), 3);
    assert!(!solutions.has_variables(&["nick"]));
    assert!(solutions.has_variables(&["person", "name"]));
}

#[test]
fn test_optional_only_query_on_empty_store() {
    let store = MemoryStore::new();
    let query = Query::new().optional(("?person", Term::iri(FOAF_MBOX), "?mbox"));

    let solutions = QueryEngine::new(&store).solutions(&query).unwrap();

    assert_eq!(solutions.len(), 1);
    assert!(solutions.get(0).is_some_and(crate::query::Solution::is_empty));
}

#[test]
fn test_required_pattern_after_unmatched_optional() {
    let store = fixture_store();
    let query = Query::new()
        .pattern(("?person", Term::iri(FOAF_NAME), Term::literal("Bob")))
        .optional(("?person", Term::iri(FOAF_MBOX), "?mbox"))
        .pattern(("?person", Term::iri(FOAF_NAME), "?name"));

    let solutions = QueryEngine::new(&store).solutions(&query).unwrap();

    assert_eq!(solutions.len(), 1);
    assert_eq!(
        solutions.get(0).and_then(|s| s.get("name")),
        Some(&Term::literal("Bob"))
    );
}
