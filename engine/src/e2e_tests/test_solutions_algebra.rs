//! Solution sequence operators on query answers.

use serde_json::json;

use crate::e2e_tests::helpers::{FOAF_KNOWS, FOAF_MBOX, FOAF_NAME, ex, fixture_store, sol};
use crate::query::{Criterion, OrderKey, Query, QueryEngine, QueryError, Solution, Solutions};
use crate::types::Term;

fn names() -> Solutions {
    let store = fixture_store();
    let query = Query::new().pattern(("?person", Term::iri(FOAF_NAME), "?name"));
    QueryEngine::new(&store).solutions(&query).unwrap()
}

#[test]
fn test_distinct_keeps_first_occurrence() {
    let s1 = sol(&[("x", ex("a"))]);
    let s2 = sol(&[("x", ex("b"))]);
    let solutions: Solutions = [s1.clone_value(), s1.clone_value(), s2.clone_value()]
        .into_iter()
        .collect();

    let distinct = solutions.distinct();

    assert_eq!(distinct.into_vec(), vec![s1, s2]);
    assert_eq!(solutions.reduced().len(), 2);
}

#[test]
fn test_offset_then_limit_paginates() {
    let solutions: Solutions = (0..5)
        .map(|i| sol(&[("i", Term::literal(i.to_string()))]))
        .collect();

    let page = solutions.offset(2).limit(2);

    let values: Vec<&Term> = page.iter().filter_map(|s| s.get("i")).collect();
    assert_eq!(values, vec![&Term::literal("2"), &Term::literal("3")]);
    assert!(solutions.offset(5).is_empty());
    assert_eq!(solutions.limit(10).len(), 5);
}

#[test]
fn test_variable_naming_convention() {
    let solution = sol(&[
        ("a", ex("1")),
        ("?b", ex("2")),
        ("??c", ex("3")),
        ("$d", ex("4")),
        ("$$e", ex("5")),
    ]);

    let flags: Vec<(String, bool, bool)> = solution
        .variables()
        .into_iter()
        .map(|v| (v.name.clone(), v.is_existential(), v.is_distinguished()))
        .collect();

    assert_eq!(
        flags,
        vec![
            ("a".to_owned(), false, true),
            ("b".to_owned(), false, true),
            ("c".to_owned(), false, false),
            ("d".to_owned(), true, true),
            ("e".to_owned(), true, false),
        ]
    );
    assert!(solution.variables().iter().all(|v| v.is_bound()));
}

#[test]
fn test_minus_and_projection_laws() {
    let solutions = names();

    assert!(solutions.minus(&solutions).is_empty());
    assert_eq!(solutions.minus(&Solutions::new()), solutions);

    let once = solutions.project(&["name"]).unwrap();
    assert_eq!(once.project(&["name"]).unwrap(), once);
    assert_eq!(once.variable_names(), vec!["name".to_owned()]);
    assert!(matches!(
        solutions.project(&[]),
        Err(QueryError::EmptyProjection)
    ));
}

#[test]
fn test_filter_criteria() {
    let solutions = names();

    let by_regex = solutions.filter(&[("name", Criterion::Matches("^[AB]".parse().unwrap()))]);
    assert_eq!(by_regex.len(), 2);

    let by_list = solutions.filter(&[(
        "name",
        Criterion::AnyOf(vec![Term::literal("Carol"), Term::literal("Zed")]),
    )]);
    assert_eq!(
        by_list.get(0).and_then(|s| s.get("person")),
        Some(&ex("carol"))
    );

    let unbound = solutions.filter(&[("missing", Criterion::Equals(Term::literal("x")))]);
    assert!(unbound.is_empty());
}

#[test]
fn test_order_puts_unbound_first() {
    let store = fixture_store();
    let query = Query::new()
        .pattern(("?person", Term::iri(FOAF_NAME), "?name"))
        .optional(("?person", Term::iri(FOAF_MBOX), "?mbox"));
    let solutions = QueryEngine::new(&store).solutions(&query).unwrap();

    let ordered = solutions.order(&[OrderKey::asc("mbox"), OrderKey::asc("name")]);

    let people: Vec<&Term> = ordered.iter().filter_map(|s| s.get("person")).collect();
    assert_eq!(people, vec![&ex("bob"), &ex("carol"), &ex("alice")]);

    let reversed = solutions.order(&[OrderKey::by(|a: &Solution, b: &Solution| {
        b.get("name").cmp(&a.get("name"))
    })]);
    assert_eq!(
        reversed.get(0).and_then(|s| s.get("name")),
        Some(&Term::literal("Carol"))
    );
}

#[test]
fn test_merge_matches_join() {
    let store = fixture_store();
    let engine = QueryEngine::new(&store);
    let left = engine
        .solutions(&Query::new().pattern(("?a", Term::iri(FOAF_KNOWS), "?b")))
        .unwrap();
    let right = engine
        .solutions(&Query::new().pattern(("?b", Term::iri(FOAF_NAME), "?name")))
        .unwrap();
    let joined = engine
        .solutions(
            &Query::new()
                .pattern(("?a", Term::iri(FOAF_KNOWS), "?b"))
                .pattern(("?b", Term::iri(FOAF_NAME), "?name")),
        )
        .unwrap();

    assert_eq!(left.merge(&right), joined);
}

#[test]
fn test_bindings_and_serialization() {
    let solutions = names().order(&[OrderKey::asc("name")]);

    let bindings = solutions.bindings();
    assert_eq!(
        bindings.get("name"),
        Some(&vec![
            Term::literal("Alice"),
            Term::literal("Bob"),
            Term::literal("Carol"),
        ])
    );

    let first: Solutions = solutions.limit(1);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        json!([{
            "person": {"type": "uri", "value": "http://example.org/alice"},
            "name": {"type": "literal", "value": "Alice"},
        }])
    );
    assert!(first.get(0).is_some_and(|s| *s != Solution::new()));
}
