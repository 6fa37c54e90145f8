//! Every dispatch route returns what a plain scan would.

use crate::config::EngineConfig;
use crate::e2e_tests::helpers::{FOAF_KNOWS, FOAF_NAME, ex, fixture_store, sorted_strings, st};
use crate::query::{
    Pattern, PatternElement, Query, QueryEngine, QueryError, QueryItem, Queryable as _,
};
use crate::testing::HookCalls;
use crate::types::{Statement, Term};

fn requests() -> Vec<Pattern> {
    vec![
        Pattern::blank(),
        Pattern::from(st(ex("alice"), FOAF_KNOWS, ex("bob"))),
        Pattern::from(st(ex("alice"), FOAF_KNOWS, ex("dave"))),
        Pattern::new(ex("alice"), Term::iri(FOAF_KNOWS), "?friend"),
        Pattern::new("?s", Term::iri(FOAF_NAME), "?name"),
        Pattern::blank().with_predicate(Term::iri(FOAF_KNOWS)),
        Pattern::new("?s", "?p", "?o").with_graph(ex("g1")),
    ]
}

fn answer(response: &crate::query::QueryResponse) -> Vec<String> {
    sorted_strings(response.statements().unwrap_or_default())
}

#[test]
fn test_memory_and_scan_only_stores_agree() {
    let store = fixture_store();
    let statements: Vec<Statement> = store.each().filter_map(Result::ok).collect();
    let indexed = QueryEngine::new(&store);
    let scanning = QueryEngine::new(&statements);

    for pattern in requests() {
        let expected = answer(&scanning.execute(pattern.clone_value()).unwrap());
        let actual = answer(&indexed.execute(pattern.clone_value()).unwrap());
        assert_eq!(actual, expected, "{pattern}");
    }
}

#[test]
fn test_hooks_off_gives_same_answers() {
    let store = fixture_store();
    let hooked = QueryEngine::new(&store);
    let scanning = QueryEngine::with_config(
        &store,
        EngineConfig {
            use_store_hooks: false,
            ..EngineConfig::default()
        },
    );

    for pattern in requests() {
        let expected = answer(&hooked.execute(pattern.clone_value()).unwrap());
        let actual = answer(&scanning.execute(pattern.clone_value()).unwrap());
        assert_eq!(actual, expected, "{pattern}");
    }
}

#[test]
fn test_each_shape_takes_its_route() {
    let store = fixture_store();
    let engine = QueryEngine::new(&store);

    let all = engine.execute(Pattern::blank()).unwrap();
    assert_eq!(all.len(), store.len());
    let present = engine
        .execute(st(ex("bob"), FOAF_KNOWS, ex("carol")))
        .unwrap();
    assert_eq!(present.len(), 1);
    let friends = engine
        .execute((ex("alice"), Term::iri(FOAF_KNOWS), "?friend"))
        .unwrap();
    assert_eq!(friends.len(), 2);

    assert_eq!(
        store.hook_calls(),
        HookCalls {
            each: 1,
            has_statement: 1,
            query_pattern: 1,
            query_execute: 0,
        }
    );
}

#[test]
fn test_constant_in_named_graph_is_not_in_default_graph() {
    let store = fixture_store();
    let engine = QueryEngine::new(&store);

    let in_default = st(ex("carol"), FOAF_KNOWS, ex("alice"));
    assert!(!engine.has_statement(&in_default).unwrap());
    assert!(
        engine
            .has_statement(&in_default.in_graph(ex("g1")))
            .unwrap()
    );
}

#[test]
fn test_streaming_matches_collected() {
    let store = fixture_store();
    let engine = QueryEngine::new(&store);
    let query = Query::new()
        .pattern(("?a", Term::iri(FOAF_KNOWS), "?b"))
        .pattern(("?b", Term::iri(FOAF_NAME), "?name"));

    let mut streamed = Vec::new();
    let count = engine
        .execute_with(query.clone_value(), |item| {
            if let QueryItem::Solution(solution) = item {
                streamed.push(solution);
            }
        })
        .unwrap();

    let collected = engine.solutions(&query).unwrap().into_vec();
    assert_eq!(count, collected.len());
    assert_eq!(streamed, collected);
}

#[test]
fn test_invalid_patterns_rejected_on_every_route() {
    let store = fixture_store();
    let hooked = QueryEngine::new(&store);
    let scanning = QueryEngine::with_config(
        &store,
        EngineConfig {
            use_store_hooks: false,
            ..EngineConfig::default()
        },
    );
    let invalid = [
        Pattern::new(Term::literal("x"), Term::iri(FOAF_KNOWS), ex("bob")),
        Pattern::new("?s", Term::literal("p"), "?o"),
        Pattern::new("?s", Term::iri(FOAF_KNOWS), PatternElement::DefaultGraph),
    ];

    for pattern in invalid {
        for engine in [&hooked, &scanning] {
            let result = engine.execute(pattern.clone_value());
            assert!(
                matches!(result, Err(QueryError::InvalidPattern(_))),
                "{pattern}"
            );
        }
    }
}

#[test]
fn test_invalid_query_rejected_regardless_of_store_contents() {
    let store = fixture_store();
    let query = Query::new()
        .pattern(("?s", ex("missing"), "?o"))
        .pattern(("?s", Term::literal("bad"), "?o"));

    for use_store_hooks in [true, false] {
        let engine = QueryEngine::with_config(
            &store,
            EngineConfig {
                use_store_hooks,
                ..EngineConfig::default()
            },
        );
        assert!(matches!(
            engine.execute(query.clone_value()),
            Err(QueryError::InvalidPattern(_))
        ));
    }
    assert_eq!(store.hook_calls(), HookCalls::default());
}

#[test]
fn test_first_helpers() {
    let store = fixture_store();
    let engine = QueryEngine::new(&store);

    assert_eq!(
        engine
            .first_literal((ex("bob"), Term::iri(FOAF_NAME), "?name"))
            .unwrap()
            .map(|literal| literal.lexical().to_owned()),
        Some("Bob".to_owned())
    );
    assert_eq!(
        engine
            .first_subject(("?s", Term::iri(FOAF_NAME), Term::literal("Carol")))
            .unwrap(),
        Some(ex("carol"))
    );
    assert_eq!(
        engine
            .first_object((ex("dave"), Term::iri(FOAF_NAME), "?name"))
            .unwrap(),
        None
    );
}
