//! SelectCompiler validation tests

use crate::config::{IdentifierCase, SelectConfig};
use crate::error::WcqError;
use crate::operator::Operator;
use crate::select::ast::{ColumnIdentifier, RawStatement, Relation, Term};
use crate::select::compiler::SelectCompiler;
use crate::select::fixtures::*;
use crate::select::restriction::Restriction;

fn rel(field: &str, op: Operator, value: &str) -> Relation {
    Relation::new(ColumnIdentifier::new(field), op, Term::literal(value))
}

#[test]
fn test_limit_must_be_positive() {
    for limit in [0, -3] {
        let raw = RawStatement::new("users").limit(limit);
        let err = compile(&raw, static_layout()).unwrap_err();
        assert!(matches!(err, WcqError::InvalidLimit(l) if l == limit));
    }
}

#[test]
fn test_first_violated_rule_wins() {
    let raw = RawStatement::new("users").select(&["nope"]).limit(0);
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::InvalidLimit(0))
    ));
}

#[test]
fn test_table_mismatch_is_rejected() {
    let raw = RawStatement::new("accounts");
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::Schema(_))
    ));
}

#[test]
fn test_limit_is_checked_before_table() {
    let raw = RawStatement::new("accounts").limit(0);
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::InvalidLimit(0))
    ));
}

#[test]
fn test_unknown_fields() {
    let raw = RawStatement::new("users").select(&["id", "email"]);
    match compile(&raw, static_layout()).unwrap_err() {
        WcqError::UnknownField { name, clause } => {
            assert_eq!(name, "email");
            assert_eq!(clause, "selection");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let raw = RawStatement::new("users").filter(rel("email", Operator::Eq, "x"));
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::UnknownField { clause: "where", .. })
    ));
}

#[test]
fn test_selection_keeps_caller_casing() {
    let raw = RawStatement::new("users").select(&["NAME", "Id"]);
    let stmt = compile(&raw, static_layout()).unwrap();
    let selection = stmt.expanded_selection();
    assert_eq!(selection.len(), 2);
    assert_eq!(selection[0].display, "NAME");
    assert_eq!(stmt.layout().field(selection[0].field).name(), "name");
    assert_eq!(selection[1].display, "Id");
    assert!(!stmt.is_wildcard());
}

#[test]
fn test_quoted_identifiers_are_case_sensitive() {
    let mut raw = RawStatement::new("users");
    raw.select_clause = vec![ColumnIdentifier::quoted("NAME")];
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::UnknownField { .. })
    ));

    raw.select_clause = vec![ColumnIdentifier::quoted("name")];
    assert!(compile(&raw, static_layout()).is_ok());
}

#[test]
fn test_preserve_case_config() {
    let compiler = SelectCompiler::with_config(SelectConfig {
        identifier_case: IdentifierCase::Preserve,
        ..SelectConfig::default()
    });
    let raw = RawStatement::new("users").select(&["Name"]);
    let err = compiler
        .compile(&raw, static_layout(), &indexed(&[]))
        .unwrap_err();
    assert!(matches!(err, WcqError::UnknownField { .. }));
}

#[test]
fn test_wildcard_expands_in_schema_order() {
    let stmt = compile(&RawStatement::new("events"), sparse_layout()).unwrap();
    assert!(stmt.is_wildcard());
    let names: Vec<String> = stmt
        .expanded_selection()
        .iter()
        .map(|s| s.display.clone())
        .collect();
    assert_eq!(names, vec!["id", "day", "seq", "kind", "note"]);
}

#[test]
fn test_count_accepts_star_and_one_only() {
    for arg in ["*", "1"] {
        let stmt = compile(&RawStatement::new("users").count(arg), static_layout()).unwrap();
        assert!(stmt.is_count());
    }
    let err = compile(&RawStatement::new("users").count("name"), static_layout()).unwrap_err();
    assert!(matches!(err, WcqError::UnsupportedCount));

    let mut raw = RawStatement::new("users").count("*");
    raw.select_clause.push(ColumnIdentifier::new("1"));
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::UnsupportedCount)
    ));
}

#[test]
fn test_value_field_cannot_be_restricted() {
    let raw = RawStatement::new("readings").filter(rel("reading", Operator::Eq, "x"));
    assert!(matches!(
        compile(&raw, dense_layout()),
        Err(WcqError::UnsupportedRestriction(_))
    ));
}

#[test]
fn test_two_equalities_conflict_in_any_order() {
    for (first, second) in [("a", "b"), ("b", "a"), ("a", "a")] {
        let raw = RawStatement::new("users")
            .filter(rel("id", Operator::Eq, first))
            .filter(rel("id", Operator::Eq, second));
        assert!(matches!(
            compile(&raw, static_layout()),
            Err(WcqError::ConflictingRestriction { .. })
        ));
    }
}

#[test]
fn test_equality_conflicts_with_ranges() {
    let raw = RawStatement::new("events")
        .filter(rel("id", Operator::Eq, "k"))
        .filter(rel("day", Operator::Eq, "d1"))
        .filter(rel("day", Operator::Gt, "d0"));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::ConflictingRestriction { .. })
    ));

    let raw = RawStatement::new("events")
        .filter(rel("day", Operator::Lte, "d9"))
        .filter(rel("day", Operator::Eq, "d1"));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::ConflictingRestriction { .. })
    ));
}

#[test]
fn test_duplicate_range_side_conflicts() {
    let raw = RawStatement::new("events")
        .filter(rel("day", Operator::Gt, "a"))
        .filter(rel("day", Operator::Gte, "b"));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::ConflictingRestriction { .. })
    ));

    let raw = RawStatement::new("events")
        .filter(rel("day", Operator::Gte, "a"))
        .filter(rel("day", Operator::Lt, "b"));
    let stmt = compile(&raw, sparse_layout()).unwrap();
    let day = stmt.layout().lookup("day").unwrap();
    let r = stmt.restriction(day).unwrap();
    assert!(r.bound(true).unwrap().inclusive);
    assert!(!r.bound(false).unwrap().inclusive);
}

#[test]
fn test_in_is_limited_to_partition_key() {
    let raw = RawStatement::new("events")
        .filter(Relation::in_list("day", vec![Term::literal("a"), Term::literal("b")]));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::UnsupportedRestriction(_))
    ));

    let raw = RawStatement::new("events").filter(Relation::in_list(
        "id",
        vec![Term::literal("a"), Term::literal("b")],
    ));
    let stmt = compile(&raw, sparse_layout()).unwrap();
    let key = stmt.layout().partition_key();
    assert_eq!(stmt.restriction(key).unwrap().eq_values().len(), 2);
}

#[test]
fn test_in_conflicts_with_existing_restriction() {
    let raw = RawStatement::new("events")
        .filter(rel("id", Operator::Gt, "a"))
        .filter(Relation::in_list("id", vec![Term::literal("b")]));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::ConflictingRestriction { .. })
    ));
}

#[test]
fn test_clustering_gap_is_rejected() {
    let raw = RawStatement::new("readings")
        .filter(rel("sensor", Operator::Eq, "s"))
        .filter(rel("c2", Operator::Eq, "x"));
    match compile(&raw, dense_layout()).unwrap_err() {
        WcqError::NonPrefixRestriction { field, previous } => {
            assert_eq!(field, "c2");
            assert_eq!(previous, "c1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_range_terminates_prefix() {
    for op in [Operator::Eq, Operator::Gt, Operator::Lte] {
        let raw = RawStatement::new("readings")
            .filter(rel("c1", Operator::Gt, "a"))
            .filter(rel("c2", op, "x"));
        assert!(matches!(
            compile(&raw, dense_layout()),
            Err(WcqError::NonPrefixRestriction { .. })
        ));
    }
}

#[test]
fn test_equality_prefix_with_trailing_range_is_valid() {
    let raw = RawStatement::new("readings")
        .filter(rel("sensor", Operator::Eq, "s"))
        .filter(rel("c1", Operator::Eq, "a"))
        .filter(rel("c2", Operator::Gte, "x"))
        .filter(rel("c2", Operator::Lt, "y"));
    let stmt = compile(&raw, dense_layout()).unwrap();
    assert!(!stmt.has_indexed_expression());
}

#[test]
fn test_metadata_restriction_needs_indexed_equality() {
    let raw = RawStatement::new("events").filter(rel("note", Operator::Eq, "x"));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::NoIndexedEquality)
    ));

    let raw = RawStatement::new("events").filter(rel("kind", Operator::Gt, "x"));
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::NoIndexedEquality)
    ));

    let raw = RawStatement::new("events")
        .filter(rel("kind", Operator::Eq, "click"))
        .filter(rel("note", Operator::Gt, "m"));
    let stmt = compile(&raw, sparse_layout()).unwrap();
    assert!(stmt.has_indexed_expression());
}

#[test]
fn test_indexed_query_rewrites_key_equality() {
    let raw = RawStatement::new("users")
        .filter(rel("id", Operator::Eq, "u1"))
        .filter(rel("name", Operator::Eq, "alice"));
    let stmt = compile(&raw, static_layout()).unwrap();
    let key = stmt.layout().partition_key();
    match stmt.restriction(key).unwrap() {
        Restriction::Range {
            start: Some(start),
            end: Some(end),
        } => {
            assert!(start.inclusive && end.inclusive);
            assert_eq!(start.term, Term::literal("u1"));
            assert_eq!(end.term, Term::literal("u1"));
        }
        other => panic!("expected closed range, got {other:?}"),
    }
}

#[test]
fn test_key_equality_without_index_stays_equality() {
    let raw = RawStatement::new("users").filter(rel("id", Operator::Eq, "u1"));
    let stmt = compile(&raw, static_layout()).unwrap();
    let key = stmt.layout().partition_key();
    assert!(stmt.restriction(key).unwrap().is_equality());
    assert!(!stmt.has_indexed_expression());
}

#[test]
fn test_indexed_query_rejects_multi_key_in() {
    let raw = RawStatement::new("users")
        .filter(Relation::in_list("id", vec![Term::literal("a"), Term::literal("b")]))
        .filter(rel("name", Operator::Eq, "alice"));
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::IndexedInUnsupported)
    ));

    let raw = RawStatement::new("users")
        .filter(Relation::in_list("id", vec![Term::literal("a")]))
        .filter(rel("name", Operator::Eq, "alice"));
    let stmt = compile(&raw, static_layout()).unwrap();
    let key = stmt.layout().partition_key();
    assert!(!stmt.restriction(key).unwrap().is_equality());
}

#[test]
fn test_reversal_needs_key_equality() {
    let raw = RawStatement::new("events").reversed();
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::UnsupportedReversal)
    ));

    let raw = RawStatement::new("events")
        .filter(rel("id", Operator::Gte, "a"))
        .reversed();
    assert!(matches!(
        compile(&raw, sparse_layout()),
        Err(WcqError::UnsupportedReversal)
    ));

    let raw = RawStatement::new("events")
        .filter(rel("id", Operator::Eq, "a"))
        .reversed();
    assert!(compile(&raw, sparse_layout()).unwrap().is_reversed());

    let raw = RawStatement::new("events")
        .filter(Relation::in_list("id", vec![Term::literal("a"), Term::literal("b")]))
        .reversed();
    assert!(compile(&raw, sparse_layout()).is_ok());
}

#[test]
fn test_reversal_rejected_once_key_becomes_range() {
    let raw = RawStatement::new("users")
        .filter(rel("id", Operator::Eq, "u1"))
        .filter(rel("name", Operator::Eq, "alice"))
        .reversed();
    assert!(matches!(
        compile(&raw, static_layout()),
        Err(WcqError::UnsupportedReversal)
    ));
}

#[test]
fn test_fetch_limit_scales_for_sparse_tables() {
    let stmt = compile(&RawStatement::new("events").limit(10), sparse_layout()).unwrap();
    assert_eq!(stmt.limit(), 10);
    assert_eq!(stmt.fetch_limit(), 20);

    let stmt = compile(&RawStatement::new("readings").limit(10), dense_layout()).unwrap();
    assert_eq!(stmt.fetch_limit(), 10);
}
