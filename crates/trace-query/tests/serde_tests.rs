//! Serialization of parsed queries (requires the `serde` feature).

#![cfg(feature = "serde")]

use trace_query::{parse, ParsedQuery, QueryKind, Value};

#[test]
fn test_parsed_query_json_round_trip() {
    let query = parse("?- frame(1, X, _, active), \\+ status(1, error).").unwrap();
    let json = serde_json::to_string(&query).unwrap();
    let back: ParsedQuery = serde_json::from_str(&json).unwrap();
    assert_eq!(back, query);
    assert!(matches!(back.kind, QueryKind::Compound(_)));
}

#[test]
fn test_predicate_serializes_lowercase() {
    let json = serde_json::to_string(&trace_query::Predicate::Allocated).unwrap();
    assert_eq!(json, "\"allocated\"");
}

#[test]
fn test_value_serialization() {
    let json = serde_json::to_string(&Value::Null).unwrap();
    let back: Value = serde_json::from_str(&json).unwrap();
    assert!(back.is_null());
}
