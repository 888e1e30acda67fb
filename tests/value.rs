//! Tests for log arguments: conversions, display, depth limits and cycles.

use scribe::record::{ARRAY_MARKER, CIRCULAR_MARKER, OBJECT_MARKER};
use scribe::{Value, args};
use serde_json::json;
use std::sync::{Arc, RwLock};

fn self_referencing() -> (Arc<RwLock<Value>>, Value) {
    let cell = Arc::new(RwLock::new(Value::Null));
    *cell.write().unwrap() = Value::object([
        ("name", Value::from("loop")),
        ("me", Value::Shared(Arc::clone(&cell))),
    ]);
    let value = Value::Shared(Arc::clone(&cell));
    (cell, value)
}

#[test]
fn display_strings_verbatim() {
    assert_eq!(Value::from("hello \"world\"").to_string(), "hello \"world\"");
}

#[test]
fn display_non_strings_as_json() {
    assert_eq!(Value::from(42).to_string(), "42");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
}

#[test]
fn objects_keep_insertion_order() {
    let value = Value::object([("zeta", 1), ("alpha", 2), ("mid", 3)]);
    assert_eq!(value.to_string(), r#"{"zeta":1,"alpha":2,"mid":3}"#);
}

#[test]
fn from_json_value() {
    let value = Value::from(json!({ "a": [1, "two", null] }));
    assert_eq!(
        value,
        Value::object([(
            "a",
            Value::Array(vec![Value::from(1), Value::from("two"), Value::Null])
        )])
    );
}

#[test]
fn non_finite_floats_become_null() {
    assert_eq!(Value::from(f64::NAN), Value::Null);
    assert_eq!(Value::from(f64::INFINITY), Value::Null);
    assert_eq!(Value::from(1.5).to_string(), "1.5");
}

#[test]
fn option_converts_to_null() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn args_macro_mixes_types() {
    let data = args!["loaded", 3, json!({ "ok": true })];
    assert_eq!(data.len(), 3);
    assert!(data[0].is_string());
    assert_eq!(data[1], Value::from(3));
    assert_eq!(data[2].to_string(), r#"{"ok":true}"#);

    assert!(args![].is_empty());
}

#[test]
fn depth_limit_replaces_containers_with_markers() {
    let value = Value::from(json!({ "a": { "b": 1 }, "list": [[1]], "n": 2 }));
    assert_eq!(
        value.to_json(Some(1)),
        json!({ "a": OBJECT_MARKER, "list": ARRAY_MARKER, "n": 2 })
    );
}

#[test]
fn depth_zero_marks_the_root() {
    assert_eq!(Value::from(json!({ "a": 1 })).to_json(Some(0)), json!(OBJECT_MARKER));
    assert_eq!(Value::from(json!([1])).to_json(Some(0)), json!(ARRAY_MARKER));
    assert_eq!(Value::from("plain").to_json(Some(0)), json!("plain"));
}

#[test]
fn default_depth_keeps_four_levels() {
    let value = Value::from(json!({ "a": { "b": { "c": { "d": { "e": 1 } } } } }));
    assert_eq!(
        value.to_json(Some(4)),
        json!({ "a": { "b": { "c": { "d": OBJECT_MARKER } } } })
    );
}

#[test]
fn cycles_become_circular_marker() {
    let (_cell, value) = self_referencing();
    assert_eq!(
        value.to_json(None),
        json!({ "name": "loop", "me": CIRCULAR_MARKER })
    );
    assert_eq!(value.to_string(), r#"{"name":"loop","me":"[Circular]"}"#);
}

#[test]
fn shared_but_acyclic_values_render_twice() {
    let shared = Value::shared(Value::from(json!({ "x": 1 })));
    let value = Value::object([("left", shared.clone()), ("right", shared)]);
    assert_eq!(
        value.to_json(None),
        json!({ "left": { "x": 1 }, "right": { "x": 1 } })
    );
}

#[test]
fn shared_cells_compare_by_identity() {
    let a = Value::shared(Value::from(1));
    let b = Value::shared(Value::from(1));
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn debug_does_not_follow_cycles() {
    let (_cell, value) = self_referencing();
    let debug = format!("{value:?}");
    assert!(debug.starts_with("Shared("));
}
