//! Tests for empty-entry omission.

use super::*;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Nested {
    inner: Option<String>,
}

#[derive(Serialize)]
struct Envelope {
    name: &'static str,
    nested: Nested,
    tags: Vec<&'static str>,
    unit: (),
}

#[derive(Serialize)]
enum Shape {
    Point,
    Circle { radius: u32, label: String },
}

fn to_string<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(&OmitEmpty(value)).unwrap()
}

#[test]
fn test_is_empty() {
    assert!(is_empty(&()));
    assert!(is_empty(&None::<u8>));
    assert!(is_empty(&""));
    assert!(is_empty(&Some(String::new())));
    assert!(is_empty(&Vec::<u8>::new()));
    assert!(is_empty(&BTreeMap::<String, u8>::new()));
    assert!(is_empty(&json!({})));

    assert!(!is_empty(&0));
    assert!(!is_empty(&false));
    assert!(!is_empty(&" "));
    assert!(!is_empty(&vec![None::<u8>]));
    assert!(!is_empty(&Shape::Point));
    assert!(!is_empty(&Nested { inner: None }));
}

#[test]
fn test_struct_with_only_empty_fields_is_written_as_empty_object() {
    let envelope = Envelope {
        name: "login",
        nested: Nested { inner: None },
        tags: Vec::new(),
        unit: (),
    };

    assert_eq!(to_string(&envelope), r#"{"name":"login","nested":{}}"#);
}

#[test]
fn test_struct_variant_fields_are_filtered() {
    let shape = Shape::Circle {
        radius: 3,
        label: String::new(),
    };

    assert_eq!(to_string(&shape), r#"{"Circle":{"radius":3}}"#);
}

#[test]
fn test_sequence_elements_are_kept() {
    let value = json!([null, "", [], {"a": null}]);

    assert_eq!(to_string(&value), r#"[null,"",[],{}]"#);
}

#[test]
fn test_top_level_empty_values_are_written() {
    assert_eq!(to_string(&""), r#""""#);
    assert_eq!(to_string(&None::<u8>), "null");
    assert_eq!(to_string(&json!({})), "{}");
}

#[test]
fn test_integer_map_keys_survive() {
    let mut value = BTreeMap::new();
    value.insert(1_u32, "one");
    value.insert(2_u32, "");

    assert_eq!(to_string(&value), r#"{"1":"one"}"#);
}
