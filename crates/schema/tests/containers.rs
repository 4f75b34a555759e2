use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use zodiac_schema::prelude::*;
use zodiac_schema::{object, tuple};

fn address() -> ObjectSchema {
    object! {
        "street" => string().min(1),
        "zip" => string().length(5),
    }
}

fn user() -> ObjectSchema {
    object! {
        "name" => string().min(1),
        "email" => string().email(),
        "age" => int().gte(0).optional(),
        "role" => enumeration(["admin", "user"]).default("user"),
        "address" => address(),
        "tags" => set(string()).max(3),
    }
}

#[test]
fn nested_object_parses_and_fills_defaults() {
    let out = user()
        .parse(json!({
            "name": "alice",
            "email": "alice@example.com",
            "address": {"street": "Main", "zip": "12345"},
            "tags": ["a", "b", "a"],
        }))
        .unwrap();

    assert_eq!(out["role"], Value::from("user"));
    assert!(!out.contains_key("age"));
    assert_eq!(out["tags"], Value::from(vec!["a", "b"]));
}

#[test]
fn every_child_issue_is_pathed_from_its_position() {
    let err = user()
        .parse(json!({
            "name": "",
            "email": "nope",
            "age": -1,
            "role": "root",
            "address": {"street": "", "zip": "1"},
            "tags": [1],
        }))
        .unwrap_err();

    let paths: Vec<String> = err.issues().iter().map(Issue::path_string).collect();
    assert_eq!(
        paths,
        vec![
            "name",
            "email",
            "age",
            "role",
            "address.street",
            "address.zip",
            "tags[0]",
        ]
    );
}

#[test]
fn shape_algebra() {
    let base = user();
    assert_eq!(base.pick(["name", "email"]).keys(), vec!["name", "email"]);
    assert!(!base.omit(["address"]).keys().contains(&"address".to_string()));

    let partial = base.pick(["name", "address"]).partial();
    assert!(partial.parse(json!({})).is_ok());

    let required = partial.required();
    assert!(required.parse(json!({})).is_err());

    let extended = address().extend(&object! { "country" => string() });
    assert_eq!(extended.keys(), vec!["street", "zip", "country"]);
}

#[test]
fn unknown_key_modes() {
    let input = json!({"street": "Main", "zip": "12345", "extra": 1});

    let stripped = address().parse(input.clone()).unwrap();
    assert!(!stripped.contains_key("extra"));

    let kept = address().passthrough().parse(input.clone()).unwrap();
    assert_eq!(kept["extra"], Value::Int(1));

    let err = address().strict().parse(input.clone()).unwrap_err();
    assert_eq!(err.first().code, IssueCode::UnrecognizedKeys);
    assert_eq!(err.first().path_string(), "extra");

    let err = address().catchall(string()).parse(input).unwrap_err();
    assert_eq!(err.first().code, IssueCode::InvalidType);
    assert_eq!(err.first().path_string(), "extra");
}

#[test]
fn tuple_with_optional_tail_and_rest() {
    let point = tuple![number(), number(), number().optional()];
    assert_eq!(point.parse(json!([1, 2])).unwrap().len(), 2);
    assert_eq!(
        point.parse(json!([1])).unwrap_err().first().code,
        IssueCode::TooSmall
    );
    assert_eq!(
        point.parse(json!([1, 2, 3, 4])).unwrap_err().first().code,
        IssueCode::TooBig
    );
    assert!(point.rest(number()).parse(json!([1, 2, 3, 4])).is_ok());
}

#[test]
fn record_and_map_count_entries() {
    let scores = record(string(), int()).min(2);
    assert!(scores.parse(json!({"a": 1, "b": 2})).is_ok());
    let err = scores.parse(json!({"abcdef": 1})).unwrap_err();
    assert_eq!(err.first().code, IssueCode::TooSmall);

    let small = map(string(), int()).max(1);
    assert!(small.parse(json!({"a": 1, "b": 2})).is_err());
}

#[test]
fn record_with_enum_keys_is_exhaustive() {
    let flags = record(enumeration(["read", "write"]), boolean());
    assert!(flags.parse(json!({"read": true, "write": false})).is_ok());

    let err = flags.parse(json!({"read": true})).unwrap_err();
    assert_eq!(err.first().path_string(), "write");
}

#[derive(Debug, Deserialize, PartialEq)]
struct Address {
    street: String,
    zip: String,
}

#[test]
fn parse_into_deserializes_output() {
    let parsed: Address = address()
        .parse_into(json!({"street": "Main", "zip": "12345", "extra": true}))
        .unwrap();
    assert_eq!(
        parsed,
        Address {
            street: "Main".into(),
            zip: "12345".into(),
        }
    );
}
