//! Nil handling across modifier combinations.

use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zodiac_schema::prelude::*;

fn nil_result<S: SchemaType>(schema: &S) -> Result<Value, ValidationError> {
    schema.clone().into_dyn().parse(Value::Null)
}

#[test]
fn bare_schema_rejects_nil() {
    let err = nil_result(&string()).unwrap_err();
    assert_eq!(err.first().code, IssueCode::InvalidType);
    assert_eq!(err.first().expected.as_deref(), Some("string"));
}

#[rstest]
#[case::optional(string().optional().into_dyn())]
#[case::nilable(string().nilable().into_dyn())]
#[case::nullish(string().nullish().into_dyn())]
#[case::optional_wrapper(optional(string()).into_dyn())]
#[case::nilable_wrapper(nilable(string()).into_dyn())]
#[case::nilable_over_default(nilable(with_default(string(), "d")).into_dyn())]
fn nil_becomes_null(#[case] schema: DynSchema) {
    assert_eq!(schema.parse(Value::Null).unwrap(), Value::Null);
}

#[rstest]
#[case::default_only(string().default("d").into_dyn(), "d")]
#[case::default_and_prefault(string().default("d").prefault("p").into_dyn(), "d")]
#[case::optional_and_default(string().default("d").optional().into_dyn(), "d")]
#[case::default_over_nilable(with_default(nilable(string()), "d").into_dyn(), "d")]
#[case::outer_default_wins(with_default(string().default("inner"), "outer").into_dyn(), "outer")]
#[case::prefault_only(string().prefault("p").into_dyn(), "p")]
fn nil_resolves_to(#[case] schema: DynSchema, #[case] expected: &str) {
    assert_eq!(schema.parse(Value::Null).unwrap(), Value::from(expected));
}

#[test]
fn non_optional_rejects_nil() {
    let err = string().non_optional().parse(Value::Null).unwrap_err();
    assert_eq!(err.first().code, IssueCode::InvalidType);
    assert_eq!(err.first().expected.as_deref(), Some("non_optional"));

    assert_eq!(string().non_optional().parse("x").unwrap(), "x");
}

#[test]
fn default_bypasses_checks() {
    let schema = string().min(10).default("short");
    assert_eq!(schema.parse(Value::Null).unwrap(), "short");
    assert!(schema.parse("short").is_err());
}

#[test]
fn prefault_runs_checks() {
    let schema = string().min(10).prefault("short");
    let err = schema.parse(Value::Null).unwrap_err();
    assert_eq!(err.first().code, IssueCode::TooSmall);
}

#[test]
fn prefault_only_replaces_nil() {
    let schema = int().prefault(1);
    assert!(schema.parse("x").is_err());
}

#[test]
fn default_fn_runs_every_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let count = calls.clone();
    let schema = int().default_fn(move || count.fetch_add(1, Ordering::SeqCst) as i64);

    assert_eq!(schema.parse(Value::Null).unwrap(), 0);
    assert_eq!(schema.parse(Value::Null).unwrap(), 1);
    assert_eq!(schema.parse(5).unwrap(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn optional_default_then_unwrap() {
    let schema = optional(string().default("v"));
    assert_eq!(schema.parse(Value::Null).unwrap(), None);
    assert_eq!(schema.unwrap().parse(Value::Null).unwrap(), "v");
}

#[test]
fn modifiers_leave_original_untouched() {
    let base = string().min(2);
    let _optional = base.clone().optional();
    let _defaulted = base.clone().default("abc");

    assert!(!base.is_optional());
    assert!(base.internals().default().is_none());
    assert!(base.parse(Value::Null).is_err());
}

#[test]
fn file_prefault_rescues_any_failure() {
    let fallback = FileHandle::new("empty.txt", 0, "text/plain");
    let schema = file().max(10).prefault(fallback.clone());

    let big = FileHandle::new("big.bin", 1_000, "application/octet-stream");
    assert_eq!(schema.parse(big).unwrap(), fallback);
    assert_eq!(schema.parse("not a file").unwrap(), fallback);
}
