//! Object schema
//!
//! Maps known string keys to schemas. Keys outside the shape are handled by
//! the [`UnknownKeys`] mode: stripped by default, reported under `strict()`,
//! copied under `passthrough()` or validated under `catchall(..)`.
//!
//! # Absent keys
//!
//! A key missing from the input is resolved in this order:
//!
//! 1. the field has a default or prefault: the field parses nil
//! 2. the field is optional: the key is left out of the output
//! 3. the field only accepts explicit nil: `invalid_type`, received `undefined`
//! 4. otherwise the field parses nil and reports its own error
//!
//! An explicit nil on an `exact_optional` field is rejected.

use super::nest_issues;
use crate::context::ParseContext;
use crate::engine::{parse_complex, stamp, Flow};
use crate::error::{IssueCode, PathSegment, RawIssue, ValidationError};
use crate::internals::{Internals, TypeTag};
use crate::node::{Kind, ObjectDef, SchemaNode, SchemaRef, UnknownKeys};
use crate::payload::ParsePayload;
use crate::schema::{DynSchema, SchemaExt, SchemaType};
use crate::value::{ObjectMap, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting a string-keyed object with a known shape.
    ///
    /// ```rust,ignore
    /// let user = ObjectSchema::new()
    ///     .field("name", string().min(1))
    ///     .field("email", string().email().optional())
    ///     .strict();
    /// ```
    ObjectSchema<> => ObjectMap
}

impl ObjectSchema {
    /// Empty object schema in strip mode.
    pub fn new() -> Self {
        Self::from_node(SchemaNode::new(
            TypeTag::Object,
            Kind::Object(ObjectDef {
                shape: IndexMap::new(),
                unknown: UnknownKeys::Strip,
            }),
        ))
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

enum Slot<'a> {
    Absent,
    Present(&'a Value),
}

/// Parses one field. Issues are relative to the field.
fn parse_field(
    schema: &SchemaRef,
    slot: Slot<'_>,
    ctx: &ParseContext,
) -> Result<Option<Value>, Vec<RawIssue>> {
    let expected = schema.internals.tag.as_str();
    match slot {
        Slot::Absent if schema.has_fallback() => parse_complex(schema, Value::Null, ctx).map(Some),
        Slot::Absent if schema.is_optional() => Ok(None),
        Slot::Absent if schema.is_nilable() => {
            Err(stamp(vec![RawIssue::invalid_type(expected)], &schema.internals))
        }
        Slot::Absent => parse_complex(schema, Value::Null, ctx)
            .map(Some)
            .map_err(|issues| issues.into_iter().map(mark_absent).collect()),
        Slot::Present(Value::Null)
            if schema.internals.flags.exact_optional && !schema.is_nilable() =>
        {
            let issue = RawIssue::invalid_type(expected).with_input(Value::Null);
            Err(stamp(vec![issue], &schema.internals))
        }
        Slot::Present(value) => parse_complex(schema, value.clone(), ctx).map(Some),
    }
}

/// A nil rejected at the field itself was really an absent key.
fn mark_absent(mut issue: RawIssue) -> RawIssue {
    if issue.path.is_empty() && issue.input == Some(Value::Null) {
        issue.input = None;
    }
    issue
}

pub(crate) fn validate(def: &ObjectDef, payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    let input = match payload.value() {
        Value::Object(map) => map.clone(),
        _ => {
            payload.add_issue(RawIssue::invalid_type("object"));
            return ControlFlow::Break(());
        }
    };

    let mut output = ObjectMap::with_capacity(def.shape.len());
    let mut issues: Vec<RawIssue> = Vec::new();

    for (key, schema) in &def.shape {
        let slot = match input.get(key) {
            Some(value) => Slot::Present(value),
            None => Slot::Absent,
        };
        match parse_field(schema, slot, ctx) {
            Ok(Some(value)) => {
                output.insert(key.clone(), value);
            }
            Ok(None) => {}
            Err(child) => nest_issues(&mut issues, child, &PathSegment::from(key.as_str())),
        }
        if ctx.is_fail_fast() && !issues.is_empty() {
            break;
        }
    }

    if !(ctx.is_fail_fast() && !issues.is_empty()) {
        for (key, value) in input.iter().filter(|(k, _)| !def.shape.contains_key(*k)) {
            match &def.unknown {
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    output.insert(key.clone(), value.clone());
                }
                UnknownKeys::Strict => issues.push(
                    RawIssue::new(IssueCode::UnrecognizedKeys)
                        .with_property("keys", vec![key.clone()])
                        .with_input(value.clone())
                        .with_path(key.as_str()),
                ),
                UnknownKeys::Catchall(schema) => match parse_complex(schema, value.clone(), ctx) {
                    Ok(parsed) => {
                        output.insert(key.clone(), parsed);
                    }
                    Err(child) => nest_issues(&mut issues, child, &PathSegment::from(key.as_str())),
                },
            }
        }
    }

    if issues.is_empty() {
        payload.set_value(Value::Object(output));
    } else {
        payload.extend_issues(issues);
    }
    ControlFlow::Continue(())
}

impl<C> ObjectSchema<C> {
    fn def(&self) -> Option<&ObjectDef> {
        match &self.node.kind {
            Kind::Object(def) => Some(def),
            _ => None,
        }
    }

    fn with_def(&self, update: impl FnOnce(&mut ObjectDef)) -> Self {
        Self::from_node(self.node.derive_kind(|kind| {
            if let Kind::Object(def) = kind {
                update(def);
            }
        }))
    }

    fn map_fields(&self, update: impl Fn(&mut Internals)) -> Self {
        self.with_def(|def| {
            for schema in def.shape.values_mut() {
                *schema = schema.derive(&update);
            }
        })
    }

    /// Adds or replaces a field.
    pub fn field<S: SchemaType>(&self, key: impl Into<String>, schema: S) -> Self {
        let key = key.into();
        let node = schema.node().clone();
        self.with_def(|def| {
            def.shape.insert(key, node);
        })
    }

    /// Field names in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.def()
            .map(|def| def.shape.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The schema of one field.
    pub fn get(&self, key: &str) -> Option<DynSchema> {
        self.def()
            .and_then(|def| def.shape.get(key))
            .map(|node| DynSchema::from_ref(node.clone()))
    }

    pub fn unknown_keys(&self) -> Option<&UnknownKeys> {
        self.def().map(|def| &def.unknown)
    }

    /// Reports every key outside the shape.
    pub fn strict(&self) -> Self {
        self.with_def(|def| def.unknown = UnknownKeys::Strict)
    }

    /// Drops keys outside the shape.
    pub fn strip(&self) -> Self {
        self.with_def(|def| def.unknown = UnknownKeys::Strip)
    }

    /// Copies keys outside the shape to the output.
    pub fn passthrough(&self) -> Self {
        self.with_def(|def| def.unknown = UnknownKeys::Passthrough)
    }

    /// Validates keys outside the shape with `schema`.
    pub fn catchall<S: SchemaType>(&self, schema: S) -> Self {
        let node = schema.node().clone();
        self.with_def(|def| def.unknown = UnknownKeys::Catchall(node))
    }

    /// Adds the fields of `other`, replacing fields with the same name.
    /// The unknown-key mode of `self` is kept.
    pub fn extend<D>(&self, other: &ObjectSchema<D>) -> Self {
        let shape = other.def().map(|def| def.shape.clone()).unwrap_or_default();
        self.with_def(|def| def.shape.extend(shape))
    }

    /// Like [`extend`](Self::extend), also taking the unknown-key mode of `other`.
    pub fn merge<D>(&self, other: &ObjectSchema<D>) -> Self {
        let Some(other_def) = other.def().cloned() else {
            return self.clone();
        };
        self.with_def(|def| {
            def.shape.extend(other_def.shape);
            def.unknown = other_def.unknown;
        })
    }

    /// Keeps only the listed fields.
    pub fn pick<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        self.with_def(|def| def.shape.retain(|k, _| keys.contains(&k.as_str())))
    }

    /// Drops the listed fields.
    pub fn omit<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        self.with_def(|def| def.shape.retain(|k, _| !keys.contains(&k.as_str())))
    }

    /// Makes every field optional.
    pub fn partial(&self) -> Self {
        self.map_fields(Internals::set_optional)
    }

    /// Makes every field reject nil and absence.
    pub fn required(&self) -> Self {
        self.map_fields(Internals::set_non_optional)
    }
}

impl ObjectSchema {
    /// Parses and deserializes the output into `T`.
    ///
    /// A deserialization failure is reported as a single `custom` issue.
    pub fn parse_into<T: DeserializeOwned>(&self, input: impl Into<Value>) -> Result<T, ValidationError> {
        let ctx = ParseContext::new();
        let output = self.parse_with(input, &ctx)?;
        serde_json::from_value(Value::Object(output).to_json())
            .map_err(|err| ValidationError::from_raw(vec![RawIssue::custom(err.to_string())], &ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    fn user() -> ObjectSchema {
        ObjectSchema::new()
            .field("name", string().min(1))
            .field("age", int().gte(0).optional())
    }

    #[test]
    fn test_strip_is_default() {
        let out = user().parse(json!({"name": "a", "extra": 1})).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_strict_reports_each_unknown_key() {
        let err = user().strict().parse(json!({"name": "a", "x": 1, "y": 2})).unwrap_err();
        let paths: Vec<_> = err.issues().iter().map(|i| i.path_string()).collect();
        assert_eq!(paths, vec!["x", "y"]);
        assert!(err.issues().iter().all(|i| i.code == IssueCode::UnrecognizedKeys));
    }

    #[test]
    fn test_passthrough_keeps_unknown_keys() {
        let out = user().passthrough().parse(json!({"name": "a", "x": 1})).unwrap();
        assert_eq!(out.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_catchall_validates_unknown_keys() {
        let schema = user().catchall(int());
        assert!(schema.parse(json!({"name": "a", "x": 1})).is_ok());
        let err = schema.parse(json!({"name": "a", "x": "no"})).unwrap_err();
        assert_eq!(err.first().path_string(), "x");
    }

    #[test]
    fn test_missing_required_key() {
        let err = user().parse(json!({})).unwrap_err();
        let issue = err.first();
        assert_eq!(issue.code, IssueCode::InvalidType);
        assert_eq!(issue.path_string(), "name");
        assert_eq!(issue.message, "Invalid input: expected string, received undefined");
    }

    #[test]
    fn test_nested_paths() {
        let schema = ObjectSchema::new().field("profile", user());
        let err = schema.parse(json!({"profile": {"name": ""}})).unwrap_err();
        assert_eq!(err.first().path_string(), "profile.name");
    }

    #[test]
    fn test_exact_optional_distinguishes_absent_from_null() {
        let schema = ObjectSchema::new().field("nick", string().exact_optional());
        assert!(schema.parse(json!({})).is_ok());
        let err = schema.parse(json!({"nick": null})).unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidType);
        assert_eq!(err.first().path_string(), "nick");
    }

    #[test]
    fn test_nilable_field_requires_presence() {
        let schema = ObjectSchema::new().field("nick", string().nilable());
        assert!(schema.parse(json!({"nick": null})).is_ok());
        let err = schema.parse(json!({})).unwrap_err();
        assert_eq!(err.first().message, "Invalid input: expected string, received undefined");
    }

    #[test]
    fn test_default_fills_absent_key() {
        let schema = ObjectSchema::new().field("role", string().default("user"));
        let out = schema.parse(json!({})).unwrap();
        assert_eq!(out.get("role"), Some(&Value::from("user")));
    }

    #[test]
    fn test_shape_algebra() {
        let base = user();
        let extended = base.extend(&ObjectSchema::new().field("email", string().email()));
        assert_eq!(extended.keys(), vec!["name", "age", "email"]);
        assert_eq!(extended.pick(["email"]).keys(), vec!["email"]);
        assert_eq!(extended.omit(["age"]).keys(), vec!["name", "email"]);
        assert_eq!(base.keys(), vec!["name", "age"]);

        let merged = base.merge(&ObjectSchema::new().strict());
        assert!(matches!(merged.unknown_keys(), Some(UnknownKeys::Strict)));
    }

    #[test]
    fn test_partial_and_required() {
        let partial = user().partial();
        assert!(partial.parse(json!({})).is_ok());

        let required = user().required();
        let err = required.parse(json!({"name": "a"})).unwrap_err();
        assert_eq!(err.first().path_string(), "age");
        assert_eq!(err.first().expected.as_deref(), Some("non_optional"));
    }

    #[test]
    fn test_parse_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            name: String,
            age: Option<i64>,
        }

        let parsed: User = user().parse_into(json!({"name": "a", "age": 3})).unwrap();
        assert_eq!(parsed, User { name: "a".into(), age: Some(3) });
    }
}
