//! Map and record schemas
//!
//! For each entry the key is parsed first, then the value. Key issues keep
//! their own code, are pathed under the key and carry `location = "key"`.
//! Value issues are pathed under the key.
//!
//! A record accepts only string-keyed input and always produces string
//! keys. When its key schema is a literal or enum, every listed key must be
//! present.

use super::nest_issues;
use crate::check::Check;
use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::{PathSegment, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::{Carrier, SchemaExt, SchemaType};
use crate::value::{ObjectMap, Value};
use indexmap::IndexMap;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting a map with arbitrary keys.
    MapSchema<K: SchemaType, V: SchemaType> => IndexMap<K::Output, V::Output>
}

carrier_schema! {
    /// Schema accepting a string-keyed map.
    ///
    /// ```rust,ignore
    /// let scores = record(string(), int().gte(0));
    /// let out = scores.parse(json!({"alice": 3}))?;
    /// ```
    RecordSchema<K: SchemaType, V: SchemaType> => IndexMap<String, V::Output>
}

pub fn map<K: SchemaType, V: SchemaType>(key: K, value: V) -> MapSchema<K, V> {
    MapSchema::from_node(SchemaNode::new(
        TypeTag::Map,
        Kind::Map {
            key: key.node().clone(),
            value: value.node().clone(),
        },
    ))
}

pub fn record<K: SchemaType, V: SchemaType>(key: K, value: V) -> RecordSchema<K, V> {
    RecordSchema::from_node(SchemaNode::new(
        TypeTag::Record,
        Kind::Record {
            key: key.node().clone(),
            value: value.node().clone(),
        },
    ))
}

fn entries(value: &Value, is_record: bool) -> Option<Vec<(Value, Value)>> {
    match value {
        Value::Object(map) => Some(
            map.iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect(),
        ),
        Value::Map(pairs) if !is_record => Some(pairs.clone()),
        _ => None,
    }
}

fn into_output(pairs: Vec<(Value, Value)>, is_record: bool) -> Value {
    if is_record || pairs.iter().all(|(k, _)| matches!(k, Value::String(_))) {
        let object: ObjectMap = pairs
            .into_iter()
            .map(|(k, v)| (k.key_string().into_owned(), v))
            .collect();
        Value::Object(object)
    } else {
        Value::Map(pairs)
    }
}

pub(crate) fn validate(
    key: &SchemaRef,
    value: &SchemaRef,
    is_record: bool,
    payload: &mut ParsePayload,
    ctx: &ParseContext,
) -> Flow {
    let Some(input) = entries(payload.value(), is_record) else {
        payload.add_issue(RawIssue::invalid_type(if is_record { "record" } else { "map" }));
        return ControlFlow::Break(());
    };

    let mut output = Vec::with_capacity(input.len());
    let mut issues = Vec::new();

    for (raw_key, raw_value) in &input {
        let segment = PathSegment::from(raw_key.clone());
        let parsed_key = match parse_complex(key, raw_key.clone(), ctx) {
            Ok(parsed) => Some(parsed),
            Err(child) => {
                let child = child
                    .into_iter()
                    .map(|issue| issue.with_property("location", "key"))
                    .collect();
                nest_issues(&mut issues, child, &segment);
                None
            }
        };
        let parsed_value = match parse_complex(value, raw_value.clone(), ctx) {
            Ok(parsed) => Some(parsed),
            Err(child) => {
                nest_issues(&mut issues, child, &segment);
                None
            }
        };
        if let (Some(k), Some(v)) = (parsed_key, parsed_value) {
            output.push((k, v));
        }
        if ctx.is_fail_fast() && !issues.is_empty() {
            break;
        }
    }

    if is_record && !(ctx.is_fail_fast() && !issues.is_empty()) {
        if let Kind::Literal(required) = &key.kind {
            for required_key in required {
                if input.iter().any(|(k, _)| k.key_string() == required_key.key_string()) {
                    continue;
                }
                let segment = PathSegment::from(required_key.clone());
                match parse_complex(value, Value::Null, ctx) {
                    Ok(parsed) if !parsed.is_null() => output.push((required_key.clone(), parsed)),
                    Ok(_) => {}
                    Err(child) => nest_issues(&mut issues, child, &segment),
                }
            }
        }
    }

    if issues.is_empty() {
        payload.set_value(into_output(output, is_record));
    } else {
        payload.extend_issues(issues);
    }
    ControlFlow::Continue(())
}

impl<K: SchemaType, V: SchemaType, C: Carrier<IndexMap<K::Output, V::Output>>> MapSchema<K, V, C> {
    /// Minimum number of entries.
    pub fn min(self, n: u64) -> Self {
        self.check(Check::min_size(n))
    }

    /// Maximum number of entries.
    pub fn max(self, n: u64) -> Self {
        self.check(Check::max_size(n))
    }

    pub fn size(self, n: u64) -> Self {
        self.check(Check::size(n))
    }
}

impl<K: SchemaType, V: SchemaType, C: Carrier<IndexMap<String, V::Output>>> RecordSchema<K, V, C> {
    /// Minimum number of entries.
    pub fn min(self, n: u64) -> Self {
        self.check(Check::min_size(n))
    }

    /// Maximum number of entries.
    pub fn max(self, n: u64) -> Self {
        self.check(Check::max_size(n))
    }

    pub fn size(self, n: u64) -> Self {
        self.check(Check::size(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use crate::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_key_and_value_issues_share_the_key_path() {
        let schema = map(string().min(3), int().min(10));
        let err = schema.parse(json!({"ab": 5, "cd": 8})).unwrap_err();
        assert_eq!(err.issues().len(), 4);

        let first = &err.issues()[0];
        assert_eq!(first.code, IssueCode::TooSmall);
        assert_eq!(first.path.to_vec(), vec![PathSegment::from("ab")]);
        assert_eq!(first.property("location"), Some(&Value::from("key")));

        let second = &err.issues()[1];
        assert_eq!(second.code, IssueCode::TooSmall);
        assert_eq!(second.path.to_vec(), vec![PathSegment::from("ab")]);
        assert_eq!(second.property("location"), None);
    }

    #[test]
    fn test_non_string_keys_produce_map() {
        let schema = map(int(), string());
        let input = Value::map([(1, "a"), (2, "b")]);
        let out = schema.parse(input).unwrap();
        assert_eq!(out.get(&1).map(String::as_str), Some("a"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_size_counts_entries() {
        let schema = record(string(), int()).max(1);
        let err = schema.parse(json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooBig);
    }

    #[test]
    fn test_record_rejects_non_string_keyed_input() {
        let err = record(string(), int()).parse(Value::map([(1, 1)])).unwrap_err();
        assert_eq!(err.first().expected.as_deref(), Some("record"));
    }

    #[test]
    fn test_record_with_enum_keys_is_exhaustive() {
        let schema = record(enumeration(["a", "b"]), int());
        let err = schema.parse(json!({"a": 1})).unwrap_err();
        assert_eq!(err.first().path.to_vec(), vec![PathSegment::from("b")]);

        let partial = record(enumeration(["a", "b"]), int().optional());
        assert!(partial.parse(json!({"a": 1})).is_ok());
    }
}
