//! Intersection - the input must satisfy both schemas

use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::{IssueCode, Path, PathSegment, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::SchemaType;
use crate::value::Value;
use std::fmt;
use std::ops::ControlFlow;

/// Schema requiring both sides to parse; their outputs are merged.
///
/// Objects merge key by key, arrays of equal length merge by position and
/// anything else must be equal. A conflict is an `invalid_value` issue at
/// the conflicting path.
#[derive(Clone)]
pub struct IntersectionSchema {
    node: SchemaRef,
}

impl IntersectionSchema {
    pub fn new(left: SchemaRef, right: SchemaRef) -> Self {
        Self {
            node: SchemaNode::new(TypeTag::Intersection, Kind::Intersection(left, right)),
        }
    }
}

impl fmt::Debug for IntersectionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionSchema")
            .field("id", &self.node.internals.id)
            .finish()
    }
}

impl SchemaType for IntersectionSchema {
    type Output = Value;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self { node }
    }
}

fn same_number(a: &Value, b: &Value) -> bool {
    matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
}

/// Deep merge. On conflict returns the path of the first mismatch.
fn merge(left: Value, right: Value) -> Result<Value, Path> {
    match (left, right) {
        (Value::Object(mut a), Value::Object(b)) => {
            for (key, b_value) in b {
                let Some(slot) = a.get_mut(&key) else {
                    a.insert(key, b_value);
                    continue;
                };
                let a_value = std::mem::take(slot);
                *slot = merge(a_value, b_value).map_err(|mut path| {
                    path.insert(0, PathSegment::from(key.as_str()));
                    path
                })?;
            }
            Ok(Value::Object(a))
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => a
            .into_iter()
            .zip(b)
            .enumerate()
            .map(|(index, (x, y))| {
                merge(x, y).map_err(|mut path| {
                    path.insert(0, PathSegment::Index(index));
                    path
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (a, b) if a == b || same_number(&a, &b) => Ok(a),
        _ => Err(Path::new()),
    }
}

pub(crate) fn validate(
    left: &SchemaRef,
    right: &SchemaRef,
    payload: &mut ParsePayload,
    ctx: &ParseContext,
) -> Flow {
    let input = payload.value().clone();
    let left = parse_complex(left, input.clone(), ctx);
    let right = parse_complex(right, input, ctx);

    match (left, right) {
        (Ok(a), Ok(b)) => match merge(a, b) {
            Ok(merged) => {
                payload.set_value(merged);
                ControlFlow::Continue(())
            }
            Err(path) => {
                let mut issue = RawIssue::new(IssueCode::InvalidValue)
                    .with_message("Intersection results could not be merged");
                issue.path = path;
                payload.add_issue(issue);
                ControlFlow::Break(())
            }
        },
        (a, b) => {
            payload.extend_issues(a.err().into_iter().chain(b.err()).flatten());
            ControlFlow::Break(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::object::ObjectSchema;
    use crate::prelude::*;
    use serde_json::json;

    #[test]
    fn test_objects_merge() {
        let a = ObjectSchema::new().field("name", string());
        let b = ObjectSchema::new().field("age", int());
        let both = a.and(b);
        let out = both.parse(json!({"name": "x", "age": 3, "other": 1})).unwrap();
        assert_eq!(out, Value::from(json!({"name": "x", "age": 3})));
    }

    #[test]
    fn test_issues_from_both_sides() {
        let both = string().min(5).and(string().email());
        let err = both.parse("ab").unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_conflicting_primitives() {
        let both = string().trim().and(string());
        let err = both.parse(" a ").unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidValue);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let both = number().and(int());
        assert!(both.parse(3).is_ok());
    }
}
