//! Set schema

use super::nest_issues;
use crate::check::Check;
use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::{PathSegment, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::{Carrier, SchemaExt, SchemaType};
use crate::value::Value;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting a sequence of unique elements.
    ///
    /// Duplicates, compared after parsing, are dropped; the first
    /// occurrence keeps its position.
    SetSchema<S: SchemaType> => Vec<S::Output>
}

pub fn set<S: SchemaType>(element: S) -> SetSchema<S> {
    SetSchema::from_node(SchemaNode::new(TypeTag::Set, Kind::Set(element.node().clone())))
}

pub(crate) fn validate(element: &SchemaRef, payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    let items = match payload.value() {
        Value::Array(items) => items.clone(),
        _ => {
            payload.add_issue(RawIssue::invalid_type("set"));
            return ControlFlow::Break(());
        }
    };

    let mut output: Vec<Value> = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match parse_complex(element, item, ctx) {
            Ok(value) => {
                if !output.contains(&value) {
                    output.push(value);
                }
            }
            Err(child) => {
                nest_issues(&mut issues, child, &PathSegment::Index(index));
                if ctx.is_fail_fast() {
                    break;
                }
            }
        }
    }

    if issues.is_empty() {
        payload.set_value(Value::Array(output));
    } else {
        payload.extend_issues(issues);
    }
    ControlFlow::Continue(())
}

impl<S: SchemaType, C: Carrier<Vec<S::Output>>> SetSchema<S, C> {
    /// Minimum number of unique elements.
    pub fn min(self, n: u64) -> Self {
        self.check(Check::min_size(n))
    }

    /// Maximum number of unique elements.
    pub fn max(self, n: u64) -> Self {
        self.check(Check::max_size(n))
    }

    pub fn size(self, n: u64) -> Self {
        self.check(Check::size(n))
    }

    pub fn non_empty(self) -> Self {
        self.min(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use crate::prelude::*;
    use serde_json::json;

    #[test]
    fn test_duplicates_removed() {
        let out = set(int()).parse(json!([1, 2, 1, 3, 2])).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_size_counts_unique_elements() {
        let schema = set(string()).min(3);
        let err = schema.parse(json!(["a", "a", "b"])).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooSmall);
        assert_eq!(err.first().property("origin"), Some(&Value::from("set")));
    }

    #[test]
    fn test_rejects_non_sequence() {
        let err = set(int()).parse(json!({"a": 1})).unwrap_err();
        assert_eq!(err.first().expected.as_deref(), Some("set"));
    }
}
