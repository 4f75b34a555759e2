//! Array schema - validates each element of a sequence

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
    /// Schema accepting a sequence whose elements all match one schema.
    ///
    /// Issues from element `i` are reported under path `[i, ...]`.
    ///
    /// ```rust,ignore
    /// let tags = array(string().min(1)).max(10);
    /// let out: Vec<String> = tags.parse(json!(["a", "b"]))?;
    /// ```
    ArraySchema<S: SchemaType> => Vec<S::Output>
}

/// Array of `element`.
pub fn array<S: SchemaType>(element: S) -> ArraySchema<S> {
    ArraySchema::from_node(SchemaNode::new(
        TypeTag::Array,
        Kind::Array(element.node().clone()),
    ))
}

/// Parses every element, collecting issues under the element index.
pub(crate) fn validate(element: &SchemaRef, payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    let items = match payload.value() {
        Value::Array(items) => items.clone(),
        _ => {
            payload.add_issue(RawIssue::invalid_type("array"));
            return ControlFlow::Break(());
        }
    };
    let mut output = Vec::with_capacity(items.len());
    let mut issues = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match parse_complex(element, item, ctx) {
            Ok(value) => output.push(value),
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

impl<S: SchemaType, C: Carrier<Vec<S::Output>>> ArraySchema<S, C> {
    /// Minimum number of items, inclusive.
    pub fn min(self, n: usize) -> Self {
        self.check(Check::min_length(n))
    }

    /// Maximum number of items, inclusive.
    pub fn max(self, n: usize) -> Self {
        self.check(Check::max_length(n))
    }

    pub fn length(self, n: usize) -> Self {
        self.check(Check::length(n))
    }

    pub fn non_empty(self) -> Self {
        self.min(1)
    }
}
