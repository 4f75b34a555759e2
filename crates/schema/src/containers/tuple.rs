//! Tuple schema

use super::nest_issues;
use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::{PathSegment, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::SchemaType;
use crate::value::Value;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema matching a sequence by position, with an optional rest schema.
    ///
    /// Trailing optional items may be left out: the required length is one
    /// past the last non-optional item.
    TupleSchema<> => Vec<Value>
}

impl TupleSchema {
    pub fn new(items: Vec<SchemaRef>) -> Self {
        Self::from_node(SchemaNode::new(
            TypeTag::Tuple,
            Kind::Tuple { items, rest: None },
        ))
    }
}

impl<C> TupleSchema<C> {
    /// Validates positions past the fixed items with `schema`.
    pub fn rest<S: SchemaType>(&self, schema: S) -> Self {
        let node = schema.node().clone();
        Self::from_node(self.node.derive_kind(|kind| {
            if let Kind::Tuple { rest, .. } = kind {
                *rest = Some(node);
            }
        }))
    }

    /// Number of fixed positions.
    pub fn len(&self) -> usize {
        match &self.node.kind {
            Kind::Tuple { items, .. } => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn required_len(items: &[SchemaRef]) -> usize {
    items
        .iter()
        .rposition(|item| !item.is_optional())
        .map_or(0, |last| last + 1)
}

pub(crate) fn validate(
    items: &[SchemaRef],
    rest: Option<&SchemaRef>,
    payload: &mut ParsePayload,
    ctx: &ParseContext,
) -> Flow {
    let input = match payload.value() {
        Value::Array(values) => values.clone(),
        _ => {
            payload.add_issue(RawIssue::invalid_type("tuple"));
            return ControlFlow::Break(());
        }
    };

    let required = required_len(items);
    if input.len() < required {
        payload.add_issue(RawIssue::too_small("tuple", required, true));
        return ControlFlow::Break(());
    }
    if rest.is_none() && input.len() > items.len() {
        payload.add_issue(RawIssue::too_big("tuple", items.len(), true));
        return ControlFlow::Break(());
    }

    let mut output = Vec::with_capacity(input.len());
    let mut issues = Vec::new();
    for index in 0..input.len().max(items.len()) {
        let Some(schema) = items.get(index).or(rest) else {
            break;
        };
        let value = match input.get(index) {
            Some(value) => value.clone(),
            // Absent trailing optionals are dropped unless they have a fallback.
            None if schema.has_fallback() => Value::Null,
            None => break,
        };
        match parse_complex(schema, value, ctx) {
            Ok(parsed) => output.push(parsed),
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
