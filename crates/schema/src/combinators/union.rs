//! Union and exclusive union
//!
//! A union tries its options in order and takes the first success. An
//! exclusive union (`xor`) tries every option and succeeds only when exactly
//! one matches.

use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::{IssueCode, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::{DynSchema, SchemaType};
use std::fmt;
use std::ops::ControlFlow;

/// Schema accepting the first (or, for xor, the only) matching option.
///
/// The output is the matching option's canonical value.
#[derive(Clone)]
pub struct UnionSchema {
    node: SchemaRef,
}

impl UnionSchema {
    /// First matching option wins.
    pub fn union(options: Vec<SchemaRef>) -> Self {
        Self {
            node: SchemaNode::new(TypeTag::Union, Kind::Union(options)),
        }
    }

    /// Exactly one option must match.
    pub fn xor(options: Vec<SchemaRef>) -> Self {
        Self {
            node: SchemaNode::new(TypeTag::Xor, Kind::Xor(options)),
        }
    }

    pub fn options(&self) -> Vec<DynSchema> {
        match &self.node.kind {
            Kind::Union(options) | Kind::Xor(options) => {
                options.iter().cloned().map(DynSchema::from_ref).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self.node.kind, Kind::Xor(_))
    }
}

impl fmt::Debug for UnionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionSchema")
            .field("tag", &self.node.internals.tag)
            .field("options", &self.options().len())
            .finish()
    }
}

impl SchemaType for UnionSchema {
    type Output = crate::value::Value;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self { node }
    }
}

pub(crate) fn validate_union(options: &[SchemaRef], payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    let mut failures = Vec::with_capacity(options.len());
    for option in options {
        match parse_complex(option, payload.value().clone(), ctx) {
            Ok(value) => {
                payload.set_value(value);
                return ControlFlow::Continue(());
            }
            Err(issues) => failures.push(issues),
        }
    }
    payload.add_issue(RawIssue::new(IssueCode::InvalidUnion).with_errors(failures));
    ControlFlow::Break(())
}

pub(crate) fn validate_xor(options: &[SchemaRef], payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    let mut matched = Vec::new();
    let mut failures = Vec::new();
    for option in options {
        match parse_complex(option, payload.value().clone(), ctx) {
            Ok(value) => matched.push(value),
            Err(issues) => failures.push(issues),
        }
    }

    match matched.len() {
        1 => {
            payload.set_value(matched.remove(0));
            ControlFlow::Continue(())
        }
        0 => {
            payload.add_issue(RawIssue::new(IssueCode::InvalidUnion).with_errors(failures));
            ControlFlow::Break(())
        }
        count => {
            payload.add_issue(RawIssue::new(IssueCode::InvalidXor).with_property("count", count));
            ControlFlow::Break(())
        }
    }
}
