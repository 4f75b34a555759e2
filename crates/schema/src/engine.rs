//! The parse pipeline shared by every schema
//!
//! For each node: nil handling, optional coercion, the kind validator, then
//! the node's checks. Issues coming out of a node are stamped with the
//! node's custom error unless a deeper node already set one.

use crate::check::apply_checks;
use crate::combinators::{intersection, lazy, modifiers, pipe, union};
use crate::containers::{array, map, object, set, tuple};
use crate::context::ParseContext;
use crate::error::{RawIssue, ValidationError};
use crate::internals::Internals;
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::primitives::{boolean, date, file, literal, number, special, string};
use crate::value::Value;
use std::ops::ControlFlow;
use tracing::trace;

/// Result of a kind validator. `Break` skips the node's checks.
pub(crate) type Flow = ControlFlow<()>;

enum NilOutcome {
    Return(Value),
    Substitute(Value),
    Forward,
    Reject(RawIssue),
}

fn nil_outcome(node: &SchemaNode) -> NilOutcome {
    let internals = &node.internals;
    if internals.flags.non_optional {
        return NilOutcome::Reject(RawIssue::invalid_type("non_optional").with_input(Value::Null));
    }
    if let Some(default) = &internals.default {
        return NilOutcome::Return(default.resolve());
    }
    if let Some(prefault) = &internals.prefault {
        return NilOutcome::Substitute(prefault.resolve());
    }
    if internals.flags.optional || internals.flags.nilable {
        return NilOutcome::Return(Value::Null);
    }
    if node.forwards_nil() {
        return NilOutcome::Forward;
    }
    NilOutcome::Reject(RawIssue::invalid_type(internals.tag.as_str()).with_input(Value::Null))
}

fn coerce(kind: &Kind, input: Value) -> Result<Value, RawIssue> {
    match kind {
        Kind::String => string::coerce(input),
        Kind::Number(format) => number::coerce(*format, input),
        Kind::Bool => boolean::coerce(input),
        Kind::Date => date::coerce(input),
        _ => Ok(input),
    }
}

fn validate_kind(node: &SchemaNode, payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    match &node.kind {
        Kind::String => string::validate(payload),
        Kind::Number(format) => number::validate(*format, payload),
        Kind::Bool => boolean::validate(payload),
        Kind::Date => date::validate(payload),
        Kind::File => file::validate(payload),
        Kind::Any | Kind::Unknown => special::validate_any(payload),
        Kind::Never => special::validate_never(payload),
        Kind::Literal(values) => literal::validate(values, node.internals.tag, payload),
        Kind::Array(element) => array::validate(element, payload, ctx),
        Kind::Set(element) => set::validate(element, payload, ctx),
        Kind::Map { key, value } => map::validate(key, value, false, payload, ctx),
        Kind::Record { key, value } => map::validate(key, value, true, payload, ctx),
        Kind::Object(def) => object::validate(def, payload, ctx),
        Kind::Tuple { items, rest } => tuple::validate(items, rest.as_ref(), payload, ctx),
        Kind::Union(options) => union::validate_union(options, payload, ctx),
        Kind::Xor(options) => union::validate_xor(options, payload, ctx),
        Kind::Intersection(left, right) => intersection::validate(left, right, payload, ctx),
        Kind::Optional(inner)
        | Kind::Nilable(inner)
        | Kind::NonOptional(inner)
        | Kind::Default(inner)
        | Kind::Prefault(inner) => modifiers::validate_inner(inner, payload, ctx),
        Kind::Pipe(source, target) => pipe::validate_pipe(source, target, payload, ctx),
        Kind::Transform { source, apply } => pipe::validate_transform(source, apply, payload, ctx),
        Kind::Lazy(lazy_ref) => lazy::validate(lazy_ref, node, payload, ctx),
    }
}

pub(crate) fn stamp(mut issues: Vec<RawIssue>, internals: &Internals) -> Vec<RawIssue> {
    if let Some(error) = &internals.error {
        for issue in &mut issues {
            if issue.schema_error.is_none() {
                issue.schema_error = Some(error.clone());
            }
        }
    }
    issues
}

/// Parses `input` against `node`.
pub(crate) fn parse_complex(
    node: &SchemaNode,
    input: Value,
    ctx: &ParseContext,
) -> Result<Value, Vec<RawIssue>> {
    let internals = &node.internals;
    let mut input = input;

    if input.is_null() {
        match nil_outcome(node) {
            NilOutcome::Return(value) => return Ok(value),
            NilOutcome::Substitute(value) => input = value,
            NilOutcome::Forward => {}
            NilOutcome::Reject(issue) => return Err(stamp(vec![issue], internals)),
        }
    }

    if internals.flags.coerce && !input.is_null() {
        input = match coerce(&node.kind, input) {
            Ok(value) => value,
            Err(issue) => return Err(stamp(vec![issue], internals)),
        };
    }

    let mut payload = ParsePayload::new(input);
    if validate_kind(node, &mut payload, ctx).is_continue() {
        apply_checks(&internals.checks, &mut payload, ctx);
    }

    match payload.into_result() {
        Ok(value) => Ok(value),
        Err(issues) => {
            if let (Kind::File, Some(prefault)) = (&node.kind, &internals.prefault) {
                trace!(schema = %internals.id, "file parse failed, using prefault");
                return Ok(prefault.resolve());
            }
            Err(stamp(issues, internals))
        }
    }
}

/// Top-level parse with issue finalization.
pub(crate) fn run(node: &SchemaNode, input: Value, ctx: &ParseContext) -> Result<Value, ValidationError> {
    parse_complex(node, input, ctx).map_err(|issues| {
        trace!(
            schema = %node.internals.id,
            tag = %node.internals.tag,
            issues = issues.len(),
            "parse failed"
        );
        ValidationError::from_raw(issues, ctx)
    })
}
