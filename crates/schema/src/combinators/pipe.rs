//! Pipe and transform
//!
//! A pipe feeds the output of one schema into another. A transform maps the
//! typed output of a schema through a function; its result is not validated
//! again unless piped.

use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::RawIssue;
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef, TransformFn};
use crate::payload::ParsePayload;
use crate::schema::{decode_issue, SchemaType};
use crate::value::{DecodeError, FromValue, Value};
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::Arc;

// ============================================================================
// PIPE
// ============================================================================

/// `A`'s output parsed by `B`. Output is `B::Output`.
pub struct PipeSchema<A, B> {
    node: SchemaRef,
    _types: PhantomData<fn() -> (A, B)>,
}

impl<A: SchemaType, B: SchemaType> PipeSchema<A, B> {
    pub fn new(source: A, target: B) -> Self {
        Self::from_node(SchemaNode::new(
            TypeTag::Pipe,
            Kind::Pipe(source.node().clone(), target.node().clone()),
        ))
    }
}

impl<A, B> PipeSchema<A, B> {
    fn from_node(node: SchemaRef) -> Self {
        Self {
            node,
            _types: PhantomData,
        }
    }
}

impl<A, B> Clone for PipeSchema<A, B> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<A, B> fmt::Debug for PipeSchema<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeSchema")
            .field("id", &self.node.internals.id)
            .finish()
    }
}

impl<A: SchemaType, B: SchemaType> SchemaType for PipeSchema<A, B> {
    type Output = B::Output;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self::from_node(node)
    }

    fn decode(value: Value) -> Result<Self::Output, DecodeError> {
        B::decode(value)
    }
}

pub(crate) fn validate_pipe(
    source: &SchemaRef,
    target: &SchemaRef,
    payload: &mut ParsePayload,
    ctx: &ParseContext,
) -> Flow {
    let result = parse_complex(source, payload.value().clone(), ctx)
        .and_then(|intermediate| parse_complex(target, intermediate, ctx));
    match result {
        Ok(value) => {
            payload.set_value(value);
            ControlFlow::Continue(())
        }
        Err(issues) => {
            payload.extend_issues(issues);
            ControlFlow::Break(())
        }
    }
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// `S`'s typed output mapped to `U`.
pub struct TransformSchema<S, U> {
    node: SchemaRef,
    _types: PhantomData<fn() -> (S, U)>,
}

impl<S, U> TransformSchema<S, U>
where
    S: SchemaType,
    U: Into<Value> + FromValue + Send + 'static,
{
    /// `f` runs on the decoded output of `source`. An `Err` becomes a
    /// `custom` issue with that message.
    pub fn new<F>(source: S, f: F) -> Self
    where
        F: Fn(S::Output) -> Result<U, String> + Send + Sync + 'static,
    {
        let apply = TransformFn(Arc::new(move |value: Value| {
            let output = S::decode(value).map_err(decode_issue)?;
            f(output).map(Into::into).map_err(RawIssue::custom)
        }));
        Self {
            node: SchemaNode::new(
                TypeTag::Transform,
                Kind::Transform {
                    source: source.node().clone(),
                    apply,
                },
            ),
            _types: PhantomData,
        }
    }
}

impl<S, U> Clone for TransformSchema<S, U> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            _types: PhantomData,
        }
    }
}

impl<S, U> fmt::Debug for TransformSchema<S, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSchema")
            .field("id", &self.node.internals.id)
            .finish()
    }
}

impl<S, U> SchemaType for TransformSchema<S, U>
where
    S: SchemaType,
    U: Into<Value> + FromValue + Send + 'static,
{
    type Output = U;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self {
            node,
            _types: PhantomData,
        }
    }
}

/// Nil input on a source with a default returns that default untouched.
pub(crate) fn validate_transform(
    source: &SchemaRef,
    apply: &TransformFn,
    payload: &mut ParsePayload,
    ctx: &ParseContext,
) -> Flow {
    if payload.value().is_null() {
        if let Some(default) = &source.internals.default {
            payload.set_value(default.resolve());
            return ControlFlow::Continue(());
        }
    }

    let parsed = match parse_complex(source, payload.value().clone(), ctx) {
        Ok(parsed) => parsed,
        Err(issues) => {
            payload.extend_issues(issues);
            return ControlFlow::Break(());
        }
    };
    match (apply.0)(parsed) {
        Ok(value) => {
            payload.set_value(value);
            ControlFlow::Continue(())
        }
        Err(issue) => {
            payload.add_issue(issue);
            ControlFlow::Break(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::IssueCode;
    use crate::prelude::*;

    #[test]
    fn test_transform_changes_output_type() {
        let len = string().transform(|s| s.chars().count() as i64);
        assert_eq!(len.parse("héllo").unwrap(), 5);
        assert_eq!(len.type_tag(), TypeTag::Transform);
    }

    #[test]
    fn test_try_transform_error_is_custom_issue() {
        let parsed = string().try_transform(|s| s.parse::<i64>().map_err(|e| e.to_string()));
        assert_eq!(parsed.parse("42").unwrap(), 42);
        let err = parsed.parse("x").unwrap_err();
        assert_eq!(err.first().code, IssueCode::Custom);
    }

    #[test]
    fn test_default_short_circuits_transform() {
        let schema = string()
            .default("default")
            .prefault("fallback")
            .transform(|s| s.to_uppercase());
        assert_eq!(schema.parse(Value::Null).unwrap(), "default");
    }

    #[test]
    fn test_prefault_flows_through_transform() {
        let schema = string().prefault("fallback").transform(|s| s.to_uppercase());
        assert_eq!(schema.parse(Value::Null).unwrap(), "FALLBACK");
    }

    #[test]
    fn test_pipe_validates_intermediate_output() {
        let schema = string().trim().pipe(string().min(3));
        assert_eq!(schema.parse("  abc ").unwrap(), "abc");
        assert!(schema.parse(" ab ").is_err());

        let numeric = string().try_transform(|s| s.parse::<i64>().map_err(|e| e.to_string()));
        let bounded = numeric.pipe(int().gte(10));
        assert_eq!(bounded.parse("12").unwrap(), 12);
        assert_eq!(
            bounded.parse("3").unwrap_err().first().code,
            IssueCode::TooSmall
        );
    }
}
