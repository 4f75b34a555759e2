//! Wrapper schemas for nil handling
//!
//! Flag methods on primitive handles (`string().optional()`) change the
//! schema itself. The wrappers here build a new node around an inner schema
//! instead, so the modifiers nest: `optional(with_default(s, v))` returns nil
//! for nil input while its unwrapped inner returns `v`.
//!
//! # Examples
//!
//! ```rust,ignore
//! let nick = optional(string().min(3));
//! assert_eq!(nick.parse(Value::Null)?, None);
//!
//! let strict = nick.non_optional();
//! assert!(strict.parse(Value::Null).is_err());
//! ```

use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::internals::{Fallback, Internals, TypeTag};
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::SchemaType;
use crate::value::{DecodeError, Value};
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;

/// Parses the payload with the wrapped schema. Checks of the wrapper run
/// only when the inner parse succeeds.
pub(crate) fn validate_inner(inner: &SchemaRef, payload: &mut ParsePayload, ctx: &ParseContext) -> Flow {
    match parse_complex(inner, payload.value().clone(), ctx) {
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
// OPTIONAL / NILABLE
// ============================================================================

/// Wrapper accepting nil. Output is `Option<S::Output>`.
#[derive(Clone)]
pub struct OptionalSchema<S> {
    node: SchemaRef,
    inner: S,
}

impl<S: SchemaType> OptionalSchema<S> {
    fn wrap(inner: S, tag: TypeTag, kind: fn(SchemaRef) -> Kind, update: fn(&mut Internals)) -> Self {
        let node = SchemaNode::wrapping(tag, kind(inner.node().clone()), update);
        Self { node, inner }
    }

    /// The wrapped schema.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Removes the wrapper.
    pub fn unwrap(self) -> S {
        self.inner
    }

    /// Wraps again, rejecting nil. The output goes back to `S::Output`.
    pub fn non_optional(self) -> NonOptionalSchema<S> {
        NonOptionalSchema::around(self.node)
    }
}

impl<S> fmt::Debug for OptionalSchema<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalSchema")
            .field("tag", &self.node.internals.tag)
            .field("id", &self.node.internals.id)
            .finish()
    }
}

impl<S: SchemaType> SchemaType for OptionalSchema<S> {
    type Output = Option<S::Output>;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self {
            node,
            inner: self.inner.clone(),
        }
    }

    fn decode(value: Value) -> Result<Self::Output, DecodeError> {
        if value.is_null() {
            Ok(None)
        } else {
            S::decode(value).map(Some)
        }
    }
}

/// Accepts nil and absent object keys.
pub fn optional<S: SchemaType>(inner: S) -> OptionalSchema<S> {
    OptionalSchema::wrap(inner, TypeTag::Optional, Kind::Optional, Internals::set_optional)
}

/// Accepts explicit nil; an absent object key is still an error.
pub fn nilable<S: SchemaType>(inner: S) -> OptionalSchema<S> {
    OptionalSchema::wrap(inner, TypeTag::Nilable, Kind::Nilable, Internals::set_nilable)
}

/// Accepts nil and absent object keys.
pub fn nullish<S: SchemaType>(inner: S) -> OptionalSchema<S> {
    OptionalSchema::wrap(inner, TypeTag::Optional, Kind::Optional, |internals| {
        internals.set_optional();
        internals.set_nilable();
    })
}

// ============================================================================
// NON-OPTIONAL / DEFAULT / PREFAULT
// ============================================================================

macro_rules! passthrough_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<S> {
            node: SchemaRef,
            _inner: PhantomData<fn() -> S>,
        }

        impl<S> $name<S> {
            fn from_node(node: SchemaRef) -> Self {
                Self {
                    node,
                    _inner: PhantomData,
                }
            }
        }

        impl<S> Clone for $name<S> {
            fn clone(&self) -> Self {
                Self::from_node(self.node.clone())
            }
        }

        impl<S> fmt::Debug for $name<S> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.node.internals.id)
                    .finish()
            }
        }

        impl<S: SchemaType> SchemaType for $name<S> {
            type Output = S::Output;

            fn node(&self) -> &SchemaRef {
                &self.node
            }

            fn with_node(&self, node: SchemaRef) -> Self {
                Self::from_node(node)
            }

            fn decode(value: Value) -> Result<Self::Output, DecodeError> {
                S::decode(value)
            }
        }
    };
}

passthrough_wrapper! {
    /// Wrapper rejecting nil, even when the wrapped schema accepts it.
    NonOptionalSchema
}

passthrough_wrapper! {
    /// Wrapper returning a default for nil input.
    DefaultSchema
}

passthrough_wrapper! {
    /// Wrapper substituting a prefault for nil input before parsing.
    PrefaultSchema
}

impl<S> NonOptionalSchema<S> {
    fn around(node: SchemaRef) -> Self {
        Self::from_node(SchemaNode::wrapping(
            TypeTag::NonOptional,
            Kind::NonOptional(node),
            Internals::set_non_optional,
        ))
    }
}

/// Rejects nil with `invalid_type`, expected `non_optional`.
pub fn non_optional<S: SchemaType>(inner: S) -> NonOptionalSchema<S> {
    NonOptionalSchema::around(inner.node().clone())
}

/// Returns `value` for nil input without running the inner schema.
pub fn with_default<S: SchemaType>(inner: S, value: impl Into<Value>) -> DefaultSchema<S> {
    let fallback = Fallback::Value(value.into());
    DefaultSchema::from_node(SchemaNode::wrapping(
        TypeTag::Default,
        Kind::Default(inner.node().clone()),
        |internals| internals.default = Some(fallback),
    ))
}

/// Parses `value` with the inner schema when the input is nil.
pub fn with_prefault<S: SchemaType>(inner: S, value: impl Into<Value>) -> PrefaultSchema<S> {
    let fallback = Fallback::Value(value.into());
    PrefaultSchema::from_node(SchemaNode::wrapping(
        TypeTag::Prefault,
        Kind::Prefault(inner.node().clone()),
        |internals| internals.prefault = Some(fallback),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use crate::prelude::*;

    #[test]
    fn test_optional_wrapper() {
        let schema = optional(string().min(2));
        assert_eq!(schema.parse(Value::Null).unwrap(), None);
        assert_eq!(schema.parse("ab").unwrap(), Some("ab".to_string()));
        assert!(schema.parse("a").is_err());
        assert_eq!(schema.type_tag(), TypeTag::Optional);
    }

    #[test]
    fn test_non_optional_over_optional() {
        let schema = optional(string()).non_optional();
        let err = schema.parse(Value::Null).unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidType);
        assert_eq!(err.first().expected.as_deref(), Some("non_optional"));
        assert_eq!(schema.parse("x").unwrap(), "x");
    }

    #[test]
    fn test_unwrap_exposes_inner_default() {
        let schema = optional(string().default("v"));
        assert_eq!(schema.parse(Value::Null).unwrap(), None);
        assert_eq!(schema.unwrap().parse(Value::Null).unwrap(), "v");
    }

    #[test]
    fn test_nested_defaults_outer_wins() {
        let schema = with_default(string().default("inner"), "outer");
        assert_eq!(schema.parse(Value::Null).unwrap(), "outer");
    }

    #[test]
    fn test_nilable_consumes_nil_before_inner_default() {
        let schema = nilable(with_default(string(), "d"));
        assert_eq!(schema.parse(Value::Null).unwrap(), None);

        let schema = with_default(nilable(string()), "d");
        assert_eq!(schema.parse(Value::Null).unwrap(), Some("d".to_string()));
    }

    #[test]
    fn test_prefault_wrapper_validates_substitute() {
        let schema = with_prefault(string().min(5), "abc");
        let err = schema.parse(Value::Null).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooSmall);
        assert_eq!(with_prefault(string(), "abc").parse(Value::Null).unwrap(), "abc");
    }
}
