//! Typed schema handles
//!
//! A handle couples a [`SchemaRef`] with the Rust type it produces.
//! [`SchemaType`] is implemented by every handle and [`SchemaExt`] adds the
//! shared builder and parse surface on top of it.
//!
//! # Examples
//!
//! ```rust,ignore
//! use zodiac_schema::prelude::*;
//!
//! let name = string().min(1).error("Name required");
//! assert_eq!(name.parse("alice")?, "alice");
//!
//! let nick = string().optional();
//! assert_eq!(nick.parse(Value::Null)?, None);
//! ```

use crate::check::Check;
use crate::combinators::intersection::IntersectionSchema;
use crate::combinators::modifiers::OptionalSchema;
use crate::combinators::pipe::{PipeSchema, TransformSchema};
use crate::combinators::union::UnionSchema;
use crate::containers::array::ArraySchema;
use crate::context::ParseContext;
use crate::engine;
use crate::error::{ErrorMessage, IssueCode, RawIssue, ValidationError};
use crate::internals::{Fallback, Internals, SchemaId, SchemaParams, TypeTag};
use crate::node::SchemaRef;
use crate::payload::ParsePayload;
use crate::registry::{self, SchemaMetadata};
use crate::value::{DecodeError, FromValue, Value};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CORE TRAITS
// ============================================================================

/// A typed handle over a schema node.
pub trait SchemaType: Clone + Send + Sync + 'static {
    /// Rust type produced by a successful parse.
    type Output: FromValue + Send + 'static;

    /// The underlying node.
    fn node(&self) -> &SchemaRef;

    /// A handle of the same type over another node.
    fn with_node(&self, node: SchemaRef) -> Self;

    /// Recovers the typed output from a parsed value.
    fn decode(value: Value) -> Result<Self::Output, DecodeError> {
        Self::Output::from_value(value)
    }
}

pub(crate) fn decode_issue(err: DecodeError) -> RawIssue {
    RawIssue::invalid_type(err.expected).with_input(err.received)
}

pub(crate) fn derived<S: SchemaType>(schema: &S, update: impl FnOnce(&mut Internals)) -> S {
    schema.with_node(schema.node().derive(update))
}

fn register(node: &SchemaRef, description: Option<String>, meta: Option<Value>) {
    if description.is_some() || meta.is_some() {
        registry::global().add(node, SchemaMetadata { description, meta });
    }
}

/// Builder and parse methods available on every schema handle.
pub trait SchemaExt: SchemaType {
    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    fn id(&self) -> SchemaId {
        self.node().internals.id
    }

    fn type_tag(&self) -> TypeTag {
        self.node().internals.tag
    }

    fn internals(&self) -> &Internals {
        &self.node().internals
    }

    /// Whether an absent object key is accepted.
    fn is_optional(&self) -> bool {
        self.node().is_optional()
    }

    /// Whether an explicit nil is accepted.
    fn is_nilable(&self) -> bool {
        self.node().is_nilable()
    }

    /// Description from the registry, falling back to the schema's own.
    fn description(&self) -> Option<String> {
        registry::global()
            .get(self.id())
            .and_then(|md| md.description)
            .or_else(|| self.node().internals.description.clone())
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    fn parse(&self, input: impl Into<Value>) -> Result<Self::Output, ValidationError> {
        self.parse_with(input, &ParseContext::new())
    }

    fn parse_with(
        &self,
        input: impl Into<Value>,
        ctx: &ParseContext,
    ) -> Result<Self::Output, ValidationError> {
        let value = engine::run(self.node(), input.into(), ctx)?;
        Self::decode(value).map_err(|err| ValidationError::from_raw(vec![decode_issue(err)], ctx))
    }

    /// Parses without decoding, returning the canonical value.
    fn parse_value(&self, input: impl Into<Value>) -> Result<Value, ValidationError> {
        engine::run(self.node(), input.into(), &ParseContext::new())
    }

    /// Parses and panics on failure.
    fn must_parse(&self, input: impl Into<Value>) -> Self::Output {
        match self.parse(input) {
            Ok(output) => output,
            Err(err) => panic!("schema parse failed: {err}"),
        }
    }

    /// Parses an already typed value.
    fn strict_parse(&self, input: Self::Output) -> Result<Self::Output, ValidationError>
    where
        Self::Output: Into<Value>,
    {
        self.parse(input.into())
    }

    // ------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------

    /// Appends a check.
    fn check(self, check: Check) -> Self {
        derived(&self, |internals| internals.checks.push(check))
    }

    /// Appends a predicate over the typed output.
    ///
    /// When the value cannot be decoded because earlier issues left it in
    /// another shape, the predicate is skipped.
    fn refine<F>(self, predicate: F, message: impl Into<ErrorMessage>) -> Self
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        let check = Check::custom(move |payload| {
            let Ok(output) = Self::decode(payload.value().clone()) else {
                return;
            };
            if !predicate(&output) {
                payload.add_issue(RawIssue::new(IssueCode::Custom));
            }
        });
        self.check(check.with_message(message))
    }

    /// Appends a check that may report any number of issues.
    fn refine_with<F>(self, f: F) -> Self
    where
        F: Fn(&Self::Output, &mut ParsePayload) + Send + Sync + 'static,
    {
        self.check(Check::custom(move |payload| {
            if let Ok(output) = Self::decode(payload.value().clone()) {
                f(&output, payload);
            }
        }))
    }

    // ------------------------------------------------------------------
    // Nil handling
    // ------------------------------------------------------------------

    /// Value returned for nil input. Checks are not run on it.
    fn default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        derived(&self, |internals| internals.default = Some(Fallback::Value(value)))
    }

    /// Like [`default`](Self::default), calling `f` on every use.
    fn default_fn<V, F>(self, f: F) -> Self
    where
        V: Into<Value>,
        F: Fn() -> V + Send + Sync + 'static,
    {
        let factory = Fallback::Factory(Arc::new(move || f().into()));
        derived(&self, |internals| internals.default = Some(factory))
    }

    /// Value substituted for nil input and then validated.
    fn prefault(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        derived(&self, |internals| internals.prefault = Some(Fallback::Value(value)))
    }

    fn prefault_fn<V, F>(self, f: F) -> Self
    where
        V: Into<Value>,
        F: Fn() -> V + Send + Sync + 'static,
    {
        let factory = Fallback::Factory(Arc::new(move || f().into()));
        derived(&self, |internals| internals.prefault = Some(factory))
    }

    /// Rejects nil input.
    fn non_optional(self) -> Self {
        derived(&self, Internals::set_non_optional)
    }

    /// Wraps in a schema accepting nil and absent keys.
    fn optional(self) -> OptionalSchema<Self> {
        crate::combinators::modifiers::optional(self)
    }

    /// Wraps in a schema accepting explicit nil.
    fn nilable(self) -> OptionalSchema<Self> {
        crate::combinators::modifiers::nilable(self)
    }

    fn nullish(self) -> OptionalSchema<Self> {
        crate::combinators::modifiers::nullish(self)
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Custom error for issues raised by this schema.
    fn error(self, message: impl Into<ErrorMessage>) -> Self {
        let message = message.into();
        derived(&self, |internals| internals.error = Some(message))
    }

    fn describe(self, description: impl Into<String>) -> Self {
        let description = description.into();
        let schema = derived(&self, |internals| internals.description = Some(description.clone()));
        register(schema.node(), Some(description), None);
        schema
    }

    fn meta(self, meta: impl Into<Value>) -> Self {
        let meta = meta.into();
        let schema = derived(&self, |internals| internals.meta = Some(meta.clone()));
        register(schema.node(), None, Some(meta));
        schema
    }

    fn with_params(self, params: SchemaParams) -> Self {
        let (description, meta) = (params.description.clone(), params.meta.clone());
        let schema = derived(&self, |internals| internals.apply(params));
        register(schema.node(), description, meta);
        schema
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    /// Maps the typed output through `f`.
    fn transform<U, F>(self, f: F) -> TransformSchema<Self, U>
    where
        U: Into<Value> + FromValue + Send + 'static,
        F: Fn(Self::Output) -> U + Send + Sync + 'static,
    {
        TransformSchema::new(self, move |output| Ok(f(output)))
    }

    /// Maps the typed output through a fallible `f`. `Err` becomes a `custom` issue.
    fn try_transform<U, F>(self, f: F) -> TransformSchema<Self, U>
    where
        U: Into<Value> + FromValue + Send + 'static,
        F: Fn(Self::Output) -> Result<U, String> + Send + Sync + 'static,
    {
        TransformSchema::new(self, f)
    }

    /// Feeds this schema's output into `next`.
    fn pipe<B: SchemaType>(self, next: B) -> PipeSchema<Self, B> {
        PipeSchema::new(self, next)
    }

    fn or<B: SchemaType>(self, other: B) -> UnionSchema {
        UnionSchema::union(vec![self.node().clone(), other.node().clone()])
    }

    fn xor<B: SchemaType>(self, other: B) -> UnionSchema {
        UnionSchema::xor(vec![self.node().clone(), other.node().clone()])
    }

    fn and<B: SchemaType>(self, other: B) -> IntersectionSchema {
        IntersectionSchema::new(self.node().clone(), other.node().clone())
    }

    fn array(self) -> ArraySchema<Self> {
        crate::containers::array::array(self)
    }

    /// Erases the output type.
    fn into_dyn(self) -> DynSchema {
        DynSchema::from_ref(self.node().clone())
    }
}

impl<S: SchemaType> SchemaExt for S {}

// ============================================================================
// CARRIERS
// ============================================================================

/// Chooses the output type of a primitive or container handle.
pub trait Carrier<T>: Send + Sync + 'static {
    type Out: FromValue + Send + 'static;

    fn decode(value: Value) -> Result<Self::Out, DecodeError>;
}

/// Output is the plain value; nil decodes to `T::default()`.
#[derive(Debug)]
pub enum Owned {}

/// Output is `Option<T>`; nil decodes to `None`.
#[derive(Debug)]
pub enum Nullable {}

impl<T: FromValue + Default + Send + 'static> Carrier<T> for Owned {
    type Out = T;

    fn decode(value: Value) -> Result<T, DecodeError> {
        if value.is_null() {
            Ok(T::default())
        } else {
            T::from_value(value)
        }
    }
}

impl<T: FromValue + Send + 'static> Carrier<T> for Nullable {
    type Out = Option<T>;

    fn decode(value: Value) -> Result<Option<T>, DecodeError> {
        Option::<T>::from_value(value)
    }
}

// ============================================================================
// DYN SCHEMA
// ============================================================================

/// Type-erased schema producing [`Value`].
#[derive(Clone)]
pub struct DynSchema {
    node: SchemaRef,
}

impl DynSchema {
    #[must_use]
    pub fn from_ref(node: SchemaRef) -> Self {
        Self { node }
    }
}

impl fmt::Debug for DynSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynSchema")
            .field("tag", &self.node.internals.tag)
            .field("id", &self.node.internals.id)
            .finish()
    }
}

impl SchemaType for DynSchema {
    type Output = Value;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self { node }
    }
}
