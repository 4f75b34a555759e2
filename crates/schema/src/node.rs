//! The type-erased schema tree
//!
//! Every typed schema handle wraps a [`SchemaRef`]. Nodes are immutable:
//! builder methods derive a new node and share unchanged children.

use crate::combinators::lazy::LazyRef;
use crate::context::ParseContext;
use crate::engine;
use crate::error::RawIssue;
use crate::internals::{Internals, TypeTag};
use crate::primitives::number::NumberFormat;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a schema node.
pub type SchemaRef = Arc<SchemaNode>;

/// Function applied by a transform node.
#[derive(Clone)]
pub(crate) struct TransformFn(pub(crate) Arc<dyn Fn(Value) -> Result<Value, RawIssue> + Send + Sync>);

impl fmt::Debug for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformFn(<fn>)")
    }
}

/// Handling of object keys missing from the shape.
#[derive(Debug, Clone)]
pub enum UnknownKeys {
    /// Drop unknown keys from the output.
    Strip,
    /// Report every unknown key.
    Strict,
    /// Copy unknown keys to the output.
    Passthrough,
    /// Validate unknown keys with a schema.
    Catchall(SchemaRef),
}

#[derive(Debug, Clone)]
pub(crate) struct ObjectDef {
    pub(crate) shape: IndexMap<String, SchemaRef>,
    pub(crate) unknown: UnknownKeys,
}

#[derive(Debug, Clone)]
pub(crate) enum Kind {
    String,
    Number(NumberFormat),
    Bool,
    Date,
    File,
    Any,
    Unknown,
    Never,
    Literal(Vec<Value>),
    Array(SchemaRef),
    Set(SchemaRef),
    Map { key: SchemaRef, value: SchemaRef },
    Record { key: SchemaRef, value: SchemaRef },
    Object(ObjectDef),
    Tuple { items: Vec<SchemaRef>, rest: Option<SchemaRef> },
    Union(Vec<SchemaRef>),
    Xor(Vec<SchemaRef>),
    Intersection(SchemaRef, SchemaRef),
    Optional(SchemaRef),
    Nilable(SchemaRef),
    NonOptional(SchemaRef),
    Default(SchemaRef),
    Prefault(SchemaRef),
    Pipe(SchemaRef, SchemaRef),
    Transform { source: SchemaRef, apply: TransformFn },
    Lazy(LazyRef),
}

/// A schema: shared metadata plus its kind-specific definition.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub(crate) internals: Internals,
    pub(crate) kind: Kind,
}

impl SchemaNode {
    pub(crate) fn new(tag: TypeTag, kind: Kind) -> SchemaRef {
        Arc::new(Self {
            internals: Internals::new(tag),
            kind,
        })
    }

    pub(crate) fn wrapping(tag: TypeTag, kind: Kind, update: impl FnOnce(&mut Internals)) -> SchemaRef {
        let mut internals = Internals::new(tag);
        update(&mut internals);
        Arc::new(Self { internals, kind })
    }

    /// Derives a node with modified internals; the kind is shared.
    pub(crate) fn derive(&self, update: impl FnOnce(&mut Internals)) -> SchemaRef {
        let mut internals = self.internals.fork();
        update(&mut internals);
        Arc::new(Self {
            internals,
            kind: self.kind.clone(),
        })
    }

    /// Derives a node with a modified kind.
    pub(crate) fn derive_kind(&self, update: impl FnOnce(&mut Kind)) -> SchemaRef {
        let mut kind = self.kind.clone();
        update(&mut kind);
        Arc::new(Self {
            internals: self.internals.fork(),
            kind,
        })
    }

    #[must_use]
    pub fn internals(&self) -> &Internals {
        &self.internals
    }

    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.internals.tag
    }

    /// Parses a dynamic value against this node.
    pub fn parse_value(&self, input: Value, ctx: &ParseContext) -> Result<Value, Vec<RawIssue>> {
        engine::parse_complex(self, input, ctx)
    }

    /// Whether an absent object key may be omitted from the output.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        let flags = self.internals.flags;
        if flags.non_optional {
            return false;
        }
        if flags.optional || flags.exact_optional {
            return true;
        }
        match &self.kind {
            Kind::Nilable(inner) => inner.is_optional(),
            Kind::Pipe(source, _) | Kind::Transform { source, .. } => source.is_optional(),
            Kind::Union(options) | Kind::Xor(options) => options.iter().any(|o| o.is_optional()),
            Kind::Lazy(lazy) => lazy.inner().is_some_and(|inner| inner.is_optional()),
            _ => false,
        }
    }

    /// Whether an explicit nil is accepted without a fallback.
    #[must_use]
    pub fn is_nilable(&self) -> bool {
        let flags = self.internals.flags;
        if flags.non_optional {
            return false;
        }
        if flags.nilable || flags.optional {
            return true;
        }
        match &self.kind {
            Kind::Optional(inner) | Kind::Nilable(inner) => inner.is_nilable(),
            Kind::Pipe(source, _) | Kind::Transform { source, .. } => source.is_nilable(),
            Kind::Union(options) | Kind::Xor(options) => options.iter().any(|o| o.is_nilable()),
            Kind::Lazy(lazy) => lazy.inner().is_some_and(|inner| inner.is_nilable()),
            _ => false,
        }
    }

    /// Whether this node has a default or prefault.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.internals.default.is_some() || self.internals.prefault.is_some()
    }

    /// Nil reaches the kind validator instead of being rejected.
    pub(crate) fn forwards_nil(&self) -> bool {
        match &self.kind {
            Kind::Literal(values) => values.iter().any(Value::is_null),
            Kind::Union(_)
            | Kind::Xor(_)
            | Kind::Intersection(..)
            | Kind::Optional(_)
            | Kind::Nilable(_)
            | Kind::NonOptional(_)
            | Kind::Default(_)
            | Kind::Prefault(_)
            | Kind::Pipe(..)
            | Kind::Transform { .. }
            | Kind::Lazy(_) => true,
            _ => false,
        }
    }
}
