//! Per-schema metadata shared by every schema kind

use crate::check::Check;
use crate::error::ErrorMessage;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// IDENTITY
// ============================================================================

/// Unique identity of a schema instance. Every derivation gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl SchemaId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discriminator of a schema's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    String,
    Number,
    Bool,
    Date,
    File,
    Any,
    Unknown,
    Never,
    Literal,
    Enum,
    Array,
    Set,
    Map,
    Record,
    Object,
    Tuple,
    Union,
    Xor,
    Intersection,
    Optional,
    Nilable,
    NonOptional,
    Default,
    Prefault,
    Pipe,
    Transform,
    Lazy,
}

impl TypeTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Date => "date",
            Self::File => "file",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Literal => "literal",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Set => "set",
            Self::Map => "map",
            Self::Record => "record",
            Self::Object => "object",
            Self::Tuple => "tuple",
            Self::Union => "union",
            Self::Xor => "xor",
            Self::Intersection => "intersection",
            Self::Optional => "optional",
            Self::Nilable => "nilable",
            Self::NonOptional => "non_optional",
            Self::Default => "default",
            Self::Prefault => "prefault",
            Self::Pipe => "pipe",
            Self::Transform => "transform",
            Self::Lazy => "lazy",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FLAGS AND FALLBACKS
// ============================================================================

/// Nil-handling and coercion switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Nil and absent keys are accepted.
    pub optional: bool,
    /// Explicit nil is accepted.
    pub nilable: bool,
    /// Nil is rejected even where a wrapped schema would accept it.
    pub non_optional: bool,
    /// Absent keys are accepted, explicit nil is not.
    pub exact_optional: bool,
    /// Input is converted to the target primitive before validation.
    pub coerce: bool,
}

/// A default or prefault: a fixed value or a factory called per use.
#[derive(Clone)]
pub enum Fallback {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Fallback {
    /// Produces the fallback value; factories run on every call.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(<fn>)"),
        }
    }
}

// ============================================================================
// PARAMS
// ============================================================================

/// Optional constructor parameters shared by every schema kind.
///
/// ```rust,ignore
/// let name = string_with(SchemaParams::new().error("Name required").describe("user name"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaParams {
    pub(crate) error: Option<ErrorMessage>,
    pub(crate) coerce: bool,
    pub(crate) description: Option<String>,
    pub(crate) meta: Option<Value>,
}

impl SchemaParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn error(mut self, error: impl Into<ErrorMessage>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn meta(mut self, meta: impl Into<Value>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

// ============================================================================
// INTERNALS
// ============================================================================

/// Metadata every schema node carries.
#[derive(Debug, Clone)]
pub struct Internals {
    pub(crate) id: SchemaId,
    pub(crate) tag: TypeTag,
    pub(crate) checks: Vec<Check>,
    pub(crate) flags: Flags,
    pub(crate) default: Option<Fallback>,
    pub(crate) prefault: Option<Fallback>,
    pub(crate) error: Option<ErrorMessage>,
    pub(crate) description: Option<String>,
    pub(crate) meta: Option<Value>,
}

impl Internals {
    pub(crate) fn new(tag: TypeTag) -> Self {
        Self {
            id: SchemaId::next(),
            tag,
            checks: Vec::new(),
            flags: Flags::default(),
            default: None,
            prefault: None,
            error: None,
            description: None,
            meta: None,
        }
    }

    /// Copy with a fresh identity. Checks are shared, not re-created.
    pub(crate) fn fork(&self) -> Self {
        Self {
            id: SchemaId::next(),
            ..self.clone()
        }
    }

    pub(crate) fn set_optional(&mut self) {
        self.flags.optional = true;
        self.flags.non_optional = false;
    }

    pub(crate) fn set_nilable(&mut self) {
        self.flags.nilable = true;
        self.flags.non_optional = false;
    }

    pub(crate) fn set_exact_optional(&mut self) {
        self.flags.exact_optional = true;
        self.flags.non_optional = false;
    }

    /// Marks nil as rejected and clears the optional flags.
    pub(crate) fn set_non_optional(&mut self) {
        self.flags.non_optional = true;
        self.flags.optional = false;
        self.flags.exact_optional = false;
    }

    pub(crate) fn apply(&mut self, params: SchemaParams) {
        if let Some(error) = params.error {
            self.error = Some(error);
        }
        if params.coerce {
            self.flags.coerce = true;
        }
        if let Some(description) = params.description {
            self.description = Some(description);
        }
        if let Some(meta) = params.meta {
            self.meta = Some(meta);
        }
    }

    #[must_use]
    pub const fn id(&self) -> SchemaId {
        self.id
    }

    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    #[must_use]
    pub fn default(&self) -> Option<&Fallback> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn prefault(&self) -> Option<&Fallback> {
        self.prefault.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorMessage> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_changes_identity_only() {
        let mut base = Internals::new(TypeTag::String);
        base.checks.push(Check::min_length(1));
        let forked = base.fork();
        assert_ne!(base.id, forked.id);
        assert_eq!(forked.checks.len(), 1);
        assert_eq!(forked.tag, TypeTag::String);
    }

    #[test]
    fn test_non_optional_clears_optional() {
        let mut internals = Internals::new(TypeTag::String);
        internals.set_optional();
        internals.set_non_optional();
        assert!(!internals.flags.optional);
        assert!(internals.flags.non_optional);

        internals.set_optional();
        assert!(!internals.flags.non_optional);
    }

    #[test]
    fn test_factory_runs_per_resolve() {
        use std::sync::atomic::AtomicUsize;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fallback = Fallback::Factory(Arc::new(move || {
            Value::from(counter.fetch_add(1, Ordering::SeqCst) as i64)
        }));
        assert_eq!(fallback.resolve(), Value::Int(0));
        assert_eq!(fallback.resolve(), Value::Int(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
