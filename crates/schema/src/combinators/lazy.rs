//! LAZY combinator - deferred, memoized schema definition
//!
//! The factory runs at most once, on first use, even under concurrent
//! parses. A lazy re-entered by the thread that is still resolving it does
//! not deadlock: the re-entrant parse reports a marked `invalid_type`
//! (expected `lazy`) and the nearest enclosing lazy treats a failure made
//! only of such issues as the recursion anchor.
//!
//! # Examples
//!
//! ```rust,ignore
//! use zodiac_schema::prelude::*;
//!
//! let list = recursive(|this| {
//!     ObjectSchema::new()
//!         .field("value", int())
//!         .field("next", this.optional())
//! });
//! list.parse(json!({"value": 1, "next": {"value": 2, "next": null}}))?;
//! ```

use crate::context::ParseContext;
use crate::engine::{parse_complex, Flow};
use crate::error::{IssueCode, IssueMarker, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode, SchemaRef};
use crate::payload::ParsePayload;
use crate::schema::{DynSchema, SchemaType};
use crate::value::{DecodeError, Value};
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};
use tracing::{debug, trace};

// ============================================================================
// RESOLUTION CELL
// ============================================================================

/// Resolution state of a lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Unresolved,
    Resolving,
    Resolved,
}

type Factory = Box<dyn Fn() -> SchemaRef + Send + Sync>;

pub(crate) struct LazyCell {
    factory: Factory,
    cell: OnceLock<SchemaRef>,
    /// Thread currently running the factory.
    owner: Mutex<Option<ThreadId>>,
}

impl LazyCell {
    fn new(factory: Factory) -> Self {
        Self {
            factory,
            cell: OnceLock::new(),
            owner: Mutex::new(None),
        }
    }

    /// Resolves the inner schema. `None` when called from inside the factory.
    fn get(&self) -> Option<SchemaRef> {
        if let Some(inner) = self.cell.get() {
            return Some(inner.clone());
        }

        let current = thread::current().id();
        if *self.owner.lock() == Some(current) {
            return None;
        }

        let inner = self.cell.get_or_init(|| {
            let _owner = OwnerGuard::claim(&self.owner, current);
            debug!("resolving lazy schema");
            (self.factory)()
        });
        Some(inner.clone())
    }

    fn resolution(&self) -> Resolution {
        if self.cell.get().is_some() {
            Resolution::Resolved
        } else if self.owner.lock().is_some() {
            Resolution::Resolving
        } else {
            Resolution::Unresolved
        }
    }
}

/// Marks the resolving thread; released on return or unwind.
struct OwnerGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> OwnerGuard<'a> {
    fn claim(owner: &'a Mutex<Option<ThreadId>>, thread: ThreadId) -> Self {
        *owner.lock() = Some(thread);
        Self(owner)
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

/// Link from a lazy node to its cell.
///
/// The handle returned to callers owns the cell; self references created by
/// [`recursive`] only observe it, so a recursive schema is not a reference
/// cycle.
#[derive(Clone)]
pub(crate) enum LazyRef {
    Strong(Arc<LazyCell>),
    Weak(Weak<LazyCell>),
}

impl LazyRef {
    fn cell(&self) -> Option<Arc<LazyCell>> {
        match self {
            Self::Strong(cell) => Some(cell.clone()),
            Self::Weak(cell) => cell.upgrade(),
        }
    }

    /// The resolved inner schema, resolving it if needed.
    pub(crate) fn inner(&self) -> Option<SchemaRef> {
        self.cell().and_then(|cell| cell.get())
    }
}

impl fmt::Debug for LazyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.cell().map(|cell| cell.resolution());
        match self {
            Self::Strong(_) => f.debug_tuple("Strong").field(&state).finish(),
            Self::Weak(_) => f.debug_tuple("Weak").field(&state).finish(),
        }
    }
}

// ============================================================================
// LAZY SCHEMA
// ============================================================================

/// Schema whose definition is produced on first use.
pub struct LazySchema<S> {
    node: SchemaRef,
    _inner: PhantomData<fn() -> S>,
}

impl<S> LazySchema<S> {
    fn from_cell(cell: Arc<LazyCell>) -> Self {
        Self {
            node: SchemaNode::new(TypeTag::Lazy, Kind::Lazy(LazyRef::Strong(cell))),
            _inner: PhantomData,
        }
    }

    fn lazy_ref(&self) -> Option<&LazyRef> {
        match &self.node.kind {
            Kind::Lazy(lazy_ref) => Some(lazy_ref),
            _ => None,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.lazy_ref()
            .and_then(LazyRef::cell)
            .map_or(Resolution::Unresolved, |cell| cell.resolution())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution() == Resolution::Resolved
    }

    /// Forces resolution and returns the inner schema.
    pub fn force(&self) -> Option<DynSchema> {
        self.lazy_ref()
            .and_then(LazyRef::inner)
            .map(DynSchema::from_ref)
    }
}

impl<S> Clone for LazySchema<S> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            _inner: PhantomData,
        }
    }
}

impl<S> fmt::Debug for LazySchema<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema")
            .field("id", &self.node.internals.id)
            .field("resolution", &self.resolution())
            .finish()
    }
}

impl<S: SchemaType> SchemaType for LazySchema<S> {
    type Output = S::Output;

    fn node(&self) -> &SchemaRef {
        &self.node
    }

    fn with_node(&self, node: SchemaRef) -> Self {
        Self {
            node,
            _inner: PhantomData,
        }
    }

    fn decode(value: Value) -> Result<Self::Output, DecodeError> {
        S::decode(value)
    }
}

/// Defers building the schema until first use.
pub fn lazy<S, F>(factory: F) -> LazySchema<S>
where
    S: SchemaType,
    F: Fn() -> S + Send + Sync + 'static,
{
    LazySchema::from_cell(Arc::new(LazyCell::new(Box::new(move || {
        factory().node().clone()
    }))))
}

/// Lazy schema whose factory receives a handle to the schema itself.
pub fn recursive<S, F>(factory: F) -> LazySchema<S>
where
    S: SchemaType,
    F: Fn(DynSchema) -> S + Send + Sync + 'static,
{
    let cell = Arc::new_cyclic(|weak: &Weak<LazyCell>| {
        let this = DynSchema::from_ref(SchemaNode::new(
            TypeTag::Lazy,
            Kind::Lazy(LazyRef::Weak(weak.clone())),
        ));
        LazyCell::new(Box::new(move || factory(this.clone()).node().clone()))
    });
    LazySchema::from_cell(cell)
}

pub(crate) fn validate(
    lazy_ref: &LazyRef,
    node: &SchemaNode,
    payload: &mut ParsePayload,
    ctx: &ParseContext,
) -> Flow {
    let Some(cell) = lazy_ref.cell() else {
        payload.add_issue(
            RawIssue::new(IssueCode::InvalidSchema)
                .with_message("recursive schema used after its owner was dropped"),
        );
        return ControlFlow::Break(());
    };

    let Some(inner) = cell.get() else {
        trace!(schema = %node.internals.id, "lazy schema re-entered while resolving");
        payload.add_issue(RawIssue::invalid_type("lazy").with_marker(IssueMarker::LazyReentry));
        return ControlFlow::Break(());
    };

    match parse_complex(&inner, payload.value().clone(), ctx) {
        Ok(value) => {
            payload.set_value(value);
            ControlFlow::Continue(())
        }
        Err(issues) if issues.iter().all(RawIssue::is_lazy_reentry) => {
            trace!(schema = %node.internals.id, "anchoring lazy recursion");
            ControlFlow::Continue(())
        }
        Err(issues) => {
            payload.extend_issues(issues);
            ControlFlow::Break(())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::object::ObjectSchema;
    use crate::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lazy_not_resolved_before_use() {
        let calls = Arc::new(AtomicUsize::new(0));
        let count = calls.clone();
        let schema = lazy(move || {
            count.fetch_add(1, Ordering::SeqCst);
            string()
        });

        assert_eq!(schema.resolution(), Resolution::Unresolved);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(schema.parse("a").unwrap(), "a");
        assert_eq!(schema.parse("b").unwrap(), "b");
        assert!(schema.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recursive_linked_list() {
        let calls = Arc::new(AtomicUsize::new(0));
        let count = calls.clone();
        let list = recursive(move |this| {
            count.fetch_add(1, Ordering::SeqCst);
            ObjectSchema::new().field("v", int()).field("next", this.optional())
        });

        let input = json!({"v": 1, "next": {"v": 2, "next": null}});
        let out = list.parse(input.clone()).unwrap();
        assert_eq!(Value::Object(out), Value::from(input));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recursive_reports_nested_paths() {
        let list = recursive(|this| ObjectSchema::new().field("v", int()).field("next", this.optional()));
        let err = list
            .parse(json!({"v": 1, "next": {"v": "x"}}))
            .unwrap_err();
        assert_eq!(err.first().path_string(), "next.v");
    }

    #[test]
    fn test_reentry_inside_factory_is_marked() {
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let schema = recursive(move |this| {
            *slot.lock() = Some(this.parse_value("x"));
            string()
        });

        assert_eq!(schema.parse("ok").unwrap(), "ok");
        let reentrant = seen.lock().take().unwrap();
        let err = reentrant.unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidType);
        assert_eq!(err.first().expected.as_deref(), Some("lazy"));
    }

    #[test]
    fn test_enclosing_lazy_anchors_reentry() {
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let schema = recursive(move |this| {
            let probe = lazy(move || this.clone());
            *slot.lock() = Some(probe.parse_value(7));
            int()
        });

        assert_eq!(schema.parse(3).unwrap(), 3);
        let anchored = seen.lock().take().unwrap();
        assert_eq!(anchored.unwrap(), Value::Int(7));
    }

    #[test]
    fn test_reentrant_flag_query_does_not_deadlock() {
        let schema = recursive(|this| {
            assert!(!this.is_optional());
            string()
        });
        assert!(schema.parse("a").is_ok());
    }

    #[test]
    fn test_factory_panic_leaves_lazy_retryable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let count = calls.clone();
        let schema = lazy(move || {
            if count.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first build fails");
            }
            string()
        });

        let first = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| schema.parse("a")));
        assert!(first.is_err());
        assert_eq!(schema.resolution(), Resolution::Unresolved);

        assert_eq!(schema.parse("a").unwrap(), "a");
        assert_eq!(schema.resolution(), Resolution::Resolved);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_force_returns_inner() {
        let schema = lazy(|| int().gte(1));
        let inner = schema.force().unwrap();
        assert_eq!(inner.type_tag(), TypeTag::Number);
        assert!(schema.parse(0).is_err());
    }
}
