//! User-defined checks and value overwrites

use super::{Check, CheckDef};
use crate::error::{ErrorMessage, IssueCode, RawIssue};
use crate::payload::ParsePayload;
use crate::value::Value;
use std::sync::Arc;

/// Check body that inspects the payload and records issues.
pub type CustomFn = Arc<dyn Fn(&mut ParsePayload) + Send + Sync>;

/// Pure function replacing the payload value.
pub type OverwriteFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

impl Check {
    /// Check with full access to the payload.
    ///
    /// ```rust,ignore
    /// let even = Check::custom(|payload| {
    ///     if payload.value().as_i64().is_some_and(|n| n % 2 != 0) {
    ///         payload.fail("must be even");
    ///     }
    /// });
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut ParsePayload) + Send + Sync + 'static,
    {
        Self::new(CheckDef::Custom(Arc::new(f)))
    }

    /// Check that fails with a `custom` issue when `predicate` returns false.
    pub fn refine<F>(predicate: F, message: impl Into<ErrorMessage>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::custom(move |payload| {
            if !predicate(payload.value()) {
                payload.add_issue(RawIssue::new(IssueCode::Custom));
            }
        })
        .with_message(message)
    }

    /// Replaces the value without raising issues.
    pub fn overwrite<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::new(CheckDef::Overwrite(Arc::new(f)))
    }

    /// Overwrite applied to string values only.
    pub(crate) fn map_string<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::overwrite(move |value| match value {
            Value::String(s) => Value::String(f(&s)),
            other => other,
        })
    }
}
