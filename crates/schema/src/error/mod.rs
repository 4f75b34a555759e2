//! Error types
//!
//! - [`RawIssue`] is what validators emit.
//! - [`Issue`] is the finalized record with a resolved message.
//! - [`ValidationError`] is returned by a failed parse and owns every issue.
//! - [`SchemaError`] reports a schema that cannot be built.
//!
//! Message resolution order, first hit wins: the issue's own message, the
//! schema-level error, the per-parse error, the global error, the default
//! table.

mod issue;
mod message;

pub use issue::{format_path, Issue, IssueCode, Path, PathSegment, Properties, RawIssue};
pub(crate) use issue::IssueMarker;
pub use message::{default_message, ErrorMessage, MessageFn};

use crate::config;
use crate::context::ParseContext;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A failed parse. Always holds at least one issue.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

fn render_issues(issues: &[Issue]) -> String {
    if let [single] = issues {
        return single.to_string();
    }
    let mut out = format!("Validation failed with {} issues:", issues.len());
    for (i, issue) in issues.iter().enumerate() {
        out.push_str(&format!("\n  {}. {issue}", i + 1));
    }
    out
}

impl ValidationError {
    /// Finalizes raw issues against the per-parse and global message sources.
    pub(crate) fn from_raw(raw: Vec<RawIssue>, ctx: &ParseContext) -> Self {
        debug_assert!(!raw.is_empty(), "a failed parse must carry issues");
        let global = config::global_error();
        let issues = raw
            .into_iter()
            .map(|issue| finalize(issue, ctx, global.as_ref()))
            .collect();
        Self { issues }
    }

    /// Wraps already finalized issues. Returns `None` for an empty list.
    #[must_use]
    pub fn from_issues(issues: Vec<Issue>) -> Option<Self> {
        (!issues.is_empty()).then_some(Self { issues })
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// First issue; a validation error is never empty.
    #[must_use]
    pub fn first(&self) -> &Issue {
        &self.issues[0]
    }

    /// Groups messages by top-level field.
    ///
    /// Issues with an empty path land in `form_errors`.
    #[must_use]
    pub fn flatten(&self) -> FlattenedErrors {
        let mut flat = FlattenedErrors::default();
        for issue in &self.issues {
            match issue.path.first() {
                Some(segment) => flat
                    .field_errors
                    .entry(segment.to_string())
                    .or_default()
                    .push(issue.message.clone()),
                None => flat.form_errors.push(issue.message.clone()),
            }
        }
        flat
    }

    /// Issues as a JSON array.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.issues).unwrap_or(serde_json::Value::Null)
    }
}

/// Messages grouped by the first path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenedErrors {
    pub form_errors: Vec<String>,
    pub field_errors: IndexMap<String, Vec<String>>,
}

fn finalize(raw: RawIssue, ctx: &ParseContext, global: Option<&ErrorMessage>) -> Issue {
    let message = raw
        .message
        .clone()
        .or_else(|| raw.schema_error.as_ref().and_then(|m| m.resolve(&raw)))
        .or_else(|| ctx.error().and_then(|m| m.resolve(&raw)))
        .or_else(|| global.and_then(|m| m.resolve(&raw)))
        .unwrap_or_else(|| default_message(&raw));

    let RawIssue {
        code,
        expected,
        input,
        path,
        properties,
        errors,
        ..
    } = raw;

    Issue {
        code,
        path,
        message,
        expected,
        input,
        properties,
        errors: errors
            .into_iter()
            .map(|branch| {
                branch
                    .into_iter()
                    .map(|issue| finalize(issue, ctx, global))
                    .collect()
            })
            .collect(),
    }
}

// ============================================================================
// SCHEMA ERROR
// ============================================================================

/// A schema definition that cannot be built.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid bounds: minimum {min} is greater than maximum {max}")]
    InvalidBounds { min: String, max: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> ParseContext {
        ParseContext::new()
    }

    #[test]
    fn test_explicit_message_wins() {
        let raw = RawIssue::custom("explicit");
        let err = ValidationError::from_raw(vec![raw], &ctx().with_error("ctx"));
        assert_eq!(err.first().message, "explicit");
    }

    #[test]
    fn test_schema_error_beats_context_error() {
        let mut raw = RawIssue::invalid_type("string");
        raw.schema_error = Some(ErrorMessage::from("schema"));
        let err = ValidationError::from_raw(vec![raw], &ctx().with_error("ctx"));
        assert_eq!(err.first().message, "schema");
    }

    #[test]
    fn test_context_error_used_when_schema_defers() {
        let mut raw = RawIssue::invalid_type("string");
        raw.schema_error = Some(ErrorMessage::map(|_| None));
        let err = ValidationError::from_raw(vec![raw], &ctx().with_error("ctx"));
        assert_eq!(err.first().message, "ctx");
    }

    #[test]
    fn test_falls_back_to_default_table() {
        let raw = RawIssue::invalid_type("string").with_input(1);
        let err = ValidationError::from_raw(vec![raw], &ctx());
        assert_eq!(err.first().message, "Invalid input: expected string, received number");
    }

    #[test]
    fn test_flatten_groups_by_field() {
        let raws = vec![
            RawIssue::custom("bad name").with_path("name"),
            RawIssue::custom("bad age").with_path("age"),
            RawIssue::custom("also name").with_path("name"),
            RawIssue::custom("root"),
        ];
        let flat = ValidationError::from_raw(raws, &ctx()).flatten();
        assert_eq!(flat.form_errors, vec!["root".to_string()]);
        assert_eq!(
            flat.field_errors.get("name"),
            Some(&vec!["bad name".to_string(), "also name".to_string()])
        );
    }

    #[test]
    fn test_display_lists_issues() {
        let raws = vec![
            RawIssue::custom("first").with_path("a"),
            RawIssue::custom("second"),
        ];
        let rendered = ValidationError::from_raw(raws, &ctx()).to_string();
        assert!(rendered.starts_with("Validation failed with 2 issues:"));
        assert!(rendered.contains("a: [custom] first"));
    }

    #[test]
    fn test_nested_union_errors_are_finalized() {
        let raw = RawIssue::new(IssueCode::InvalidUnion)
            .with_errors(vec![vec![RawIssue::invalid_type("string").with_input(1)]]);
        let err = ValidationError::from_raw(vec![raw], &ctx());
        assert_eq!(
            err.first().errors[0][0].message,
            "Invalid input: expected string, received number"
        );
    }
}
