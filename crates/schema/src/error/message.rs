//! Error message sources and the default message table

use super::issue::{IssueCode, RawIssue};
use crate::value::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Signature of a message-mapping function.
pub type MessageFn = Arc<dyn Fn(&RawIssue) -> Option<String> + Send + Sync>;

/// A custom error message: fixed text or a function of the issue.
///
/// A function returning `None` defers to the next message source.
///
/// ```rust,ignore
/// use zodiac_schema::error::ErrorMessage;
///
/// let fixed = ErrorMessage::from("Name required");
/// let mapped = ErrorMessage::map(|issue| {
///     (issue.code == IssueCode::TooSmall).then(|| "too short".to_string())
/// });
/// ```
#[derive(Clone)]
pub enum ErrorMessage {
    Text(Cow<'static, str>),
    Map(MessageFn),
}

impl ErrorMessage {
    pub fn text(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Text(text.into())
    }

    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&RawIssue) -> Option<String> + Send + Sync + 'static,
    {
        Self::Map(Arc::new(f))
    }

    /// Produces the message for `issue`, if this source has one.
    #[must_use]
    pub fn resolve(&self, issue: &RawIssue) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone().into_owned()),
            Self::Map(f) => f(issue),
        }
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Map(_) => f.write_str("Map(<fn>)"),
        }
    }
}

impl From<&'static str> for ErrorMessage {
    fn from(text: &'static str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for ErrorMessage {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl From<Cow<'static, str>> for ErrorMessage {
    fn from(text: Cow<'static, str>) -> Self {
        Self::Text(text)
    }
}

// ============================================================================
// DEFAULT TABLE
// ============================================================================

fn comparator(issue: &RawIssue, small: bool) -> &'static str {
    let inclusive = issue
        .property("inclusive")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let exact = issue.property("exact").and_then(Value::as_bool).unwrap_or(false);
    match (exact, small, inclusive) {
        (true, _, _) => "exactly",
        (false, true, true) => ">=",
        (false, true, false) => ">",
        (false, false, true) => "<=",
        (false, false, false) => "<",
    }
}

fn unit(origin: &str) -> &'static str {
    match origin {
        "string" => " characters",
        "array" | "set" | "tuple" => " items",
        "object" | "map" | "record" => " entries",
        "file" => " bytes",
        _ => "",
    }
}

fn describe_bound(issue: &RawIssue, key: &str, small: bool) -> String {
    let origin = issue
        .property("origin")
        .and_then(Value::as_str)
        .unwrap_or("value")
        .to_string();
    let bound = issue.property(key).map(Value::to_string).unwrap_or_default();
    let adjective = if small { "small" } else { "big" };
    format!(
        "Too {adjective}: expected {origin} to have {} {bound}{}",
        comparator(issue, small),
        unit(&origin)
    )
}

/// Built-in message for an issue, the last message source consulted.
#[must_use]
pub fn default_message(issue: &RawIssue) -> String {
    match issue.code {
        IssueCode::InvalidType => {
            let expected = issue.expected.as_deref().unwrap_or("value");
            format!("Invalid input: expected {expected}, received {}", issue.received())
        }
        IssueCode::InvalidFormat => {
            let format = issue
                .property("format")
                .and_then(Value::as_str)
                .unwrap_or("format");
            match issue.property("pattern").or_else(|| issue.property("prefix")) {
                Some(detail) => format!("Invalid string: must match {format} {detail}"),
                None => format!("Invalid {format}"),
            }
        }
        IssueCode::InvalidValue => match issue.property("values") {
            Some(values) => format!("Invalid option: expected one of {values}"),
            None => "Invalid input".to_string(),
        },
        IssueCode::TooSmall => describe_bound(issue, "minimum", true),
        IssueCode::TooBig => describe_bound(issue, "maximum", false),
        IssueCode::NotMultipleOf => {
            let divisor = issue
                .property("divisor")
                .map(Value::to_string)
                .unwrap_or_default();
            format!("Invalid number: must be a multiple of {divisor}")
        }
        IssueCode::InvalidKey => "Invalid key".to_string(),
        IssueCode::InvalidElement => "Invalid element".to_string(),
        IssueCode::InvalidUnion => "Invalid input".to_string(),
        IssueCode::InvalidXor => {
            let count = issue.property("count").map(Value::to_string).unwrap_or_default();
            format!("Invalid input: expected exactly one match, {count} options matched")
        }
        IssueCode::UnrecognizedKeys => {
            let keys = issue.property("keys").map(Value::to_string).unwrap_or_default();
            format!("Unrecognized key: {keys}")
        }
        IssueCode::NotFound => "Not found".to_string(),
        IssueCode::InvalidSchema => "Invalid schema".to_string(),
        IssueCode::Custom => "Invalid input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_type_message() {
        let issue = RawIssue::invalid_type("string").with_input(42);
        assert_eq!(
            default_message(&issue),
            "Invalid input: expected string, received number"
        );
    }

    #[test]
    fn test_too_small_message_for_string() {
        let issue = RawIssue::too_small("string", 3, true);
        assert_eq!(
            default_message(&issue),
            "Too small: expected string to have >= 3 characters"
        );
    }

    #[test]
    fn test_too_big_exclusive_number() {
        let issue = RawIssue::too_big("number", 10, false);
        assert_eq!(default_message(&issue), "Too big: expected number to have < 10");
    }

    #[test]
    fn test_map_message_can_defer() {
        let message = ErrorMessage::map(|issue| {
            (issue.code == IssueCode::TooSmall).then(|| "short".to_string())
        });
        assert_eq!(
            message.resolve(&RawIssue::too_small("string", 1, true)).as_deref(),
            Some("short")
        );
        assert_eq!(message.resolve(&RawIssue::invalid_type("string")), None);
    }
}
