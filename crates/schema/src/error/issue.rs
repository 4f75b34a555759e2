//! Issue records produced while parsing
//!
//! Validators emit [`RawIssue`]s. They carry the code, location and
//! parameters of a failure but not necessarily a message. When a parse
//! fails, raw issues are finalized into [`Issue`]s with a resolved message.

use super::message::ErrorMessage;
use crate::value::Value;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// ISSUE CODE
// ============================================================================

/// Machine-readable category of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Input has the wrong shape or type.
    InvalidType,
    /// String does not match a format or pattern.
    InvalidFormat,
    /// Input is not one of the allowed values.
    InvalidValue,
    /// Value, length or size is below the minimum.
    TooSmall,
    /// Value, length or size is above the maximum.
    TooBig,
    /// Number is not a multiple of the step.
    NotMultipleOf,
    /// Map or record key failed validation.
    InvalidKey,
    /// Collection element failed validation.
    InvalidElement,
    /// No union option matched.
    InvalidUnion,
    /// More than one exclusive option matched.
    InvalidXor,
    /// Strict object received keys it does not know.
    UnrecognizedKeys,
    /// Requested item does not exist.
    NotFound,
    /// Schema definition cannot be used.
    InvalidSchema,
    /// Raised by a user check.
    Custom,
}

impl IssueCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidValue => "invalid_value",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::NotMultipleOf => "not_multiple_of",
            Self::InvalidKey => "invalid_key",
            Self::InvalidElement => "invalid_element",
            Self::InvalidUnion => "invalid_union",
            Self::InvalidXor => "invalid_xor",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::NotFound => "not_found",
            Self::InvalidSchema => "invalid_schema",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PATH
// ============================================================================

/// One step of an issue path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object field or string map key.
    Key(String),
    /// Array or tuple position.
    Index(usize),
    /// Non-string map key.
    Value(Value),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Value> for PathSegment {
    /// String values become keys, anything else is kept as a value marker.
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Key(s),
            other => Self::Value(other),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Ordered location of an issue inside the input.
pub type Path = SmallVec<[PathSegment; 8]>;

/// Issue parameters such as `minimum` or `format`.
pub type Properties = SmallVec<[(Cow<'static, str>, Value); 4]>;

/// Renders a path as `items[0].name`.
#[must_use]
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
            PathSegment::Value(value) => {
                out.push('[');
                out.push_str(&value.to_string());
                out.push(']');
            }
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
        }
    }
    out
}

// ============================================================================
// RAW ISSUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IssueMarker {
    /// Emitted by a lazy schema re-entered while it was resolving.
    LazyReentry,
}

/// An issue as emitted by a validator, before message resolution.
///
/// # Examples
///
/// ```rust,ignore
/// use zodiac_schema::error::{IssueCode, RawIssue};
///
/// let issue = RawIssue::new(IssueCode::TooSmall)
///     .with_property("minimum", 3)
///     .with_property("origin", "string");
/// assert_eq!(issue.property("minimum").and_then(|v| v.as_i64()), Some(3));
/// ```
#[derive(Debug, Clone)]
#[must_use = "issues do nothing unless added to a payload"]
pub struct RawIssue {
    /// Issue category.
    pub code: IssueCode,
    /// Explicit message; wins over every other message source.
    pub message: Option<String>,
    /// Expected type name for `invalid_type`.
    pub expected: Option<Cow<'static, str>>,
    /// Offending input. `None` means the input was absent.
    pub input: Option<Value>,
    /// Location relative to the schema that reported it.
    pub path: Path,
    /// Code-specific parameters.
    pub properties: Properties,
    /// Per-option issues of a failed union.
    pub errors: Vec<Vec<RawIssue>>,
    pub(crate) schema_error: Option<ErrorMessage>,
    pub(crate) marker: Option<IssueMarker>,
}

impl RawIssue {
    pub fn new(code: IssueCode) -> Self {
        Self {
            code,
            message: None,
            expected: None,
            input: None,
            path: Path::new(),
            properties: Properties::new(),
            errors: Vec::new(),
            schema_error: None,
            marker: None,
        }
    }

    /// `invalid_type` issue with the expected type name.
    pub fn invalid_type(expected: impl Into<Cow<'static, str>>) -> Self {
        Self::new(IssueCode::InvalidType).with_expected(expected)
    }

    /// `custom` issue with an explicit message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueCode::Custom).with_message(message)
    }

    /// `too_small` issue for the given origin (`string`, `number`, ...).
    pub fn too_small(origin: &'static str, minimum: impl Into<Value>, inclusive: bool) -> Self {
        Self::new(IssueCode::TooSmall)
            .with_property("origin", origin)
            .with_property("minimum", minimum)
            .with_property("inclusive", inclusive)
    }

    /// `too_big` issue for the given origin.
    pub fn too_big(origin: &'static str, maximum: impl Into<Value>, inclusive: bool) -> Self {
        Self::new(IssueCode::TooBig)
            .with_property("origin", origin)
            .with_property("maximum", maximum)
            .with_property("inclusive", inclusive)
    }

    /// `invalid_format` issue naming the format.
    pub fn invalid_format(format: &'static str) -> Self {
        Self::new(IssueCode::InvalidFormat).with_property("format", format)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<Cow<'static, str>>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<Value>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Appends a segment to the end of the path.
    pub fn with_path(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.push(segment.into());
        self
    }

    pub fn with_property(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.properties.push((Cow::Borrowed(key), value.into()));
        self
    }

    pub fn with_errors(mut self, errors: Vec<Vec<RawIssue>>) -> Self {
        self.errors = errors;
        self
    }

    pub(crate) fn with_marker(mut self, marker: IssueMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Inserts a segment at the front of the path.
    pub fn prefix_path(&mut self, segment: impl Into<PathSegment>) {
        self.path.insert(0, segment.into());
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Name of the received input's type, `undefined` when absent.
    #[must_use]
    pub fn received(&self) -> &'static str {
        self.input.as_ref().map_or("undefined", |v| v.kind().name())
    }

    pub(crate) fn is_lazy_reentry(&self) -> bool {
        self.marker == Some(IssueMarker::LazyReentry)
    }
}

// ============================================================================
// ISSUE
// ============================================================================

/// A finalized issue with its resolved message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Path,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(
        skip_serializing_if = "SmallVec::is_empty",
        serialize_with = "serialize_properties"
    )]
    pub properties: Properties,
    /// Per-option issues of a failed union.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Vec<Issue>>,
}

impl Issue {
    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Path rendered as `items[0].name`.
    #[must_use]
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "{}: [{}] {}", self.path_string(), self.code, self.message)
        }
    }
}

fn serialize_properties<S: Serializer>(props: &Properties, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(props.iter().map(|(k, v)| (k.as_ref(), v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path_mixes_keys_and_indices() {
        let path: Path = smallvec::smallvec![
            PathSegment::from("items"),
            PathSegment::from(0usize),
            PathSegment::from("name"),
        ];
        assert_eq!(format_path(&path), "items[0].name");
    }

    #[test]
    fn test_non_string_key_segment() {
        assert_eq!(PathSegment::from(Value::Int(7)), PathSegment::Value(Value::Int(7)));
        assert_eq!(PathSegment::from(Value::from("k")), PathSegment::Key("k".into()));
    }

    #[test]
    fn test_received_for_absent_input() {
        let issue = RawIssue::invalid_type("string");
        assert_eq!(issue.received(), "undefined");
        assert_eq!(issue.with_input(1).received(), "number");
    }

    #[test]
    fn test_prefix_path() {
        let mut issue = RawIssue::custom("bad").with_path("b");
        issue.prefix_path("a");
        assert_eq!(format_path(&issue.path), "a.b");
    }

    #[test]
    fn test_issue_serializes_properties_as_map() {
        let issue = Issue {
            code: IssueCode::TooSmall,
            path: Path::new(),
            message: "too small".into(),
            expected: None,
            input: None,
            properties: smallvec::smallvec![(Cow::Borrowed("minimum"), Value::Int(3))],
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "too_small");
        assert_eq!(json["properties"]["minimum"], 3);
        assert!(json.get("errors").is_none());
    }
}
