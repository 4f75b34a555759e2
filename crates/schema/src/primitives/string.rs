//! String schema

use crate::check::{Check, StringFormat};
use crate::engine::Flow;
use crate::error::{RawIssue, SchemaError};
use crate::internals::{SchemaParams, TypeTag};
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::schema::{Carrier, Nullable, SchemaExt};
use crate::value::Value;
use chrono::SecondsFormat;
use regex::Regex;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting UTF-8 strings.
    ///
    /// Lengths are counted in chars, not bytes.
    ///
    /// ```rust,ignore
    /// let username = string().trim().min(3).max(20).pattern(r"^[a-z0-9_]+$");
    /// ```
    StringSchema<> => String
}

/// Schema accepting a string.
pub fn string() -> StringSchema {
    StringSchema::from_node(SchemaNode::new(TypeTag::String, Kind::String))
}

/// String schema whose output is `Option<String>`.
pub fn string_ptr() -> StringSchema<Nullable> {
    string().optional()
}

pub fn string_with(params: SchemaParams) -> StringSchema {
    string().with_params(params)
}

pub(crate) fn validate(payload: &mut ParsePayload) -> Flow {
    if matches!(payload.value(), Value::String(_)) {
        ControlFlow::Continue(())
    } else {
        payload.add_issue(RawIssue::invalid_type("string"));
        ControlFlow::Break(())
    }
}

/// Numbers use their shortest round-trip form, booleans `true`/`false`.
pub(crate) fn coerce(input: Value) -> Result<Value, RawIssue> {
    match input {
        Value::String(_) => Ok(input),
        Value::Int(i) => Ok(Value::String(i.to_string())),
        Value::Float(f) => Ok(Value::String(f.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::DateTime(dt) => Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        other => Err(RawIssue::invalid_type("string").with_input(other)),
    }
}

impl<C: Carrier<String>> StringSchema<C> {
    /// Minimum length, inclusive.
    pub fn min(self, n: usize) -> Self {
        self.check(Check::min_length(n))
    }

    /// Maximum length, inclusive.
    pub fn max(self, n: usize) -> Self {
        self.check(Check::max_length(n))
    }

    /// Exact length.
    pub fn length(self, n: usize) -> Self {
        self.check(Check::length(n))
    }

    pub fn non_empty(self) -> Self {
        self.min(1)
    }

    /// Inclusive length range.
    pub fn length_range(self, min: usize, max: usize) -> Result<Self, SchemaError> {
        if min > max {
            return Err(SchemaError::InvalidBounds {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(self.min(min).max(max))
    }

    /// Must match a compiled regex.
    pub fn regex(self, re: Regex) -> Self {
        self.check(Check::pattern(re))
    }

    /// Must match `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Use
    /// [`try_pattern`](Self::try_pattern) for patterns built at runtime.
    pub fn pattern(self, pattern: &str) -> Self {
        match self.try_pattern(pattern) {
            Ok(schema) => schema,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        let re = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.regex(re))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.check(Check::starts_with(prefix))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.check(Check::ends_with(suffix))
    }

    pub fn includes(self, needle: impl Into<String>) -> Self {
        self.check(Check::includes(needle))
    }

    pub fn format(self, format: StringFormat) -> Self {
        self.check(Check::format(format))
    }

    pub fn email(self) -> Self {
        self.format(StringFormat::Email)
    }

    pub fn url(self) -> Self {
        self.format(StringFormat::Url)
    }

    pub fn uuid(self) -> Self {
        self.format(StringFormat::Uuid)
    }

    pub fn ipv4(self) -> Self {
        self.format(StringFormat::Ipv4)
    }

    pub fn ipv6(self) -> Self {
        self.format(StringFormat::Ipv6)
    }

    pub fn cuid(self) -> Self {
        self.format(StringFormat::Cuid)
    }

    pub fn cuid2(self) -> Self {
        self.format(StringFormat::Cuid2)
    }

    pub fn ulid(self) -> Self {
        self.format(StringFormat::Ulid)
    }

    pub fn xid(self) -> Self {
        self.format(StringFormat::Xid)
    }

    pub fn ksuid(self) -> Self {
        self.format(StringFormat::Ksuid)
    }

    pub fn nanoid(self) -> Self {
        self.format(StringFormat::NanoId)
    }

    /// Must contain parseable JSON.
    pub fn json(self) -> Self {
        self.format(StringFormat::Json)
    }

    pub fn emoji(self) -> Self {
        self.format(StringFormat::Emoji)
    }

    pub fn jwt(self) -> Self {
        self.format(StringFormat::Jwt)
    }

    pub fn base64(self) -> Self {
        self.format(StringFormat::Base64)
    }

    pub fn base64url(self) -> Self {
        self.format(StringFormat::Base64Url)
    }

    pub fn hex(self) -> Self {
        self.format(StringFormat::Hex)
    }

    pub fn e164(self) -> Self {
        self.format(StringFormat::E164)
    }

    /// ISO 8601 date-time. The output stays a string.
    pub fn datetime(self) -> Self {
        self.format(StringFormat::IsoDateTime)
    }

    pub fn date(self) -> Self {
        self.format(StringFormat::IsoDate)
    }

    pub fn time(self) -> Self {
        self.format(StringFormat::IsoTime)
    }

    pub fn duration(self) -> Self {
        self.format(StringFormat::IsoDuration)
    }

    /// Rejects strings containing uppercase characters.
    pub fn lowercase(self) -> Self {
        self.format(StringFormat::Lowercase)
    }

    /// Rejects strings containing lowercase characters.
    pub fn uppercase(self) -> Self {
        self.format(StringFormat::Uppercase)
    }

    /// Trims surrounding whitespace before later checks run.
    pub fn trim(self) -> Self {
        self.check(Check::map_string(|s| s.trim().to_string()))
    }

    pub fn to_lowercase(self) -> Self {
        self.check(Check::map_string(str::to_lowercase))
    }

    pub fn to_uppercase(self) -> Self {
        self.check(Check::map_string(str::to_uppercase))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case("abcde", true)]
    #[case("abcd", false)]
    #[case("ñññññ", true)]
    fn test_min_is_inclusive_and_counts_chars(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(string().min(5).parse(input).is_ok(), ok);
    }

    #[test]
    fn test_max_is_inclusive() {
        assert!(string().max(3).parse("abc").is_ok());
        let err = string().max(3).parse("abcd").unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooBig);
    }

    #[test]
    fn test_rejects_non_string() {
        let err = string().parse(42).unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidType);
        assert_eq!(err.first().expected.as_deref(), Some("string"));
    }

    #[test]
    fn test_all_checks_report() {
        let schema = string().min(5).max(2).pattern(r"^\d+$");
        let err = schema.parse("abc").unwrap_err();
        let codes: Vec<_> = err.issues().iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![IssueCode::TooSmall, IssueCode::TooBig, IssueCode::InvalidFormat]
        );
    }

    #[test]
    fn test_trim_runs_before_later_checks() {
        let schema = string().trim().min(1).to_uppercase();
        assert_eq!(schema.parse("  ab ").unwrap(), "AB");
        assert!(schema.parse("   ").is_err());
    }

    #[test]
    fn test_try_pattern_reports_invalid_regex() {
        let err = string().try_pattern("(").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_length_range_rejects_inverted_bounds() {
        assert!(string().length_range(5, 1).is_err());
        assert!(string().length_range(1, 5).unwrap().parse("abc").is_ok());
    }

    #[test]
    fn test_optional_switches_to_option() {
        let schema = string().optional();
        assert_eq!(schema.parse(Value::Null).unwrap(), None);
        assert_eq!(schema.parse("x").unwrap(), Some("x".to_string()));
        assert_eq!(string_ptr().parse(Value::Null).unwrap(), None);
    }

    #[test]
    fn test_coerce_from_number_and_bool() {
        assert_eq!(coerce(Value::Int(5)).unwrap(), Value::from("5"));
        assert_eq!(coerce(Value::Float(1.5)).unwrap(), Value::from("1.5"));
        assert_eq!(coerce(Value::Bool(true)).unwrap(), Value::from("true"));
        assert!(coerce(Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(string().email().parse("a@b.co").is_ok());
        let err = string().email().parse("nope").unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidFormat);
        assert_eq!(err.first().property("format"), Some(&Value::from("email")));
    }

    #[test]
    fn test_params_error_applies() {
        let schema = string_with(SchemaParams::new().error("Name required"));
        assert_eq!(schema.parse(1).unwrap_err().first().message, "Name required");
    }
}
