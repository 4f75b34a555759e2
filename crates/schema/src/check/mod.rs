//! Checks: post-validation constraints attached to a schema
//!
//! A schema owns an ordered list of checks. After the kind validator
//! accepts the input, every check runs in the order it was appended, even
//! when an earlier check already raised an issue. Fail-fast mode stops at
//! the first issue instead.

mod bounds;
mod custom;
mod format;

pub use bounds::Numeric;
pub use custom::{CustomFn, OverwriteFn};
pub use format::StringFormat;

use crate::context::ParseContext;
use crate::error::{ErrorMessage, IssueCode, RawIssue};
use crate::payload::ParsePayload;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;

/// What a check tests.
#[derive(Clone)]
pub enum CheckDef {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    MinSize(u64),
    MaxSize(u64),
    Size(u64),
    Greater { value: Numeric, inclusive: bool },
    Less { value: Numeric, inclusive: bool },
    MultipleOf(Numeric),
    MinDate(DateTime<Utc>),
    MaxDate(DateTime<Utc>),
    Pattern(Regex),
    StartsWith(String),
    EndsWith(String),
    Includes(String),
    Format(StringFormat),
    Mime(Vec<String>),
    Custom(CustomFn),
    Overwrite(OverwriteFn),
}

impl fmt::Debug for CheckDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength(n) => write!(f, "MinLength({n})"),
            Self::MaxLength(n) => write!(f, "MaxLength({n})"),
            Self::Length(n) => write!(f, "Length({n})"),
            Self::MinSize(n) => write!(f, "MinSize({n})"),
            Self::MaxSize(n) => write!(f, "MaxSize({n})"),
            Self::Size(n) => write!(f, "Size({n})"),
            Self::Greater { value, inclusive } => write!(f, "Greater({value:?}, {inclusive})"),
            Self::Less { value, inclusive } => write!(f, "Less({value:?}, {inclusive})"),
            Self::MultipleOf(step) => write!(f, "MultipleOf({step:?})"),
            Self::MinDate(dt) => write!(f, "MinDate({dt})"),
            Self::MaxDate(dt) => write!(f, "MaxDate({dt})"),
            Self::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Self::StartsWith(s) => write!(f, "StartsWith({s:?})"),
            Self::EndsWith(s) => write!(f, "EndsWith({s:?})"),
            Self::Includes(s) => write!(f, "Includes({s:?})"),
            Self::Format(format) => write!(f, "Format({})", format.name()),
            Self::Mime(types) => write!(f, "Mime({types:?})"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
            Self::Overwrite(_) => f.write_str("Overwrite(<fn>)"),
        }
    }
}

/// A constraint plus an optional message override.
///
/// Checks are immutable once built and shared between derived schemas.
#[derive(Clone)]
pub struct Check {
    def: CheckDef,
    message: Option<ErrorMessage>,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("def", &self.def)
            .field("message", &self.message)
            .finish()
    }
}

impl Check {
    #[must_use]
    pub fn new(def: CheckDef) -> Self {
        Self { def, message: None }
    }

    /// Message used for issues this check raises without one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<ErrorMessage>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn def(&self) -> &CheckDef {
        &self.def
    }

    /// Identifier of the check kind, e.g. `min_length`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match &self.def {
            CheckDef::MinLength(_) => "min_length",
            CheckDef::MaxLength(_) => "max_length",
            CheckDef::Length(_) => "length_equals",
            CheckDef::MinSize(_) => "min_size",
            CheckDef::MaxSize(_) => "max_size",
            CheckDef::Size(_) => "size_equals",
            CheckDef::Greater { .. } => "greater_than",
            CheckDef::Less { .. } => "less_than",
            CheckDef::MultipleOf(_) => "multiple_of",
            CheckDef::MinDate(_) => "min_date",
            CheckDef::MaxDate(_) => "max_date",
            CheckDef::Pattern(_) => "regex",
            CheckDef::StartsWith(_) => "starts_with",
            CheckDef::EndsWith(_) => "ends_with",
            CheckDef::Includes(_) => "includes",
            CheckDef::Format(_) => "string_format",
            CheckDef::Mime(_) => "mime_type",
            CheckDef::Custom(_) => "custom",
            CheckDef::Overwrite(_) => "overwrite",
        }
    }

    pub fn min_length(n: usize) -> Self {
        Self::new(CheckDef::MinLength(n))
    }

    pub fn max_length(n: usize) -> Self {
        Self::new(CheckDef::MaxLength(n))
    }

    pub fn length(n: usize) -> Self {
        Self::new(CheckDef::Length(n))
    }

    pub fn min_size(n: u64) -> Self {
        Self::new(CheckDef::MinSize(n))
    }

    pub fn max_size(n: u64) -> Self {
        Self::new(CheckDef::MaxSize(n))
    }

    pub fn size(n: u64) -> Self {
        Self::new(CheckDef::Size(n))
    }

    pub fn gt(value: impl Into<Numeric>) -> Self {
        Self::new(CheckDef::Greater { value: value.into(), inclusive: false })
    }

    pub fn gte(value: impl Into<Numeric>) -> Self {
        Self::new(CheckDef::Greater { value: value.into(), inclusive: true })
    }

    pub fn lt(value: impl Into<Numeric>) -> Self {
        Self::new(CheckDef::Less { value: value.into(), inclusive: false })
    }

    pub fn lte(value: impl Into<Numeric>) -> Self {
        Self::new(CheckDef::Less { value: value.into(), inclusive: true })
    }

    pub fn multiple_of(step: impl Into<Numeric>) -> Self {
        Self::new(CheckDef::MultipleOf(step.into()))
    }

    pub fn min_date(min: DateTime<Utc>) -> Self {
        Self::new(CheckDef::MinDate(min))
    }

    pub fn max_date(max: DateTime<Utc>) -> Self {
        Self::new(CheckDef::MaxDate(max))
    }

    pub fn pattern(re: Regex) -> Self {
        Self::new(CheckDef::Pattern(re))
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self::new(CheckDef::StartsWith(prefix.into()))
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self::new(CheckDef::EndsWith(suffix.into()))
    }

    pub fn includes(needle: impl Into<String>) -> Self {
        Self::new(CheckDef::Includes(needle.into()))
    }

    pub fn format(format: StringFormat) -> Self {
        Self::new(CheckDef::Format(format))
    }

    pub fn mime<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CheckDef::Mime(types.into_iter().map(Into::into).collect()))
    }

    /// Runs the check against the payload.
    pub(crate) fn run(&self, payload: &mut ParsePayload) {
        let before = payload.issue_count();
        if let Some(issue) = self.evaluate(payload) {
            payload.add_issue(issue);
        }
        if let Some(message) = &self.message {
            for issue in &mut payload.issues_mut()[before..] {
                if issue.message.is_none() {
                    issue.message = message.resolve(issue);
                }
            }
        }
    }

    fn evaluate(&self, payload: &mut ParsePayload) -> Option<RawIssue> {
        let value = payload.value();
        match &self.def {
            CheckDef::MinLength(n) => {
                let (len, origin) = bounds::length_of(value)?;
                bounds::check_min(len as u64, origin, *n as u64)
            }
            CheckDef::MaxLength(n) => {
                let (len, origin) = bounds::length_of(value)?;
                bounds::check_max(len as u64, origin, *n as u64)
            }
            CheckDef::Length(n) => {
                let (len, origin) = bounds::length_of(value)?;
                bounds::check_exact(len as u64, origin, *n as u64)
            }
            CheckDef::MinSize(n) => {
                let (size, origin) = bounds::size_of(value)?;
                bounds::check_min(size, origin, *n)
            }
            CheckDef::MaxSize(n) => {
                let (size, origin) = bounds::size_of(value)?;
                bounds::check_max(size, origin, *n)
            }
            CheckDef::Size(n) => {
                let (size, origin) = bounds::size_of(value)?;
                bounds::check_exact(size, origin, *n)
            }
            CheckDef::Greater { value: bound, inclusive } => {
                bounds::check_greater(value, *bound, *inclusive)
            }
            CheckDef::Less { value: bound, inclusive } => {
                bounds::check_less(value, *bound, *inclusive)
            }
            CheckDef::MultipleOf(step) => bounds::check_multiple_of(value, *step),
            CheckDef::MinDate(min) => {
                let dt = value.as_datetime()?;
                (dt < min).then(|| RawIssue::too_small("date", *min, true))
            }
            CheckDef::MaxDate(max) => {
                let dt = value.as_datetime()?;
                (dt > max).then(|| RawIssue::too_big("date", *max, true))
            }
            CheckDef::Pattern(re) => {
                let s = value.as_str()?;
                (!re.is_match(s)).then(|| {
                    RawIssue::invalid_format("regex").with_property("pattern", re.as_str())
                })
            }
            CheckDef::StartsWith(prefix) => {
                let s = value.as_str()?;
                (!s.starts_with(prefix.as_str())).then(|| {
                    RawIssue::invalid_format("starts_with").with_property("prefix", prefix.as_str())
                })
            }
            CheckDef::EndsWith(suffix) => {
                let s = value.as_str()?;
                (!s.ends_with(suffix.as_str())).then(|| {
                    RawIssue::invalid_format("ends_with").with_property("suffix", suffix.as_str())
                })
            }
            CheckDef::Includes(needle) => {
                let s = value.as_str()?;
                (!s.contains(needle.as_str())).then(|| {
                    RawIssue::invalid_format("includes").with_property("includes", needle.as_str())
                })
            }
            CheckDef::Format(format) => {
                let s = value.as_str()?;
                (!format.validate(s)).then(|| RawIssue::invalid_format(format.name()))
            }
            CheckDef::Mime(types) => {
                let file = value.as_file()?;
                (!types.iter().any(|t| t == &file.mime)).then(|| {
                    RawIssue::new(IssueCode::InvalidValue)
                        .with_property("values", types.clone())
                        .with_input(file.mime.clone())
                })
            }
            CheckDef::Custom(f) => {
                f(payload);
                None
            }
            CheckDef::Overwrite(f) => {
                let current = payload.take_value();
                payload.set_value(f(current));
                None
            }
        }
    }
}

/// Runs `checks` in order against the payload.
pub(crate) fn apply_checks(checks: &[Check], payload: &mut ParsePayload, ctx: &ParseContext) {
    for check in checks {
        if ctx.is_fail_fast() && payload.has_issues() {
            break;
        }
        check.run(payload);
    }
}
