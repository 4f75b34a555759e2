//! Per-parse context

use crate::config;
use crate::error::ErrorMessage;
use crate::value::Value;
use indexmap::IndexMap;

/// How many issues a parse collects before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueMode {
    /// Keep validating and report every issue.
    #[default]
    CollectAll,
    /// Stop running checks on a value once it has an issue.
    FailFast,
}

/// Options for a single parse call.
///
/// ```rust,ignore
/// use zodiac_schema::prelude::*;
///
/// let ctx = ParseContext::new()
///     .with_error("Invalid value")
///     .fail_fast();
/// let result = string().min(3).parse_with("ab", &ctx);
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext {
    error: Option<ErrorMessage>,
    mode: IssueMode,
    extensions: IndexMap<String, Value>,
}

impl ParseContext {
    /// Context using the global default mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            error: None,
            mode: config::global_mode(),
            extensions: IndexMap::new(),
        }
    }

    /// Message source used when the schema does not supply one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_error(mut self, error: impl Into<ErrorMessage>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_mode(mut self, mode: IssueMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn fail_fast(self) -> Self {
        self.with_mode(IssueMode::FailFast)
    }

    /// Attaches a value that custom checks can read back.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorMessage> {
        self.error.as_ref()
    }

    #[must_use]
    pub const fn mode(&self) -> IssueMode {
        self.mode
    }

    #[must_use]
    pub fn is_fail_fast(&self) -> bool {
        self.mode == IssueMode::FailFast
    }

    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}
