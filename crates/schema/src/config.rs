//! Process-wide parse configuration
//!
//! The global configuration supplies the lowest-priority custom error
//! message and the default issue-collection mode for new parse contexts.
//!
//! ```rust,ignore
//! use zodiac_schema::config::{self, IssueMode};
//!
//! config::configure(|cfg| {
//!     cfg.error = Some("Invalid value".into());
//!     cfg.mode = IssueMode::FailFast;
//! });
//! ```

use crate::context::IssueMode;
use crate::error::ErrorMessage;
use parking_lot::RwLock;
use std::sync::LazyLock;
use tracing::debug;

/// Global configuration values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Message source consulted after schema and per-parse errors.
    pub error: Option<ErrorMessage>,
    /// Mode used by [`ParseContext::new`](crate::ParseContext::new).
    pub mode: IssueMode,
}

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

/// Updates the global configuration in place.
pub fn configure(update: impl FnOnce(&mut Config)) {
    let mut config = CONFIG.write();
    update(&mut config);
    debug!(
        has_error = config.error.is_some(),
        mode = ?config.mode,
        "global parse configuration updated"
    );
}

/// Snapshot of the current configuration.
#[must_use]
pub fn current() -> Config {
    CONFIG.read().clone()
}

/// Restores the default configuration.
pub fn reset() {
    configure(|config| *config = Config::default());
}

pub(crate) fn global_error() -> Option<ErrorMessage> {
    CONFIG.read().error.clone()
}

pub(crate) fn global_mode() -> IssueMode {
    CONFIG.read().mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IssueCode, RawIssue, ValidationError};
    use crate::ParseContext;

    const SENTINEL: &str = "config-test-sentinel";

    #[test]
    fn test_global_error_is_last_resort() {
        // Only answers for the sentinel so concurrently running tests are unaffected.
        configure(|cfg| {
            cfg.error = Some(ErrorMessage::map(|issue| {
                (issue.expected.as_deref() == Some(SENTINEL)).then(|| "global".to_string())
            }));
        });

        let err = ValidationError::from_raw(
            vec![RawIssue::invalid_type(SENTINEL)],
            &ParseContext::new(),
        );
        assert_eq!(err.first().message, "global");

        let err = ValidationError::from_raw(
            vec![RawIssue::invalid_type(SENTINEL)],
            &ParseContext::new().with_error("local"),
        );
        assert_eq!(err.first().message, "local");

        let err = ValidationError::from_raw(
            vec![RawIssue::new(IssueCode::NotFound)],
            &ParseContext::new(),
        );
        assert_eq!(err.first().message, "Not found");

        configure(|cfg| cfg.error = None);
    }
}
