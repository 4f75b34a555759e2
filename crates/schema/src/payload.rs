//! Mutable parse state shared by a validator and its checks

use crate::error::{IssueCode, RawIssue};
use crate::value::Value;

/// The value being parsed plus the issues raised so far.
///
/// Checks may read the value and add issues. Only overwrite checks and
/// validators inside the crate can replace the value.
#[derive(Debug, Clone)]
pub struct ParsePayload {
    value: Value,
    issues: Vec<RawIssue>,
}

impl ParsePayload {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn issues(&self) -> &[RawIssue] {
        &self.issues
    }

    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Records an issue. The current value becomes its input unless one is set.
    pub fn add_issue(&mut self, mut issue: RawIssue) {
        if issue.input.is_none() {
            issue.input = Some(self.value.clone());
        }
        self.issues.push(issue);
    }

    /// Records a `custom` issue with the given message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.add_issue(RawIssue::new(IssueCode::Custom).with_message(message));
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub(crate) fn take_value(&mut self) -> Value {
        std::mem::take(&mut self.value)
    }

    /// Appends issues reported by a nested parse as they are.
    pub(crate) fn extend_issues(&mut self, issues: impl IntoIterator<Item = RawIssue>) {
        self.issues.extend(issues);
    }

    pub(crate) fn issues_mut(&mut self) -> &mut [RawIssue] {
        &mut self.issues
    }

    pub(crate) fn into_result(self) -> Result<Value, Vec<RawIssue>> {
        if self.issues.is_empty() {
            Ok(self.value)
        } else {
            Err(self.issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_issue_stamps_input() {
        let mut payload = ParsePayload::new(Value::from("abc"));
        payload.fail("nope");
        assert_eq!(payload.issues()[0].input, Some(Value::from("abc")));
        assert_eq!(payload.issues()[0].message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_into_result() {
        let payload = ParsePayload::new(Value::Int(1));
        assert_eq!(payload.into_result().unwrap(), Value::Int(1));

        let mut payload = ParsePayload::new(Value::Int(1));
        payload.extend_issues([RawIssue::custom("x")]);
        assert_eq!(payload.into_result().unwrap_err().len(), 1);
    }
}
