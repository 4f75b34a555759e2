//! Date/time schema

use crate::check::Check;
use crate::engine::Flow;
use crate::error::RawIssue;
use crate::internals::{SchemaParams, TypeTag};
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::schema::{Carrier, Nullable, SchemaExt};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, Utc};
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting a point in time.
    ///
    /// ISO strings stay strings unless the schema coerces; see
    /// [`StringSchema::datetime`](crate::StringSchema::datetime) for
    /// validating them as text.
    DateSchema<> => DateTime<Utc>
}

pub fn date() -> DateSchema {
    DateSchema::from_node(SchemaNode::new(TypeTag::Date, Kind::Date))
}

pub fn date_ptr() -> DateSchema<Nullable> {
    date().optional()
}

pub fn date_with(params: SchemaParams) -> DateSchema {
    date().with_params(params)
}

pub(crate) fn validate(payload: &mut ParsePayload) -> Flow {
    if matches!(payload.value(), Value::DateTime(_)) {
        ControlFlow::Continue(())
    } else {
        payload.add_issue(RawIssue::invalid_type("date"));
        ControlFlow::Break(())
    }
}

fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Integers are Unix epoch seconds; strings are RFC 3339 or `YYYY-MM-DD`.
pub(crate) fn coerce(input: Value) -> Result<Value, RawIssue> {
    let parsed = match &input {
        Value::DateTime(_) => return Ok(input),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
        Value::Float(secs) if secs.is_finite() => {
            DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
        }
        Value::String(s) => parse_date_string(s),
        _ => None,
    };
    parsed
        .map(Value::DateTime)
        .ok_or_else(|| RawIssue::invalid_type("date").with_input(input))
}

impl<C: Carrier<DateTime<Utc>>> DateSchema<C> {
    /// Earliest accepted instant, inclusive.
    pub fn min(self, min: DateTime<Utc>) -> Self {
        self.check(Check::min_date(min))
    }

    /// Latest accepted instant, inclusive.
    pub fn max(self, max: DateTime<Utc>) -> Self {
        self.check(Check::max_date(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_accepts_datetime_only() {
        let now = at(2024, 1, 15);
        assert_eq!(date().parse(now).unwrap(), now);
        assert!(date().parse("2024-01-15").is_err());
    }

    #[test]
    fn test_bounds() {
        let schema = date().min(at(2024, 1, 1)).max(at(2024, 12, 31));
        assert!(schema.parse(at(2024, 6, 1)).is_ok());
        let err = schema.parse(at(2023, 6, 1)).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooSmall);
    }

    #[test]
    fn test_coerce_epoch_and_strings() {
        assert_eq!(coerce(Value::Int(0)).unwrap(), Value::DateTime(at(1970, 1, 1)));
        assert_eq!(coerce(Value::from("2024-01-15")).unwrap(), Value::DateTime(at(2024, 1, 15)));
        assert!(coerce(Value::from("2024-01-15T10:00:00+02:00")).is_ok());
        assert!(coerce(Value::from("yesterday")).is_err());
    }
}
