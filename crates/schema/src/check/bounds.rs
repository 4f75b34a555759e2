//! Length, size, numeric and date bounds

use crate::error::{IssueCode, RawIssue};
use crate::value::Value;
use std::cmp::Ordering;

// ============================================================================
// NUMERIC
// ============================================================================

/// A number used as a bound or step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    /// Numeric view of an int or float value.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Float(f) => Some(Self::Float(*f)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Ordering of `self` relative to `other`; `None` when either is NaN.
    #[must_use]
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    /// Whether `self` is an exact multiple of `step`.
    #[must_use]
    pub fn is_multiple_of(self, step: Self) -> bool {
        match (self, step) {
            (Self::Int(_), Self::Int(0)) => false,
            (Self::Int(v), Self::Int(s)) => v.checked_rem(s).is_none_or(|r| r == 0),
            (v, s) => float_remainder(v.as_f64(), s.as_f64()) == 0.0,
        }
    }
}

fn decimal_places(x: f64) -> i32 {
    let rendered = x.to_string();
    rendered
        .split_once('.')
        .map_or(0, |(_, frac)| frac.len().min(15) as i32)
}

/// Remainder computed on values scaled to integers so `0.3 % 0.1` is zero.
fn float_remainder(value: f64, step: f64) -> f64 {
    let scale = 10f64.powi(decimal_places(value).max(decimal_places(step)));
    let scaled_value = (value * scale).round();
    let scaled_step = (step * scale).round();
    (scaled_value % scaled_step) / scale
}

macro_rules! numeric_from {
    (int: $($i:ty),*; wide: $($w:ty),*; float: $($f:ty),*) => {
        $(
            impl From<$i> for Numeric {
                fn from(n: $i) -> Self {
                    Self::Int(n as i64)
                }
            }
        )*
        $(
            // Past `i64::MAX` the bound becomes a float, as values do.
            impl From<$w> for Numeric {
                fn from(n: $w) -> Self {
                    i64::try_from(n).map_or(Self::Float(n as f64), Self::Int)
                }
            }
        )*
        $(
            impl From<$f> for Numeric {
                fn from(n: $f) -> Self {
                    Self::Float(n as f64)
                }
            }
        )*
    };
}

numeric_from!(int: i8, i16, i32, i64, u8, u16, u32, isize; wide: u64, usize; float: f32, f64);

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        match n {
            Numeric::Int(i) => Value::Int(i),
            Numeric::Float(f) => Value::Float(f),
        }
    }
}

// ============================================================================
// MEASUREMENTS
// ============================================================================

/// Length of a string (in chars) or array, with the origin name.
pub(crate) fn length_of(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count(), "string")),
        Value::Array(items) => Some((items.len(), "array")),
        _ => None,
    }
}

/// Size of a collection or file, with the origin name.
pub(crate) fn size_of(value: &Value) -> Option<(u64, &'static str)> {
    match value {
        Value::Array(items) => Some((items.len() as u64, "set")),
        Value::Object(map) => Some((map.len() as u64, "object")),
        Value::Map(pairs) => Some((pairs.len() as u64, "map")),
        Value::File(file) => Some((file.size, "file")),
        _ => None,
    }
}

pub(crate) fn check_min(actual: u64, origin: &'static str, min: u64) -> Option<RawIssue> {
    (actual < min).then(|| RawIssue::too_small(origin, min, true))
}

pub(crate) fn check_max(actual: u64, origin: &'static str, max: u64) -> Option<RawIssue> {
    (actual > max).then(|| RawIssue::too_big(origin, max, true))
}

pub(crate) fn check_exact(actual: u64, origin: &'static str, exact: u64) -> Option<RawIssue> {
    match actual.cmp(&exact) {
        Ordering::Less => Some(RawIssue::too_small(origin, exact, true).with_property("exact", true)),
        Ordering::Greater => Some(RawIssue::too_big(origin, exact, true).with_property("exact", true)),
        Ordering::Equal => None,
    }
}

pub(crate) fn check_greater(value: &Value, bound: Numeric, inclusive: bool) -> Option<RawIssue> {
    let actual = Numeric::of(value)?;
    let ok = match actual.compare(bound) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => inclusive,
        _ => false,
    };
    (!ok).then(|| RawIssue::too_small("number", bound, inclusive))
}

pub(crate) fn check_less(value: &Value, bound: Numeric, inclusive: bool) -> Option<RawIssue> {
    let actual = Numeric::of(value)?;
    let ok = match actual.compare(bound) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => inclusive,
        _ => false,
    };
    (!ok).then(|| RawIssue::too_big("number", bound, inclusive))
}

pub(crate) fn check_multiple_of(value: &Value, step: Numeric) -> Option<RawIssue> {
    let actual = Numeric::of(value)?;
    (!actual.is_multiple_of(step))
        .then(|| RawIssue::new(IssueCode::NotMultipleOf).with_property("divisor", step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Numeric::Int(10), Numeric::Int(5), true)]
    #[case(Numeric::Int(10), Numeric::Int(3), false)]
    #[case(Numeric::Float(0.3), Numeric::Float(0.1), true)]
    #[case(Numeric::Float(1.05), Numeric::Float(0.05), true)]
    #[case(Numeric::Float(1.01), Numeric::Float(0.05), false)]
    #[case(Numeric::Int(4), Numeric::Int(0), false)]
    fn test_is_multiple_of(#[case] value: Numeric, #[case] step: Numeric, #[case] expected: bool) {
        assert_eq!(value.is_multiple_of(step), expected);
    }

    #[test]
    fn test_greater_respects_inclusive() {
        assert!(check_greater(&Value::Int(5), Numeric::Int(5), true).is_none());
        let issue = check_greater(&Value::Int(5), Numeric::Int(5), false).unwrap();
        assert_eq!(issue.code, IssueCode::TooSmall);
        assert_eq!(issue.property("inclusive"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_less_with_mixed_numbers() {
        assert!(check_less(&Value::Float(4.5), Numeric::Int(5), true).is_none());
        assert!(check_less(&Value::Float(5.5), Numeric::Int(5), true).is_some());
    }

    #[test]
    fn test_wide_unsigned_bounds_do_not_wrap() {
        assert_eq!(Numeric::from(u64::MAX), Numeric::Float(u64::MAX as f64));
        assert_eq!(Numeric::from(7u64), Numeric::Int(7));
        assert!(check_less(&Value::Int(5), Numeric::from(u64::MAX), true).is_none());
        assert!(check_greater(&Value::Int(5), Numeric::from(10_000_000_000_000_000_000u64), true).is_some());
    }

    #[test]
    fn test_nan_fails_bounds() {
        assert!(check_greater(&Value::Float(f64::NAN), Numeric::Int(0), true).is_some());
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(length_of(&Value::from("héllo")), Some((5, "string")));
    }

    #[test]
    fn test_exact_marks_property() {
        let issue = check_exact(2, "string", 3).unwrap();
        assert_eq!(issue.code, IssueCode::TooSmall);
        assert_eq!(issue.property("exact"), Some(&Value::Bool(true)));
        assert!(check_exact(3, "string", 3).is_none());
    }
}
