//! Number schemas over integer widths and floats

use crate::check::{Check, Numeric};
use crate::engine::Flow;
use crate::error::{RawIssue, SchemaError};
use crate::internals::{SchemaParams, TypeTag};
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::schema::{Carrier, Nullable, SchemaExt};
use crate::value::{FromValue, Value};
use std::ops::ControlFlow;

// ============================================================================
// FORMATS
// ============================================================================

/// Numeric representation enforced by a number schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    Float64,
    Float32,
    /// Integers in `±(2^53 - 1)`.
    SafeInt,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

// `i64::MAX as f64` rounds up to 2^63, which does not fit.
const I64_CEIL: f64 = 9_223_372_036_854_775_808.0;
const I64_FLOOR: f64 = -I64_CEIL;

impl NumberFormat {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float64 => "float64",
            Self::Float32 => "float32",
            Self::SafeInt => "safeint",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float64 | Self::Float32)
    }

    /// Inclusive integer range; `None` for floats and `Uint64` beyond `i64`.
    const fn int_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Float64 | Self::Float32 => None,
            Self::SafeInt => Some((-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER)),
            Self::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            Self::Uint8 => Some((0, u8::MAX as i64)),
            Self::Uint16 => Some((0, u16::MAX as i64)),
            Self::Uint32 => Some((0, u32::MAX as i64)),
            Self::Uint64 => Some((0, i64::MAX)),
        }
    }
}

/// Rust numeric types usable as number schema outputs.
pub trait NumberType:
    FromValue + Into<Value> + Into<Numeric> + Default + Copy + PartialOrd + Send + Sync + 'static
{
    const FORMAT: NumberFormat;
}

macro_rules! number_type {
    ($($t:ty => $format:ident),* $(,)?) => {
        $(
            impl NumberType for $t {
                const FORMAT: NumberFormat = NumberFormat::$format;
            }
        )*
    };
}

number_type!(
    f64 => Float64,
    f32 => Float32,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
);

carrier_schema! {
    /// Schema accepting numbers of a given Rust type.
    ///
    /// Zero is a regular value, never nil. NaN and infinities are rejected.
    ///
    /// ```rust,ignore
    /// let age = int().gte(0).lte(150);
    /// let ratio = number().gt(0.0).lt(1.0);
    /// ```
    NumberSchema<N: NumberType> => N
}

fn number_schema<N: NumberType>(format: NumberFormat) -> NumberSchema<N> {
    NumberSchema::from_node(SchemaNode::new(TypeTag::Number, Kind::Number(format)))
}

/// Schema for `N` using its natural format.
pub fn number_of<N: NumberType>() -> NumberSchema<N> {
    number_schema(N::FORMAT)
}

/// 64-bit float schema.
pub fn number() -> NumberSchema<f64> {
    number_of()
}

pub fn number_ptr() -> NumberSchema<f64, Nullable> {
    number().optional()
}

pub fn number_with(params: SchemaParams) -> NumberSchema<f64> {
    number().with_params(params)
}

/// Integer schema limited to the safe-integer range.
pub fn int() -> NumberSchema<i64> {
    number_schema(NumberFormat::SafeInt)
}

pub fn int_ptr() -> NumberSchema<i64, Nullable> {
    int().optional()
}

pub fn int_with(params: SchemaParams) -> NumberSchema<i64> {
    int().with_params(params)
}

pub fn float64() -> NumberSchema<f64> {
    number_of()
}

pub fn float32() -> NumberSchema<f32> {
    number_of()
}

pub fn int8() -> NumberSchema<i8> {
    number_of()
}

pub fn int16() -> NumberSchema<i16> {
    number_of()
}

pub fn int32() -> NumberSchema<i32> {
    number_of()
}

pub fn int64() -> NumberSchema<i64> {
    number_of()
}

pub fn uint8() -> NumberSchema<u8> {
    number_of()
}

pub fn uint16() -> NumberSchema<u16> {
    number_of()
}

pub fn uint32() -> NumberSchema<u32> {
    number_of()
}

pub fn uint64() -> NumberSchema<u64> {
    number_of()
}

// ============================================================================
// VALIDATION
// ============================================================================

fn check_range(format: NumberFormat, n: i64) -> Option<RawIssue> {
    let (min, max) = format.int_range()?;
    if n < min {
        Some(RawIssue::too_small("number", min, true))
    } else if n > max {
        Some(RawIssue::too_big("number", max, true))
    } else {
        None
    }
}

fn canonical_float(format: NumberFormat, f: f64) -> Result<Value, RawIssue> {
    if !f.is_finite() {
        return Err(RawIssue::invalid_type("number"));
    }
    if format.is_integer() {
        if f.fract() != 0.0 || !(I64_FLOOR..I64_CEIL).contains(&f) {
            return Err(RawIssue::invalid_type("int"));
        }
        return Ok(Value::Int(f as i64));
    }
    if format == NumberFormat::Float32 && f.abs() > f64::from(f32::MAX) {
        return Err(RawIssue::too_big("number", f64::from(f32::MAX), true));
    }
    Ok(Value::Float(f))
}

pub(crate) fn validate(format: NumberFormat, payload: &mut ParsePayload) -> Flow {
    let canonical = match *payload.value() {
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Float(f) => canonical_float(format, f),
        _ => Err(RawIssue::invalid_type("number")),
    };
    let checked = canonical.and_then(|value| match value {
        Value::Int(n) => check_range(format, n).map_or(Ok(value), Err),
        other => Ok(other),
    });

    match checked {
        Ok(value) => {
            payload.set_value(value);
            ControlFlow::Continue(())
        }
        Err(issue) => {
            payload.add_issue(issue);
            ControlFlow::Break(())
        }
    }
}

/// Parses trimmed decimal strings; booleans become 1/0, dates epoch seconds.
pub(crate) fn coerce(format: NumberFormat, input: Value) -> Result<Value, RawIssue> {
    match input {
        Value::Int(_) | Value::Float(_) => Ok(input),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::DateTime(dt) => Ok(Value::Int(dt.timestamp())),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() && !(format.is_integer() && f.fract() != 0.0) => {
                    Ok(Value::Float(f))
                }
                _ => Err(RawIssue::invalid_type("number").with_input(Value::String(s))),
            }
        }
        other => Err(RawIssue::invalid_type("number").with_input(other)),
    }
}

// ============================================================================
// CHECKS
// ============================================================================

impl<N: NumberType, C: Carrier<N>> NumberSchema<N, C> {
    pub fn gt(self, value: N) -> Self {
        self.check(Check::gt(value))
    }

    pub fn gte(self, value: N) -> Self {
        self.check(Check::gte(value))
    }

    pub fn lt(self, value: N) -> Self {
        self.check(Check::lt(value))
    }

    pub fn lte(self, value: N) -> Self {
        self.check(Check::lte(value))
    }

    /// Inclusive minimum. Alias of [`gte`](Self::gte).
    pub fn min(self, value: N) -> Self {
        self.gte(value)
    }

    /// Inclusive maximum. Alias of [`lte`](Self::lte).
    pub fn max(self, value: N) -> Self {
        self.lte(value)
    }

    /// Inclusive range.
    pub fn between(self, min: N, max: N) -> Result<Self, SchemaError> {
        if min > max {
            let (min, max): (Value, Value) = (min.into(), max.into());
            return Err(SchemaError::InvalidBounds {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(self.gte(min).lte(max))
    }

    pub fn positive(self) -> Self {
        self.check(Check::gt(0))
    }

    pub fn negative(self) -> Self {
        self.check(Check::lt(0))
    }

    pub fn non_negative(self) -> Self {
        self.check(Check::gte(0))
    }

    pub fn non_positive(self) -> Self {
        self.check(Check::lte(0))
    }

    pub fn multiple_of(self, step: N) -> Self {
        self.check(Check::multiple_of(step))
    }

    /// Alias of [`multiple_of`](Self::multiple_of).
    pub fn step(self, step: N) -> Self {
        self.multiple_of(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use rstest::rstest;

    #[test]
    fn test_zero_is_not_nil() {
        assert_eq!(int().parse(0).unwrap(), 0);
        assert!(int().parse(Value::Null).is_err());
    }

    #[test]
    fn test_int_rejects_fraction_and_accepts_integral_float() {
        assert_eq!(int().parse(3.0).unwrap(), 3);
        let err = int().parse(3.5).unwrap_err();
        assert_eq!(err.first().expected.as_deref(), Some("int"));
    }

    #[rstest]
    #[case(127, true)]
    #[case(128, false)]
    #[case(-128, true)]
    #[case(-129, false)]
    fn test_int8_range(#[case] input: i64, #[case] ok: bool) {
        assert_eq!(int8().parse(input).is_ok(), ok);
    }

    #[test]
    fn test_width_ranges() {
        assert!(int16().parse(32_767).is_ok());
        assert!(int16().parse(32_768).is_err());
        assert!(int32().parse(i64::from(i32::MIN)).is_ok());
        assert!(int32().parse(i64::from(i32::MIN) - 1).is_err());
        assert_eq!(uint8().parse(255).unwrap(), 255);
        assert!(uint8().parse(256).is_err());
        assert!(uint16().parse(65_536).is_err());
        assert_eq!(uint32().parse(i64::from(u32::MAX)).unwrap(), u32::MAX);
    }

    #[test]
    fn test_float32_rejects_beyond_f32_max() {
        assert_eq!(float32().parse(1.5).unwrap(), 1.5);
        let err = float32().parse(1e39).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooBig);
    }

    #[test]
    fn test_int64_float_edges() {
        let err = int64().parse(9_223_372_036_854_775_808f64).unwrap_err();
        assert_eq!(err.first().expected.as_deref(), Some("int"));
        assert!(uint64().parse(9_223_372_036_854_775_808f64).is_err());
        assert_eq!(int64().parse(-9_223_372_036_854_775_808f64).unwrap(), i64::MIN);
    }

    #[test]
    fn test_uint64_bounds_beyond_i64() {
        assert_eq!(uint64().lte(u64::MAX).parse(5u64).unwrap(), 5);
        assert_eq!(uint64().max(u64::MAX).parse(u64::MAX >> 1).unwrap(), u64::MAX >> 1);

        let err = uint64().gte(10_000_000_000_000_000_000u64).parse(5u64).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooSmall);
    }

    #[test]
    fn test_uint_rejects_negative() {
        let err = uint32().parse(-1).unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooSmall);
    }

    #[test]
    fn test_rejects_nan_and_infinity() {
        assert!(number().parse(f64::NAN).is_err());
        assert!(number().parse(f64::INFINITY).is_err());
    }

    #[test]
    fn test_min_max_inclusive_and_exclusive() {
        assert!(number().min(1.0).parse(1.0).is_ok());
        assert!(number().gt(1.0).parse(1.0).is_err());
        assert!(number().max(1.0).parse(1.0).is_ok());
        assert!(number().lt(1.0).parse(1.0).is_err());
    }

    #[test]
    fn test_sign_helpers() {
        assert!(int().positive().parse(0).is_err());
        assert!(int().non_negative().parse(0).is_ok());
        assert!(int().negative().parse(-1).is_ok());
        assert!(int().non_positive().parse(1).is_err());
    }

    #[test]
    fn test_multiple_of() {
        assert!(int().multiple_of(5).parse(15).is_ok());
        let err = int().step(5).parse(7).unwrap_err();
        assert_eq!(err.first().code, IssueCode::NotMultipleOf);
        assert!(number().multiple_of(0.1).parse(0.3).is_ok());
    }

    #[test]
    fn test_int_output_is_int_value() {
        let value = int().parse_value(2.0).unwrap();
        assert_eq!(value, Value::Int(2));
    }

    #[test]
    fn test_coerce_strings() {
        assert_eq!(coerce(NumberFormat::Float64, Value::from(" 42 ")).unwrap(), Value::Int(42));
        assert_eq!(coerce(NumberFormat::Float64, Value::from("1.5")).unwrap(), Value::Float(1.5));
        assert!(coerce(NumberFormat::Float64, Value::from("abc")).is_err());
        assert!(coerce(NumberFormat::Float64, Value::from("1e999")).is_err());
        assert_eq!(coerce(NumberFormat::Int32, Value::Bool(true)).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_between() {
        assert!(int().between(5, 1).is_err());
        assert!(int().between(1, 5).unwrap().parse(3).is_ok());
    }
}
