//! Coercing constructors
//!
//! Each schema converts its input to the target type before validating.
//! Strings come from any scalar, numbers and booleans from strings, dates
//! from RFC 3339 strings, `YYYY-MM-DD` and epoch seconds.
//!
//! ```rust,ignore
//! use zodiac_schema::coerce;
//!
//! assert_eq!(coerce::int().parse("42")?, 42);
//! assert_eq!(coerce::string().parse(1.5)?, "1.5");
//! ```

use crate::internals::SchemaParams;
use crate::primitives::{self, BoolSchema, DateSchema, NumberSchema, StringSchema};

pub fn string() -> StringSchema {
    primitives::string_with(SchemaParams::new().coerce())
}

pub fn int() -> NumberSchema<i64> {
    primitives::int_with(SchemaParams::new().coerce())
}

pub fn number() -> NumberSchema<f64> {
    primitives::number_with(SchemaParams::new().coerce())
}

pub fn boolean() -> BoolSchema {
    primitives::boolean_with(SchemaParams::new().coerce())
}

pub fn date() -> DateSchema {
    primitives::date_with(SchemaParams::new().coerce())
}

#[cfg(test)]
mod tests {
    use crate::error::IssueCode;
    use crate::schema::SchemaExt;
    use crate::value::Value;

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(super::int().parse("42").unwrap(), 42);
        assert_eq!(super::number().parse("1.5").unwrap(), 1.5);
        assert_eq!(super::string().parse(7).unwrap(), "7");
        assert!(super::boolean().parse("true").unwrap());
    }

    #[test]
    fn test_coerced_value_still_checked() {
        let err = super::int().gte(10).parse("3").unwrap_err();
        assert_eq!(err.first().code, IssueCode::TooSmall);
    }

    #[test]
    fn test_coerce_date_from_epoch_seconds() {
        let parsed = super::date().parse(86_400).unwrap();
        assert_eq!(parsed.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_nil_is_not_coerced() {
        assert!(super::string().parse(Value::Null).is_err());
    }
}
