//! Boolean schema

use crate::engine::Flow;
use crate::error::RawIssue;
use crate::internals::{SchemaParams, TypeTag};
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::schema::{Nullable, SchemaExt};
use crate::value::Value;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting `true` or `false`.
    BoolSchema<> => bool
}

pub fn boolean() -> BoolSchema {
    BoolSchema::from_node(SchemaNode::new(TypeTag::Bool, Kind::Bool))
}

pub fn bool_ptr() -> BoolSchema<Nullable> {
    boolean().optional()
}

pub fn boolean_with(params: SchemaParams) -> BoolSchema {
    boolean().with_params(params)
}

pub(crate) fn validate(payload: &mut ParsePayload) -> Flow {
    if matches!(payload.value(), Value::Bool(_)) {
        ControlFlow::Continue(())
    } else {
        payload.add_issue(RawIssue::invalid_type("boolean"));
        ControlFlow::Break(())
    }
}

/// Accepts `"true"`/`"false"`/`"1"`/`"0"` (case-insensitive) and the numbers 0 and 1.
pub(crate) fn coerce(input: Value) -> Result<Value, RawIssue> {
    match input {
        Value::Bool(_) => Ok(input),
        Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(RawIssue::invalid_type("boolean").with_input(input)),
        },
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Float(f) if f == 0.0 => Ok(Value::Bool(false)),
        Value::Float(f) if f == 1.0 => Ok(Value::Bool(true)),
        other => Err(RawIssue::invalid_type("boolean").with_input(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_accepts_only_booleans() {
        assert!(boolean().parse(true).unwrap());
        assert!(!boolean().parse(false).unwrap());
        assert!(boolean().parse("true").is_err());
    }

    #[rstest]
    #[case(Value::from("true"), Some(true))]
    #[case(Value::from(" FALSE "), Some(false))]
    #[case(Value::from("1"), Some(true))]
    #[case(Value::Int(0), Some(false))]
    #[case(Value::Int(2), None)]
    #[case(Value::from("yes"), None)]
    fn test_coerce(#[case] input: Value, #[case] expected: Option<bool>) {
        assert_eq!(coerce(input).ok().and_then(|v| v.as_bool()), expected);
    }

    #[test]
    fn test_nilable_pointer() {
        assert_eq!(bool_ptr().parse(Value::Null).unwrap(), None);
    }
}
