//! `any`, `unknown` and `never`

use crate::engine::Flow;
use crate::error::RawIssue;
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::value::Value;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting any non-nil value.
    ///
    /// `any()` and `unknown()` parse identically; only the type tag differs.
    AnySchema<> => Value
}

carrier_schema! {
    /// Schema rejecting every value.
    NeverSchema<> => Value
}

pub fn any() -> AnySchema {
    AnySchema::from_node(SchemaNode::new(TypeTag::Any, Kind::Any))
}

pub fn unknown() -> AnySchema {
    AnySchema::from_node(SchemaNode::new(TypeTag::Unknown, Kind::Unknown))
}

pub fn never() -> NeverSchema {
    NeverSchema::from_node(SchemaNode::new(TypeTag::Never, Kind::Never))
}

pub(crate) fn validate_any(_payload: &mut ParsePayload) -> Flow {
    ControlFlow::Continue(())
}

pub(crate) fn validate_never(payload: &mut ParsePayload) -> Flow {
    payload.add_issue(RawIssue::invalid_type("never"));
    ControlFlow::Break(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCode;
    use crate::schema::SchemaExt;

    #[test]
    fn test_any_accepts_non_nil() {
        assert_eq!(any().parse(5).unwrap(), Value::Int(5));
        assert_eq!(unknown().parse("x").unwrap(), Value::from("x"));
        assert_eq!(any().type_tag(), TypeTag::Any);
        assert_eq!(unknown().type_tag(), TypeTag::Unknown);
    }

    #[test]
    fn test_any_rejects_nil_unless_optional() {
        let err = any().parse(Value::Null).unwrap_err();
        assert_eq!(err.first().code, IssueCode::InvalidType);
        assert_eq!(any().optional().parse(Value::Null).unwrap(), None);
    }

    #[test]
    fn test_never_rejects_everything() {
        for input in [Value::Int(1), Value::from("a"), Value::Bool(false)] {
            let err = never().parse(input).unwrap_err();
            assert_eq!(err.first().expected.as_deref(), Some("never"));
        }
    }
}
