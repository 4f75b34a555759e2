//! Literal and enum schemas
//!
//! Both accept only listed values. Integers and floats compare by numeric
//! value, so `literal(1)` accepts `1.0`.

use crate::engine::Flow;
use crate::error::{IssueCode, RawIssue};
use crate::internals::TypeTag;
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::value::Value;
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting one of a fixed set of values.
    ///
    /// ```rust,ignore
    /// let role = enumeration(["admin", "user"]);
    /// assert!(role.parse("admin").is_ok());
    /// ```
    LiteralSchema<> => Value
}

/// Accepts exactly `value`.
pub fn literal(value: impl Into<Value>) -> LiteralSchema {
    LiteralSchema::from_node(SchemaNode::new(
        TypeTag::Literal,
        Kind::Literal(vec![value.into()]),
    ))
}

/// Accepts any of `values`, tagged as a literal.
pub fn literals<I, V>(values: I) -> LiteralSchema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    LiteralSchema::from_node(SchemaNode::new(
        TypeTag::Literal,
        Kind::Literal(values.into_iter().map(Into::into).collect()),
    ))
}

/// Accepts any of `values`, tagged as an enum.
pub fn enumeration<I, V>(values: I) -> LiteralSchema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    LiteralSchema::from_node(SchemaNode::new(
        TypeTag::Enum,
        Kind::Literal(values.into_iter().map(Into::into).collect()),
    ))
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        _ => a == b,
    }
}

pub(crate) fn validate(values: &[Value], tag: TypeTag, payload: &mut ParsePayload) -> Flow {
    if values.iter().any(|v| same_value(v, payload.value())) {
        return ControlFlow::Continue(());
    }
    payload.add_issue(
        RawIssue::new(IssueCode::InvalidValue)
            .with_expected(tag.as_str())
            .with_property("values", values.to_vec()),
    );
    ControlFlow::Break(())
}

impl<C> LiteralSchema<C> {
    /// The accepted values, in declaration order.
    pub fn options(&self) -> &[Value] {
        match &self.node.kind {
            Kind::Literal(values) => values,
            _ => &[],
        }
    }

    fn with_values(&self, keep: impl Fn(&Value) -> bool) -> Self {
        Self::from_node(self.node.derive_kind(|kind| {
            if let Kind::Literal(values) = kind {
                values.retain(|v| keep(v));
            }
        }))
    }

    /// Keeps only the listed values.
    pub fn extract<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let wanted: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with_values(|v| wanted.iter().any(|w| same_value(v, w)))
    }

    /// Drops the listed values.
    pub fn exclude<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let unwanted: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with_values(|v| !unwanted.iter().any(|w| same_value(v, w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaExt;

    #[test]
    fn test_literal_numeric_equality() {
        assert!(literal(1).parse(1.0).is_ok());
        assert!(literal(1.5).parse(1.5).is_ok());
        assert!(literal(1).parse(2).is_err());
    }

    #[test]
    fn test_enum_reports_values() {
        let role = enumeration(["admin", "user"]);
        assert_eq!(role.parse("user").unwrap(), Value::from("user"));

        let err = role.parse("root").unwrap_err();
        let issue = err.first();
        assert_eq!(issue.code, IssueCode::InvalidValue);
        assert_eq!(issue.expected.as_deref(), Some("enum"));
        assert_eq!(
            issue.property("values"),
            Some(&Value::Array(vec![Value::from("admin"), Value::from("user")]))
        );
        assert_eq!(issue.message, r#"Invalid option: expected one of ["admin","user"]"#);
    }

    #[test]
    fn test_null_literal_accepts_nil() {
        assert_eq!(literal(Value::Null).parse(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_extract_and_exclude() {
        let colors = enumeration(["red", "green", "blue"]);
        let warm = colors.extract(["red"]);
        let cool = colors.exclude(["red"]);

        assert_eq!(warm.options(), &[Value::from("red")]);
        assert_eq!(cool.options().len(), 2);
        assert!(cool.parse("red").is_err());
        assert_eq!(colors.options().len(), 3);
    }
}
