//! Macros for building schemas with less ceremony
//!
//! # Available Macros
//!
//! - [`object!`] builds an object schema from `key => schema` pairs
//! - [`union!`] tries options in order, first success wins
//! - [`xor!`] requires exactly one option to succeed
//! - [`tuple!`] builds a fixed-position tuple schema
//!
//! # Examples
//!
//! ```rust,ignore
//! use zodiac_schema::prelude::*;
//! use zodiac_schema::{object, union};
//!
//! let user = object! {
//!     "name" => string().min(1),
//!     "age" => int().gte(0).optional(),
//! };
//! let id = union![string(), int()];
//! ```

// ============================================================================
// CARRIER HANDLES (crate-internal)
// ============================================================================

/// Declares a primitive or container handle whose output is chosen by a
/// [`Carrier`](crate::schema::Carrier) parameter.
///
/// Generates the struct, `Clone`/`Debug`, the `SchemaType` impl and the
/// nil-handling methods that switch the carrier between `Owned` and
/// `Nullable`.
macro_rules! carrier_schema {
    (
        $(#[$meta:meta])*
        $name:ident<$($param:ident: $bound:path),*> => $base:ty
    ) => {
        $(#[$meta])*
        pub struct $name<$($param,)* C = $crate::schema::Owned> {
            node: $crate::node::SchemaRef,
            _marker: ::std::marker::PhantomData<fn() -> ($($param,)* C,)>,
        }

        impl<$($param,)* C> $name<$($param,)* C> {
            pub(crate) fn from_node(node: $crate::node::SchemaRef) -> Self {
                Self {
                    node,
                    _marker: ::std::marker::PhantomData,
                }
            }
        }

        impl<$($param,)* C> ::std::clone::Clone for $name<$($param,)* C> {
            fn clone(&self) -> Self {
                Self::from_node(self.node.clone())
            }
        }

        impl<$($param,)* C> ::std::fmt::Debug for $name<$($param,)* C> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.node.internals.id)
                    .field("flags", &self.node.internals.flags)
                    .field("checks", &self.node.internals.checks.len())
                    .finish()
            }
        }

        impl<$($param: $bound,)* C: $crate::schema::Carrier<$base>> $crate::schema::SchemaType
            for $name<$($param,)* C>
        {
            type Output = <C as $crate::schema::Carrier<$base>>::Out;

            fn node(&self) -> &$crate::node::SchemaRef {
                &self.node
            }

            fn with_node(&self, node: $crate::node::SchemaRef) -> Self {
                Self::from_node(node)
            }

            fn decode(
                value: $crate::value::Value,
            ) -> ::std::result::Result<Self::Output, $crate::value::DecodeError> {
                <C as $crate::schema::Carrier<$base>>::decode(value)
            }
        }

        impl<$($param: $bound,)* C: $crate::schema::Carrier<$base>> $name<$($param,)* C> {
            /// Accepts nil and absent keys. The output becomes an `Option`.
            pub fn optional(self) -> $name<$($param,)* $crate::schema::Nullable> {
                $name::from_node(self.node.derive($crate::internals::Internals::set_optional))
            }

            /// Accepts explicit nil. An absent object key is still an error.
            pub fn nilable(self) -> $name<$($param,)* $crate::schema::Nullable> {
                $name::from_node(self.node.derive($crate::internals::Internals::set_nilable))
            }

            /// Accepts nil and absent keys.
            pub fn nullish(self) -> $name<$($param,)* $crate::schema::Nullable> {
                $name::from_node(self.node.derive(|internals| {
                    internals.set_optional();
                    internals.set_nilable();
                }))
            }

            /// Accepts an absent object key but rejects explicit nil.
            pub fn exact_optional(self) -> $name<$($param,)* $crate::schema::Nullable> {
                $name::from_node(
                    self.node
                        .derive($crate::internals::Internals::set_exact_optional),
                )
            }

            /// Rejects nil. The output goes back to the plain type.
            pub fn non_optional(self) -> $name<$($param,)* $crate::schema::Owned> {
                $name::from_node(
                    self.node
                        .derive($crate::internals::Internals::set_non_optional),
                )
            }
        }
    };
}

// ============================================================================
// PUBLIC MACROS
// ============================================================================

/// Builds an [`ObjectSchema`](crate::containers::object::ObjectSchema) from
/// `key => schema` pairs.
#[macro_export]
macro_rules! object {
    ($($key:expr => $schema:expr),* $(,)?) => {
        $crate::containers::object::ObjectSchema::new()
            $(.field($key, $schema))*
    };
}

/// Union of schemas: the first option that parses wins.
#[macro_export]
macro_rules! union {
    ($($schema:expr),+ $(,)?) => {
        $crate::combinators::union::UnionSchema::union(vec![
            $($crate::schema::SchemaType::node(&$schema).clone()),+
        ])
    };
}

/// Exclusive union: exactly one option must parse.
#[macro_export]
macro_rules! xor {
    ($($schema:expr),+ $(,)?) => {
        $crate::combinators::union::UnionSchema::xor(vec![
            $($crate::schema::SchemaType::node(&$schema).clone()),+
        ])
    };
}

/// Tuple of schemas matched by position.
#[macro_export]
macro_rules! tuple {
    ($($schema:expr),* $(,)?) => {
        $crate::containers::tuple::TupleSchema::new(vec![
            $($crate::schema::SchemaType::node(&$schema).clone()),*
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_object_macro() {
        let schema = crate::object! {
            "name" => string(),
            "age" => int().optional(),
        };
        let out = schema.parse(serde_json::json!({"name": "a"})).unwrap();
        assert_eq!(out.get("name"), Some(&Value::from("a")));
        assert!(!out.contains_key("age"));
    }

    #[test]
    fn test_union_and_tuple_macros() {
        let id = crate::union![string(), int()];
        assert_eq!(id.parse(5).unwrap(), Value::Int(5));

        let pair = crate::tuple![string(), boolean()];
        let out = pair.parse(serde_json::json!(["a", true])).unwrap();
        assert_eq!(out, vec![Value::from("a"), Value::Bool(true)]);
    }

    #[test]
    fn test_xor_macro() {
        let schema = crate::xor![string(), int()];
        assert!(schema.parse("x").is_ok());
    }
}
