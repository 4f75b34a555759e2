//! # zodiac-schema
//!
//! Composable runtime schemas: describe a data shape once, then parse
//! untyped input against it to get a typed value or a structured error.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zodiac_schema::prelude::*;
//! use serde_json::json;
//!
//! let user = ObjectSchema::new()
//!     .field("name", string().min(1))
//!     .field("age", int().gte(0).optional())
//!     .field("role", enumeration(["admin", "user"]).default("user"));
//!
//! let parsed = user.parse(json!({"name": "alice"}))?;
//! assert_eq!(parsed["role"], Value::from("user"));
//!
//! let err = user.parse(json!({"name": ""})).unwrap_err();
//! assert_eq!(err.first().path_string(), "name");
//! ```
//!
//! ## Building blocks
//!
//! - **Primitives**: [`string`], [`int`], [`number`], [`boolean`], [`date`],
//!   [`file`], [`literal`], [`enumeration`], [`any`], [`never`]
//! - **Containers**: [`array`], [`set`], [`map`], [`record`],
//!   [`ObjectSchema`], [`TupleSchema`]
//! - **Combinators**: [`SchemaExt::or`], [`SchemaExt::xor`],
//!   [`SchemaExt::and`], [`SchemaExt::pipe`], [`SchemaExt::transform`],
//!   [`lazy`], [`recursive`]
//! - **Nil handling**: `optional`, `nilable`, `nullish`, `non_optional`,
//!   `default` and `prefault` on every schema
//!
//! Every builder method returns a new schema; schemas are immutable and can
//! be shared across threads.

#![allow(clippy::result_large_err)]

#[macro_use]
mod macros;

pub mod check;
pub mod coerce;
pub mod combinators;
pub mod config;
pub mod containers;
pub mod context;
mod engine;
pub mod error;
pub mod internals;
pub mod node;
pub mod payload;
pub mod prelude;
pub mod primitives;
pub mod registry;
pub mod schema;
pub mod value;

pub use check::{Check, StringFormat};
pub use combinators::{lazy, recursive, LazySchema, UnionSchema};
pub use containers::{array, map, record, set, ObjectSchema, TupleSchema};
pub use context::{IssueMode, ParseContext};
pub use error::{Issue, IssueCode, PathSegment, SchemaError, ValidationError};
pub use internals::{SchemaParams, TypeTag};
pub use primitives::{
    any, boolean, date, enumeration, file, int, literal, never, number, string, unknown,
    StringSchema,
};
pub use schema::{DynSchema, SchemaExt, SchemaType};
pub use value::{FileHandle, ObjectMap, Value};
