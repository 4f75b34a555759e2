//! Prelude module for convenient imports.
//!
//! `use zodiac_schema::prelude::*;` brings in the handle traits, every
//! constructor and the error types needed to inspect a failed parse.
//!
//! # Examples
//!
//! ```rust,ignore
//! use zodiac_schema::prelude::*;
//!
//! let user = ObjectSchema::new()
//!     .field("name", string().min(1))
//!     .field("role", enumeration(["admin", "user"]).default("user"));
//! ```

// ============================================================================
// CORE: Traits, values, errors
// ============================================================================

pub use crate::context::{IssueMode, ParseContext};
pub use crate::error::{
    ErrorMessage, Issue, IssueCode, PathSegment, RawIssue, SchemaError, ValidationError,
};
pub use crate::internals::{SchemaId, SchemaParams, TypeTag};
pub use crate::payload::ParsePayload;
pub use crate::schema::{DynSchema, Nullable, Owned, SchemaExt, SchemaType};
pub use crate::value::{FileHandle, ObjectMap, Value};
pub use crate::{coerce, registry};

// ============================================================================
// PRIMITIVES
// ============================================================================

pub use crate::primitives::{
    any, bool_ptr, boolean, boolean_with, date, date_ptr, date_with, enumeration, file, file_ptr,
    file_with, float32, float64, int, int16, int32, int64, int8, int_ptr, int_with, literal,
    literals, never, number, number_of, number_ptr, number_with, string, string_ptr, string_with,
    uint16, uint32, uint64, uint8, unknown, AnySchema, BoolSchema, DateSchema, FileSchema,
    LiteralSchema, NeverSchema, NumberSchema, StringSchema,
};

// ============================================================================
// CONTAINERS
// ============================================================================

pub use crate::containers::{
    array, map, record, set, ArraySchema, MapSchema, ObjectSchema, RecordSchema, SetSchema,
    TupleSchema,
};

// ============================================================================
// COMBINATORS
// ============================================================================

pub use crate::combinators::{
    lazy, nilable, non_optional, nullish, optional, recursive, with_default, with_prefault,
    DefaultSchema, IntersectionSchema, LazySchema, NonOptionalSchema, OptionalSchema, PipeSchema,
    PrefaultSchema, Resolution, TransformSchema, UnionSchema,
};
