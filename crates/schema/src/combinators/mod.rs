//! Schemas built from other schemas
//!
//! - [`union`]: first-match and exclusive (`xor`) unions
//! - [`intersection`]: both sides must parse, outputs are merged
//! - [`modifiers`]: optional, nilable, non-optional, default and prefault wrappers
//! - [`pipe`]: pipe and transform
//! - [`lazy`]: deferred and recursive schemas

pub mod intersection;
pub mod lazy;
pub mod modifiers;
pub mod pipe;
pub mod union;

pub use intersection::IntersectionSchema;
pub use lazy::{lazy, recursive, LazySchema, Resolution};
pub use modifiers::{
    nilable, non_optional, nullish, optional, with_default, with_prefault, DefaultSchema,
    NonOptionalSchema, OptionalSchema, PrefaultSchema,
};
pub use pipe::{PipeSchema, TransformSchema};
pub use union::UnionSchema;
