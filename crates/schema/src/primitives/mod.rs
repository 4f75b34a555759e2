//! Leaf schemas: strings, numbers, booleans, dates, files, literals and the
//! `any`/`unknown`/`never` family.

pub mod boolean;
pub mod date;
pub mod file;
pub mod literal;
pub mod number;
pub mod special;
pub mod string;

pub use boolean::{bool_ptr, boolean, boolean_with, BoolSchema};
pub use date::{date, date_ptr, date_with, DateSchema};
pub use file::{file, file_ptr, file_with, FileSchema};
pub use literal::{enumeration, literal, literals, LiteralSchema};
pub use number::{
    float32, float64, int, int16, int32, int64, int8, int_ptr, int_with, number, number_of,
    number_ptr, number_with, uint16, uint32, uint64, uint8, NumberFormat, NumberSchema, NumberType,
};
pub use special::{any, never, unknown, AnySchema, NeverSchema};
pub use string::{string, string_ptr, string_with, StringSchema};
