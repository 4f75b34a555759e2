//! Schemas over collections: arrays, sets, maps, records, objects and tuples

pub mod array;
pub mod map;
pub mod object;
pub mod set;
pub mod tuple;

pub use array::{array, ArraySchema};
pub use map::{map, record, MapSchema, RecordSchema};
pub use object::ObjectSchema;
pub use set::{set, SetSchema};
pub use tuple::TupleSchema;

use crate::error::{PathSegment, RawIssue};

/// Moves child issues into `out`, prefixing each path with `segment`.
pub(crate) fn nest_issues(out: &mut Vec<RawIssue>, child: Vec<RawIssue>, segment: &PathSegment) {
    out.extend(child.into_iter().map(|mut issue| {
        issue.prefix_path(segment.clone());
        issue
    }));
}
