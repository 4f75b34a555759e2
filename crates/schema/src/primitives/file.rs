//! File schema
//!
//! A prefault on a file schema also rescues failed validation: any issue
//! makes the parse return the prefault instead.

use crate::check::Check;
use crate::engine::Flow;
use crate::error::RawIssue;
use crate::internals::{SchemaParams, TypeTag};
use crate::node::{Kind, SchemaNode};
use crate::payload::ParsePayload;
use crate::schema::{Carrier, Nullable, SchemaExt};
use crate::value::{FileHandle, Value};
use std::ops::ControlFlow;

carrier_schema! {
    /// Schema accepting a [`FileHandle`].
    FileSchema<> => FileHandle
}

pub fn file() -> FileSchema {
    FileSchema::from_node(SchemaNode::new(TypeTag::File, Kind::File))
}

pub fn file_ptr() -> FileSchema<Nullable> {
    file().optional()
}

pub fn file_with(params: SchemaParams) -> FileSchema {
    file().with_params(params)
}

pub(crate) fn validate(payload: &mut ParsePayload) -> Flow {
    if matches!(payload.value(), Value::File(_)) {
        ControlFlow::Continue(())
    } else {
        payload.add_issue(RawIssue::invalid_type("file"));
        ControlFlow::Break(())
    }
}

impl<C: Carrier<FileHandle>> FileSchema<C> {
    /// Minimum size in bytes.
    pub fn min(self, bytes: u64) -> Self {
        self.check(Check::min_size(bytes))
    }

    /// Maximum size in bytes.
    pub fn max(self, bytes: u64) -> Self {
        self.check(Check::max_size(bytes))
    }

    /// Exact size in bytes.
    pub fn size(self, bytes: u64) -> Self {
        self.check(Check::size(bytes))
    }

    /// Allowed MIME types.
    pub fn mime<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check(Check::mime(types))
    }
}
