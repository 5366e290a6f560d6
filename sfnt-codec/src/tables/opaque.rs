//! Tables without a dedicated implementation
//!
//! Their bytes are carried through unchanged; a builder can only replace
//! them wholesale with [`TableBuilder::set_data`] or edit them through its
//! writable bytes.
//!
//! [`TableBuilder::set_data`]: crate::TableBuilder::set_data

use crate::{table::BuilderCore, FontData, TableRecord};

/// A table whose contents are not interpreted.
#[derive(Debug, Clone)]
pub struct OpaqueTable {
    record: TableRecord,
    data: FontData,
}

#[derive(Debug, Clone)]
pub struct OpaqueBuilder {
    core: BuilderCore,
}

font_table!(OpaqueTable);
data_builder!(OpaqueBuilder => OpaqueTable);
