//! Reading, editing and writing sfnt (TrueType / OpenType) font files
//!
//! This crate is a codec for the sfnt container: the header, the table
//! directory and the table payloads. It does not render, hint or shape.
//!
//! The pieces, from the bottom up:
//!
//! - [`ByteStore`] holds bytes, with a filled length separate from its
//!   capacity. [`FontData`] and [`WritableFontData`] are windows onto a shared
//!   store, with big-endian typed access; slicing a window never copies.
//! - Every table is an immutable [`FontTable`] produced by a single-use
//!   [`TableBuilder`]. Builders share the bytes they were loaded from until
//!   they are first written to.
//! - [`Font`] and [`FontBuilder`] handle the container: loading the
//!   directory, wiring tables that depend on each other, and writing the
//!   tables back out with a tag-sorted directory and 4-byte alignment.
//! - [`FontFactory`] loads single fonts and collections, from bytes or from
//!   a stream.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use sfnt_codec::{tables::head::HeadBuilder, FontFactory};
//!
//! let factory = FontFactory::new();
//! let bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let mut builder = factory.load_font_builders_bytes(bytes).unwrap().remove(0);
//! let head = builder.get_builder_mut::<HeadBuilder>().expect("missing 'head' table");
//! head.set_units_per_em(2048).unwrap();
//! let font = builder.build().unwrap();
//! let mut out = Vec::new();
//! factory.serialize_font(&font, &mut out).unwrap();
//! ```

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Public re-export of the sfnt-types crate.
pub extern crate sfnt_types as types;

mod byte_store;
mod checksum;
mod error;
mod factory;
mod font;
mod font_data;
pub mod table;
mod table_record;
pub mod tables;
mod writable_data;

pub use byte_store::{ByteStore, COPY_BUFFER_SIZE, MAX_GROWABLE_LEN};
pub use checksum::{compute_checksum, compute_checksum_excluding, CHECKSUM_MAGIC};
pub use error::{ConsistencyFault, Error, ReadError};
pub use factory::{FactoryOptions, FontFactory, TTC_HEADER_LEN};
pub use font::{
    is_supported_sfnt_version, Font, FontBuilder, SearchRange, CFF_TABLE_ORDERING,
    SFNT_HEADER_LEN, TRUE_TYPE_TABLE_ORDERING,
};
pub use font_data::FontData;
pub use table::{BuilderCore, BuilderData, FontTable, SerializedSize, TableBuilder};
pub use table_record::{TableRecord, TABLE_RECORD_LEN};
pub use tables::{AnyTable, AnyTableBuilder, TopLevelBuilder, TopLevelTable};
pub use writable_data::WritableFontData;
