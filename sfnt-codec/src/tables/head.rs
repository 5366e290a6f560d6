//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use std::ops::Range;

use types::{Fixed, LongDateTime, Tag};

use crate::{table::BuilderCore, FontData, TableRecord};

use super::loca::LocaFormat;

/// 'head'
pub const TAG: Tag = Tag::new(b"head");

/// The length of the head table.
pub const HEAD_LEN: usize = 54;

/// The value of the magicNumber field.
pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// Byte offsets of the fields of the head table.
pub mod offsets {
    pub const VERSION: usize = 0;
    pub const FONT_REVISION: usize = 4;
    pub const CHECKSUM_ADJUSTMENT: usize = 8;
    pub const MAGIC_NUMBER: usize = 12;
    pub const FLAGS: usize = 16;
    pub const UNITS_PER_EM: usize = 18;
    pub const CREATED: usize = 20;
    pub const MODIFIED: usize = 28;
    pub const X_MIN: usize = 36;
    pub const Y_MIN: usize = 38;
    pub const X_MAX: usize = 40;
    pub const Y_MAX: usize = 42;
    pub const MAC_STYLE: usize = 44;
    pub const LOWEST_REC_PPEM: usize = 46;
    pub const FONT_DIRECTION_HINT: usize = 48;
    pub const INDEX_TO_LOC_FORMAT: usize = 50;
    pub const GLYPH_DATA_FORMAT: usize = 52;
}

/// The byte ranges left out of the head table's checksum.
///
/// checksumAdjustment is derived from the whole-font checksum, so it (and
/// the magic number next to it) must not contribute to it.
///
/// Most font tools only zero checksumAdjustment when computing the head
/// checksum. For fonts written by them, the directory checksum loaded for
/// head differs from this one by the magic number, and a re-serialized
/// file carries this checksum instead of the original.
pub const CHECKSUM_EXEMPT: [Range<usize>; 2] = [
    offsets::CHECKSUM_ADJUSTMENT..offsets::CHECKSUM_ADJUSTMENT + 4,
    offsets::MAGIC_NUMBER..offsets::MAGIC_NUMBER + 4,
];

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table.
#[derive(Debug, Clone)]
pub struct Head {
    record: TableRecord,
    data: FontData,
}

/// A builder for the head table; fields are edited in place.
#[derive(Debug, Clone)]
pub struct HeadBuilder {
    core: BuilderCore,
}

record_fields! {
    Head, HeadBuilder {
        /// Version number of the font header table, set to 1.0.
        version, set_version: Fixed = offsets::VERSION;
        /// Set by font manufacturer.
        font_revision, set_font_revision: Fixed = offsets::FONT_REVISION;
        /// `0xB1B0AFBA` minus the checksum of the whole font, computed with
        /// this field set to zero.
        checksum_adjustment, set_checksum_adjustment: u32 = offsets::CHECKSUM_ADJUSTMENT;
        /// Set to `0x5F0F3CF5`.
        magic_number, set_magic_number: u32 = offsets::MAGIC_NUMBER;
        flags, set_flags: u16 = offsets::FLAGS;
        /// Set to a value from 16 to 16384.
        units_per_em, set_units_per_em: u16 = offsets::UNITS_PER_EM;
        /// Seconds since 12:00 midnight, January 1st 1904, UTC.
        created, set_created: LongDateTime = offsets::CREATED;
        /// Seconds since 12:00 midnight, January 1st 1904, UTC.
        modified, set_modified: LongDateTime = offsets::MODIFIED;
        /// Minimum x coordinate across all glyph bounding boxes.
        x_min, set_x_min: i16 = offsets::X_MIN;
        /// Minimum y coordinate across all glyph bounding boxes.
        y_min, set_y_min: i16 = offsets::Y_MIN;
        /// Maximum x coordinate across all glyph bounding boxes.
        x_max, set_x_max: i16 = offsets::X_MAX;
        /// Maximum y coordinate across all glyph bounding boxes.
        y_max, set_y_max: i16 = offsets::Y_MAX;
        mac_style, set_mac_style: u16 = offsets::MAC_STYLE;
        /// Smallest readable size in pixels.
        lowest_rec_ppem, set_lowest_rec_ppem: u16 = offsets::LOWEST_REC_PPEM;
        /// Deprecated (set to 2).
        font_direction_hint, set_font_direction_hint: i16 = offsets::FONT_DIRECTION_HINT;
        /// 0 for short offsets (Offset16), 1 for long (Offset32).
        index_to_loc_format, set_index_to_loc_format: i16 = offsets::INDEX_TO_LOC_FORMAT;
        /// 0 for current format.
        glyph_data_format, set_glyph_data_format: i16 = offsets::GLYPH_DATA_FORMAT;
    }
}

impl Head {
    /// The loca format, or `None` if indexToLocFormat is not 0 or 1.
    pub fn loca_format(&self) -> Option<LocaFormat> {
        LocaFormat::from_index_to_loc_format(self.index_to_loc_format())
    }
}

impl crate::table::FontTable for Head {
    fn record(&self) -> &TableRecord {
        &self.record
    }

    fn data(&self) -> &FontData {
        &self.data
    }

    fn checksum(&self) -> u32 {
        self.data.checksum_excluding(&CHECKSUM_EXEMPT)
    }
}

impl HeadBuilder {
    pub fn loca_format(&self) -> Option<LocaFormat> {
        LocaFormat::from_index_to_loc_format(self.index_to_loc_format())
    }
}

data_builder!(HeadBuilder => Head);
