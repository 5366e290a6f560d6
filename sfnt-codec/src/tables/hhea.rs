//! The [hhea (Horizontal Header)](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use types::{Fixed, Tag};

use crate::{table::BuilderCore, FontData, TableRecord};

/// 'hhea'
pub const TAG: Tag = Tag::new(b"hhea");

/// The length of the hhea table.
pub const HHEA_LEN: usize = 36;

pub mod offsets {
    pub const VERSION: usize = 0;
    pub const ASCENDER: usize = 4;
    pub const DESCENDER: usize = 6;
    pub const LINE_GAP: usize = 8;
    pub const ADVANCE_WIDTH_MAX: usize = 10;
    pub const MIN_LEFT_SIDE_BEARING: usize = 12;
    pub const MIN_RIGHT_SIDE_BEARING: usize = 14;
    pub const X_MAX_EXTENT: usize = 16;
    pub const CARET_SLOPE_RISE: usize = 18;
    pub const CARET_SLOPE_RUN: usize = 20;
    pub const CARET_OFFSET: usize = 22;
    pub const METRIC_DATA_FORMAT: usize = 32;
    pub const NUMBER_OF_H_METRICS: usize = 34;
}

/// The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table.
#[derive(Debug, Clone)]
pub struct Hhea {
    record: TableRecord,
    data: FontData,
}

#[derive(Debug, Clone)]
pub struct HheaBuilder {
    core: BuilderCore,
}

record_fields! {
    Hhea, HheaBuilder {
        version, set_version: Fixed = offsets::VERSION;
        /// Typographic ascent.
        ascender, set_ascender: i16 = offsets::ASCENDER;
        /// Typographic descent.
        descender, set_descender: i16 = offsets::DESCENDER;
        /// Typographic line gap.
        line_gap, set_line_gap: i16 = offsets::LINE_GAP;
        /// Maximum advance width value in 'hmtx' table.
        advance_width_max, set_advance_width_max: u16 = offsets::ADVANCE_WIDTH_MAX;
        min_left_side_bearing, set_min_left_side_bearing: i16 = offsets::MIN_LEFT_SIDE_BEARING;
        min_right_side_bearing, set_min_right_side_bearing: i16 = offsets::MIN_RIGHT_SIDE_BEARING;
        /// Max(lsb + (xMax - xMin)).
        x_max_extent, set_x_max_extent: i16 = offsets::X_MAX_EXTENT;
        caret_slope_rise, set_caret_slope_rise: i16 = offsets::CARET_SLOPE_RISE;
        caret_slope_run, set_caret_slope_run: i16 = offsets::CARET_SLOPE_RUN;
        caret_offset, set_caret_offset: i16 = offsets::CARET_OFFSET;
        /// 0 for current format.
        metric_data_format, set_metric_data_format: i16 = offsets::METRIC_DATA_FORMAT;
        /// Number of long metrics in the 'hmtx' table.
        number_of_h_metrics, set_number_of_h_metrics: u16 = offsets::NUMBER_OF_H_METRICS;
    }
}

font_table!(Hhea);
data_builder!(HheaBuilder => Hhea);
