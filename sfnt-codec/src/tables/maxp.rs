//! The [maxp (Maximum Profile)](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::{Fixed, Tag};

use crate::{table::BuilderCore, FontData, TableRecord};

/// 'maxp'
pub const TAG: Tag = Tag::new(b"maxp");

/// Version 0.5, used by fonts with CFF outlines.
pub const VERSION_0_5: Fixed = Fixed::from_bits(0x0000_5000);
/// Version 1.0, used by fonts with TrueType outlines.
pub const VERSION_1_0: Fixed = Fixed::from_bits(0x0001_0000);

/// The length of a version 0.5 table.
pub const MAXP_V0_5_LEN: usize = 6;
/// The length of a version 1.0 table.
pub const MAXP_V1_0_LEN: usize = 32;

pub mod offsets {
    pub const VERSION: usize = 0;
    pub const NUM_GLYPHS: usize = 4;
    pub const MAX_POINTS: usize = 6;
    pub const MAX_CONTOURS: usize = 8;
    pub const MAX_COMPOSITE_POINTS: usize = 10;
    pub const MAX_COMPOSITE_CONTOURS: usize = 12;
    pub const MAX_ZONES: usize = 14;
    pub const MAX_TWILIGHT_POINTS: usize = 16;
    pub const MAX_STORAGE: usize = 18;
    pub const MAX_FUNCTION_DEFS: usize = 20;
    pub const MAX_INSTRUCTION_DEFS: usize = 22;
    pub const MAX_STACK_ELEMENTS: usize = 24;
    pub const MAX_SIZE_OF_INSTRUCTIONS: usize = 26;
    pub const MAX_COMPONENT_ELEMENTS: usize = 28;
    pub const MAX_COMPONENT_DEPTH: usize = 30;
}

/// The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table.
///
/// The fields after `num_glyphs` only exist in version 1.0, and read as zero
/// in a version 0.5 table.
#[derive(Debug, Clone)]
pub struct Maxp {
    record: TableRecord,
    data: FontData,
}

#[derive(Debug, Clone)]
pub struct MaxpBuilder {
    core: BuilderCore,
}

record_fields! {
    Maxp, MaxpBuilder {
        version, set_version: Fixed = offsets::VERSION;
        /// The number of glyphs in the font.
        num_glyphs, set_num_glyphs: u16 = offsets::NUM_GLYPHS;
        max_points, set_max_points: u16 = offsets::MAX_POINTS;
        max_contours, set_max_contours: u16 = offsets::MAX_CONTOURS;
        max_composite_points, set_max_composite_points: u16 = offsets::MAX_COMPOSITE_POINTS;
        max_composite_contours, set_max_composite_contours: u16 = offsets::MAX_COMPOSITE_CONTOURS;
        max_zones, set_max_zones: u16 = offsets::MAX_ZONES;
        max_twilight_points, set_max_twilight_points: u16 = offsets::MAX_TWILIGHT_POINTS;
        max_storage, set_max_storage: u16 = offsets::MAX_STORAGE;
        max_function_defs, set_max_function_defs: u16 = offsets::MAX_FUNCTION_DEFS;
        max_instruction_defs, set_max_instruction_defs: u16 = offsets::MAX_INSTRUCTION_DEFS;
        max_stack_elements, set_max_stack_elements: u16 = offsets::MAX_STACK_ELEMENTS;
        max_size_of_instructions, set_max_size_of_instructions: u16 = offsets::MAX_SIZE_OF_INSTRUCTIONS;
        max_component_elements, set_max_component_elements: u16 = offsets::MAX_COMPONENT_ELEMENTS;
        max_component_depth, set_max_component_depth: u16 = offsets::MAX_COMPONENT_DEPTH;
    }
}

font_table!(Maxp);
data_builder!(MaxpBuilder => Maxp);
