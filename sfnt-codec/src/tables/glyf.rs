//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use types::Tag;

use crate::{error::ReadError, table::BuilderCore, FontData, TableRecord};

use super::loca::Loca;

/// 'glyf'
pub const TAG: Tag = Tag::new(b"glyf");

/// The length of the header shared by simple and composite glyphs.
pub const GLYPH_HEADER_LEN: usize = 10;

/// The [glyf](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table.
///
/// Glyphs are located through the [`Loca`] table; outlines are not decoded.
#[derive(Debug, Clone)]
pub struct Glyf {
    record: TableRecord,
    data: FontData,
}

#[derive(Debug, Clone)]
pub struct GlyfBuilder {
    core: BuilderCore,
}

/// The bytes of a single glyph, sharing storage with the glyf table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphData {
    data: FontData,
}

impl Glyf {
    /// The data for one glyph.
    ///
    /// Returns `Ok(None)` for a glyph with no outline, and an error if the
    /// glyph id is not in `loca` or its range does not fit in this table.
    pub fn glyph_data(&self, loca: &Loca, gid: u16) -> Result<Option<GlyphData>, ReadError> {
        let start = loca.glyph_offset(gid).ok_or(ReadError::OutOfBounds)?;
        let len = loca.glyph_length(gid).ok_or(ReadError::OutOfBounds)?;
        if len == 0 {
            return Ok(None);
        }
        self.data
            .slice(start as usize, len as usize)
            .map(|data| Some(GlyphData { data }))
            .ok_or(ReadError::OutOfBounds)
    }
}

impl GlyphData {
    pub fn data(&self) -> &FontData {
        &self.data
    }

    /// Non-negative for simple glyphs, negative for composites.
    pub fn number_of_contours(&self) -> i16 {
        self.data.read_at(0).unwrap_or_default()
    }

    pub fn is_composite(&self) -> bool {
        self.number_of_contours() < 0
    }

    pub fn x_min(&self) -> i16 {
        self.data.read_at(2).unwrap_or_default()
    }

    pub fn y_min(&self) -> i16 {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn x_max(&self) -> i16 {
        self.data.read_at(6).unwrap_or_default()
    }

    pub fn y_max(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    /// The bounding box as `[x_min, y_min, x_max, y_max]`.
    pub fn bbox(&self) -> [i16; 4] {
        [self.x_min(), self.y_min(), self.x_max(), self.y_max()]
    }
}

font_table!(Glyf);
data_builder!(GlyfBuilder => Glyf);
