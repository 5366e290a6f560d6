//! Index subtables, which locate glyph images in the EBDT table
//!
//! Each subtable covers a contiguous range of glyph ids and comes in one of
//! five formats:
//!
//! 1. variable-size images, u32 offsets
//! 2. constant-size images with shared metrics
//! 3. variable-size images, u16 offsets
//! 4. variable-size images for a sparse set of glyphs
//! 5. constant-size images with shared metrics for a sparse set of glyphs

use crate::{error::ReadError, FontData, WritableFontData};

/// The length of an entry in a size's index subtable array.
pub const INDEX_SUBTABLE_RECORD_LEN: usize = 8;
/// The length of the header at the start of every index subtable.
pub const INDEX_SUB_HEADER_LEN: usize = 8;
/// The length of a [`BigGlyphMetrics`] record.
pub const BIG_GLYPH_METRICS_LEN: usize = 8;

// offsets of the format specific fields, relative to the subtable
const OFFSET_ARRAY: usize = 8;
const IMAGE_SIZE: usize = 8;
const BIG_METRICS: usize = 12;
const FORMAT_4_NUM_GLYPHS: usize = 8;
const FORMAT_4_GLYPH_ARRAY: usize = 12;
const FORMAT_5_NUM_GLYPHS: usize = 20;
const FORMAT_5_GLYPH_ARRAY: usize = 24;

/// Metrics for bitmaps that may be drawn horizontally or vertically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BigGlyphMetrics {
    pub height: u8,
    pub width: u8,
    pub hori_bearing_x: i8,
    pub hori_bearing_y: i8,
    pub hori_advance: u8,
    pub vert_bearing_x: i8,
    pub vert_bearing_y: i8,
    pub vert_advance: u8,
}

impl BigGlyphMetrics {
    pub(crate) fn read(data: &FontData, offset: usize) -> Result<Self, ReadError> {
        Ok(BigGlyphMetrics {
            height: data.read_at(offset)?,
            width: data.read_at(offset + 1)?,
            hori_bearing_x: data.read_at(offset + 2)?,
            hori_bearing_y: data.read_at(offset + 3)?,
            hori_advance: data.read_at(offset + 4)?,
            vert_bearing_x: data.read_at(offset + 5)?,
            vert_bearing_y: data.read_at(offset + 6)?,
            vert_advance: data.read_at(offset + 7)?,
        })
    }

    pub(crate) fn write(&self, into: &WritableFontData, offset: usize) -> Result<usize, ReadError> {
        let bytes = [
            self.height,
            self.width,
            self.hori_bearing_x as u8,
            self.hori_bearing_y as u8,
            self.hori_advance,
            self.vert_bearing_x as u8,
            self.vert_bearing_y as u8,
            self.vert_advance,
        ];
        if into.write_bytes(offset, &bytes)? < BIG_GLYPH_METRICS_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(BIG_GLYPH_METRICS_LEN)
    }
}

/// The location of one glyph's image in the EBDT table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapGlyphInfo {
    pub glyph_id: u16,
    /// Offset from the start of the EBDT table.
    pub offset: u32,
    /// Length of the image data in bytes.
    pub length: u32,
    /// Format of the EBDT image data.
    pub image_format: u16,
}

/// An index subtable, read from an EBLC table.
#[derive(Debug, Clone)]
pub struct IndexSubtable {
    first_glyph_index: u16,
    last_glyph_index: u16,
    index_format: u16,
    image_format: u16,
    image_data_offset: u32,
    // starts at the subtable header, runs to the end of the EBLC table
    data: FontData,
}

impl IndexSubtable {
    /// Read a subtable whose header is at the start of `data`.
    ///
    /// The glyph range comes from the subtable's entry in its size's index
    /// subtable array.
    pub(crate) fn read(
        first_glyph_index: u16,
        last_glyph_index: u16,
        data: FontData,
    ) -> Result<Self, ReadError> {
        if last_glyph_index < first_glyph_index {
            return Err(ReadError::MalformedData(
                "index subtable ends before it starts",
            ));
        }
        let index_format: u16 = data.read_at(0)?;
        if !(1..=5).contains(&index_format) {
            return Err(ReadError::InvalidFormat(index_format.into()));
        }
        Ok(IndexSubtable {
            first_glyph_index,
            last_glyph_index,
            index_format,
            image_format: data.read_at(2)?,
            image_data_offset: data.read_at(4)?,
            data,
        })
    }

    pub fn first_glyph_index(&self) -> u16 {
        self.first_glyph_index
    }

    pub fn last_glyph_index(&self) -> u16 {
        self.last_glyph_index
    }

    /// The format of this subtable, 1 to 5.
    pub fn index_format(&self) -> u16 {
        self.index_format
    }

    /// The format of the EBDT image data.
    pub fn image_format(&self) -> u16 {
        self.image_format
    }

    /// Offset of this subtable's image data from the start of EBDT.
    pub fn image_data_offset(&self) -> u32 {
        self.image_data_offset
    }

    /// `true` if `gid` is in `first_glyph_index..=last_glyph_index`.
    ///
    /// For the sparse formats this does not mean the glyph has an image.
    pub fn covers(&self, gid: u16) -> bool {
        (self.first_glyph_index..=self.last_glyph_index).contains(&gid)
    }

    fn range_len(&self) -> usize {
        (self.last_glyph_index - self.first_glyph_index) as usize + 1
    }

    /// The number of glyphs with an entry in this subtable.
    pub fn num_glyphs(&self) -> usize {
        match self.index_format {
            4 => self.sparse_count(FORMAT_4_NUM_GLYPHS),
            5 => self.sparse_count(FORMAT_5_NUM_GLYPHS),
            _ => self.range_len(),
        }
    }

    fn sparse_count(&self, offset: usize) -> usize {
        self.data.read_at::<u32>(offset).unwrap_or_default() as usize
    }

    /// The size of every image, for the constant-size formats 2 and 5.
    pub fn image_size(&self) -> Option<u32> {
        match self.index_format {
            2 | 5 => self.data.read_at(IMAGE_SIZE).ok(),
            _ => None,
        }
    }

    /// The metrics shared by every glyph, for formats 2 and 5.
    pub fn big_metrics(&self) -> Option<BigGlyphMetrics> {
        match self.index_format {
            2 | 5 => BigGlyphMetrics::read(&self.data, BIG_METRICS).ok(),
            _ => None,
        }
    }

    /// The glyphs with an entry in this subtable, in increasing order.
    pub fn glyph_ids(&self) -> Vec<u16> {
        let count = self.num_glyphs();
        match self.index_format {
            4 => (0..count)
                .map_while(|i| self.data.read_at(FORMAT_4_GLYPH_ARRAY + i * 4).ok())
                .collect(),
            5 => self
                .data
                .read_array(FORMAT_5_GLYPH_ARRAY, count)
                .unwrap_or_default(),
            _ => (self.first_glyph_index..=self.last_glyph_index).collect(),
        }
    }

    // start and end of a glyph's image, relative to image_data_offset
    fn image_range(&self, gid: u16) -> Option<(u32, u32)> {
        if !self.covers(gid) {
            return None;
        }
        let ix = (gid - self.first_glyph_index) as usize;
        match self.index_format {
            1 => {
                let start = self.data.read_at::<u32>(OFFSET_ARRAY + ix * 4).ok()?;
                let end = self.data.read_at::<u32>(OFFSET_ARRAY + (ix + 1) * 4).ok()?;
                Some((start, end))
            }
            3 => {
                let start = self.data.read_at::<u16>(OFFSET_ARRAY + ix * 2).ok()?;
                let end = self.data.read_at::<u16>(OFFSET_ARRAY + (ix + 1) * 2).ok()?;
                Some((start.into(), end.into()))
            }
            2 => {
                let size = self.image_size()?;
                let start = (ix as u32).checked_mul(size)?;
                Some((start, start.checked_add(size)?))
            }
            4 => {
                let count = self.num_glyphs();
                let i = self.data.search_u16(FORMAT_4_GLYPH_ARRAY, 4, count, gid)?;
                let entry = FORMAT_4_GLYPH_ARRAY + i * 4;
                let start = self.data.read_at::<u16>(entry + 2).ok()?;
                let end = self.data.read_at::<u16>(entry + 4 + 2).ok()?;
                Some((start.into(), end.into()))
            }
            5 => {
                let count = self.num_glyphs();
                let i = self.data.search_u16(FORMAT_5_GLYPH_ARRAY, 2, count, gid)?;
                let size = self.image_size()?;
                let start = (i as u32).checked_mul(size)?;
                Some((start, start.checked_add(size)?))
            }
            _ => None,
        }
    }

    /// The offset of a glyph's image from the start of EBDT.
    ///
    /// Returns `None` if the glyph is not covered by this subtable, or is
    /// absent from a sparse subtable.
    pub fn glyph_offset(&self, gid: u16) -> Option<u32> {
        let (start, _) = self.image_range(gid)?;
        self.image_data_offset.checked_add(start)
    }

    /// The length of a glyph's image.
    pub fn glyph_length(&self, gid: u16) -> Option<u32> {
        let (start, end) = self.image_range(gid)?;
        end.checked_sub(start)
    }

    /// The location of a glyph's image.
    pub fn glyph_info(&self, gid: u16) -> Option<BitmapGlyphInfo> {
        let (start, end) = self.image_range(gid)?;
        Some(BitmapGlyphInfo {
            glyph_id: gid,
            offset: self.image_data_offset.checked_add(start)?,
            length: end.checked_sub(start)?,
            image_format: self.image_format,
        })
    }
}

/// A glyph id and the offset of its image, for format 4.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GlyphIdOffsetPair {
    pub glyph_id: u16,
    pub offset: u16,
}

impl GlyphIdOffsetPair {
    pub fn new(glyph_id: u16, offset: u16) -> Self {
        GlyphIdOffsetPair { glyph_id, offset }
    }
}

/// The format specific contents of an index subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSubtableData {
    /// One offset per glyph in the range, plus one for the end of the last
    /// image.
    Format1(Vec<u32>),
    Format2 {
        image_size: u32,
        big_metrics: BigGlyphMetrics,
    },
    /// As format 1, with u16 offsets.
    Format3(Vec<u16>),
    /// Pairs sorted by glyph id, plus a final pair whose offset is the end
    /// of the last image.
    Format4(Vec<GlyphIdOffsetPair>),
    Format5 {
        image_size: u32,
        big_metrics: BigGlyphMetrics,
        glyph_ids: Vec<u16>,
    },
}

/// An owned, editable index subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSubtableBuilder {
    pub first_glyph_index: u16,
    pub last_glyph_index: u16,
    pub image_format: u16,
    pub image_data_offset: u32,
    pub data: IndexSubtableData,
}

impl IndexSubtableBuilder {
    /// Copy a subtable out of an EBLC table.
    pub fn from_table(table: &IndexSubtable) -> Result<Self, ReadError> {
        let data = &table.data;
        let range_len = table.range_len();
        let contents = match table.index_format {
            1 => IndexSubtableData::Format1(data.read_array(OFFSET_ARRAY, range_len + 1)?),
            2 => IndexSubtableData::Format2 {
                image_size: data.read_at(IMAGE_SIZE)?,
                big_metrics: BigGlyphMetrics::read(data, BIG_METRICS)?,
            },
            3 => IndexSubtableData::Format3(data.read_array(OFFSET_ARRAY, range_len + 1)?),
            4 => {
                let count = data.read_at::<u32>(FORMAT_4_NUM_GLYPHS)? as usize;
                let pairs = (0..=count)
                    .map(|i| {
                        let entry = FORMAT_4_GLYPH_ARRAY + i * 4;
                        Ok(GlyphIdOffsetPair::new(
                            data.read_at(entry)?,
                            data.read_at(entry + 2)?,
                        ))
                    })
                    .collect::<Result<_, ReadError>>()?;
                IndexSubtableData::Format4(pairs)
            }
            5 => {
                let count = data.read_at::<u32>(FORMAT_5_NUM_GLYPHS)? as usize;
                IndexSubtableData::Format5 {
                    image_size: data.read_at(IMAGE_SIZE)?,
                    big_metrics: BigGlyphMetrics::read(data, BIG_METRICS)?,
                    glyph_ids: data.read_array(FORMAT_5_GLYPH_ARRAY, count)?,
                }
            }
            other => return Err(ReadError::InvalidFormat(other.into())),
        };
        Ok(IndexSubtableBuilder {
            first_glyph_index: table.first_glyph_index,
            last_glyph_index: table.last_glyph_index,
            image_format: table.image_format,
            image_data_offset: table.image_data_offset,
            data: contents,
        })
    }

    pub fn index_format(&self) -> u16 {
        match self.data {
            IndexSubtableData::Format1(_) => 1,
            IndexSubtableData::Format2 { .. } => 2,
            IndexSubtableData::Format3(_) => 3,
            IndexSubtableData::Format4(_) => 4,
            IndexSubtableData::Format5 { .. } => 5,
        }
    }

    /// The length of the serialized subtable, without trailing padding.
    pub fn byte_len(&self) -> usize {
        INDEX_SUB_HEADER_LEN
            + match &self.data {
                IndexSubtableData::Format1(offsets) => offsets.len() * 4,
                IndexSubtableData::Format2 { .. } => 4 + BIG_GLYPH_METRICS_LEN,
                IndexSubtableData::Format3(offsets) => offsets.len() * 2,
                IndexSubtableData::Format4(pairs) => 4 + pairs.len() * 4,
                IndexSubtableData::Format5 { glyph_ids, .. } => {
                    4 + BIG_GLYPH_METRICS_LEN + 4 + glyph_ids.len() * 2
                }
            }
    }

    /// Write the subtable at `offset`, returning the number of bytes written.
    pub(crate) fn write(&self, into: &WritableFontData, offset: usize) -> Result<usize, ReadError> {
        let mut pos = offset;
        pos += into.write_at(pos, self.index_format())?;
        pos += into.write_at(pos, self.image_format)?;
        pos += into.write_at(pos, self.image_data_offset)?;
        match &self.data {
            IndexSubtableData::Format1(offsets) => {
                for off in offsets {
                    pos += into.write_at(pos, *off)?;
                }
            }
            IndexSubtableData::Format2 {
                image_size,
                big_metrics,
            } => {
                pos += into.write_at(pos, *image_size)?;
                pos += big_metrics.write(into, pos)?;
            }
            IndexSubtableData::Format3(offsets) => {
                for off in offsets {
                    pos += into.write_at(pos, *off)?;
                }
            }
            IndexSubtableData::Format4(pairs) => {
                let count = pairs.len().saturating_sub(1) as u32;
                pos += into.write_at(pos, count)?;
                for pair in pairs {
                    pos += into.write_at(pos, pair.glyph_id)?;
                    pos += into.write_at(pos, pair.offset)?;
                }
            }
            IndexSubtableData::Format5 {
                image_size,
                big_metrics,
                glyph_ids,
            } => {
                pos += into.write_at(pos, *image_size)?;
                pos += big_metrics.write(into, pos)?;
                pos += into.write_at(pos, glyph_ids.len() as u32)?;
                for gid in glyph_ids {
                    pos += into.write_at(pos, *gid)?;
                }
            }
        }
        Ok(pos - offset)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use sfnt_test_data::eblc as fixtures;

    use super::*;

    fn subtable(format: u16) -> IndexSubtable {
        let (first, last, bytes) = fixtures::index_subtable(format);
        IndexSubtable::read(first, last, FontData::new(bytes)).unwrap()
    }

    #[rstest]
    #[case::format_1(1)]
    #[case::format_2(2)]
    #[case::format_3(3)]
    #[case::format_4(4)]
    #[case::format_5(5)]
    fn outside_range_is_not_found(#[case] format: u16) {
        let table = subtable(format);
        assert_eq!(table.index_format(), format);
        for gid in [0, fixtures::FIRST_GLYPH - 1, fixtures::LAST_GLYPH + 1, u16::MAX] {
            assert_eq!(table.glyph_offset(gid), None, "gid {gid}");
            assert_eq!(table.glyph_length(gid), None, "gid {gid}");
            assert_eq!(table.glyph_info(gid), None, "gid {gid}");
        }
    }

    #[rstest]
    #[case::format_1(1)]
    #[case::format_2(2)]
    #[case::format_3(3)]
    #[case::format_4(4)]
    #[case::format_5(5)]
    fn copy_into_builder_and_back(#[case] format: u16) {
        let table = subtable(format);
        let builder = IndexSubtableBuilder::from_table(&table).unwrap();
        assert_eq!(builder.index_format(), format);
        let out = WritableFontData::growable();
        let written = builder.write(&out, 0).unwrap();
        assert_eq!(written, builder.byte_len());
        let (first, last, bytes) = fixtures::index_subtable(format);
        assert_eq!(out.to_font_data().as_bytes(), &bytes[..written]);
        let reread = IndexSubtable::read(first, last, out.into_read_only()).unwrap();
        assert_eq!(reread.glyph_ids(), table.glyph_ids());
    }

    #[test]
    fn variable_size_formats() {
        // images are 10, 0 and 6 bytes long
        for format in [1, 3] {
            let table = subtable(format);
            let base = fixtures::IMAGE_DATA_OFFSET;
            assert_eq!(table.glyph_offset(fixtures::FIRST_GLYPH), Some(base));
            assert_eq!(table.glyph_length(fixtures::FIRST_GLYPH), Some(10));
            assert_eq!(table.glyph_length(fixtures::FIRST_GLYPH + 1), Some(0));
            assert_eq!(
                table.glyph_info(fixtures::LAST_GLYPH),
                Some(BitmapGlyphInfo {
                    glyph_id: fixtures::LAST_GLYPH,
                    offset: base + 10,
                    length: 6,
                    image_format: fixtures::IMAGE_FORMAT,
                })
            );
        }
    }

    #[test]
    fn constant_size_format() {
        let table = subtable(2);
        assert_eq!(table.image_size(), Some(fixtures::IMAGE_SIZE));
        assert_eq!(
            table.big_metrics(),
            Some(BigGlyphMetrics {
                height: 12,
                width: 8,
                hori_bearing_x: 1,
                hori_bearing_y: 10,
                hori_advance: 9,
                vert_bearing_x: -2,
                vert_bearing_y: 0,
                vert_advance: 12,
            })
        );
        assert_eq!(
            table.glyph_offset(fixtures::LAST_GLYPH),
            Some(fixtures::IMAGE_DATA_OFFSET + 2 * fixtures::IMAGE_SIZE)
        );
        assert_eq!(table.num_glyphs(), 3);
    }

    #[test]
    fn sparse_formats() {
        // only the first and last glyphs of the range are present
        for format in [4, 5] {
            let table = subtable(format);
            assert_eq!(table.num_glyphs(), 2);
            assert_eq!(
                table.glyph_ids(),
                [fixtures::FIRST_GLYPH, fixtures::LAST_GLYPH]
            );
            assert!(table.covers(fixtures::FIRST_GLYPH + 1));
            assert_eq!(table.glyph_offset(fixtures::FIRST_GLYPH + 1), None);
            assert!(table.glyph_offset(fixtures::LAST_GLYPH).is_some());
        }
        let format_4 = subtable(4);
        assert_eq!(format_4.glyph_length(fixtures::FIRST_GLYPH), Some(10));
        assert_eq!(format_4.glyph_length(fixtures::LAST_GLYPH), Some(6));
        let format_5 = subtable(5);
        assert_eq!(
            format_5.glyph_offset(fixtures::LAST_GLYPH),
            Some(fixtures::IMAGE_DATA_OFFSET + fixtures::IMAGE_SIZE)
        );
    }

    #[test]
    fn bad_format_or_range() {
        let (_, _, mut bytes) = fixtures::index_subtable(1);
        bytes[1] = 9;
        assert_eq!(
            IndexSubtable::read(fixtures::FIRST_GLYPH, fixtures::LAST_GLYPH, FontData::new(bytes))
                .err(),
            Some(ReadError::InvalidFormat(9))
        );
        let (_, _, bytes) = fixtures::index_subtable(1);
        assert!(IndexSubtable::read(5, 4, FontData::new(bytes)).is_err());
    }
}
