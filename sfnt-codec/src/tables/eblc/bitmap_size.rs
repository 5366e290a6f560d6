//! Bitmap size records

use std::sync::OnceLock;

use crate::{checksum::round4, error::ReadError, FontData, WritableFontData};

use super::index_subtable::{
    BitmapGlyphInfo, IndexSubtable, IndexSubtableBuilder, INDEX_SUBTABLE_RECORD_LEN,
};

/// The length of a [`BitmapSizeRecord`].
pub const BITMAP_SIZE_LEN: usize = 48;
/// The length of a [`SbitLineMetrics`] record, including padding.
pub const SBIT_LINE_METRICS_LEN: usize = 12;

/// Line metrics for one direction of a strike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SbitLineMetrics {
    pub ascender: i8,
    pub descender: i8,
    pub width_max: u8,
    pub caret_slope_numerator: i8,
    pub caret_slope_denominator: i8,
    pub caret_offset: i8,
    pub min_origin_sb: i8,
    pub min_advance_sb: i8,
    pub max_before_bl: i8,
    pub min_after_bl: i8,
}

impl SbitLineMetrics {
    fn read(data: &FontData, offset: usize) -> Result<Self, ReadError> {
        Ok(SbitLineMetrics {
            ascender: data.read_at(offset)?,
            descender: data.read_at(offset + 1)?,
            width_max: data.read_at(offset + 2)?,
            caret_slope_numerator: data.read_at(offset + 3)?,
            caret_slope_denominator: data.read_at(offset + 4)?,
            caret_offset: data.read_at(offset + 5)?,
            min_origin_sb: data.read_at(offset + 6)?,
            min_advance_sb: data.read_at(offset + 7)?,
            max_before_bl: data.read_at(offset + 8)?,
            min_after_bl: data.read_at(offset + 9)?,
        })
    }

    fn write(&self, into: &WritableFontData, offset: usize) -> Result<usize, ReadError> {
        let bytes = [
            self.ascender as u8,
            self.descender as u8,
            self.width_max,
            self.caret_slope_numerator as u8,
            self.caret_slope_denominator as u8,
            self.caret_offset as u8,
            self.min_origin_sb as u8,
            self.min_advance_sb as u8,
            self.max_before_bl as u8,
            self.min_after_bl as u8,
            0,
            0,
        ];
        if into.write_bytes(offset, &bytes)? < SBIT_LINE_METRICS_LEN {
            return Err(ReadError::OutOfBounds);
        }
        Ok(SBIT_LINE_METRICS_LEN)
    }
}

/// The fixed-size part of a bitmap size (strike).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitmapSizeRecord {
    /// Offset from the start of EBLC to this size's index subtable array.
    pub index_subtable_array_offset: u32,
    /// Total size of the index subtable array and its subtables.
    pub index_tables_size: u32,
    pub number_of_index_subtables: u32,
    pub color_ref: u32,
    pub hori: SbitLineMetrics,
    pub vert: SbitLineMetrics,
    pub start_glyph_index: u16,
    pub end_glyph_index: u16,
    pub ppem_x: u8,
    pub ppem_y: u8,
    pub bit_depth: u8,
    pub flags: i8,
}

impl BitmapSizeRecord {
    pub(crate) fn read(data: &FontData, offset: usize) -> Result<Self, ReadError> {
        Ok(BitmapSizeRecord {
            index_subtable_array_offset: data.read_at(offset)?,
            index_tables_size: data.read_at(offset + 4)?,
            number_of_index_subtables: data.read_at(offset + 8)?,
            color_ref: data.read_at(offset + 12)?,
            hori: SbitLineMetrics::read(data, offset + 16)?,
            vert: SbitLineMetrics::read(data, offset + 28)?,
            start_glyph_index: data.read_at(offset + 40)?,
            end_glyph_index: data.read_at(offset + 42)?,
            ppem_x: data.read_at(offset + 44)?,
            ppem_y: data.read_at(offset + 45)?,
            bit_depth: data.read_at(offset + 46)?,
            flags: data.read_at(offset + 47)?,
        })
    }

    pub(crate) fn write(&self, into: &WritableFontData, offset: usize) -> Result<usize, ReadError> {
        let mut pos = offset;
        pos += into.write_at(pos, self.index_subtable_array_offset)?;
        pos += into.write_at(pos, self.index_tables_size)?;
        pos += into.write_at(pos, self.number_of_index_subtables)?;
        pos += into.write_at(pos, self.color_ref)?;
        pos += self.hori.write(into, pos)?;
        pos += self.vert.write(into, pos)?;
        pos += into.write_at(pos, self.start_glyph_index)?;
        pos += into.write_at(pos, self.end_glyph_index)?;
        pos += into.write_at(pos, self.ppem_x)?;
        pos += into.write_at(pos, self.ppem_y)?;
        pos += into.write_at(pos, self.bit_depth)?;
        pos += into.write_at(pos, self.flags)?;
        Ok(pos - offset)
    }
}

/// A bitmap size (strike) in an EBLC table.
///
/// The index subtables are parsed on first access and cached; the cache is
/// safe to populate from several threads at once.
#[derive(Debug, Clone)]
pub struct BitmapSize {
    record: BitmapSizeRecord,
    // the whole EBLC table; subtable offsets are relative to its start
    data: FontData,
    subtables: OnceLock<Vec<IndexSubtable>>,
}

impl BitmapSize {
    pub(crate) fn new(record: BitmapSizeRecord, data: FontData) -> Self {
        BitmapSize {
            record,
            data,
            subtables: OnceLock::new(),
        }
    }

    pub fn record(&self) -> &BitmapSizeRecord {
        &self.record
    }

    pub fn start_glyph_index(&self) -> u16 {
        self.record.start_glyph_index
    }

    pub fn end_glyph_index(&self) -> u16 {
        self.record.end_glyph_index
    }

    /// The index subtables of this size.
    ///
    /// Subtables that cannot be read are left out (with a warning), along
    /// with every subtable after them.
    pub fn subtables(&self) -> &[IndexSubtable] {
        self.subtables.get_or_init(|| {
            let mut subtables = Vec::new();
            for ix in 0..self.record.number_of_index_subtables as usize {
                match self.read_subtable(ix) {
                    Ok(subtable) => subtables.push(subtable),
                    Err(e) => {
                        log::warn!("skipping unreadable index subtable {ix}: {e}");
                        break;
                    }
                }
            }
            subtables
        })
    }

    /// Read every index subtable, failing on the first one that is malformed.
    pub fn try_subtables(&self) -> Result<Vec<IndexSubtable>, ReadError> {
        (0..self.record.number_of_index_subtables as usize)
            .map(|ix| self.read_subtable(ix))
            .collect()
    }

    fn read_subtable(&self, ix: usize) -> Result<IndexSubtable, ReadError> {
        let array_offset = self.record.index_subtable_array_offset as usize;
        let entry = array_offset + ix * INDEX_SUBTABLE_RECORD_LEN;
        let first = self.data.read_at(entry)?;
        let last = self.data.read_at(entry + 2)?;
        let additional_offset: u32 = self.data.read_at(entry + 4)?;
        let data = self
            .data
            .split_off(array_offset + additional_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        IndexSubtable::read(first, last, data)
    }

    /// The subtable covering a glyph.
    pub fn subtable_for(&self, gid: u16) -> Option<&IndexSubtable> {
        self.subtables()
            .iter()
            .find(|subtable| subtable.covers(gid))
    }

    /// The location of a glyph's image in EBDT, or `None` if this size has
    /// no image for it.
    pub fn glyph_info(&self, gid: u16) -> Option<BitmapGlyphInfo> {
        if !(self.record.start_glyph_index..=self.record.end_glyph_index).contains(&gid) {
            return None;
        }
        self.subtable_for(gid)?.glyph_info(gid)
    }
}

/// An owned, editable bitmap size.
///
/// The offset and count fields of `record` are recomputed when serialized,
/// as are the start and end glyph ids when there are any subtables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitmapSizeBuilder {
    pub record: BitmapSizeRecord,
    pub subtables: Vec<IndexSubtableBuilder>,
}

impl BitmapSizeBuilder {
    pub fn new(record: BitmapSizeRecord) -> Self {
        BitmapSizeBuilder {
            record,
            subtables: Vec::new(),
        }
    }

    /// Copy a size and all of its subtables out of an EBLC table.
    pub fn from_table(size: &BitmapSize) -> Result<Self, ReadError> {
        let subtables = size
            .try_subtables()?
            .iter()
            .map(IndexSubtableBuilder::from_table)
            .collect::<Result<_, _>>()?;
        Ok(BitmapSizeBuilder {
            record: size.record,
            subtables,
        })
    }

    /// The length of the index subtable array and its (padded) subtables.
    pub fn index_tables_len(&self) -> usize {
        self.subtables.len() * INDEX_SUBTABLE_RECORD_LEN
            + self
                .subtables
                .iter()
                .map(|subtable| round4(subtable.byte_len()))
                .sum::<usize>()
    }

    /// Write the index subtable array and its subtables at `array_offset`.
    ///
    /// Returns the record to write for this size, with its offsets, counts
    /// and glyph range filled in.
    pub(crate) fn write_index_tables(
        &self,
        into: &WritableFontData,
        array_offset: usize,
    ) -> Result<BitmapSizeRecord, ReadError> {
        let mut subtable_offset = self.subtables.len() * INDEX_SUBTABLE_RECORD_LEN;
        for (ix, subtable) in self.subtables.iter().enumerate() {
            let entry = array_offset + ix * INDEX_SUBTABLE_RECORD_LEN;
            into.write_at(entry, subtable.first_glyph_index)?;
            into.write_at(entry + 2, subtable.last_glyph_index)?;
            into.write_at(entry + 4, to_u32(subtable_offset)?)?;
            let written = subtable.write(into, array_offset + subtable_offset)?;
            let padded = round4(written);
            into.write_padding(array_offset + subtable_offset + written, padded - written)?;
            subtable_offset += padded;
        }

        let mut record = self.record;
        record.index_subtable_array_offset = to_u32(array_offset)?;
        record.index_tables_size = to_u32(subtable_offset)?;
        record.number_of_index_subtables = to_u32(self.subtables.len())?;
        let first = self.subtables.iter().map(|s| s.first_glyph_index).min();
        let last = self.subtables.iter().map(|s| s.last_glyph_index).max();
        if let (Some(first), Some(last)) = (first, last) {
            record.start_glyph_index = first;
            record.end_glyph_index = last;
        }
        Ok(record)
    }
}

fn to_u32(value: usize) -> Result<u32, ReadError> {
    u32::try_from(value).map_err(|_| ReadError::OutOfBounds)
}
