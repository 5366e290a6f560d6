//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use types::Tag;

use crate::{
    error::{Error, ReadError},
    table::{BuilderCore, SerializedSize, TableBuilder},
    FontData, TableRecord, WritableFontData,
};

/// 'loca'
pub const TAG: Tag = Tag::new(b"loca");

/// The largest offset a short loca can hold.
const MAX_SHORT_OFFSET: u32 = u16::MAX as u32 * 2;

/// The width of the offsets in a loca table, from `head.indexToLocFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocaFormat {
    /// Offsets are u16, storing the real offset divided by two.
    Short,
    /// Offsets are u32.
    Long,
}

impl LocaFormat {
    /// Returns `None` for any value other than 0 (short) or 1 (long).
    pub fn from_index_to_loc_format(raw: i16) -> Option<Self> {
        match raw {
            0 => Some(LocaFormat::Short),
            1 => Some(LocaFormat::Long),
            _ => None,
        }
    }

    /// The value stored in `head.indexToLocFormat`.
    pub fn index_to_loc_format(self) -> i16 {
        match self {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        }
    }

    /// The size of one entry.
    pub fn entry_len(self) -> usize {
        match self {
            LocaFormat::Short => 2,
            LocaFormat::Long => 4,
        }
    }

    fn read(self, data: &FontData, index: usize) -> Option<u32> {
        match self {
            LocaFormat::Short => data
                .read_at::<u16>(index * 2)
                .ok()
                .map(|off| off as u32 * 2),
            LocaFormat::Long => data.read_at::<u32>(index * 4).ok(),
        }
    }
}

/// The [loca] table.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Debug, Clone)]
pub struct Loca {
    record: TableRecord,
    data: FontData,
    format: Option<LocaFormat>,
    num_glyphs: Option<u16>,
}

impl Loca {
    /// The offset format, if it was known when the table was built.
    pub fn format(&self) -> Option<LocaFormat> {
        self.format
    }

    /// The number of glyphs covered by the table.
    ///
    /// Without a glyph count from `maxp` this is derived from the table's
    /// length.
    pub fn num_glyphs(&self) -> usize {
        match (self.num_glyphs, self.format) {
            (Some(count), _) => count as usize,
            (None, Some(format)) => (self.data.len() / format.entry_len()).saturating_sub(1),
            (None, None) => 0,
        }
    }

    /// The offset of a glyph in the glyf table.
    ///
    /// `gid` may be equal to the glyph count, for the end of the last glyph.
    pub fn glyph_offset(&self, gid: u16) -> Option<u32> {
        if gid as usize > self.num_glyphs() {
            return None;
        }
        self.format?.read(&self.data, gid as usize)
    }

    /// The length in bytes of a glyph in the glyf table.
    pub fn glyph_length(&self, gid: u16) -> Option<u32> {
        let start = self.glyph_offset(gid)?;
        let end = self.glyph_offset(gid.checked_add(1)?)?;
        end.checked_sub(start)
    }
}

font_table!(Loca);

/// A builder for the loca table.
///
/// Reading or serializing the offsets needs the format, which the font
/// builder pushes in from `head`.
#[derive(Debug, Clone)]
pub struct LocaBuilder {
    core: BuilderCore,
    format: Option<LocaFormat>,
    num_glyphs: Option<u16>,
    offsets: Option<Vec<u32>>,
}

impl LocaBuilder {
    pub(crate) fn from_core(core: BuilderCore) -> Self {
        LocaBuilder {
            core,
            format: None,
            num_glyphs: None,
            offsets: None,
        }
    }

    /// Set the glyph count, from `maxp`.
    pub fn set_num_glyphs(&mut self, num_glyphs: u16) {
        self.num_glyphs = Some(num_glyphs);
    }

    /// Set the offset format, from `head`.
    ///
    /// This is both the format the raw bytes are read in and the format a
    /// changed model is written in.
    pub fn set_format(&mut self, format: LocaFormat) {
        self.format = Some(format);
    }

    pub fn format(&self) -> Option<LocaFormat> {
        self.format
    }

    pub fn num_glyphs(&self) -> Option<u16> {
        self.num_glyphs
    }

    /// The glyph offsets, parsing them from the raw bytes if needed.
    ///
    /// There is one more offset than there are glyphs. Marks the model as
    /// changed.
    pub fn offsets_mut(&mut self) -> Result<&mut Vec<u32>, Error> {
        let offsets = match self.offsets.take() {
            Some(offsets) => offsets,
            None => self.parse_offsets()?,
        };
        self.core.set_model_changed();
        Ok(self.offsets.insert(offsets))
    }

    /// Replace the glyph offsets.
    pub fn set_offsets(&mut self, offsets: Vec<u32>) {
        self.offsets = Some(offsets);
        self.core.set_model_changed();
    }

    fn missing(&self, field: &'static str) -> Error {
        Error::MissingState {
            tag: self.core.tag(),
            field,
        }
    }

    fn parse_offsets(&self) -> Result<Vec<u32>, Error> {
        let Some(data) = self.core.font_data() else {
            return Ok(Vec::new());
        };
        let format = self.format.ok_or_else(|| self.missing("indexToLocFormat"))?;
        let count = match self.num_glyphs {
            Some(num_glyphs) => num_glyphs as usize + 1,
            None => data.len() / format.entry_len(),
        };
        let offsets = match format {
            LocaFormat::Short => data
                .read_array::<u16>(0, count)?
                .into_iter()
                .map(|off| off as u32 * 2)
                .collect(),
            LocaFormat::Long => data.read_array::<u32>(0, count)?,
        };
        Ok(offsets)
    }
}

impl TableBuilder for LocaBuilder {
    type Table = Loca;

    fn core(&self) -> &BuilderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BuilderCore {
        &mut self.core
    }

    fn ready_to_serialize(&self) -> bool {
        self.offsets.is_some()
    }

    fn size_to_serialize(&self) -> SerializedSize {
        let count = self.offsets.as_ref().map_or(0, Vec::len);
        let entry_len = self.format.map_or(0, LocaFormat::entry_len);
        SerializedSize::Known(count * entry_len)
    }

    fn serialize(&self, into: &WritableFontData) -> Result<usize, Error> {
        let format = self.format.ok_or_else(|| self.missing("indexToLocFormat"))?;
        let mut pos = 0;
        for offset in self.offsets.iter().flatten().copied() {
            pos += match format {
                LocaFormat::Short => {
                    if offset % 2 != 0 || offset > MAX_SHORT_OFFSET {
                        return Err(ReadError::MalformedData(
                            "short loca offsets must be even and below 0x20000",
                        )
                        .into());
                    }
                    into.write_at(pos, (offset / 2) as u16)?
                }
                LocaFormat::Long => into.write_at(pos, offset)?,
            };
        }
        Ok(pos)
    }

    fn reset_model(&mut self) {
        self.offsets = None;
    }

    fn materialize(&self, record: TableRecord, data: FontData) -> Result<Loca, Error> {
        let num_glyphs = match &self.offsets {
            Some(offsets) => Some(offsets.len().saturating_sub(1).min(u16::MAX as usize) as u16),
            None => self.num_glyphs,
        };
        Ok(Loca {
            record,
            data,
            format: self.format,
            num_glyphs,
        })
    }
}
