//! Fonts, font builders, and the sfnt container format
//!
//! A [`Font`] is an immutable map of built tables. A [`FontBuilder`] holds
//! one [`AnyTableBuilder`] per tag; building it wires the tables that cannot
//! describe themselves (hmtx and loca) to the tables that describe them,
//! then builds every table.
//!
//! Serialization writes the tables in a *data order* (where the bytes land
//! in the file) that is independent of the *directory order*, which is
//! always sorted by tag.

use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    io::{ErrorKind, Read, Write},
    ops::Range,
};

use indexmap::IndexSet;
use types::{Scalar, Tag, CFF_SFNT_VERSION, TRUE_SFNT_VERSION, TT_SFNT_VERSION};

use crate::{
    byte_store::ByteStore,
    checksum::{compute_checksum, round4, CHECKSUM_MAGIC},
    error::{ConsistencyFault, Error, ReadError},
    table::{BuilderData, FontTable},
    table_record::{TableRecord, TABLE_RECORD_LEN},
    tables::{
        head::{self, HeadBuilder},
        hhea::{self, HheaBuilder},
        hmtx::HmtxBuilder,
        loca::{LocaBuilder, LocaFormat},
        maxp::{self, MaxpBuilder},
        AnyTable, AnyTableBuilder, TopLevelBuilder, TopLevelTable,
    },
    FontData, WritableFontData,
};

/// The length of the sfnt header that precedes the table directory.
pub const SFNT_HEADER_LEN: usize = 12;

const CFF: Tag = Tag::new(b"CFF ");

/// The default data order for fonts with TrueType outlines.
pub const TRUE_TYPE_TABLE_ORDERING: &[Tag] = &[
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"maxp"),
    Tag::new(b"OS/2"),
    Tag::new(b"hmtx"),
    Tag::new(b"LTSH"),
    Tag::new(b"VDMX"),
    Tag::new(b"hdmx"),
    Tag::new(b"cmap"),
    Tag::new(b"fpgm"),
    Tag::new(b"prep"),
    Tag::new(b"cvt "),
    Tag::new(b"loca"),
    Tag::new(b"glyf"),
    Tag::new(b"kern"),
    Tag::new(b"name"),
    Tag::new(b"post"),
    Tag::new(b"gasp"),
    Tag::new(b"PCLT"),
    Tag::new(b"DSIG"),
];

/// The default data order for fonts with CFF outlines.
pub const CFF_TABLE_ORDERING: &[Tag] = &[
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"maxp"),
    Tag::new(b"OS/2"),
    Tag::new(b"name"),
    Tag::new(b"cmap"),
    Tag::new(b"post"),
    CFF,
];

/// `true` for the sfnt versions this crate can load.
pub fn is_supported_sfnt_version(version: u32) -> bool {
    matches!(
        version,
        TT_SFNT_VERSION | CFF_SFNT_VERSION | TRUE_SFNT_VERSION
    )
}

/// The binary search helper fields of the sfnt header.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    /// Compute the fields for a directory of `num_tables` records.
    ///
    /// All three fields are zero for an empty directory.
    pub fn compute(num_tables: u16) -> Self {
        if num_tables == 0 {
            return SearchRange::default();
        }
        let entry_selector = num_tables.ilog2();
        let search_range = 2u32 << (entry_selector + 3);
        let range_shift = num_tables as u32 * TABLE_RECORD_LEN as u32 - search_range;
        // from 4096 tables on, the ranges no longer fit in 16 bits
        let saturate = |value: u32| u16::try_from(value).unwrap_or(u16::MAX);
        SearchRange {
            search_range: saturate(search_range),
            entry_selector: entry_selector as u16,
            range_shift: saturate(range_shift),
        }
    }
}

/// The sfnt header and table directory of one font.
#[derive(Debug, Clone)]
struct TableDirectory {
    sfnt_version: u32,
    /// In directory order, with duplicate tags removed.
    records: Vec<TableRecord>,
}

impl TableDirectory {
    /// Read the directory of a font whose header starts at `offset`.
    fn read(data: &FontData, offset: usize) -> Result<Self, ReadError> {
        let sfnt_version: u32 = data.read_at(offset)?;
        if !is_supported_sfnt_version(sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let num_tables: u16 = data.read_at(offset + 4)?;
        let mut records = Vec::with_capacity(num_tables as usize);
        for ix in 0..num_tables as usize {
            let pos = offset + SFNT_HEADER_LEN + ix * TABLE_RECORD_LEN;
            records.push(TableRecord::from_directory(
                data.read_at(pos)?,
                data.read_at(pos + 4)?,
                data.read_at(pos + 8)?,
                data.read_at(pos + 12)?,
            ));
        }

        if records.windows(2).any(|pair| pair[0].tag() >= pair[1].tag()) {
            log::warn!("table directory is not sorted by tag");
        }
        let mut seen = BTreeSet::new();
        records.retain(|record| {
            let first = seen.insert(record.tag());
            if !first {
                log::warn!("duplicate '{}' record, keeping the first", record.tag());
            }
            first
        });
        Ok(TableDirectory {
            sfnt_version,
            records,
        })
    }

    fn header_len(num_tables: usize) -> usize {
        SFNT_HEADER_LEN + num_tables * TABLE_RECORD_LEN
    }
}

// head's directory checksum leaves out the fields derived from it.
fn exempt_ranges(tag: Tag) -> &'static [Range<usize>] {
    if tag == head::TAG {
        &head::CHECKSUM_EXEMPT
    } else {
        &[]
    }
}

fn checksum_adjustment_range() -> Range<usize> {
    head::offsets::CHECKSUM_ADJUSTMENT..head::offsets::CHECKSUM_ADJUSTMENT + 4
}

/// An immutable font: a set of built tables and an sfnt version.
///
/// A font never changes once built, and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Font {
    sfnt_version: u32,
    tables: BTreeMap<Tag, AnyTable>,
    fingerprint: Option<u32>,
}

/// A table's place in a serialized font.
struct LayoutEntry<'a> {
    record: TableRecord,
    table: &'a AnyTable,
}

impl Font {
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn has_table(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    pub fn table(&self, tag: Tag) -> Option<&AnyTable> {
        self.tables.get(&tag)
    }

    /// Every table, by tag.
    pub fn table_map(&self) -> &BTreeMap<Tag, AnyTable> {
        &self.tables
    }

    /// A table with a dedicated type, e.g. `font.get::<Head>()`.
    pub fn get<T: TopLevelTable>(&self) -> Option<&T> {
        self.tables.get(&T::TAG).and_then(T::from_any)
    }

    /// The content fingerprint, if it was computed when the font was loaded.
    ///
    /// This is the whole-font checksum of the header, directory and table
    /// checksums, for the default data ordering.
    pub fn fingerprint(&self) -> Option<u32> {
        self.fingerprint
    }

    pub(crate) fn compute_fingerprint(&mut self) -> Result<u32, Error> {
        let layout = self.layout(None)?;
        let directory = self.directory_bytes(&layout)?;
        let fingerprint = layout
            .iter()
            .fold(compute_checksum(&directory), |sum, entry| {
                sum.wrapping_add(entry.table.checksum())
            });
        self.fingerprint = Some(fingerprint);
        Ok(fingerprint)
    }

    /// The data order for this font.
    ///
    /// Starts from `preferred` (or the default ordering for the font's
    /// outline format), keeps the tags that are present, and appends every
    /// other table in tag order.
    pub fn data_ordering(&self, preferred: Option<&[Tag]>) -> IndexSet<Tag> {
        let preferred = preferred.unwrap_or(if self.has_table(CFF) {
            CFF_TABLE_ORDERING
        } else {
            TRUE_TYPE_TABLE_ORDERING
        });
        let mut ordering: IndexSet<Tag> = preferred
            .iter()
            .copied()
            .filter(|tag| self.has_table(*tag))
            .collect();
        ordering.extend(self.tables.keys().copied());
        ordering
    }

    /// Write the font, with its tables in `ordering` (or the default order).
    ///
    /// Returns the number of bytes written. Table bytes are written exactly
    /// as built.
    pub fn serialize<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        ordering: Option<&[Tag]>,
    ) -> Result<usize, Error> {
        self.write_font(writer, ordering, false)
    }

    /// Write the font, replacing `head.checksumAdjustment` in the output so
    /// the whole file sums to the checksum magic number.
    pub fn serialize_with_checksum_adjustment<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        ordering: Option<&[Tag]>,
    ) -> Result<usize, Error> {
        self.write_font(writer, ordering, true)
    }

    /// Serialize the font in the default order.
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.serialize(&mut out, None)?;
        Ok(out)
    }

    pub(crate) fn write_font<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        ordering: Option<&[Tag]>,
        update_checksum_adjustment: bool,
    ) -> Result<usize, Error> {
        let layout = self.layout(ordering)?;
        let directory = self.directory_bytes(&layout)?;
        let adjustment = update_checksum_adjustment
            .then(|| self.checksum_adjustment(&layout, &directory));
        log::debug!(
            "writing {} tables, {} byte directory",
            layout.len(),
            directory.len()
        );

        writer.write_all(&directory)?;
        let mut written = directory.len();
        for entry in &layout {
            let data = entry.table.data();
            let adjustment_range = checksum_adjustment_range();
            match adjustment {
                Some(adjustment)
                    if entry.record.tag() == head::TAG && data.len() >= adjustment_range.end =>
                {
                    let bytes = data.as_bytes();
                    writer.write_all(&bytes[..adjustment_range.start])?;
                    writer.write_all(&adjustment.to_be_bytes())?;
                    writer.write_all(&bytes[adjustment_range.end..])?;
                }
                _ => {
                    data.copy_to_writer(writer)?;
                }
            }
            let padding = round4(data.len()) - data.len();
            writer.write_all(&[0u8; 3][..padding])?;
            written += data.len() + padding;
        }
        Ok(written)
    }

    /// Assign each table its offset, length and checksum, in data order.
    fn layout(&self, ordering: Option<&[Tag]>) -> Result<Vec<LayoutEntry<'_>>, Error> {
        let mut offset = TableDirectory::header_len(self.tables.len());
        let mut layout = Vec::with_capacity(self.tables.len());
        for tag in self.data_ordering(ordering) {
            let Some(table) = self.tables.get(&tag) else {
                continue;
            };
            let actual = u32::try_from(table.data().len()).map_err(|_| ReadError::OutOfBounds)?;
            if let Some(declared) = table.record().length() {
                if declared != actual {
                    return Err(ConsistencyFault::LengthMismatch {
                        tag,
                        declared,
                        actual,
                    }
                    .into());
                }
            }
            let table_offset = u32::try_from(offset).map_err(|_| ReadError::OutOfBounds)?;
            log::trace!("'{tag}' at {table_offset}, {actual} bytes");
            layout.push(LayoutEntry {
                record: TableRecord::from_directory(tag, table.checksum(), table_offset, actual),
                table,
            });
            offset = round4(offset + actual as usize);
        }
        Ok(layout)
    }

    /// The sfnt header followed by the tag-sorted directory.
    fn directory_bytes(&self, layout: &[LayoutEntry]) -> Result<Vec<u8>, Error> {
        let num_tables =
            u16::try_from(layout.len()).map_err(|_| ReadError::MalformedData("too many tables"))?;
        let search = SearchRange::compute(num_tables);
        let out = WritableFontData::with_capacity(TableDirectory::header_len(layout.len()));
        out.write_at(0, self.sfnt_version)?;
        out.write_at(4, num_tables)?;
        out.write_at(6, search.search_range)?;
        out.write_at(8, search.entry_selector)?;
        out.write_at(10, search.range_shift)?;

        let mut records: Vec<_> = layout.iter().map(|entry| entry.record).collect();
        records.sort_by(TableRecord::cmp_by_tag);
        for (ix, record) in records.iter().enumerate() {
            let pos = SFNT_HEADER_LEN + ix * TABLE_RECORD_LEN;
            out.write_at(pos, record.tag())?;
            out.write_at(pos + 4, record.checksum().unwrap_or_default())?;
            out.write_at(pos + 8, record.offset().unwrap_or_default())?;
            out.write_at(pos + 12, record.length().unwrap_or_default())?;
        }
        Ok(out.into_read_only().to_vec())
    }

    /// `CHECKSUM_MAGIC` minus the checksum of the whole file, computed with
    /// checksumAdjustment set to zero.
    fn checksum_adjustment(&self, layout: &[LayoutEntry], directory: &[u8]) -> u32 {
        let adjustment_range = [checksum_adjustment_range()];
        let sum = layout
            .iter()
            .fold(compute_checksum(directory), |sum, entry| {
                let exempt: &[Range<usize>] = if entry.record.tag() == head::TAG {
                    &adjustment_range
                } else {
                    &[]
                };
                sum.wrapping_add(entry.table.data().checksum_excluding(exempt))
            });
        CHECKSUM_MAGIC.wrapping_sub(sum)
    }
}

/// A mutable font, holding a builder for each table.
///
/// A font builder is single use: [`FontBuilder::build`] consumes it.
#[derive(Debug, Clone)]
pub struct FontBuilder {
    sfnt_version: u32,
    builders: BTreeMap<Tag, AnyTableBuilder>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        FontBuilder {
            sfnt_version: TT_SFNT_VERSION,
            builders: BTreeMap::new(),
        }
    }
}

impl FontBuilder {
    /// An empty TrueType font builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a font from shared bytes, with its header at `offset`.
    ///
    /// Table builders share `data` until they are first written to.
    /// Records whose tables do not fit in `data` are dropped.
    pub(crate) fn from_font_data(data: &FontData, offset: usize) -> Result<Self, Error> {
        let directory = TableDirectory::read(data, offset)?;
        let mut builder = FontBuilder {
            sfnt_version: directory.sfnt_version,
            builders: BTreeMap::new(),
        };
        for record in directory.records {
            let (table_offset, length) = (
                record.offset().unwrap_or_default() as usize,
                record.length().unwrap_or_default() as usize,
            );
            match data.slice(table_offset, length) {
                Some(table_data) => builder.insert_loaded(record, BuilderData::Reading(table_data)),
                None => log::warn!(
                    "'{}' ({length} bytes at {table_offset}) runs past the end of the data",
                    record.tag()
                ),
            }
        }
        Ok(builder)
    }

    /// Load a single font from a stream, in one forward pass.
    ///
    /// Tables are read in offset order, each into its own buffer. Tables
    /// that overlap data already read, or that the stream ends before, are
    /// dropped. Empty tables are kept wherever they point.
    pub(crate) fn from_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let mut header = vec![0u8; SFNT_HEADER_LEN];
        reader.read_exact(&mut header)?;
        let sfnt_version = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        if !is_supported_sfnt_version(sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version).into());
        }
        let num_tables = u16::from_be_bytes([header[4], header[5]]) as usize;
        header.resize(TableDirectory::header_len(num_tables), 0);
        reader.read_exact(&mut header[SFNT_HEADER_LEN..])?;
        let mut position = header.len();
        let directory = TableDirectory::read(&FontData::new(header), 0)?;

        let mut records = directory.records;
        records.sort_by(TableRecord::cmp_by_offset);
        let mut builder = FontBuilder {
            sfnt_version,
            builders: BTreeMap::new(),
        };
        for record in records {
            let tag = record.tag();
            let offset = record.offset().unwrap_or_default() as usize;
            let length = record.length().unwrap_or_default() as usize;
            if offset < position && length == 0 {
                let data = WritableFontData::from_store(ByteStore::fixed(0));
                builder.insert_loaded(record, BuilderData::Writing(data));
                continue;
            }
            if offset < position {
                log::warn!("'{tag}' at {offset} overlaps data already read, skipping");
                continue;
            }
            let skip = (offset - position) as u64;
            if std::io::copy(&mut (&mut *reader).take(skip), &mut std::io::sink())? < skip {
                log::warn!("stream ended before '{tag}' at {offset}");
                break;
            }
            let mut store = ByteStore::fixed(length);
            match store.copy_from_reader(0, length, reader) {
                Ok(_) => (),
                Err(Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    log::warn!("stream ended inside '{tag}' ({length} bytes at {offset})");
                    break;
                }
                Err(e) => return Err(e),
            }
            position = offset + length;
            let data = WritableFontData::from_store(store);
            builder.insert_loaded(record, BuilderData::Writing(data));
        }
        Ok(builder)
    }

    fn insert_loaded(&mut self, record: TableRecord, data: BuilderData) {
        let tag = record.tag();
        if let Some(stored) = record.checksum() {
            let actual = data.checksum_excluding(exempt_ranges(tag));
            if actual != stored {
                if tag == head::TAG {
                    // usually only the magic number was counted when the file was written
                    log::info!("'head' checksum is 0x{actual:08X}, directory says 0x{stored:08X}");
                } else {
                    log::warn!("'{tag}' checksum is 0x{actual:08X}, directory says 0x{stored:08X}");
                }
            }
        }
        log::debug!("loaded '{tag}', {} bytes", data.len());
        self.builders
            .insert(tag, AnyTableBuilder::new(record, Some(data)));
    }

    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    pub fn set_sfnt_version(&mut self, version: u32) {
        self.sfnt_version = version;
    }

    pub fn has_table_builder(&self, tag: Tag) -> bool {
        self.builders.contains_key(&tag)
    }

    pub fn table_builder(&self, tag: Tag) -> Option<&AnyTableBuilder> {
        self.builders.get(&tag)
    }

    pub fn table_builder_mut(&mut self, tag: Tag) -> Option<&mut AnyTableBuilder> {
        self.builders.get_mut(&tag)
    }

    /// Every table builder, by tag.
    pub fn table_builders(&self) -> &BTreeMap<Tag, AnyTableBuilder> {
        &self.builders
    }

    pub fn get_builder<B: TopLevelBuilder>(&self) -> Option<&B> {
        self.builders.get(&B::TAG).and_then(B::from_any)
    }

    /// A builder with a dedicated type, e.g. `builder.get_builder_mut::<HeadBuilder>()`.
    pub fn get_builder_mut<B: TopLevelBuilder>(&mut self) -> Option<&mut B> {
        self.builders.get_mut(&B::TAG).and_then(B::from_any_mut)
    }

    /// Add an empty builder for `tag`, replacing any existing one.
    pub fn new_table_builder(&mut self, tag: Tag) -> &mut AnyTableBuilder {
        self.insert_builder(AnyTableBuilder::new(TableRecord::new(tag), None))
    }

    /// Add a builder for `tag` holding `data`, replacing any existing one.
    ///
    /// The bytes are shared with `data` until the builder is first written to.
    pub fn new_table_builder_with_data(&mut self, tag: Tag, data: FontData) -> &mut AnyTableBuilder {
        let record = match u32::try_from(data.len()) {
            Ok(len) => TableRecord::with_length(tag, len),
            Err(_) => TableRecord::new(tag),
        };
        self.insert_builder(AnyTableBuilder::new(record, Some(BuilderData::Reading(data))))
    }

    fn insert_builder(&mut self, builder: AnyTableBuilder) -> &mut AnyTableBuilder {
        let tag = builder.tag();
        log::debug!("new '{tag}' builder");
        match self.builders.entry(tag) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = builder;
                slot
            }
            Entry::Vacant(entry) => entry.insert(builder),
        }
    }

    pub fn remove_table_builder(&mut self, tag: Tag) -> Option<AnyTableBuilder> {
        self.builders.remove(&tag)
    }

    pub fn table_builder_count(&self) -> usize {
        self.builders.len()
    }

    /// `true` if every table builder can build.
    ///
    /// Wiring is not applied; a builder whose model needs wired values may
    /// only become ready in [`build`](Self::build).
    pub fn ready_to_build(&self) -> bool {
        self.builders.values().all(AnyTableBuilder::ready_to_build)
    }

    fn wired_value<B: TopLevelBuilder, T: Scalar>(&self, offset: usize) -> Option<T> {
        self.get_builder::<B>()?.core().data()?.read_at(offset).ok()
    }

    /// Push the values hmtx and loca depend on into their builders.
    ///
    /// hmtx gets its glyph count from maxp and its long metric count from
    /// hhea; loca gets its glyph count from maxp and its format from head.
    /// This is called by [`build`](Self::build), and may be called earlier
    /// to inspect the wired builders.
    pub fn wire_dependencies(&mut self) {
        let num_glyphs = self.wired_value::<MaxpBuilder, u16>(maxp::offsets::NUM_GLYPHS);
        let number_of_h_metrics =
            self.wired_value::<HheaBuilder, u16>(hhea::offsets::NUMBER_OF_H_METRICS);
        let loca_format = self
            .wired_value::<HeadBuilder, i16>(head::offsets::INDEX_TO_LOC_FORMAT)
            .and_then(LocaFormat::from_index_to_loc_format);

        if let Some(hmtx) = self.get_builder_mut::<HmtxBuilder>() {
            match num_glyphs {
                Some(num_glyphs) => hmtx.set_num_glyphs(num_glyphs),
                None => log::warn!("hmtx present without a readable maxp"),
            }
            match number_of_h_metrics {
                Some(count) => hmtx.set_number_of_h_metrics(count),
                None => log::warn!("hmtx present without a readable hhea"),
            }
        }
        if let Some(loca) = self.get_builder_mut::<LocaBuilder>() {
            match num_glyphs {
                Some(num_glyphs) => loca.set_num_glyphs(num_glyphs),
                None => log::warn!("loca present without a readable maxp"),
            }
            match loca_format {
                Some(format) => loca.set_format(format),
                None => log::warn!("loca present without a valid head indexToLocFormat"),
            }
        }
    }

    /// Wire the table dependencies and build every table.
    ///
    /// A table builder that is not ready, or has no data, fails the whole
    /// build.
    pub fn build(mut self) -> Result<Font, Error> {
        self.wire_dependencies();
        let mut tables = BTreeMap::new();
        for (tag, builder) in std::mem::take(&mut self.builders) {
            let table = builder.build().map_err(|e| match e {
                Error::NotReady(_) | Error::NoData(_) => {
                    log::warn!("failed to build '{tag}': {e}");
                    ConsistencyFault::MissingTable(tag).into()
                }
                other => other,
            })?;
            tables.insert(tag, table);
        }
        Ok(Font {
            sfnt_version: self.sfnt_version,
            tables,
            fingerprint: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sfnt_test_data::{fonts, BeBuffer};

    use super::*;
    use crate::tables::{head::Head, hmtx::Hmtx};

    fn load(bytes: Vec<u8>) -> FontBuilder {
        FontBuilder::from_font_data(&FontData::new(bytes), 0).unwrap()
    }

    #[test]
    fn search_range() {
        assert_eq!(SearchRange::compute(0), SearchRange::default());
        // Based on Roboto's num tables
        let computed = SearchRange::compute(0x16);
        assert_eq!(
            (computed.search_range, computed.entry_selector, computed.range_shift),
            (256, 4, 96)
        );
        let computed = SearchRange::compute(1);
        assert_eq!(
            (computed.search_range, computed.entry_selector, computed.range_shift),
            (16, 0, 0)
        );
        let computed = SearchRange::compute(4096);
        assert_eq!(
            (computed.search_range, computed.entry_selector, computed.range_shift),
            (u16::MAX, 12, 0)
        );
        let computed = SearchRange::compute(u16::MAX);
        assert_eq!(
            (computed.search_range, computed.entry_selector, computed.range_shift),
            (u16::MAX, 15, u16::MAX)
        );
    }

    #[test]
    fn empty_table_before_the_data() {
        // 'aaaa' holds four bytes after the directory; 'zzzz' is empty at 0
        let bytes = BeBuffer::new()
            .push(TT_SFNT_VERSION)
            .extend([2u16, 32, 1, 0])
            .push(Tag::new(b"aaaa"))
            .extend([0x0102_0304u32, 44, 4])
            .push(Tag::new(b"zzzz"))
            .extend([0u32, 0, 0])
            .extend([1u8, 2, 3, 4])
            .into_vec();
        let from_stream = FontBuilder::from_reader(&mut bytes.as_slice()).unwrap();
        let from_bytes = load(bytes);
        for builder in [&from_stream, &from_bytes] {
            assert_eq!(builder.table_builder_count(), 2);
            let empty = builder.table_builder(Tag::new(b"zzzz")).unwrap();
            assert_eq!(empty.core().data().map(BuilderData::len), Some(0));
        }
        let built = from_stream.build().unwrap();
        assert_eq!(built.table(Tag::new(b"zzzz")).unwrap().data().len(), 0);
        assert_eq!(built.to_vec().unwrap(), from_bytes.build().unwrap().to_vec().unwrap());
    }

    #[test]
    fn survives_no_tables() {
        let font = FontBuilder::new().build().unwrap();
        let bytes = font.to_vec().unwrap();
        assert_eq!(bytes, [0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn rejects_unknown_sfnt_version() {
        let mut bytes = fonts::minimal_font();
        bytes[..4].copy_from_slice(b"wOFF");
        assert!(matches!(
            FontBuilder::from_font_data(&FontData::new(bytes), 0),
            Err(Error::Read(ReadError::InvalidSfnt(0x774F4646)))
        ));
    }

    #[test]
    fn load_shares_storage() {
        let data = FontData::new(fonts::minimal_font());
        let builder = FontBuilder::from_font_data(&data, 0).unwrap();
        assert_eq!(builder.table_builder_count(), 7);
        let head = builder.table_builder(head::TAG).unwrap();
        match head.core().data() {
            Some(BuilderData::Reading(head_data)) => assert!(head_data.shares_store(&data)),
            other => panic!("expected shared data, found {other:?}"),
        }
    }

    #[test]
    fn wiring() {
        let mut builder = load(fonts::metrics_font());
        builder.wire_dependencies();
        let hmtx = builder.get_builder::<HmtxBuilder>().unwrap();
        assert_eq!(hmtx.number_of_h_metrics().unwrap(), fonts::NUMBER_OF_H_METRICS);
        assert_eq!(hmtx.number_of_lsbs().unwrap(), 1);

        let font = builder.build().unwrap();
        let hmtx = font.get::<Hmtx>().unwrap();
        assert_eq!(hmtx.number_of_h_metrics(), Some(2));
        assert_eq!(hmtx.advance_width(2), Some(600));
        assert_eq!(hmtx.left_side_bearing(2), Some(fonts::TRAILING_LSB));
    }

    #[test]
    fn missing_table_fails_the_build() {
        let mut builder = load(fonts::minimal_font());
        builder.new_table_builder(Tag::new(b"cmap"));
        assert!(!builder.ready_to_build());
        let err = builder.build().unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(
            err,
            Error::Inconsistent(ConsistencyFault::MissingTable(tag)) if tag == Tag::new(b"cmap")
        ));
    }

    #[test]
    fn hmtx_without_maxp_cannot_be_edited() {
        let mut builder = load(fonts::metrics_font());
        builder.remove_table_builder(maxp::TAG);
        builder.wire_dependencies();
        let hmtx = builder.get_builder_mut::<HmtxBuilder>().unwrap();
        assert!(matches!(
            hmtx.metrics_mut(),
            Err(Error::MissingState { field: "numGlyphs", .. })
        ));
    }

    #[test]
    fn default_orderings() {
        let font = load(fonts::minimal_font()).build().unwrap();
        let ordering: Vec<_> = font.data_ordering(None).into_iter().collect();
        assert_eq!(
            ordering,
            [
                fonts::HEAD,
                fonts::HHEA,
                fonts::MAXP,
                fonts::HMTX,
                fonts::LOCA,
                fonts::GLYF,
                fonts::NAME
            ]
        );

        let mut builder = load(fonts::minimal_font());
        builder.new_table_builder_with_data(CFF, FontData::new(vec![1, 0, 4, 4]));
        builder.set_sfnt_version(CFF_SFNT_VERSION);
        let font = builder.build().unwrap();
        let ordering: Vec<_> = font.data_ordering(None).into_iter().collect();
        assert_eq!(&ordering[..5], [fonts::HEAD, fonts::HHEA, fonts::MAXP, fonts::NAME, CFF]);
        // the rest in tag order
        assert_eq!(&ordering[5..], [fonts::GLYF, fonts::HMTX, fonts::LOCA]);
    }

    #[test]
    fn explicit_ordering() {
        let font = load(fonts::minimal_font()).build().unwrap();
        let ordering: Vec<_> = font
            .data_ordering(Some(&[fonts::NAME, Tag::new(b"zzzz"), fonts::GLYF]))
            .into_iter()
            .collect();
        assert_eq!(ordering[..2], [fonts::NAME, fonts::GLYF]);
        assert_eq!(ordering.len(), 7);
    }

    #[test]
    fn checksum_adjustment() {
        let font = load(fonts::minimal_font()).build().unwrap();
        let mut out = Vec::new();
        font.serialize_with_checksum_adjustment(&mut out, None)
            .unwrap();
        assert_eq!(compute_checksum(&out), CHECKSUM_MAGIC);
        // the fixture already carries a correct adjustment
        assert_eq!(out, fonts::minimal_font());
        let head = font.get::<Head>().unwrap();
        assert_eq!(
            head.checksum(),
            head.data().checksum_excluding(&head::CHECKSUM_EXEMPT)
        );
    }

    #[test]
    fn fingerprint_ignores_adjustment() {
        let mut font = load(fonts::minimal_font()).build().unwrap();
        let fingerprint = font.compute_fingerprint().unwrap();
        assert_eq!(font.fingerprint(), Some(fingerprint));

        let mut builder = load(fonts::minimal_font());
        builder
            .get_builder_mut::<HeadBuilder>()
            .unwrap()
            .set_checksum_adjustment(0)
            .unwrap();
        let mut edited = builder.build().unwrap();
        assert_eq!(edited.compute_fingerprint().unwrap(), fingerprint);
    }

    #[test]
    fn length_mismatch_is_a_consistency_fault() {
        let mut builder = load(fonts::minimal_font());
        let record = TableRecord::from_directory(Tag::new(b"zzzz"), 0, 0, 10);
        let data = BuilderData::Reading(FontData::new(vec![0; 6]));
        builder.insert_builder(AnyTableBuilder::new(record, Some(data)));
        let err = builder.build().unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(
            err,
            Error::Inconsistent(ConsistencyFault::LengthMismatch {
                declared: 10,
                actual: 6,
                ..
            })
        ));
    }

    #[test]
    fn replaced_data_gets_a_fresh_record() {
        let mut builder = load(fonts::minimal_font());
        builder
            .table_builder_mut(fonts::NAME)
            .unwrap()
            .set_data(FontData::new(vec![0, 0, 0, 0, 0, 6, 0, 0]));
        let font = builder.build().unwrap();
        let name = font.table(fonts::NAME).unwrap();
        assert_eq!(name.record().length(), Some(8));
        assert_eq!(name.record().offset(), None);
    }
}
