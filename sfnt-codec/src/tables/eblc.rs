//! The [EBLC (Embedded Bitmap Location)](https://docs.microsoft.com/en-us/typography/opentype/spec/eblc) table
//!
//! EBLC locates the images stored in EBDT. It holds a list of bitmap sizes
//! (strikes), and each size holds index subtables mapping glyph ids to
//! image offsets. EBDT itself is carried as an opaque table.

mod bitmap_size;
mod index_subtable;

use std::sync::OnceLock;

use types::Tag;

pub use bitmap_size::{
    BitmapSize, BitmapSizeBuilder, BitmapSizeRecord, SbitLineMetrics, BITMAP_SIZE_LEN,
    SBIT_LINE_METRICS_LEN,
};
pub use index_subtable::{
    BigGlyphMetrics, BitmapGlyphInfo, GlyphIdOffsetPair, IndexSubtable, IndexSubtableBuilder,
    IndexSubtableData, BIG_GLYPH_METRICS_LEN, INDEX_SUBTABLE_RECORD_LEN, INDEX_SUB_HEADER_LEN,
};

use crate::{
    error::{Error, ReadError},
    table::{BuilderCore, SerializedSize, TableBuilder},
    FontData, TableRecord, WritableFontData,
};

/// 'EBLC'
pub const TAG: Tag = Tag::new(b"EBLC");

/// The length of the EBLC header.
pub const EBLC_HEADER_LEN: usize = 8;

const MAJOR_VERSION: u16 = 2;
const MINOR_VERSION: u16 = 0;

/// The [EBLC](https://docs.microsoft.com/en-us/typography/opentype/spec/eblc) table.
#[derive(Debug, Clone)]
pub struct Eblc {
    record: TableRecord,
    data: FontData,
    sizes: OnceLock<Vec<BitmapSize>>,
}

impl Eblc {
    pub(crate) fn new(record: TableRecord, data: FontData) -> Self {
        Eblc {
            record,
            data,
            sizes: OnceLock::new(),
        }
    }

    pub fn major_version(&self) -> u16 {
        self.data.read_at(0).unwrap_or_default()
    }

    pub fn minor_version(&self) -> u16 {
        self.data.read_at(2).unwrap_or_default()
    }

    /// The number of sizes declared in the header.
    pub fn num_sizes(&self) -> u32 {
        self.data.read_at(4).unwrap_or_default()
    }

    /// The bitmap sizes in this table.
    ///
    /// Parsed on first access; size records that run past the end of the
    /// table are left out.
    pub fn sizes(&self) -> &[BitmapSize] {
        self.sizes.get_or_init(|| {
            let declared = self.num_sizes() as usize;
            let sizes: Vec<_> = (0..declared)
                .map_while(|ix| {
                    let offset = EBLC_HEADER_LEN + ix * BITMAP_SIZE_LEN;
                    BitmapSizeRecord::read(&self.data, offset).ok()
                })
                .map(|record| BitmapSize::new(record, self.data.clone()))
                .collect();
            if sizes.len() < declared {
                log::warn!(
                    "EBLC declares {declared} sizes but only {} fit in the table",
                    sizes.len()
                );
            }
            sizes
        })
    }

    /// The location of a glyph's image in one size.
    pub fn glyph_info(&self, size_index: usize, gid: u16) -> Option<BitmapGlyphInfo> {
        self.sizes().get(size_index)?.glyph_info(gid)
    }
}

font_table!(Eblc);

/// A builder for the EBLC table.
///
/// The model is an owned list of sizes and their subtables. Its serialized
/// length is only known once it has been written.
#[derive(Debug, Clone)]
pub struct EblcBuilder {
    core: BuilderCore,
    sizes: Option<Vec<BitmapSizeBuilder>>,
}

impl EblcBuilder {
    pub(crate) fn from_core(core: BuilderCore) -> Self {
        EblcBuilder { core, sizes: None }
    }

    /// The sizes, parsing them from the raw bytes if needed.
    ///
    /// Marks the model as changed.
    pub fn sizes_mut(&mut self) -> Result<&mut Vec<BitmapSizeBuilder>, Error> {
        let sizes = match self.sizes.take() {
            Some(sizes) => sizes,
            None => self.parse_sizes()?,
        };
        self.core.set_model_changed();
        Ok(self.sizes.insert(sizes))
    }

    /// Replace every size.
    pub fn set_sizes(&mut self, sizes: Vec<BitmapSizeBuilder>) {
        self.sizes = Some(sizes);
        self.core.set_model_changed();
    }

    fn parse_sizes(&self) -> Result<Vec<BitmapSizeBuilder>, Error> {
        let Some(data) = self.core.font_data() else {
            return Ok(Vec::new());
        };
        let num_sizes: u32 = data.read_at(4)?;
        (0..num_sizes as usize)
            .map(|ix| {
                let record = BitmapSizeRecord::read(&data, EBLC_HEADER_LEN + ix * BITMAP_SIZE_LEN)?;
                BitmapSizeBuilder::from_table(&BitmapSize::new(record, data.clone()))
            })
            .collect::<Result<_, ReadError>>()
            .map_err(Error::from)
    }
}

impl TableBuilder for EblcBuilder {
    type Table = Eblc;

    fn core(&self) -> &BuilderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BuilderCore {
        &mut self.core
    }

    fn ready_to_serialize(&self) -> bool {
        self.sizes.is_some()
    }

    fn size_to_serialize(&self) -> SerializedSize {
        SerializedSize::Pending
    }

    fn serialize(&self, into: &WritableFontData) -> Result<usize, Error> {
        let sizes = self.sizes.as_deref().unwrap_or_default();
        let num_sizes = u32::try_from(sizes.len()).map_err(|_| ReadError::OutOfBounds)?;
        into.write_at(0, MAJOR_VERSION)?;
        into.write_at(2, MINOR_VERSION)?;
        into.write_at(4, num_sizes)?;

        let mut array_offset = EBLC_HEADER_LEN + sizes.len() * BITMAP_SIZE_LEN;
        for (ix, size) in sizes.iter().enumerate() {
            let record = size.write_index_tables(into, array_offset)?;
            record.write(into, EBLC_HEADER_LEN + ix * BITMAP_SIZE_LEN)?;
            array_offset += record.index_tables_size as usize;
        }
        Ok(array_offset)
    }

    fn reset_model(&mut self) {
        self.sizes = None;
    }

    fn materialize(&self, record: TableRecord, data: FontData) -> Result<Eblc, Error> {
        Ok(Eblc::new(record, data))
    }
}

#[cfg(test)]
mod tests {
    use sfnt_test_data::eblc as fixtures;

    use super::*;
    use crate::table::{BuilderData, FontTable};

    fn builder() -> EblcBuilder {
        let data = FontData::new(fixtures::eblc_table());
        let record = TableRecord::from_directory(TAG, 0, 0, data.len() as u32);
        EblcBuilder::from_core(BuilderCore::new(record, Some(BuilderData::Reading(data))))
    }

    #[test]
    fn read_sizes_and_subtables() {
        let eblc = builder().build().unwrap();
        assert_eq!((eblc.major_version(), eblc.minor_version()), (2, 0));
        assert_eq!(eblc.num_sizes(), 1);
        let size = &eblc.sizes()[0];
        assert_eq!(size.record().ppem_x, fixtures::PPEM);
        assert_eq!(size.subtables().len(), 5);
        let formats: Vec<_> = size.subtables().iter().map(|s| s.index_format()).collect();
        assert_eq!(formats, [1, 2, 3, 4, 5]);
        assert_eq!(
            (size.start_glyph_index(), size.end_glyph_index()),
            (fixtures::FIRST_GLYPH, fixtures::LAST_GLYPH + 4 * fixtures::GLYPH_STRIDE)
        );
    }

    #[test]
    fn lookups_outside_the_size_are_not_found() {
        let eblc = builder().build().unwrap();
        assert_eq!(eblc.glyph_info(0, 0), None);
        assert_eq!(eblc.glyph_info(0, u16::MAX), None);
        assert_eq!(eblc.glyph_info(1, fixtures::FIRST_GLYPH), None);
        let info = eblc.glyph_info(0, fixtures::FIRST_GLYPH).unwrap();
        assert_eq!(info.offset, fixtures::IMAGE_DATA_OFFSET);
        assert_eq!(info.length, 10);
    }

    #[test]
    fn subtables_are_parsed_once() {
        let eblc = builder().build().unwrap();
        let size = &eblc.sizes()[0];
        let ptrs: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| size.subtables().as_ptr() as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(ptrs.iter().all(|ptr| *ptr == ptrs[0]));
        assert_eq!(size.subtables().as_ptr() as usize, ptrs[0]);
    }

    #[test]
    fn rebuild_from_model() {
        let source = builder().build().unwrap();
        let mut eblc = builder();
        assert_eq!(eblc.sizes_mut().unwrap().len(), 1);
        let rebuilt = eblc.build().unwrap();
        // the fixture is laid out the same way the serializer lays it out
        assert_eq!(rebuilt.data(), source.data());
        assert_eq!(rebuilt.data().len() % 4, 0);
    }

    #[test]
    fn edit_model() {
        let mut eblc = builder();
        let sizes = eblc.sizes_mut().unwrap();
        // drop the format 1 subtable and add a second size
        sizes[0].subtables.remove(0);
        let mut second = sizes[0].clone();
        second.record.ppem_x = 2 * fixtures::PPEM;
        second.subtables.truncate(1);
        sizes.push(second);

        let eblc = eblc.build().unwrap();
        assert_eq!(eblc.sizes().len(), 2);
        assert_eq!(eblc.sizes()[0].subtables().len(), 4);
        assert_eq!(eblc.glyph_info(0, fixtures::FIRST_GLYPH), None);
        let second = &eblc.sizes()[1];
        assert_eq!(second.record().ppem_x, 2 * fixtures::PPEM);
        assert_eq!(second.record().number_of_index_subtables, 1);
        assert_eq!(second.start_glyph_index(), fixtures::FIRST_GLYPH + fixtures::GLYPH_STRIDE);
        for size in eblc.sizes() {
            assert_eq!(size.record().index_subtable_array_offset % 4, 0);
        }
    }

    #[test]
    fn truncated_size_records_are_dropped() {
        let mut bytes = fixtures::eblc_table();
        // claim a second size that does not exist
        bytes[7] = 2;
        bytes.truncate(EBLC_HEADER_LEN + BITMAP_SIZE_LEN + 4);
        let data = FontData::new(bytes);
        let eblc = Eblc::new(TableRecord::new(TAG), data);
        assert_eq!(eblc.num_sizes(), 2);
        assert_eq!(eblc.sizes().len(), 1);
        // the subtables are gone, so nothing is found
        assert_eq!(eblc.glyph_info(0, fixtures::FIRST_GLYPH), None);
    }
}
