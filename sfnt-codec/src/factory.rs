//! Loading fonts and font collections

use std::io::{Read, Write};

use types::{Tag, TTC_HEADER_TAG, TTC_VERSION_1, TTC_VERSION_2};

use crate::{
    error::{Error, ReadError},
    font::{Font, FontBuilder},
    FontData,
};

/// The length of the fixed part of a collection header.
pub const TTC_HEADER_LEN: usize = 12;

/// Options for loading and serializing fonts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FactoryOptions {
    /// Compute a content fingerprint for each loaded font.
    pub fingerprint: bool,
    /// The data order to serialize with, instead of the default order.
    pub table_ordering: Option<Vec<Tag>>,
    /// Rewrite `head.checksumAdjustment` when serializing.
    ///
    /// Off by default, so an unmodified font round-trips byte for byte.
    pub update_checksum_adjustment: bool,
}

/// The entry point for loading fonts, single or in a collection.
#[derive(Debug, Clone, Default)]
pub struct FontFactory {
    options: FactoryOptions,
}

impl FontFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        FontFactory { options }
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    /// `true` if `bytes` start with the collection header tag.
    pub fn is_collection(bytes: &[u8]) -> bool {
        bytes.get(..4) == Some(TTC_HEADER_TAG.to_be_bytes().as_slice())
    }

    /// Load every font in a stream.
    pub fn load_fonts<R: Read>(&self, reader: R) -> Result<Vec<Font>, Error> {
        self.load_fonts_for_building(reader)?
            .into_iter()
            .map(|builder| self.build_font(builder))
            .collect()
    }

    /// Load every font in a stream, as builders.
    ///
    /// A single font is read in one forward pass. A collection is read into
    /// memory first, since its fonts may share tables.
    pub fn load_fonts_for_building<R: Read>(&self, mut reader: R) -> Result<Vec<FontBuilder>, Error> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if Self::is_collection(&magic) {
            let mut bytes = magic.to_vec();
            reader.read_to_end(&mut bytes)?;
            log::debug!("loading a {} byte collection from a stream", bytes.len());
            return self.load_font_builders_bytes(bytes);
        }
        let mut reader = magic.as_slice().chain(reader);
        Ok(vec![FontBuilder::from_reader(&mut reader)?])
    }

    /// Load every font in some bytes.
    pub fn load_font_bytes(&self, bytes: Vec<u8>) -> Result<Vec<Font>, Error> {
        self.load_font_builders_bytes(bytes)?
            .into_iter()
            .map(|builder| self.build_font(builder))
            .collect()
    }

    /// Load every font in some bytes, as builders.
    ///
    /// The builders share the bytes until their tables are first written to.
    pub fn load_font_builders_bytes(&self, bytes: Vec<u8>) -> Result<Vec<FontBuilder>, Error> {
        let data = FontData::new(bytes);
        if !Self::is_collection(data.as_bytes()) {
            return Ok(vec![FontBuilder::from_font_data(&data, 0)?]);
        }
        collection_offsets(&data)?
            .into_iter()
            .map(|offset| FontBuilder::from_font_data(&data, offset))
            .collect()
    }

    /// Load one font out of a collection.
    pub fn load_collection_font(&self, bytes: Vec<u8>, index: u32) -> Result<Font, Error> {
        let data = FontData::new(bytes);
        let offset = *collection_offsets(&data)?
            .get(index as usize)
            .ok_or(ReadError::InvalidCollectionIndex(index))?;
        self.build_font(FontBuilder::from_font_data(&data, offset)?)
    }

    /// An empty font builder.
    pub fn new_font_builder(&self) -> FontBuilder {
        FontBuilder::new()
    }

    /// Write `font` using this factory's options.
    pub fn serialize_font<W: Write + ?Sized>(&self, font: &Font, writer: &mut W) -> Result<usize, Error> {
        font.write_font(
            writer,
            self.options.table_ordering.as_deref(),
            self.options.update_checksum_adjustment,
        )
    }

    fn build_font(&self, builder: FontBuilder) -> Result<Font, Error> {
        let mut font = builder.build()?;
        if self.options.fingerprint {
            font.compute_fingerprint()?;
        }
        Ok(font)
    }
}

/// The offset of each font's header in a collection.
fn collection_offsets(data: &FontData) -> Result<Vec<usize>, ReadError> {
    let tag: Tag = data.read_at(0)?;
    if tag != TTC_HEADER_TAG {
        return Err(ReadError::InvalidTtc(tag));
    }
    let version: u32 = data.read_at(4)?;
    if version != TTC_VERSION_1 && version != TTC_VERSION_2 {
        log::warn!("unexpected collection version 0x{version:08X}");
    }
    let num_fonts: u32 = data.read_at(8)?;
    Ok(data
        .read_array::<u32>(TTC_HEADER_LEN, num_fonts as usize)?
        .into_iter()
        .map(|offset| offset as usize)
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sfnt_test_data::fonts;

    use super::*;
    use crate::tables::maxp::Maxp;

    #[test]
    fn detects_collections() {
        assert!(FontFactory::is_collection(&fonts::collection()));
        assert!(!FontFactory::is_collection(&fonts::minimal_font()));
        assert!(!FontFactory::is_collection(b"ttc"));
    }

    #[test]
    fn load_collection() {
        let factory = FontFactory::new();
        let loaded = factory.load_font_bytes(fonts::collection()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].num_tables(), 7);
        assert_eq!(loaded[1].num_tables(), 4);
        assert_eq!(loaded[1].get::<Maxp>().unwrap().num_glyphs(), fonts::NUM_GLYPHS);
    }

    #[test]
    fn collection_index() {
        let factory = FontFactory::new();
        let font = factory.load_collection_font(fonts::collection(), 1).unwrap();
        assert_eq!(font.num_tables(), 4);
        assert!(matches!(
            factory.load_collection_font(fonts::collection(), 2),
            Err(Error::Read(ReadError::InvalidCollectionIndex(2)))
        ));
        assert!(matches!(
            factory.load_collection_font(fonts::minimal_font(), 0),
            Err(Error::Read(ReadError::InvalidTtc(_)))
        ));
    }

    #[test]
    fn fingerprint_is_optional() {
        let plain = FontFactory::new()
            .load_font_bytes(fonts::minimal_font())
            .unwrap();
        assert_eq!(plain[0].fingerprint(), None);

        let factory = FontFactory::with_options(FactoryOptions {
            fingerprint: true,
            ..Default::default()
        });
        let from_bytes = factory.load_font_bytes(fonts::minimal_font()).unwrap();
        let from_stream = factory
            .load_fonts(fonts::minimal_font().as_slice())
            .unwrap();
        assert!(from_bytes[0].fingerprint().is_some());
        assert_eq!(from_bytes[0].fingerprint(), from_stream[0].fingerprint());
    }

    #[test]
    fn serialize_with_options() {
        let factory = FontFactory::with_options(FactoryOptions {
            table_ordering: Some(vec![fonts::NAME]),
            ..Default::default()
        });
        let loaded = factory.load_font_bytes(fonts::minimal_font()).unwrap();
        let mut out = Vec::new();
        let written = factory.serialize_font(&loaded[0], &mut out).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(out.len(), fonts::minimal_font().len());
        // name comes straight after the directory
        let name_offset = 12 + 7 * 16;
        assert_eq!(&out[name_offset..name_offset + 6], fonts::name_table().as_slice());
    }
}
