//! Loading and writing whole fonts.

use pretty_assertions::assert_eq;
use rstest::rstest;
use sfnt_codec::{
    compute_checksum, tables::head, types::Tag, Error, FactoryOptions, FontData, FontFactory,
    FontTable, ReadError, CHECKSUM_MAGIC, SFNT_HEADER_LEN, TABLE_RECORD_LEN,
};
use sfnt_test_data::{fonts, sfnt};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// (tag, checksum, offset, length) for each directory entry.
fn directory(bytes: &[u8]) -> Vec<(Tag, u32, usize, usize)> {
    let num_tables = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;
    (0..num_tables)
        .map(|i| {
            let pos = SFNT_HEADER_LEN + i * TABLE_RECORD_LEN;
            let u32_at = |at: usize| u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap());
            (
                Tag::from_u32(u32_at(pos)),
                u32_at(pos + 4),
                u32_at(pos + 8) as usize,
                u32_at(pos + 12) as usize,
            )
        })
        .collect()
}

#[rstest]
#[case::minimal(fonts::minimal_font())]
#[case::metrics_only(fonts::metrics_font())]
#[case::bitmaps(fonts::bitmap_font())]
fn unmodified_font_is_byte_identical(#[case] bytes: Vec<u8>) {
    init_logging();
    let factory = FontFactory::new();
    let loaded = factory.load_font_bytes(bytes.clone()).unwrap();
    assert_eq!(loaded.len(), 1);
    let mut out = Vec::new();
    factory.serialize_font(&loaded[0], &mut out).unwrap();
    assert_eq!(out, bytes);
}

#[test]
fn stream_and_bytes_agree() {
    init_logging();
    let factory = FontFactory::new();
    let from_stream = factory
        .load_fonts(fonts::minimal_font().as_slice())
        .unwrap();
    let from_bytes = factory.load_font_bytes(fonts::minimal_font()).unwrap();
    assert_eq!(from_stream.len(), 1);
    assert_eq!(
        from_stream[0].to_vec().unwrap(),
        from_bytes[0].to_vec().unwrap()
    );
}

#[test]
fn stream_ending_inside_a_table() {
    init_logging();
    let mut bytes = fonts::minimal_font();
    let glyf = directory(&bytes)
        .into_iter()
        .find(|entry| entry.0 == fonts::GLYF)
        .unwrap();
    bytes.truncate(glyf.2 + 4);

    let factory = FontFactory::new();
    let builders = factory.load_fonts_for_building(bytes.as_slice()).unwrap();
    let builder = &builders[0];
    // everything written before glyf survives
    for tag in [fonts::HEAD, fonts::HHEA, fonts::MAXP, fonts::HMTX, fonts::LOCA] {
        assert!(builder.has_table_builder(tag), "missing '{tag}'");
    }
    assert!(!builder.has_table_builder(fonts::GLYF));
    assert!(!builder.has_table_builder(fonts::NAME));

    // the byte loader drops the same records
    let builders = factory.load_font_builders_bytes(bytes).unwrap();
    assert_eq!(builders[0].table_builder_count(), 5);
}

#[test]
fn not_an_sfnt() {
    let factory = FontFactory::new();
    assert!(matches!(
        factory.load_font_bytes(b"wOF2 and some more bytes".to_vec()),
        Err(Error::Read(ReadError::InvalidSfnt(0x774F4632)))
    ));
    assert!(matches!(
        factory.load_fonts(&b"OT"[..]),
        Err(Error::Io(_))
    ));
}

#[test]
fn directory_is_sorted_and_tables_are_aligned() {
    init_logging();
    let factory = FontFactory::new();
    let mut builder = factory
        .load_font_builders_bytes(fonts::minimal_font())
        .unwrap()
        .remove(0);
    // odd lengths force padding after both tables
    builder.new_table_builder_with_data(fonts::NAME, FontData::new(vec![0, 0, 0, 1, 0, 6, 7]));
    builder.new_table_builder_with_data(Tag::new(b"cvt "), FontData::new(vec![0xFF; 5]));
    let font = builder.build().unwrap();
    let bytes = font.to_vec().unwrap();

    let entries = directory(&bytes);
    assert_eq!(entries.len(), 8);
    assert!(entries.windows(2).all(|pair| pair[0].0 < pair[1].0));
    let field = |at: usize| u16::from_be_bytes([bytes[at], bytes[at + 1]]);
    assert_eq!((field(6), field(8), field(10)), sfnt::search_fields(8));

    for (tag, checksum, offset, length) in entries {
        assert_eq!(offset % 4, 0, "'{tag}' at {offset}");
        let table = &bytes[offset..offset + length];
        assert_eq!(checksum, sfnt::table_checksum(tag, table), "'{tag}'");
        assert_eq!(font.table(tag).unwrap().data().as_bytes(), table);
    }
    assert_eq!(bytes.len() % 4, 0);
}

#[test]
fn head_checksum_ignores_adjustment() {
    let factory = FontFactory::new();
    let mut builder = factory
        .load_font_builders_bytes(fonts::minimal_font())
        .unwrap()
        .remove(0);
    let before = directory(&fonts::minimal_font())
        .into_iter()
        .find(|entry| entry.0 == head::TAG)
        .unwrap()
        .1;
    builder
        .get_builder_mut::<head::HeadBuilder>()
        .unwrap()
        .set_checksum_adjustment(0x1234_5678)
        .unwrap();
    let bytes = builder.build().unwrap().to_vec().unwrap();
    let after = directory(&bytes)
        .into_iter()
        .find(|entry| entry.0 == head::TAG)
        .unwrap()
        .1;
    assert_eq!(before, after);
}

#[test]
fn head_checksum_counting_the_magic_number() {
    init_logging();
    let mut bytes = fonts::minimal_font();
    let (index, (_, ours, offset, length)) = directory(&bytes)
        .into_iter()
        .enumerate()
        .find(|(_, entry)| entry.0 == head::TAG)
        .unwrap();
    // the usual convention: only checksumAdjustment is zeroed
    let mut table = bytes[offset..offset + length].to_vec();
    table[8..12].fill(0);
    let conventional = compute_checksum(&table);
    assert_ne!(conventional, ours);
    let at = SFNT_HEADER_LEN + index * TABLE_RECORD_LEN + 4;
    bytes[at..at + 4].copy_from_slice(&conventional.to_be_bytes());

    // the font still loads, and is written back with the exempt checksum
    let font = FontFactory::new().load_font_bytes(bytes).unwrap().remove(0);
    let out = font.to_vec().unwrap();
    let written = directory(&out)
        .into_iter()
        .find(|entry| entry.0 == head::TAG)
        .unwrap()
        .1;
    assert_eq!(written, ours);
    assert_eq!(out, fonts::minimal_font());
}

#[test]
fn checksum_adjustment_after_edit() {
    init_logging();
    let factory = FontFactory::with_options(FactoryOptions {
        update_checksum_adjustment: true,
        ..Default::default()
    });
    let mut builder = factory
        .load_font_builders_bytes(fonts::minimal_font())
        .unwrap()
        .remove(0);
    builder
        .get_builder_mut::<head::HeadBuilder>()
        .unwrap()
        .set_units_per_em(2048)
        .unwrap();
    let font = builder.build().unwrap();
    let mut out = Vec::new();
    factory.serialize_font(&font, &mut out).unwrap();
    assert_eq!(compute_checksum(&out), CHECKSUM_MAGIC);
    assert_ne!(out, fonts::minimal_font());

    // the built table keeps its stale adjustment; only the output changes
    let head = font.get::<head::Head>().unwrap();
    assert_eq!(head.units_per_em(), 2048);
    assert_ne!(compute_checksum(&font.to_vec().unwrap()), CHECKSUM_MAGIC);
}

#[test]
fn fonts_can_be_shared_between_threads() {
    let font = FontFactory::new()
        .load_font_bytes(fonts::minimal_font())
        .unwrap()
        .remove(0);
    let expected = font.to_vec().unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| font.to_vec().unwrap())).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[cfg(feature = "serde")]
#[test]
fn factory_options_from_json() {
    let options: FactoryOptions =
        serde_json::from_str(r#"{"fingerprint": true, "table_ordering": ["name", "head"]}"#)
            .unwrap();
    assert_eq!(
        options,
        FactoryOptions {
            fingerprint: true,
            table_ordering: Some(vec![fonts::NAME, fonts::HEAD]),
            update_checksum_adjustment: false,
        }
    );
    let defaults: FactoryOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, FactoryOptions::default());
    let json = serde_json::to_string(&options).unwrap();
    assert_eq!(serde_json::from_str::<FactoryOptions>(&json).unwrap(), options);
}
