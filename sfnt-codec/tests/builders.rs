//! Editing fonts through their table builders.

use pretty_assertions::assert_eq;
use rstest::rstest;
use sfnt_codec::{
    tables::{
        eblc::Eblc,
        glyf::Glyf,
        head::HeadBuilder,
        hhea::HheaBuilder,
        hmtx::{Hmtx, HmtxBuilder, LongMetric},
        loca::{Loca, LocaBuilder, LocaFormat},
        maxp::MaxpBuilder,
        AnyTable, AnyTableBuilder,
    },
    types::{Tag, CFF_SFNT_VERSION, TRUE_SFNT_VERSION, TT_SFNT_VERSION},
    ConsistencyFault, Error, FontBuilder, FontData, FontFactory, FontTable,
};
use sfnt_test_data::{eblc as bitmap, fonts};

fn load(bytes: Vec<u8>) -> FontBuilder {
    let _ = env_logger::builder().is_test(true).try_init();
    FontFactory::new()
        .load_font_builders_bytes(bytes)
        .unwrap()
        .remove(0)
}

#[test]
fn hmtx_needs_wiring_before_editing() {
    let mut builder = load(fonts::minimal_font());
    let hmtx = builder.get_builder_mut::<HmtxBuilder>().unwrap();
    assert!(matches!(
        hmtx.metrics_mut(),
        Err(Error::MissingState { field: "numberOfHMetrics", .. })
    ));

    builder.wire_dependencies();
    let hmtx = builder.get_builder_mut::<HmtxBuilder>().unwrap();
    let metrics = hmtx.metrics_mut().unwrap();
    let expected: Vec<_> = fonts::LONG_METRICS
        .iter()
        .map(|(advance, lsb)| LongMetric::new(*advance, *lsb))
        .collect();
    assert_eq!(metrics.long_metrics, expected);
    assert_eq!(metrics.left_side_bearings, [fonts::TRAILING_LSB]);
    metrics.long_metrics[0].advance = 700;

    let font = builder.build().unwrap();
    let hmtx = font.get::<Hmtx>().unwrap();
    assert_eq!(hmtx.number_of_h_metrics(), Some(fonts::NUMBER_OF_H_METRICS));
    assert_eq!(hmtx.advance_width(0), Some(700));
    assert_eq!(hmtx.advance_width(2), Some(fonts::LONG_METRICS[1].0));
    assert_eq!(hmtx.left_side_bearing(2), Some(fonts::TRAILING_LSB));
    assert_eq!(hmtx.advance_width(fonts::NUM_GLYPHS), None);
}

#[test]
fn wiring_follows_edits_to_maxp_and_hhea() {
    let mut builder = load(fonts::minimal_font());
    let maxp = builder.get_builder_mut::<MaxpBuilder>().unwrap();
    maxp.set_num_glyphs(fonts::NUM_GLYPHS + 1).unwrap();
    let hhea = builder.get_builder_mut::<HheaBuilder>().unwrap();
    hhea.set_number_of_h_metrics(1).unwrap();

    builder.wire_dependencies();
    let hmtx = builder.get_builder::<HmtxBuilder>().unwrap();
    assert_eq!(hmtx.number_of_h_metrics().unwrap(), 1);
    assert_eq!(hmtx.number_of_lsbs().unwrap(), fonts::NUM_GLYPHS);
    let loca = builder.get_builder::<LocaBuilder>().unwrap();
    assert_eq!(loca.num_glyphs(), Some(fonts::NUM_GLYPHS + 1));
    assert_eq!(loca.format(), Some(LocaFormat::Short));
}

#[test]
fn grow_a_glyph_with_long_offsets() {
    let mut builder = load(fonts::minimal_font());
    // parse in the current short format, then switch head to long offsets
    builder.wire_dependencies();
    let loca = builder.get_builder_mut::<LocaBuilder>().unwrap();
    let offsets = loca.offsets_mut().unwrap();
    assert_eq!(offsets.as_slice(), fonts::GLYPH_OFFSETS);
    offsets[1] = 0;
    offsets[2] = 0;
    builder
        .get_builder_mut::<HeadBuilder>()
        .unwrap()
        .set_index_to_loc_format(LocaFormat::Long.index_to_loc_format())
        .unwrap();

    let font = builder.build().unwrap();
    let loca = font.get::<Loca>().unwrap();
    assert_eq!(loca.format(), Some(LocaFormat::Long));
    assert_eq!(loca.record().length(), Some(16));
    assert_eq!(loca.glyph_length(0), Some(0));
    assert_eq!(loca.glyph_length(2), Some(24));
    let glyf = font.get::<Glyf>().unwrap();
    assert_eq!(glyf.glyph_data(loca, 0).unwrap(), None);
    assert!(glyf.glyph_data(loca, 2).unwrap().is_some());
}

#[test]
fn bitmap_lookups() {
    let font = load(fonts::bitmap_font()).build().unwrap();
    assert!(matches!(font.table(fonts::EBDT), Some(AnyTable::Opaque(_))));
    let eblc = font.get::<Eblc>().unwrap();
    let first = eblc.glyph_info(0, bitmap::FIRST_GLYPH).unwrap();
    assert_eq!(first.image_format, bitmap::IMAGE_FORMAT);
    assert_eq!(first.offset, bitmap::IMAGE_DATA_OFFSET);
    // below the first range, past the last one, and in a missing size
    assert_eq!(eblc.glyph_info(0, bitmap::FIRST_GLYPH - 1), None);
    assert_eq!(eblc.glyph_info(0, bitmap::FIRST_GLYPH + 5 * bitmap::GLYPH_STRIDE), None);
    assert_eq!(eblc.glyph_info(3, bitmap::FIRST_GLYPH), None);
}

#[test]
fn missing_data_fails_the_build() {
    let mut builder = load(fonts::minimal_font());
    builder.new_table_builder(Tag::new(b"kern"));
    assert!(!builder.ready_to_build());
    let err = builder.build().unwrap_err();
    assert!(matches!(
        err,
        Error::Inconsistent(ConsistencyFault::MissingTable(tag)) if tag == Tag::new(b"kern")
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn replacing_and_removing_tables() {
    let mut builder = load(fonts::minimal_font());
    assert!(builder.remove_table_builder(fonts::NAME).is_some());
    assert!(builder.remove_table_builder(fonts::NAME).is_none());
    let post = Tag::new(b"post");
    let data = FontData::new(vec![0, 3, 0, 0]);
    let table = builder.new_table_builder_with_data(post, data.clone());
    assert!(matches!(table, AnyTableBuilder::Opaque(_)));
    assert_eq!(builder.table_builder_count(), 7);

    let font = builder.build().unwrap();
    assert!(!font.has_table(fonts::NAME));
    assert_eq!(font.table(post).unwrap().data(), &data);
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
            post
        ]
    );
}

#[rstest]
#[case(TT_SFNT_VERSION)]
#[case(CFF_SFNT_VERSION)]
#[case(TRUE_SFNT_VERSION)]
fn sfnt_version_survives(#[case] version: u32) {
    let mut builder = load(fonts::metrics_font());
    builder.set_sfnt_version(version);
    let bytes = builder.build().unwrap().to_vec().unwrap();
    assert_eq!(&bytes[..4], version.to_be_bytes());
    let reloaded = load(bytes);
    assert_eq!(reloaded.sfnt_version(), version);
}

#[test]
fn cff_fonts_use_the_cff_ordering() {
    let mut builder = load(fonts::metrics_font());
    let cff = Tag::new(b"CFF ");
    let name = fonts::NAME;
    builder.set_sfnt_version(CFF_SFNT_VERSION);
    builder.new_table_builder_with_data(cff, FontData::new(vec![1, 0, 4, 1]));
    builder.new_table_builder_with_data(name, FontData::new(fonts::name_table()));
    let font = builder.build().unwrap();
    let ordering: Vec<_> = font.data_ordering(None).into_iter().collect();
    assert_eq!(
        ordering,
        [fonts::HEAD, fonts::HHEA, fonts::MAXP, name, cff, fonts::HMTX]
    );
}

#[test]
fn collection_from_stream_and_bytes() {
    let factory = FontFactory::new();
    let from_stream = factory.load_fonts(fonts::collection().as_slice()).unwrap();
    let from_bytes = factory.load_font_bytes(fonts::collection()).unwrap();
    assert_eq!(from_stream.len(), 2);
    for (a, b) in from_stream.iter().zip(&from_bytes) {
        assert_eq!(a.to_vec().unwrap(), b.to_vec().unwrap());
    }
    // same head, apart from each font's own checksum adjustment
    let head = |ix: usize| from_bytes[ix].table(fonts::HEAD).unwrap().checksum();
    assert_eq!(head(0), head(1));
}
