//! Small but complete fonts.
//!
//! The minimal TrueType font has three glyphs: a simple glyph, an empty
//! glyph and a composite. Its tables are laid out in the codec's default
//! TrueType ordering, so an unmodified round trip reproduces the file.

use sfnt_types::{Tag, TT_SFNT_VERSION};

use crate::{eblc, sfnt, BeBuffer};

pub const HEAD: Tag = Tag::new(b"head");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const HMTX: Tag = Tag::new(b"hmtx");
pub const LOCA: Tag = Tag::new(b"loca");
pub const GLYF: Tag = Tag::new(b"glyf");
pub const NAME: Tag = Tag::new(b"name");
pub const EBDT: Tag = Tag::new(b"EBDT");
pub const EBLC: Tag = Tag::new(b"EBLC");

pub const UNITS_PER_EM: u16 = 1000;
pub const NUM_GLYPHS: u16 = 3;
pub const NUMBER_OF_H_METRICS: u16 = 2;
/// `(advance, lsb)` for the glyphs with a long metric.
pub const LONG_METRICS: [(u16, i16); 2] = [(500, 10), (600, 20)];
/// The left side bearing of the last glyph, which shares the last advance.
pub const TRAILING_LSB: i16 = 30;
/// Offsets of each glyph in glyf, plus the end of the last glyph.
pub const GLYPH_OFFSETS: [u32; 4] = [0, 12, 12, 24];

/// A version 1.0 head table using short loca offsets.
pub fn head_table() -> Vec<u8> {
    BeBuffer::new()
        .push(0x0001_0000u32) // version
        .push(0x0001_8000u32) // fontRevision 1.5
        .push(0u32) // checksumAdjustment
        .push(0x5F0F_3CF5u32) // magicNumber
        .push(0x000Bu16) // flags
        .push(UNITS_PER_EM)
        .push(3_600_000_000i64) // created
        .push(3_700_000_000i64) // modified
        .extend([-50i16, -200, 650, 800]) // bbox
        .push(0u16) // macStyle
        .push(8u16) // lowestRecPPEM
        .push(2i16) // fontDirectionHint
        .push(0i16) // indexToLocFormat
        .push(0i16) // glyphDataFormat
        .into_vec()
}

pub fn hhea_table() -> Vec<u8> {
    BeBuffer::new()
        .push(0x0001_0000u32)
        .extend([800i16, -200, 90]) // ascender, descender, lineGap
        .push(600u16) // advanceWidthMax
        .extend([10i16, -50, 650]) // minLsb, minRsb, xMaxExtent
        .extend([1i16, 0, 0]) // caret
        .extend([0i16; 4]) // reserved
        .push(0i16) // metricDataFormat
        .push(NUMBER_OF_H_METRICS)
        .into_vec()
}

/// A version 0.5 maxp table.
pub fn maxp_table() -> Vec<u8> {
    BeBuffer::new()
        .push(0x0000_5000u32)
        .push(NUM_GLYPHS)
        .into_vec()
}

pub fn hmtx_table() -> Vec<u8> {
    let mut buf = BeBuffer::new();
    for (advance, lsb) in LONG_METRICS {
        buf = buf.push(advance).push(lsb);
    }
    buf.push(TRAILING_LSB).into_vec()
}

/// Short format loca for [`GLYPH_OFFSETS`].
pub fn loca_table() -> Vec<u8> {
    BeBuffer::new()
        .extend(GLYPH_OFFSETS.iter().map(|off| (off / 2) as u16))
        .into_vec()
}

pub fn glyf_table() -> Vec<u8> {
    BeBuffer::new()
        // a simple glyph with one contour of one point
        .extend([1i16, -50, -200, 650, 800])
        .push(0u16)
        // a composite; the component record is not decoded
        .extend([-1i16, 0, 0, 600, 700])
        .push(0u16)
        .into_vec()
}

/// A name table with no records; six bytes, so it needs padding.
pub fn name_table() -> Vec<u8> {
    BeBuffer::new().extend([0u16, 0, 6]).into_vec()
}

/// A version 2.0 EBDT table holding the images located by
/// [`eblc::eblc_table`].
pub fn ebdt_table() -> Vec<u8> {
    let mut bytes = BeBuffer::new().push(0x0002_0000u32).into_vec();
    bytes.resize(eblc::IMAGE_DATA_OFFSET as usize, 0);
    bytes.extend((0..eblc::IMAGE_DATA_LEN).map(|i| i as u8));
    bytes
}

/// The tables of the minimal TrueType font, in their data order.
pub fn minimal_tables() -> Vec<(Tag, Vec<u8>)> {
    vec![
        (HEAD, head_table()),
        (HHEA, hhea_table()),
        (MAXP, maxp_table()),
        (HMTX, hmtx_table()),
        (LOCA, loca_table()),
        (GLYF, glyf_table()),
        (NAME, name_table()),
    ]
}

/// The minimal TrueType font.
pub fn minimal_font() -> Vec<u8> {
    sfnt::assemble(TT_SFNT_VERSION, &minimal_tables())
}

/// Only the tables needed to derive horizontal metrics.
pub fn metrics_font() -> Vec<u8> {
    sfnt::assemble(
        TT_SFNT_VERSION,
        &[
            (HEAD, head_table()),
            (HHEA, hhea_table()),
            (MAXP, maxp_table()),
            (HMTX, hmtx_table()),
        ],
    )
}

/// The minimal font plus embedded bitmaps.
pub fn bitmap_font() -> Vec<u8> {
    let mut tables = minimal_tables();
    tables.push((EBDT, ebdt_table()));
    tables.push((EBLC, eblc::eblc_table()));
    sfnt::assemble(TT_SFNT_VERSION, &tables)
}

/// A collection of the minimal font and the metrics-only font.
pub fn collection() -> Vec<u8> {
    let metrics = minimal_tables().into_iter().take(4).collect();
    sfnt::assemble_collection(&[
        (TT_SFNT_VERSION, minimal_tables()),
        (TT_SFNT_VERSION, metrics),
    ])
}
