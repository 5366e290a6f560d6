//! EBLC index subtables and a complete EBLC table.
//!
//! Every subtable covers three glyphs. The variable-size formats have
//! images of 10, 0 and 6 bytes; the sparse formats only hold the first and
//! last glyph of their range.

use crate::BeBuffer;

pub const FIRST_GLYPH: u16 = 4;
pub const LAST_GLYPH: u16 = 6;
/// The distance between the ranges of consecutive subtables in
/// [`eblc_table`].
pub const GLYPH_STRIDE: u16 = 3;
pub const IMAGE_FORMAT: u16 = 6;
pub const IMAGE_DATA_OFFSET: u32 = 100;
pub const IMAGE_SIZE: u32 = 12;
/// The length of the image data every subtable points into.
pub const IMAGE_DATA_LEN: u32 = 36;
pub const PPEM: u8 = 12;

const BIG_METRICS: [u8; 8] = [12, 8, 1, 10, 9, 0xFE, 0, 12];
const OFFSETS: [u32; 4] = [0, 10, 10, 16];

/// The bytes of an index subtable in `format`, with its glyph range.
pub fn index_subtable(format: u16) -> (u16, u16, Vec<u8>) {
    (
        FIRST_GLYPH,
        LAST_GLYPH,
        subtable_for_range(format, FIRST_GLYPH),
    )
}

fn subtable_for_range(format: u16, first: u16) -> Vec<u8> {
    let last = first + (LAST_GLYPH - FIRST_GLYPH);
    let buf = BeBuffer::new()
        .push(format)
        .push(IMAGE_FORMAT)
        .push(IMAGE_DATA_OFFSET);
    match format {
        1 => buf.extend(OFFSETS),
        2 => buf.push(IMAGE_SIZE).extend(BIG_METRICS),
        3 => buf.extend(OFFSETS.map(|off| off as u16)),
        4 => buf
            .push(2u32)
            .extend([first, 0, last, 10, 0, 16]),
        5 => buf
            .push(IMAGE_SIZE)
            .extend(BIG_METRICS)
            .push(2u32)
            .extend([first, last]),
        _ => panic!("no index subtable format {format}"),
    }
    .into_vec()
}

/// An EBLC table with one size holding a subtable of each format.
///
/// The subtable of format `n` covers glyphs starting at
/// `FIRST_GLYPH + (n - 1) * GLYPH_STRIDE`. The table is laid out the way
/// the codec serializes it.
pub fn eblc_table() -> Vec<u8> {
    let subtables: Vec<_> = (1..=5u16)
        .map(|format| {
            let first = FIRST_GLYPH + (format - 1) * GLYPH_STRIDE;
            (first, subtable_for_range(format, first))
        })
        .collect();
    let array_offset = 8 + 48;
    let array_len = subtables.len() * 8;
    let tables_len = array_len
        + subtables
            .iter()
            .map(|(_, bytes)| (bytes.len() + 3) & !3)
            .sum::<usize>();
    let last_glyph = subtables.last().map(|(first, _)| first + 2).unwrap();

    let mut buf = BeBuffer::new()
        .extend([2u16, 0])
        .push(1u32)
        // BitmapSize
        .push(array_offset as u32)
        .push(tables_len as u32)
        .push(subtables.len() as u32)
        .push(0u32) // colorRef
        .extend([PPEM as i8, -3, PPEM as i8, 1, 1, 0, 0, 0, PPEM as i8, -3])
        .extend([0u8; 2])
        .extend([0i8; 10])
        .extend([0u8; 2])
        .push(FIRST_GLYPH)
        .push(last_glyph)
        .extend([PPEM, PPEM, 1])
        .push(1i8); // flags: horizontal

    let mut subtable_offset = array_len as u32;
    for (first, bytes) in &subtables {
        buf = buf
            .push(*first)
            .push(first + 2)
            .push(subtable_offset);
        subtable_offset += ((bytes.len() + 3) & !3) as u32;
    }
    let mut out = buf.into_vec();
    for (_, bytes) in subtables {
        out.extend(bytes);
        out.resize((out.len() + 3) & !3, 0);
    }
    out
}
