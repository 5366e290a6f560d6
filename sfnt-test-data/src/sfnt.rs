//! Assembling sfnt files and collections from raw tables.
//!
//! These mirror the layout rules of the codec (tag sorted directory, 4-byte
//! aligned tables laid out in the order given) so that a font assembled
//! here in the codec's default ordering serializes back to the same bytes.

use sfnt_types::{Tag, TTC_HEADER_TAG, TTC_VERSION_1};

use crate::BeBuffer;

pub const HEAD: Tag = Tag::new(b"head");

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 16;
const CHECKSUM_ADJUSTMENT: usize = 8;
const MAGIC: u32 = 0xB1B0AFBA;
const ADJUSTMENT_MARK: &str = "checksumAdjustment";

/// The sfnt checksum of `bytes`, zero padding the final word.
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// The checksum stored for a table in the directory.
///
/// For `head` the checksumAdjustment and magicNumber fields count as zero.
pub fn table_checksum(tag: Tag, bytes: &[u8]) -> u32 {
    if tag == HEAD && bytes.len() >= 16 {
        let mut masked = bytes.to_vec();
        masked[8..16].fill(0);
        checksum(&masked)
    } else {
        checksum(bytes)
    }
}

/// `(searchRange, entrySelector, rangeShift)` for a directory of `n` tables.
pub fn search_fields(num_tables: u16) -> (u16, u16, u16) {
    if num_tables == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = 16u16 << entry_selector;
    (search_range, entry_selector, num_tables * 16 - search_range)
}

fn round4(len: usize) -> usize {
    (len + 3) & !3
}

/// Assemble a font whose tables are laid out in the order given.
///
/// The `head` checksumAdjustment is filled in when `head` is present.
pub fn assemble(sfnt_version: u32, tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    assemble_at(0, sfnt_version, tables)
}

/// Assemble a font that will be placed `base` bytes into a larger file.
///
/// Table offsets in the directory are relative to the start of that file.
/// The returned bytes are padded to a multiple of four.
pub fn assemble_at(base: usize, sfnt_version: u32, tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let (search_range, entry_selector, range_shift) = search_fields(num_tables);
    let mut buf = BeBuffer::new()
        .push(sfnt_version)
        .push(num_tables)
        .push(search_range)
        .push(entry_selector)
        .push(range_shift);

    let mut offset = HEADER_LEN + tables.len() * RECORD_LEN;
    let mut records = Vec::new();
    for (tag, bytes) in tables {
        let mut bytes = bytes.clone();
        if *tag == HEAD && bytes.len() >= CHECKSUM_ADJUSTMENT + 4 {
            bytes[CHECKSUM_ADJUSTMENT..CHECKSUM_ADJUSTMENT + 4].fill(0);
        }
        let len = bytes.len();
        records.push((*tag, table_checksum(*tag, &bytes), offset, bytes));
        offset = round4(offset + len);
    }

    let mut directory: Vec<_> = records.iter().collect();
    directory.sort_by_key(|(tag, ..)| *tag);
    for (tag, checksum, offset, bytes) in directory {
        buf = buf
            .push(*tag)
            .push(*checksum)
            .push((base + offset) as u32)
            .push(bytes.len() as u32);
    }

    for (tag, _, offset, bytes) in &records {
        debug_assert_eq!(buf.len(), *offset);
        buf = if *tag == HEAD && bytes.len() >= CHECKSUM_ADJUSTMENT + 4 {
            buf.append(&bytes[..CHECKSUM_ADJUSTMENT])
                .mark(ADJUSTMENT_MARK)
                .append(&bytes[CHECKSUM_ADJUSTMENT..])
        } else {
            buf.append(bytes)
        };
        buf = buf.align4();
    }

    if buf.position(ADJUSTMENT_MARK).is_some() {
        let adjustment = MAGIC.wrapping_sub(checksum(&buf));
        buf.patch(ADJUSTMENT_MARK, adjustment);
    }
    buf.into_vec()
}

/// Assemble a version 1.0 font collection.
pub fn assemble_collection(fonts: &[(u32, Vec<(Tag, Vec<u8>)>)]) -> Vec<u8> {
    let mut header = BeBuffer::new()
        .push(TTC_HEADER_TAG)
        .push(TTC_VERSION_1)
        .push(fonts.len() as u32);
    let mut body = Vec::new();
    let header_len = 12 + 4 * fonts.len();
    for (version, tables) in fonts {
        let base = header_len + body.len();
        header = header.push(base as u32);
        body.extend(assemble_at(base, *version, tables));
    }
    let mut out = header.into_vec();
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_fields_match_the_format() {
        assert_eq!(search_fields(0), (0, 0, 0));
        assert_eq!(search_fields(1), (16, 0, 0));
        assert_eq!(search_fields(7), (64, 2, 48));
        assert_eq!(search_fields(8), (128, 3, 0));
    }

    #[test]
    fn whole_font_sums_to_magic() {
        let head = crate::fonts::head_table();
        let font = assemble(0x00010000, &[(HEAD, head), (Tag::new(b"name"), vec![1, 2, 3])]);
        assert_eq!(font.len() % 4, 0);
        assert_eq!(checksum(&font), MAGIC);
    }
}
