//! The sfnt checksum

use std::ops::Range;

/// The value the whole-font checksum must sum to once `head.checksumAdjustment`
/// has been set.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// Compute the checksum of some bytes.
///
/// The bytes are summed as big-endian `u32` words, with a trailing partial
/// word padded with zeros.
pub fn compute_checksum(bytes: &[u8]) -> u32 {
    compute_checksum_excluding(bytes, &[])
}

/// Compute the checksum of some bytes, treating bytes in `exempt` as zero.
///
/// This is what lets the `head` table's checksum ignore its own
/// checksumAdjustment field: the adjustment is derived from a checksum that
/// must not depend on the adjustment itself.
pub fn compute_checksum_excluding(bytes: &[u8], exempt: &[Range<usize>]) -> u32 {
    let mut sum = 0u32;
    let mut iter = bytes.chunks_exact(4);
    let mut pos = 0;
    for quad in &mut iter {
        let mut word = [quad[0], quad[1], quad[2], quad[3]];
        mask_exempt(&mut word, pos, exempt);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
        pos += 4;
    }

    let rem = iter.remainder();
    if !rem.is_empty() {
        let mut word = [0u8; 4];
        word[..rem.len()].copy_from_slice(rem);
        mask_exempt(&mut word, pos, exempt);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

fn mask_exempt(word: &mut [u8; 4], pos: usize, exempt: &[Range<usize>]) {
    if exempt.is_empty() {
        return;
    }
    for (i, byte) in word.iter_mut().enumerate() {
        if exempt.iter().any(|range| range.contains(&(pos + i))) {
            *byte = 0;
        }
    }
}

/// Round up to the next multiple of four.
pub(crate) fn round4(len: usize) -> usize {
    (len + 3) & !3
}
