//! 24-bit integer types

/// 24-bit unsigned integer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Uint24(u32);

/// 24-bit signed integer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Int24(i32);

impl Uint24 {
    /// The smallest value that can be represented by this integer type.
    pub const MIN: Self = Uint24(0);

    /// The largest value that can be represented by this integer type.
    pub const MAX: Self = Uint24(0xFF_FFFF);

    /// Create from a u32. Saturates on overflow.
    pub const fn new(raw: u32) -> Uint24 {
        if raw > Self::MAX.0 {
            Self::MAX
        } else {
            Uint24(raw)
        }
    }

    /// Create from a u32, returning `None` if the value overflows.
    pub const fn checked_new(raw: u32) -> Option<Uint24> {
        if raw > Self::MAX.0 {
            None
        } else {
            Some(Uint24(raw))
        }
    }

    /// Returns this value as an unsigned 32-bit integer.
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl Int24 {
    /// The smallest value that can be represented by this integer type.
    pub const MIN: Self = Int24(-0x80_0000);

    /// The largest value that can be represented by this integer type.
    pub const MAX: Self = Int24(0x7F_FFFF);

    /// Create from an i32. Saturates on overflow.
    pub const fn new(raw: i32) -> Int24 {
        if raw > Self::MAX.0 {
            Self::MAX
        } else if raw < Self::MIN.0 {
            Self::MIN
        } else {
            Int24(raw)
        }
    }

    /// Returns this value as a signed 32-bit integer.
    pub const fn to_i32(self) -> i32 {
        self.0
    }
}

impl crate::Scalar for Uint24 {
    type Raw = [u8; 3];

    fn from_raw(raw: [u8; 3]) -> Self {
        Uint24((raw[0] as u32) << 16 | (raw[1] as u32) << 8 | raw[2] as u32)
    }

    fn to_raw(self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }
}

impl crate::Scalar for Int24 {
    type Raw = [u8; 3];

    fn from_raw(raw: [u8; 3]) -> Self {
        // sign-extend by shifting the top byte into place
        Int24(i32::from_be_bytes([raw[0], raw[1], raw[2], 0]) >> 8)
    }

    fn to_raw(self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }
}

impl From<Uint24> for u32 {
    fn from(src: Uint24) -> u32 {
        src.0
    }
}

impl From<Int24> for i32 {
    fn from(src: Int24) -> i32 {
        src.0
    }
}

impl std::fmt::Display for Uint24 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for Int24 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;

    #[test]
    fn uint24_saturates() {
        assert_eq!(Uint24::new(0x1_000_000), Uint24::MAX);
        assert_eq!(Uint24::checked_new(0x1_000_000), None);
        assert_eq!(Uint24::from_raw([0x12, 0x34, 0x56]).to_u32(), 0x123456);
        assert_eq!(Uint24::new(0xABCDEF).to_raw(), [0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn int24_sign_extends() {
        assert_eq!(Int24::from_raw([0xFF, 0xFF, 0xFE]).to_i32(), -2);
        assert_eq!(Int24::from_raw([0x7F, 0xFF, 0xFF]), Int24::MAX);
        assert_eq!(Int24::from_raw([0x80, 0x00, 0x00]), Int24::MIN);
        assert_eq!(Int24::new(-2).to_raw(), [0xFF, 0xFF, 0xFE]);
        assert_eq!(Int24::new(i32::MIN), Int24::MIN);
    }
}
