//! fixed-point numerical types

use std::ops::{Add, Neg, Sub};

// shared between Fixed and F2Dot14
macro_rules! fixed_impl {
    ($name:ident, $bits:literal, $fract_bits:literal, $ty:ty, $len:literal) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[doc = concat!(stringify!($bits), "-bit signed fixed point number with ", stringify!($fract_bits), " bits of fraction.")]
        pub struct $name($ty);

        impl $name {
            /// Minimum value.
            pub const MIN: Self = Self(<$ty>::MIN);
            /// Maximum value.
            pub const MAX: Self = Self(<$ty>::MAX);
            /// The value `0`.
            pub const ZERO: Self = Self(0);
            /// The value `1`.
            pub const ONE: Self = Self(1 << $fract_bits);

            const INT_MASK: $ty = !0 << $fract_bits;
            const FRACT_BITS: u32 = $fract_bits;

            /// Creates a value from its raw bit representation.
            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// Returns the raw bit representation.
            pub const fn to_bits(self) -> $ty {
                self.0
            }

            /// Creates a value from an integer, saturating on overflow.
            pub fn from_i32(int: i32) -> Self {
                let shifted = (int as i64) << Self::FRACT_BITS;
                Self(shifted.clamp(<$ty>::MIN as i64, <$ty>::MAX as i64) as $ty)
            }

            /// Returns the largest integer less than or equal to the number.
            pub fn floor(self) -> Self {
                Self(self.0 & Self::INT_MASK)
            }

            /// Returns the fractional part of the number.
            pub fn fract(self) -> Self {
                Self(self.0 - self.floor().0)
            }

            /// Creates a value from a float, rounding to the nearest representable value.
            pub fn from_f64(x: f64) -> Self {
                let scaled = (x * (1i64 << $fract_bits) as f64).round();
                Self(scaled.clamp(<$ty>::MIN as f64, <$ty>::MAX as f64) as $ty)
            }

            /// Returns the value as an `f64`. This conversion is lossless.
            pub fn to_f64(self) -> f64 {
                self.0 as f64 / (1i64 << $fract_bits) as f64
            }
        }

        impl crate::Scalar for $name {
            type Raw = [u8; $len];

            fn from_raw(raw: [u8; $len]) -> Self {
                Self(<$ty>::from_be_bytes(raw))
            }

            fn to_raw(self) -> [u8; $len] {
                self.0.to_be_bytes()
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, other: Self) -> Self {
                Self(self.0.wrapping_add(other.0))
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, other: Self) -> Self {
                Self(self.0.wrapping_sub(other.0))
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(self.0.wrapping_neg())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.to_f64().fmt(f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.to_f64().fmt(f)
            }
        }
    };
}

fixed_impl!(F2Dot14, 16, 14, i16, 2);
fixed_impl!(Fixed, 32, 16, i32, 4);

impl Fixed {
    /// The major part of a packed 16.16 version number.
    pub const fn version_major(self) -> u16 {
        (self.0 as u32 >> 16) as u16
    }

    /// The minor part of a packed 16.16 version number.
    pub const fn version_minor(self) -> u16 {
        self.0 as u32 as u16
    }
}

impl From<F2Dot14> for Fixed {
    fn from(src: F2Dot14) -> Fixed {
        Fixed((src.0 as i32) << 2)
    }
}

#[cfg(test)]
mod tests {
    #![allow(overflowing_literals)] // we want to specify byte values directly
    use super::*;
    use crate::Scalar;

    #[test]
    fn f2dot14_floats() {
        // Examples from https://learn.microsoft.com/en-us/typography/opentype/spec/otff#data-types
        assert_eq!(F2Dot14(0x7fff), F2Dot14::from_f64(1.999939));
        assert_eq!(F2Dot14(0x7000), F2Dot14::from_f64(1.75));
        assert_eq!(F2Dot14(0x0001), F2Dot14::from_f64(0.0000610356));
        assert_eq!(F2Dot14(0x0000), F2Dot14::from_f64(0.0));
        assert_eq!(F2Dot14(0xffff), F2Dot14::from_f64(-0.000061));
        assert_eq!(F2Dot14(0x8000), F2Dot14::from_f64(-2.0));
    }

    #[test]
    fn fixed_floats() {
        assert_eq!(Fixed(0x7fff_0000), Fixed::from_f64(32767.));
        assert_eq!(Fixed(0x0001_0000), Fixed::from_f64(1.0));
        assert_eq!(Fixed(0x0001_8000), Fixed::from_f64(1.5));
        assert_eq!(Fixed(0x7fff_ffff), Fixed::from_f64(32768.0));
        assert_eq!(Fixed::from_f64(-1.25).to_f64(), -1.25);
    }

    #[test]
    fn integer_parts() {
        let val = Fixed::from_f64(2.75);
        assert_eq!(val.floor(), Fixed::from_i32(2));
        assert_eq!(val.fract(), Fixed::from_f64(0.75));
        assert_eq!(Fixed::from_i32(40_000), Fixed::MAX);
    }

    #[test]
    fn versions() {
        let version = Fixed::from_bits(0x0001_0000);
        assert_eq!((version.version_major(), version.version_minor()), (1, 0));
        let maxp_05 = Fixed::from_bits(0x0000_5000);
        assert_eq!((maxp_05.version_major(), maxp_05.version_minor()), (0, 0x5000));
    }

    #[test]
    fn raw_bytes() {
        assert_eq!(Fixed::from_f64(1.5).to_raw(), [0x00, 0x01, 0x80, 0x00]);
        assert_eq!(F2Dot14::from_raw([0x40, 0x00]), F2Dot14::ONE);
        assert_eq!(Fixed::from(F2Dot14::from_f64(-0.5)), Fixed::from_f64(-0.5));
    }
}
