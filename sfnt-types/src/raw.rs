//! Encoding and decoding scalars as raw big-endian bytes

/// A fixed-size array of big-endian bytes.
///
/// This is sealed; it is only implemented for the `[u8; N]` sizes that
/// appear in font files.
pub trait BeByteArray:
    Copy + Default + AsRef<[u8]> + AsMut<[u8]> + sealed::Sealed + 'static
{
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! be_array {
    ($($len:literal),*) => {
        $(
            impl sealed::Sealed for [u8; $len] {}
            impl BeByteArray for [u8; $len] {}
        )*
    };
}

be_array!(1, 2, 3, 4, 8);

/// A type that can be read from or written to big-endian font data.
///
/// Reading goes through [`Scalar::from_raw`] and writing through
/// [`Scalar::to_raw`]; the byte views assemble the raw array one byte at a
/// time, so implementations never see partial input.
pub trait Scalar: Sized + Copy {
    /// The raw byte representation of this type.
    type Raw: BeByteArray;

    /// The number of bytes this type occupies in font data.
    const RAW_BYTE_LEN: usize = std::mem::size_of::<Self::Raw>();

    /// Create an instance of this type from raw big-endian bytes.
    fn from_raw(raw: Self::Raw) -> Self;

    /// Encode this type as raw big-endian bytes.
    fn to_raw(self) -> Self::Raw;

    /// Attempt to read an instance of this type from the front of a slice.
    ///
    /// Returns `None` if the slice is too short.
    fn read(bytes: &[u8]) -> Option<Self> {
        let mut raw = Self::Raw::default();
        let src = bytes.get(..Self::RAW_BYTE_LEN)?;
        raw.as_mut().copy_from_slice(src);
        Some(Self::from_raw(raw))
    }
}

macro_rules! int_scalar {
    ($ty:ty, $len:literal) => {
        impl Scalar for $ty {
            type Raw = [u8; $len];

            fn from_raw(raw: [u8; $len]) -> $ty {
                <$ty>::from_be_bytes(raw)
            }

            fn to_raw(self) -> [u8; $len] {
                self.to_be_bytes()
            }
        }
    };
}

int_scalar!(u8, 1);
int_scalar!(i8, 1);
int_scalar!(u16, 2);
int_scalar!(i16, 2);
int_scalar!(u32, 4);
int_scalar!(i32, 4);
int_scalar!(u64, 8);
int_scalar!(i64, 8);
