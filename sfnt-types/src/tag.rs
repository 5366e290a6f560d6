use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

/// A four-byte table identifier.
///
/// [Per the spec][spec], a tag is four bytes in the printable ASCII range,
/// padded with trailing spaces. Tags read from existing files are not
/// validated, since fonts in the wild occasionally carry invalid ones and
/// those must still round-trip; use [`Tag::new_checked`] when creating a
/// tag from user input.
///
/// Tags order bytewise, which is the order the table directory is sorted in.
///
/// [spec]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#data-types
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Construct a `Tag` from raw bytes, without validation.
    pub const fn new(src: &[u8; 4]) -> Tag {
        Tag(*src)
    }

    /// Attempt to create a `Tag` from one to four printable ASCII bytes.
    ///
    /// Shorter input is padded with spaces. A tag may not start with a space,
    /// and may not contain a non-space byte after a space.
    pub fn new_checked(src: &[u8]) -> Result<Self, InvalidTag> {
        if src.is_empty() || src.len() > 4 {
            return Err(InvalidTag::InvalidLength(src.len()));
        }
        let mut raw = [b' '; 4];
        raw[..src.len()].copy_from_slice(src);
        let tag = Tag(raw);
        tag.validate()?;
        Ok(tag)
    }

    /// Create a tag from a big-endian `u32`.
    pub const fn from_u32(src: u32) -> Self {
        Tag(src.to_be_bytes())
    }

    /// Create a tag from raw big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    /// Return the memory representation of this tag.
    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }

    /// The tag as a big-endian `u32`.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Check that the tag conforms to the spec.
    pub fn validate(self) -> Result<(), InvalidTag> {
        let mut seen_space = false;
        for (pos, byte) in self.0.iter().copied().enumerate() {
            match byte {
                b' ' if pos == 0 => return Err(InvalidTag::InvalidByte { pos, byte }),
                b' ' => seen_space = true,
                0..=0x1F | 0x7F.. => return Err(InvalidTag::InvalidByte { pos, byte }),
                _ if seen_space => return Err(InvalidTag::ByteAfterSpace { pos }),
                _ => (),
            }
        }
        Ok(())
    }
}

impl crate::Scalar for Tag {
    type Raw = [u8; 4];

    fn from_raw(raw: [u8; 4]) -> Self {
        Tag(raw)
    }

    fn to_raw(self) -> [u8; 4] {
        self.0
    }
}

/// An error representing an invalid tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidTag {
    /// The tag was not between 1 and 4 bytes in length.
    InvalidLength(usize),
    /// The tag contained a byte outside of the printable ASCII range, or
    /// started with a space.
    InvalidByte { pos: usize, byte: u8 },
    /// The tag contained a non-space byte after a space.
    ByteAfterSpace { pos: usize },
}

impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Tag::new_checked(src.as_bytes())
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<&[u8; 4]> for Tag {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            if (0x20..0x7F).contains(&byte) {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "{{0x{byte:02X}}}")?;
            }
        }
        Ok(())
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl Display for InvalidTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidTag::InvalidLength(len) => write!(f, "tag must have 1-4 bytes, found {len}"),
            InvalidTag::InvalidByte { pos, byte } => {
                write!(f, "invalid byte 0x{byte:02X} at position {pos}")
            }
            InvalidTag::ByteAfterSpace { pos } => {
                write!(f, "non-space byte at position {pos} follows a space")
            }
        }
    }
}

impl std::error::Error for InvalidTag {}

#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
