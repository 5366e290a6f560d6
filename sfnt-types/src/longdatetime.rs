//! a datetime type

/// A simple datetime type.
///
/// This is represented as a number of seconds since 12:00 midnight,
/// January 1, 1904, UTC.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongDateTime(i64);

impl LongDateTime {
    /// Seconds between the 1904 epoch and the unix epoch.
    pub const UNIX_EPOCH_OFFSET: i64 = 2_082_844_800;

    /// Create with a number of seconds relative to 1904-01-01 00:00.
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Create from a number of seconds relative to the unix epoch.
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs.saturating_add(Self::UNIX_EPOCH_OFFSET))
    }

    /// The number of seconds since 00:00 1904-01-01, UTC.
    ///
    /// This can be a negative number, which presumably represents a date prior
    /// to the reference date.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// The number of seconds relative to the unix epoch.
    pub const fn as_unix_secs(&self) -> i64 {
        self.0.saturating_sub(Self::UNIX_EPOCH_OFFSET)
    }
}

impl crate::Scalar for LongDateTime {
    type Raw = [u8; 8];

    fn from_raw(raw: [u8; 8]) -> Self {
        Self(i64::from_be_bytes(raw))
    }

    fn to_raw(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_conversion() {
        let date = LongDateTime::from_unix_secs(0);
        assert_eq!(date.as_secs(), LongDateTime::UNIX_EPOCH_OFFSET);
        assert_eq!(date.as_unix_secs(), 0);
        assert_eq!(LongDateTime::new(-500).as_secs(), -500);
    }
}
