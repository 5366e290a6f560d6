//! Table directory records

use std::cmp::Ordering;

use types::Tag;

/// The size of one record in the table directory.
pub const TABLE_RECORD_LEN: usize = 16;

/// A table's entry in the font's table directory.
///
/// Besides the tag, each field may or may not be known yet:
///
/// - a new, empty table knows only its tag ([`TableRecord::new`]);
/// - a freshly built table knows its length but has no position in any file
///   ([`TableRecord::with_length`]);
/// - a record read from a file knows everything
///   ([`TableRecord::from_directory`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableRecord {
    tag: Tag,
    offset: Option<u32>,
    length: Option<u32>,
    checksum: Option<u32>,
}

impl TableRecord {
    /// A record for a table that has no data yet.
    pub fn new(tag: Tag) -> Self {
        TableRecord {
            tag,
            offset: None,
            length: None,
            checksum: None,
        }
    }

    /// A record for a newly built table.
    pub fn with_length(tag: Tag, length: u32) -> Self {
        TableRecord {
            length: Some(length),
            ..TableRecord::new(tag)
        }
    }

    /// A complete record, as read from a table directory.
    pub fn from_directory(tag: Tag, checksum: u32, offset: u32, length: u32) -> Self {
        TableRecord {
            tag,
            offset: Some(offset),
            length: Some(length),
            checksum: Some(checksum),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The table's offset from the start of the file, if known.
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    /// The table's length in bytes (excluding padding), if known.
    pub fn length(&self) -> Option<u32> {
        self.length
    }

    /// The checksum stored in the directory, if known.
    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    /// Order records by their position in the file.
    ///
    /// Records without an offset sort last; ties are broken by tag.
    pub fn cmp_by_offset(&self, other: &TableRecord) -> Ordering {
        match (self.offset, other.offset) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.tag.cmp(&other.tag))
    }

    /// Order records by tag, the order of the on-disk directory.
    pub fn cmp_by_tag(&self, other: &TableRecord) -> Ordering {
        self.tag.cmp(&other.tag)
    }
}
