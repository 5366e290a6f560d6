//! Errors that occur while reading, building and writing fonts

use types::Tag;

/// An error that occurs when reading font data.
///
/// This is the error returned by the byte views and by table parsing; it is
/// always local to the access that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    OutOfBounds,
    // i64 is flexible enough to store any value we might encounter
    InvalidFormat(i64),
    InvalidSfnt(u32),
    InvalidTtc(Tag),
    InvalidCollectionIndex(u32),
    MalformedData(&'static str),
}

/// An error that occurs while loading, building or serializing a font.
#[derive(Debug)]
pub enum Error {
    /// A byte access fell outside of a view or store.
    Read(ReadError),
    /// Reading from or writing to an external source or sink failed.
    Io(std::io::Error),
    /// A builder whose model has changed was asked to build, but its model
    /// cannot be serialized yet.
    NotReady(Tag),
    /// A builder has no data and no model to build from.
    NoData(Tag),
    /// An operation needs a value that has not been supplied.
    ///
    /// This is usually a value that the font builder pushes from one table
    /// to another, such as the glyph count.
    MissingState { tag: Tag, field: &'static str },
    /// An internal invariant was violated.
    Inconsistent(ConsistencyFault),
}

/// An internal invariant that failed during a build or serialize.
///
/// These are never recoverable: the font being produced would be invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyFault {
    /// The bytes written for a table disagree with its directory record.
    LengthMismatch {
        tag: Tag,
        declared: u32,
        actual: u32,
    },
    /// A table serializer wrote a different number of bytes than it said it
    /// would.
    SizeMismatch {
        tag: Tag,
        expected: usize,
        written: usize,
    },
    /// A table could not be produced for a tag present in the builder.
    MissingTable(Tag),
}

impl Error {
    /// Returns `false` if this error is an internal consistency fault.
    ///
    /// All other errors are local to the operation that produced them.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Inconsistent(_))
    }
}

impl From<ReadError> for Error {
    fn from(src: ReadError) -> Error {
        Error::Read(src)
    }
}

impl From<std::io::Error> for Error {
    fn from(src: std::io::Error) -> Error {
        Error::Io(src)
    }
}

impl From<ConsistencyFault> for Error {
    fn from(src: ConsistencyFault) -> Error {
        Error::Inconsistent(src)
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::OutOfBounds => write!(f, "An offset was out of bounds"),
            ReadError::InvalidFormat(x) => write!(f, "Invalid format '{x}'"),
            ReadError::InvalidSfnt(ver) => write!(f, "Invalid sfnt version 0x{ver:08X}"),
            ReadError::InvalidTtc(tag) => write!(f, "Invalid ttc tag {tag}"),
            ReadError::InvalidCollectionIndex(ix) => {
                write!(f, "Invalid index {ix} for font collection")
            }
            ReadError::MalformedData(msg) => write!(f, "Malformed data: '{msg}'"),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Read(err) => err.fmt(f),
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::NotReady(tag) => write!(f, "the '{tag}' builder is not ready to build"),
            Error::NoData(tag) => write!(f, "the '{tag}' builder has no data"),
            Error::MissingState { tag, field } => {
                write!(f, "the '{tag}' table requires '{field}', which was never set")
            }
            Error::Inconsistent(fault) => fault.fmt(f),
        }
    }
}

impl std::fmt::Display for ConsistencyFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyFault::LengthMismatch {
                tag,
                declared,
                actual,
            } => write!(
                f,
                "'{tag}' declares {declared} bytes in its record but has {actual}"
            ),
            ConsistencyFault::SizeMismatch {
                tag,
                expected,
                written,
            } => write!(
                f,
                "'{tag}' serializer wrote {written} bytes, expected {expected}"
            ),
            ConsistencyFault::MissingTable(tag) => {
                write!(f, "no table could be built for '{tag}'")
            }
        }
    }
}

impl std::error::Error for ReadError {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for ConsistencyFault {}
