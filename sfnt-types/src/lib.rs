//! Common [scalar data types][data types] used in sfnt font files
//!
//! Every type here knows how to encode and decode itself as big-endian bytes
//! through the [`Scalar`] trait; the byte views in `sfnt-codec` build all of
//! their typed reads and writes on top of it.
//!
//! [data types]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod fixed;
mod int24;
mod longdatetime;
mod raw;
mod tag;

pub use fixed::{F2Dot14, Fixed};
pub use int24::{Int24, Uint24};
pub use longdatetime::LongDateTime;
pub use raw::{BeByteArray, Scalar};
pub use tag::{InvalidTag, Tag};

/// The header tag for a font collection file.
pub const TTC_HEADER_TAG: Tag = Tag::new(b"ttcf");

/// The sfnt version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The sfnt version for fonts containing CFF outlines (`OTTO`).
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
/// The sfnt version used by some legacy Apple fonts (`true`).
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;

/// Collection header versions.
pub const TTC_VERSION_1: u32 = 0x00010000;
pub const TTC_VERSION_2: u32 = 0x00020000;
