//! The immutable table / mutable builder lifecycle shared by every table
//!
//! A table is an immutable view of its bytes plus its directory record. A
//! builder is the mutable counterpart, and moves through three states:
//!
//! - it starts out holding the bytes it was loaded from (read-only, or a
//!   buffer it already owns), with a clean model;
//! - on first write access the bytes are copied into a writable buffer and
//!   the builder is marked as having changed data; alternatively a concrete
//!   builder may parse its bytes into an object model, after which the model
//!   is the source of truth;
//! - [`TableBuilder::build`] consumes the builder.
//!
//! `build` either copies the current bytes through unchanged, serializes the
//! model into a fresh buffer, or refuses if the model is not ready. Concrete
//! tables plug in through the [`FontTable`] and [`TableBuilder`] traits.

use std::ops::Range;

use types::{Scalar, Tag};

use crate::{
    error::{ConsistencyFault, Error, ReadError},
    table_record::TableRecord,
    FontData, WritableFontData,
};

/// How many bytes a builder's model needs when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializedSize {
    /// Exactly this many bytes; serializing into a buffer of this size must
    /// fill it completely.
    Known(usize),
    /// Only known once serialization is finished; the model is written into
    /// a growable buffer.
    Pending,
}

/// The raw bytes held by a builder.
#[derive(Debug, Clone)]
pub enum BuilderData {
    /// Bytes shared with the source of the builder, not yet copied.
    Reading(FontData),
    /// Bytes owned by this builder, which may be edited in place.
    Writing(WritableFontData),
}

impl BuilderData {
    /// The number of bytes held.
    pub fn len(&self) -> usize {
        match self {
            BuilderData::Reading(data) => data.len(),
            BuilderData::Writing(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a big-endian scalar at `offset`.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        match self {
            BuilderData::Reading(data) => data.read_at(offset),
            BuilderData::Writing(data) => data.read_at(offset),
        }
    }

    /// A read-only view of the current bytes.
    ///
    /// For a writable buffer this is a snapshot: later writes to the buffer
    /// are not visible through it.
    pub fn font_data(&self) -> FontData {
        match self {
            BuilderData::Reading(data) => data.clone(),
            BuilderData::Writing(data) => data.to_font_data(),
        }
    }

    /// The checksum of the current bytes, treating `exempt` ranges as zero.
    pub fn checksum_excluding(&self, exempt: &[Range<usize>]) -> u32 {
        match self {
            BuilderData::Reading(data) => data.checksum_excluding(exempt),
            BuilderData::Writing(data) => data.checksum_excluding(exempt),
        }
    }

    // a freshly allocated writable copy of the current bytes.
    fn fresh_copy(&self) -> WritableFontData {
        match self {
            BuilderData::Reading(data) => WritableFontData::copy_of(data),
            BuilderData::Writing(data) => WritableFontData::copy_of(&data.to_font_data()),
        }
    }
}

/// Why a builder is no longer clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyReason {
    /// The raw bytes were edited or replaced.
    Data,
    /// The builder's object model has diverged from its raw bytes.
    Model,
}

/// Whether a builder still matches the bytes it was created from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelState {
    #[default]
    Clean,
    Dirty(DirtyReason),
}

/// The state shared by every table builder: its record, bytes and dirtiness.
#[derive(Debug, Clone)]
pub struct BuilderCore {
    record: TableRecord,
    data: Option<BuilderData>,
    state: ModelState,
}

impl BuilderCore {
    pub fn new(record: TableRecord, data: Option<BuilderData>) -> Self {
        BuilderCore {
            record,
            data,
            state: ModelState::Clean,
        }
    }

    pub fn record(&self) -> &TableRecord {
        &self.record
    }

    pub fn tag(&self) -> Tag {
        self.record.tag()
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// The raw bytes currently held, if any.
    pub fn data(&self) -> Option<&BuilderData> {
        self.data.as_ref()
    }

    /// A read-only view of the raw bytes, if any.
    pub fn font_data(&self) -> Option<FontData> {
        self.data.as_ref().map(BuilderData::font_data)
    }

    /// Read a scalar from the raw bytes, or the default if it is missing.
    pub fn read_or_default<T: Scalar + Default>(&self, offset: usize) -> T {
        self.data
            .as_ref()
            .and_then(|data| data.read_at(offset).ok())
            .unwrap_or_default()
    }

    /// The writable bytes of this builder, copying on first access.
    ///
    /// The returned view aliases the builder's buffer, and the data is marked
    /// as changed. A builder with no data at all gets an empty growable
    /// buffer.
    pub fn writable_data(&mut self) -> WritableFontData {
        let writable = match self.data.take() {
            Some(BuilderData::Writing(data)) => data,
            other => {
                let copy = match other {
                    Some(data) => data.fresh_copy(),
                    None => WritableFontData::growable(),
                };
                log::trace!("'{}' copied {} bytes on first write", self.tag(), copy.len());
                copy
            }
        };
        self.data = Some(BuilderData::Writing(writable.clone()));
        if self.state == ModelState::Clean {
            self.state = ModelState::Dirty(DirtyReason::Data);
        }
        writable
    }

    /// Replace the raw bytes, marking the data as changed.
    ///
    /// Any model must be discarded by the caller; see
    /// [`TableBuilder::set_data`].
    pub fn replace_data(&mut self, data: BuilderData) {
        self.data = Some(data);
        self.state = ModelState::Dirty(DirtyReason::Data);
    }

    /// Mark the object model as the source of truth.
    pub fn set_model_changed(&mut self) {
        self.state = ModelState::Dirty(DirtyReason::Model);
    }
}

/// An immutable font table.
///
/// Once built, a table never changes and is safe to read from many threads.
pub trait FontTable {
    /// The table's directory record.
    fn record(&self) -> &TableRecord;

    /// The table's bytes.
    fn data(&self) -> &FontData;

    fn tag(&self) -> Tag {
        self.record().tag()
    }

    /// The checksum written to the table directory for this table.
    fn checksum(&self) -> u32 {
        self.data().checksum()
    }
}

/// A mutable, single-use table builder.
///
/// Implementors supply the hooks (`ready_to_serialize`, `size_to_serialize`,
/// `serialize`, `reset_model`, `materialize`) and get the generic build
/// state machine for free.
pub trait TableBuilder: Sized {
    /// The table produced by this builder.
    type Table: FontTable;

    fn core(&self) -> &BuilderCore;

    fn core_mut(&mut self) -> &mut BuilderCore;

    /// `true` if the object model can be serialized.
    ///
    /// Only consulted when the model has changed.
    fn ready_to_serialize(&self) -> bool;

    /// The size of the serialized model.
    fn size_to_serialize(&self) -> SerializedSize;

    /// Write the model into `into`, returning the number of bytes written.
    fn serialize(&self, into: &WritableFontData) -> Result<usize, Error>;

    /// Discard the object model, so it is reparsed from the raw bytes.
    fn reset_model(&mut self);

    /// Create the immutable table from its final bytes.
    fn materialize(&self, record: TableRecord, data: FontData) -> Result<Self::Table, Error>;

    fn tag(&self) -> Tag {
        self.core().tag()
    }

    /// `true` if [`build`](Self::build) can succeed.
    fn ready_to_build(&self) -> bool {
        match self.core().state() {
            ModelState::Dirty(DirtyReason::Model) => self.ready_to_serialize(),
            _ => self.core().data().is_some(),
        }
    }

    /// Replace this builder's bytes, discarding any model.
    fn set_data(&mut self, data: FontData) {
        self.core_mut().replace_data(BuilderData::Reading(data));
        self.reset_model();
    }

    /// Consume the builder, producing a table.
    fn build(self) -> Result<Self::Table, Error> {
        let tag = self.tag();
        let state = self.core().state();
        let data = match state {
            ModelState::Dirty(DirtyReason::Model) => {
                if !self.ready_to_serialize() {
                    return Err(Error::NotReady(tag));
                }
                log::debug!("'{tag}' serializing from model");
                serialize_model(&self)?
            }
            ModelState::Clean | ModelState::Dirty(DirtyReason::Data) => {
                let source = self.core().data().ok_or(Error::NoData(tag))?;
                log::debug!("'{tag}' copying {} bytes through", source.len());
                source.fresh_copy().into_read_only()
            }
        };

        let actual = u32::try_from(data.len()).map_err(|_| ReadError::OutOfBounds)?;
        let record = match state {
            ModelState::Clean => {
                let record = *self.core().record();
                match record.length() {
                    Some(declared) if declared != actual => {
                        return Err(ConsistencyFault::LengthMismatch {
                            tag,
                            declared,
                            actual,
                        }
                        .into())
                    }
                    Some(_) => record,
                    None => TableRecord::with_length(tag, actual),
                }
            }
            ModelState::Dirty(_) => TableRecord::with_length(tag, actual),
        };
        self.materialize(record, data)
    }
}

fn serialize_model<B: TableBuilder>(builder: &B) -> Result<FontData, Error> {
    let tag = builder.tag();
    match builder.size_to_serialize() {
        SerializedSize::Known(size) => {
            let out = WritableFontData::with_capacity(size);
            let written = builder.serialize(&out)?;
            if written != size || out.len() != size {
                return Err(ConsistencyFault::SizeMismatch {
                    tag,
                    expected: size,
                    written,
                }
                .into());
            }
            Ok(out.into_read_only())
        }
        SerializedSize::Pending => {
            let out = WritableFontData::growable();
            let written = builder.serialize(&out)?;
            if written > out.len() {
                return Err(ConsistencyFault::SizeMismatch {
                    tag,
                    expected: out.len(),
                    written,
                }
                .into());
            }
            out.truncate(written);
            Ok(out.into_read_only())
        }
    }
}
