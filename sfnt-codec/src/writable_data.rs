//! Bounded, writable views of font bytes

use std::{
    io::Write,
    ops::Range,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use types::Scalar;

use crate::{
    byte_store::ByteStore,
    checksum,
    error::{Error, ReadError},
    font_data::{Bounds, FontData},
};

/// A writable view of font bytes.
///
/// Like [`FontData`], this is a window into a shared [`ByteStore`].
/// Slices alias: a write through one view is visible through every
/// overlapping view of the same store, which is what allows a table builder
/// to edit a field in place inside a larger buffer.
///
/// Writable views are meant to be used from one thread at a time; the store
/// sits behind a lock only so that views can move between threads.
#[derive(Clone)]
pub struct WritableFontData {
    store: Arc<RwLock<ByteStore>>,
    bounds: Bounds,
}

impl WritableFontData {
    /// A fixed-size view with room for `capacity` bytes, none of them filled.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_store(ByteStore::fixed(capacity))
    }

    /// A growable view, which extends its store on demand.
    pub fn growable() -> Self {
        Self::from_store(ByteStore::growable(0))
    }

    /// A fixed-size view that is completely filled with these bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::from_store(ByteStore::from_vec(bytes))
    }

    pub fn from_store(store: ByteStore) -> Self {
        WritableFontData {
            store: Arc::new(RwLock::new(store)),
            bounds: Bounds::default(),
        }
    }

    /// A new writable view holding a copy of the bytes in `src`.
    pub fn copy_of(src: &FontData) -> Self {
        let data = Self::with_capacity(src.len());
        // the destination was sized to fit, so this cannot be clamped
        let _ = src.copy_to(&data);
        data
    }

    fn store(&self) -> RwLockReadGuard<'_, ByteStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn store_mut(&self) -> RwLockWriteGuard<'_, ByteStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn with_store_mut<R>(
        &self,
        f: impl FnOnce(&mut ByteStore, usize) -> Result<R, ReadError>,
    ) -> Result<R, ReadError> {
        f(&mut self.store_mut(), self.bounds.offset)
    }

    /// The number of filled bytes in the view.
    pub fn len(&self) -> usize {
        self.bounds.len(self.store().len())
    }

    /// `true` if no bytes in the view have been filled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of bytes that may be written to this view.
    pub fn size(&self) -> usize {
        self.bounds.size(self.store().limit())
    }

    /// The offset of this view from the start of its store.
    pub fn store_offset(&self) -> usize {
        self.bounds.offset
    }

    /// Narrow this view to start at `offset` (relative to the current window).
    ///
    /// If `length` is `None` the view keeps its current end. On failure the
    /// view is unchanged.
    pub fn rebound(
        &mut self,
        offset: usize,
        length: impl Into<Option<usize>>,
    ) -> Result<(), ReadError> {
        let limit = self.store().limit();
        self.bounds.rebound(offset, length.into(), limit)
    }

    /// A new view of `length` bytes starting at `offset`, sharing this store.
    pub fn slice(&self, offset: usize, length: usize) -> Option<WritableFontData> {
        let mut data = self.clone();
        data.rebound(offset, length).ok()?;
        Some(data)
    }

    /// A new view from `offset` to the end of this view, sharing this store.
    pub fn split_off(&self, offset: usize) -> Option<WritableFontData> {
        let mut data = self.clone();
        data.rebound(offset, None).ok()?;
        Some(data)
    }

    /// Returns `true` if both views address the same store.
    pub fn shares_store(&self, other: &WritableFontData) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Read the byte at `offset`.
    pub fn read_u8(&self, offset: usize) -> Result<u8, ReadError> {
        let store = self.store();
        if offset >= self.bounds.len(store.len()) {
            return Err(ReadError::OutOfBounds);
        }
        store.get(self.bounds.offset + offset)
    }

    /// Read a big-endian scalar at `offset`.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        let store = self.store();
        let len = self.bounds.len(store.len());
        let mut raw = T::Raw::default();
        for (i, byte) in raw.as_mut().iter_mut().enumerate() {
            if offset + i >= len {
                return Err(ReadError::OutOfBounds);
            }
            *byte = store.get(self.bounds.offset + offset + i)?;
        }
        Ok(T::from_raw(raw))
    }

    /// Write a single byte at `offset`.
    pub fn write_u8(&self, offset: usize, byte: u8) -> Result<(), ReadError> {
        let mut store = self.store_mut();
        if offset >= self.bounds.size(store.limit()) {
            return Err(ReadError::OutOfBounds);
        }
        store.put(self.bounds.offset + offset, byte)
    }

    /// Write a big-endian scalar at `offset`, returning the number of bytes
    /// written.
    ///
    /// Either the whole value is written or nothing is.
    pub fn write_at<T: Scalar>(&self, offset: usize, value: T) -> Result<usize, ReadError> {
        let mut store = self.store_mut();
        let end = offset
            .checked_add(T::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        if end > self.bounds.size(store.limit()) {
            return Err(ReadError::OutOfBounds);
        }
        if !store.is_growable() && self.bounds.offset.saturating_add(end) > store.capacity() {
            return Err(ReadError::OutOfBounds);
        }
        let raw = value.to_raw();
        for (i, byte) in raw.as_ref().iter().enumerate() {
            store.put(self.bounds.offset + offset + i, *byte)?;
        }
        Ok(T::RAW_BYTE_LEN)
    }

    /// Write `bytes` starting at `offset`, returning the number written.
    ///
    /// A write that runs past the end of the view is clamped.
    pub fn write_bytes(&self, offset: usize, bytes: &[u8]) -> Result<usize, ReadError> {
        let mut store = self.store_mut();
        let size = self.bounds.size(store.limit());
        if offset > size || (offset == size && !bytes.is_empty()) {
            return Err(ReadError::OutOfBounds);
        }
        let count = bytes.len().min(size - offset);
        store.put_slice(self.bounds.offset + offset, &bytes[..count])
    }

    /// Write `count` zero bytes starting at `offset`.
    pub fn write_padding(&self, offset: usize, count: usize) -> Result<usize, ReadError> {
        const ZEROS: [u8; 4] = [0; 4];
        let mut written = 0;
        while written < count {
            let chunk = (count - written).min(ZEROS.len());
            written += self.write_bytes(offset + written, &ZEROS[..chunk])?;
        }
        Ok(written)
    }

    /// Copy all of the bytes of `src` into this view at `offset`.
    pub fn write_data(&self, offset: usize, src: &FontData) -> Result<usize, ReadError> {
        let dst = self.split_off(offset).ok_or(ReadError::OutOfBounds)?;
        let copied = src.copy_to(&dst)?;
        if copied < src.len() {
            return Err(ReadError::OutOfBounds);
        }
        Ok(copied)
    }

    /// The checksum of the bytes in this view.
    pub fn checksum(&self) -> u32 {
        self.checksum_excluding(&[])
    }

    /// The checksum of the bytes in this view, reading bytes in the `exempt`
    /// ranges (relative to the view) as zero.
    pub fn checksum_excluding(&self, exempt: &[Range<usize>]) -> u32 {
        let store = self.store();
        let len = self.bounds.len(store.len());
        let start = self.bounds.offset.min(store.len());
        checksum::compute_checksum_excluding(&store.as_slice()[start..start + len], exempt)
    }

    /// Write the bytes of this view to a stream.
    pub fn copy_to_writer<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, Error> {
        let store = self.store();
        let len = self.bounds.len(store.len());
        store.copy_to_writer(self.bounds.offset, len, writer)
    }

    /// A read-only snapshot of the current contents of this view.
    pub fn to_font_data(&self) -> FontData {
        let store = self.store();
        let len = self.bounds.len(store.len());
        let start = self.bounds.offset.min(store.len());
        FontData::new(store.as_slice()[start..start + len].to_vec())
    }

    /// Convert this view into a read-only view, without copying if this is
    /// the last handle to its store.
    ///
    /// The read-only view is capped at the current filled length.
    pub fn into_read_only(self) -> FontData {
        let len = self.len();
        let WritableFontData { store, bounds } = self;
        let store = match Arc::try_unwrap(store) {
            Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared.read().unwrap_or_else(PoisonError::into_inner).clone(),
        };
        let bounds = Bounds {
            offset: bounds.offset,
            length: Some(len),
        };
        FontData::from_parts(Arc::new(store), bounds)
    }

    /// Forget any bytes filled past `len` in the underlying store.
    pub(crate) fn truncate(&self, len: usize) {
        let offset = self.bounds.offset;
        self.store_mut().truncate(offset + len);
    }
}

impl std::fmt::Debug for WritableFontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritableFontData")
            .field("offset", &self.bounds.offset)
            .field("len", &self.len())
            .field("size", &self.size())
            .finish()
    }
}
