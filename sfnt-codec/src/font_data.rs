//! Bounded, read-only views of font bytes

use std::{io::Write, ops::Range, sync::Arc};

use types::Scalar;

use crate::{
    byte_store::ByteStore,
    checksum,
    error::{Error, ReadError},
    WritableFontData,
};

/// The window a view addresses within its store.
///
/// `offset` is relative to the start of the store and accumulates as views
/// are re-bounded. `length` is an absolute cap on the window; `None` is the
/// "growable" sentinel, meaning the window is limited only by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub(crate) offset: usize,
    pub(crate) length: Option<usize>,
}

impl Bounds {
    /// The addressable size of the window, given the store's limit.
    pub(crate) fn size(&self, limit: usize) -> usize {
        let available = limit.saturating_sub(self.offset);
        self.length.map_or(available, |len| len.min(available))
    }

    /// The readable length of the window, given the store's filled length.
    pub(crate) fn len(&self, filled: usize) -> usize {
        let available = filled.saturating_sub(self.offset);
        self.length.map_or(available, |len| len.min(available))
    }

    /// Narrow the window: `offset` is relative to the current window.
    ///
    /// With no `length` the window keeps its current end. Fails, leaving the
    /// bounds untouched, if the new window would not fit inside the current
    /// one.
    pub(crate) fn rebound(
        &mut self,
        offset: usize,
        length: Option<usize>,
        limit: usize,
    ) -> Result<(), ReadError> {
        let size = self.size(limit);
        if offset > size {
            return Err(ReadError::OutOfBounds);
        }
        let length = match length {
            Some(length) if offset.checked_add(length).is_none_or(|end| end > size) => {
                return Err(ReadError::OutOfBounds)
            }
            Some(length) => Some(length),
            None => self.length.map(|len| len - offset),
        };
        self.offset += offset;
        self.length = length;
        Ok(())
    }
}

/// A read-only view of font bytes.
///
/// The view is a window (offset, length) into a shared [`ByteStore`].
/// Cloning, slicing and re-bounding never copy bytes: every view over a store
/// holds an atomically reference-counted handle to it, so views may be sent
/// to and read from multiple threads at once.
///
/// All reads are relative to the start of the window, and all multi-byte
/// values are big-endian.
#[derive(Clone, Default)]
pub struct FontData {
    store: Arc<ByteStore>,
    bounds: Bounds,
}

impl FontData {
    /// Create a new view covering these bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self::from_store(ByteStore::from_vec(bytes))
    }

    /// Create a new view covering the filled portion of a store.
    pub fn from_store(store: ByteStore) -> Self {
        FontData {
            store: Arc::new(store),
            bounds: Bounds::default(),
        }
    }

    pub(crate) fn from_parts(store: Arc<ByteStore>, bounds: Bounds) -> Self {
        FontData { store, bounds }
    }

    /// The number of readable bytes in the view.
    pub fn len(&self) -> usize {
        self.bounds.len(self.store.len())
    }

    /// `true` if the view has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The addressable size of the view.
    ///
    /// This can exceed [`len`](Self::len) when the store has been allocated
    /// but not completely filled.
    pub fn size(&self) -> usize {
        self.bounds.size(self.store.limit())
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
        self.bounds
            .rebound(offset, length.into(), self.store.limit())
    }

    /// A new view of `length` bytes starting at `offset`, sharing this store.
    pub fn slice(&self, offset: usize, length: usize) -> Option<FontData> {
        let mut data = self.clone();
        data.rebound(offset, length).ok()?;
        Some(data)
    }

    /// A new view from `offset` to the end of this view, sharing this store.
    pub fn split_off(&self, offset: usize) -> Option<FontData> {
        let mut data = self.clone();
        data.rebound(offset, None).ok()?;
        Some(data)
    }

    /// Returns `true` if both views address the same store.
    pub fn shares_store(&self, other: &FontData) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Read the byte at `offset`.
    pub fn read_u8(&self, offset: usize) -> Result<u8, ReadError> {
        if offset >= self.len() {
            return Err(ReadError::OutOfBounds);
        }
        self.store.get(self.bounds.offset + offset)
    }

    /// Read a big-endian scalar at `offset`.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        let mut raw = T::Raw::default();
        for (i, byte) in raw.as_mut().iter_mut().enumerate() {
            *byte = self.read_u8(offset + i)?;
        }
        Ok(T::from_raw(raw))
    }

    /// Read `count` consecutive scalars starting at `offset`.
    pub fn read_array<T: Scalar>(&self, offset: usize, count: usize) -> Result<Vec<T>, ReadError> {
        let end = count
            .checked_mul(T::RAW_BYTE_LEN)
            .and_then(|len| len.checked_add(offset))
            .ok_or(ReadError::OutOfBounds)?;
        if end > self.len() {
            return Err(ReadError::OutOfBounds);
        }
        (0..count)
            .map(|i| self.read_at(offset + i * T::RAW_BYTE_LEN))
            .collect()
    }

    /// Copy bytes starting at `offset` into `buf`, returning the number copied.
    ///
    /// A request that runs past the end of the view is clamped.
    pub fn read_bytes(&self, offset: usize, buf: &mut [u8]) -> Result<usize, ReadError> {
        let len = self.len();
        if offset > len {
            return Err(ReadError::OutOfBounds);
        }
        let count = buf.len().min(len - offset);
        self.store
            .get_into(self.bounds.offset + offset, &mut buf[..count])
    }

    /// Binary search a sorted array of records for an exact `u16` key.
    ///
    /// The array has `count` records of `stride` bytes starting at `start`,
    /// and each key is the first field of its record. Returns the index of
    /// the matching record.
    pub fn search_u16(&self, start: usize, stride: usize, count: usize, key: u16) -> Option<usize> {
        self.search_exact(count, key, |i| self.read_at::<u16>(start + i * stride))
    }

    /// Binary search a sorted array of records for an exact `u32` key.
    pub fn search_u32(&self, start: usize, stride: usize, count: usize, key: u32) -> Option<usize> {
        self.search_exact(count, key, |i| self.read_at::<u32>(start + i * stride))
    }

    /// Binary search parallel arrays of range starts and range ends.
    ///
    /// Returns the index `i` such that `start[i] <= key <= end[i]`. This is
    /// the layout of segment maps, where the start and end keys live in
    /// separate arrays with their own strides.
    pub fn search_u16_range(
        &self,
        starts: (usize, usize),
        ends: (usize, usize),
        count: usize,
        key: u16,
    ) -> Option<usize> {
        let (start_offset, start_stride) = starts;
        let (end_offset, end_stride) = ends;
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let range_start: u16 = self.read_at(start_offset + mid * start_stride).ok()?;
            if key < range_start {
                hi = mid;
                continue;
            }
            let range_end: u16 = self.read_at(end_offset + mid * end_stride).ok()?;
            if key <= range_end {
                return Some(mid);
            }
            lo = mid + 1;
        }
        None
    }

    fn search_exact<T: Ord>(
        &self,
        count: usize,
        key: T,
        read: impl Fn(usize) -> Result<T, ReadError>,
    ) -> Option<usize> {
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match read(mid).ok()?.cmp(&key) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(mid),
            }
        }
        None
    }

    /// The checksum of the bytes in this view.
    pub fn checksum(&self) -> u32 {
        checksum::compute_checksum(self.as_bytes())
    }

    /// The checksum of the bytes in this view, reading bytes in the `exempt`
    /// ranges (relative to the view) as zero.
    pub fn checksum_excluding(&self, exempt: &[Range<usize>]) -> u32 {
        checksum::compute_checksum_excluding(self.as_bytes(), exempt)
    }

    /// Copy the bytes of this view into `dst`, starting at `dst`'s offset 0.
    ///
    /// The copy is clamped to the size of `dst`; returns the number of bytes
    /// copied.
    pub fn copy_to(&self, dst: &WritableFontData) -> Result<usize, ReadError> {
        let len = self.len().min(dst.size());
        dst.with_store_mut(|store, dst_offset| {
            self.store
                .copy_to(self.bounds.offset, len, store, dst_offset)
        })
    }

    /// Write the bytes of this view to a stream.
    pub fn copy_to_writer<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, Error> {
        self.store
            .copy_to_writer(self.bounds.offset, self.len(), writer)
    }

    /// The bytes of this view.
    pub fn as_bytes(&self) -> &[u8] {
        let start = self.bounds.offset.min(self.store.len());
        &self.store.as_slice()[start..start + self.len()]
    }

    /// Copy the bytes of this view into a new vec.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl AsRef<[u8]> for FontData {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for FontData {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FontData {}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("offset", &self.bounds.offset)
            .field("len", &self.len())
            .finish()
    }
}
