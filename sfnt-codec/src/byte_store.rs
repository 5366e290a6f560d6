//! Contiguous byte storage underlying every font data view

use std::io::{Read, Write};

use crate::error::{Error, ReadError};

/// The size of the intermediate buffer used when copying between stores
/// and streams.
pub const COPY_BUFFER_SIZE: usize = 8192;

/// The largest size a growable store may reach.
///
/// Offsets in font files are 32 bits wide, so nothing beyond this is
/// addressable anyway.
pub const MAX_GROWABLE_LEN: usize = u32::MAX as usize;

/// Contiguous byte storage with a filled length distinct from its capacity.
///
/// `len()` is the number of bytes that have actually been written (or were
/// present when the store was created), and is never larger than
/// `capacity()`, the number of bytes allocated. A fixed store rejects any
/// write at or beyond its capacity; a growable store extends its capacity to
/// satisfy the write.
///
/// Stores are not shared directly; views such as [`FontData`] and
/// [`WritableFontData`] hold a reference-counted handle to one and address
/// it through an (offset, length) window.
///
/// [`FontData`]: crate::FontData
/// [`WritableFontData`]: crate::WritableFontData
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteStore {
    bytes: Vec<u8>,
    filled: usize,
    growable: bool,
}

impl ByteStore {
    /// Create a fixed store with `capacity` zeroed bytes and nothing filled.
    pub fn fixed(capacity: usize) -> Self {
        ByteStore {
            bytes: vec![0; capacity],
            filled: 0,
            growable: false,
        }
    }

    /// Create a growable store, preallocating `capacity` bytes.
    pub fn growable(capacity: usize) -> Self {
        ByteStore {
            bytes: vec![0; capacity],
            filled: 0,
            growable: true,
        }
    }

    /// Create a fixed store that is completely filled with these bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        ByteStore {
            filled: bytes.len(),
            bytes,
            growable: false,
        }
    }

    /// The number of bytes that have been written.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// The number of bytes currently allocated.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The largest length this store can reach: its capacity if fixed,
    /// otherwise [`MAX_GROWABLE_LEN`].
    pub fn limit(&self) -> usize {
        if self.growable {
            MAX_GROWABLE_LEN
        } else {
            self.bytes.len()
        }
    }

    pub fn is_growable(&self) -> bool {
        self.growable
    }

    /// Return the byte at `index`.
    ///
    /// Fails if `index` is not in `0..len()`.
    pub fn get(&self, index: usize) -> Result<u8, ReadError> {
        if index >= self.filled {
            return Err(ReadError::OutOfBounds);
        }
        Ok(self.bytes[index])
    }

    /// Copy bytes starting at `index` into `buf`, returning the number copied.
    ///
    /// A request running past the filled length is clamped; only an `index`
    /// outside of `0..=len()` is an error.
    pub fn get_into(&self, index: usize, buf: &mut [u8]) -> Result<usize, ReadError> {
        if index > self.filled {
            return Err(ReadError::OutOfBounds);
        }
        let count = buf.len().min(self.filled - index);
        buf[..count].copy_from_slice(&self.bytes[index..index + count]);
        Ok(count)
    }

    /// Write a single byte at `index`.
    pub fn put(&mut self, index: usize, byte: u8) -> Result<(), ReadError> {
        let end = index.checked_add(1).ok_or(ReadError::OutOfBounds)?;
        if !self.reserve_to(end) {
            return Err(ReadError::OutOfBounds);
        }
        self.bytes[index] = byte;
        self.filled = self.filled.max(end);
        Ok(())
    }

    /// Write `bytes` starting at `index`, returning the number written.
    ///
    /// On a fixed store the write is clamped to the capacity; it only fails
    /// if `index` itself is at or beyond the capacity.
    pub fn put_slice(&mut self, index: usize, bytes: &[u8]) -> Result<usize, ReadError> {
        if bytes.is_empty() {
            return if index <= self.limit() {
                Ok(0)
            } else {
                Err(ReadError::OutOfBounds)
            };
        }
        let first = index.checked_add(1).ok_or(ReadError::OutOfBounds)?;
        if !self.reserve_to(first) {
            return Err(ReadError::OutOfBounds);
        }
        let wanted = index.saturating_add(bytes.len()).min(self.limit());
        self.reserve_to(wanted);
        let count = wanted.min(self.bytes.len()) - index;
        self.bytes[index..index + count].copy_from_slice(&bytes[..count]);
        self.filled = self.filled.max(index + count);
        Ok(count)
    }

    /// Copy `len` bytes starting at `src_index` into `dst` at `dst_index`.
    ///
    /// The copy proceeds through a fixed-size intermediate buffer. Returns the
    /// number of bytes copied, which is smaller than `len` if either side
    /// runs out of room.
    pub fn copy_to(
        &self,
        src_index: usize,
        len: usize,
        dst: &mut ByteStore,
        dst_index: usize,
    ) -> Result<usize, ReadError> {
        let mut buf = [0u8; COPY_BUFFER_SIZE];
        let mut copied = 0;
        while copied < len {
            let chunk = (len - copied).min(COPY_BUFFER_SIZE);
            let read = self.get_into(src_index + copied, &mut buf[..chunk])?;
            if read == 0 {
                break;
            }
            let written = dst.put_slice(dst_index + copied, &buf[..read])?;
            copied += written;
            if written < read {
                break;
            }
        }
        Ok(copied)
    }

    /// Write `len` bytes starting at `index` to a stream.
    pub fn copy_to_writer<W: Write + ?Sized>(
        &self,
        index: usize,
        len: usize,
        writer: &mut W,
    ) -> Result<usize, Error> {
        let mut buf = [0u8; COPY_BUFFER_SIZE];
        let mut copied = 0;
        while copied < len {
            let chunk = (len - copied).min(COPY_BUFFER_SIZE);
            let read = self.get_into(index + copied, &mut buf[..chunk])?;
            if read == 0 {
                break;
            }
            writer.write_all(&buf[..read])?;
            copied += read;
        }
        Ok(copied)
    }

    /// Read exactly `len` bytes from a stream into this store at `index`.
    pub fn copy_from_reader<R: Read + ?Sized>(
        &mut self,
        index: usize,
        len: usize,
        reader: &mut R,
    ) -> Result<usize, Error> {
        let mut buf = [0u8; COPY_BUFFER_SIZE];
        let mut copied = 0;
        while copied < len {
            let chunk = (len - copied).min(COPY_BUFFER_SIZE);
            reader.read_exact(&mut buf[..chunk])?;
            let written = self.put_slice(index + copied, &buf[..chunk])?;
            copied += written;
            if written < chunk {
                return Err(ReadError::OutOfBounds.into());
            }
        }
        Ok(copied)
    }

    /// The filled portion of the store.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.filled]
    }

    /// Consume the store, returning the filled bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.bytes.truncate(self.filled);
        self.bytes
    }

    /// Forget everything past `len`; has no effect if `len >= self.len()`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.filled = self.filled.min(len);
    }

    // make sure `len` bytes are addressable, growing if allowed.
    fn reserve_to(&mut self, len: usize) -> bool {
        if len <= self.bytes.len() {
            return true;
        }
        if !self.growable || len > MAX_GROWABLE_LEN {
            return false;
        }
        let new_len = len
            .max(self.bytes.len().saturating_mul(2))
            .min(MAX_GROWABLE_LEN);
        self.bytes.resize(new_len, 0);
        true
    }
}

impl std::fmt::Debug for ByteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStore")
            .field("len", &self.filled)
            .field("capacity", &self.bytes.len())
            .field("growable", &self.growable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rejects_writes_past_capacity() {
        let mut store = ByteStore::fixed(4);
        assert!(store.put(3, 0xAB).is_ok());
        assert_eq!(store.len(), 4);
        assert_eq!(store.put(4, 0xCD), Err(ReadError::OutOfBounds));
        assert_eq!(store.capacity(), 4);
    }

    #[test]
    fn writes_at_the_end_of_the_address_space() {
        let mut store = ByteStore::fixed(4);
        assert_eq!(store.put(usize::MAX, 1), Err(ReadError::OutOfBounds));
        assert_eq!(store.put_slice(usize::MAX, &[1, 2]), Err(ReadError::OutOfBounds));
        let mut store = ByteStore::growable(4);
        assert_eq!(store.put(usize::MAX, 1), Err(ReadError::OutOfBounds));
        assert_eq!(store.put_slice(usize::MAX, &[1]), Err(ReadError::OutOfBounds));
        assert!(store.is_empty());
    }

    #[test]
    fn growable_extends_on_write() {
        let mut store = ByteStore::growable(2);
        store.put(10, 0xCD).unwrap();
        assert!(store.capacity() >= 11);
        assert_eq!(store.len(), 11);
        assert_eq!(store.get(10), Ok(0xCD));
        assert_eq!(store.get(5), Ok(0));
    }

    #[test]
    fn get_checks_filled_length() {
        let mut store = ByteStore::fixed(8);
        store.put_slice(0, &[1, 2, 3]).unwrap();
        assert_eq!(store.get(2), Ok(3));
        // allocated, but never written
        assert_eq!(store.get(3), Err(ReadError::OutOfBounds));
    }

    #[test]
    fn bulk_get_clamps() {
        let store = ByteStore::from_vec(vec![1, 2, 3, 4, 5]);
        let mut buf = [0u8; 8];
        assert_eq!(store.get_into(3, &mut buf), Ok(2));
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(store.get_into(5, &mut buf), Ok(0));
        assert_eq!(store.get_into(6, &mut buf), Err(ReadError::OutOfBounds));
    }

    #[test]
    fn bulk_put_clamps_to_capacity() {
        let mut store = ByteStore::fixed(4);
        assert_eq!(store.put_slice(2, &[9, 9, 9, 9]), Ok(2));
        assert_eq!(store.len(), 4);
        assert_eq!(store.put_slice(4, &[1]), Err(ReadError::OutOfBounds));
    }

    #[test]
    fn copy_larger_than_buffer() {
        let src: Vec<u8> = (0..COPY_BUFFER_SIZE * 2 + 17).map(|i| i as u8).collect();
        let src = ByteStore::from_vec(src);
        let mut dst = ByteStore::growable(0);
        let copied = src.copy_to(0, src.len(), &mut dst, 3).unwrap();
        assert_eq!(copied, src.len());
        assert_eq!(&dst.as_slice()[3..], src.as_slice());
    }

    #[test]
    fn stream_roundtrip() {
        let src = ByteStore::from_vec((0..100u8).collect());
        let mut out = Vec::new();
        assert_eq!(src.copy_to_writer(10, 50, &mut out).unwrap(), 50);
        let mut dst = ByteStore::fixed(50);
        dst.copy_from_reader(0, 50, &mut out.as_slice()).unwrap();
        assert_eq!(dst.as_slice(), &src.as_slice()[10..60]);
    }

    #[test]
    fn short_stream_is_an_error() {
        let mut dst = ByteStore::fixed(10);
        let result = dst.copy_from_reader(0, 10, &mut [1u8, 2, 3].as_slice());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
