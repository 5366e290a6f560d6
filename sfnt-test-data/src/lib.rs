//! Test data shared between the sfnt crates.
//!
//! Nothing here is checked in as a binary; every font is assembled from
//! its tables when a test asks for it.

use std::collections::HashMap;

use sfnt_types::Scalar;

pub mod eblc;
pub mod fonts;
pub mod sfnt;

/// Big-endian bytes built up one scalar at a time.
///
/// Positions can be marked while building and patched once the value that
/// belongs there is known, such as a checksum over the finished bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
    marks: HashMap<&'static str, usize>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// Append raw bytes as they are.
    pub fn append(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append zeros until the length is a multiple of four.
    pub fn align4(mut self) -> Self {
        self.data.resize((self.data.len() + 3) & !3, 0);
        self
    }

    /// Remember the current end of the buffer as `name`.
    pub fn mark(mut self, name: &'static str) -> Self {
        self.marks.insert(name, self.data.len());
        self
    }

    /// The position recorded by [`mark`](Self::mark), if any.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.marks.get(name).copied()
    }

    /// Overwrite the bytes at a marked position with `item`.
    ///
    /// Panics if `name` was never marked or the value runs past the end.
    pub fn patch(&mut self, name: &str, item: impl Scalar) {
        let at = self
            .position(name)
            .unwrap_or_else(|| panic!("no position marked as '{name}'"));
        let raw = item.to_raw();
        self.data[at..at + raw.as_ref().len()].copy_from_slice(raw.as_ref());
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
