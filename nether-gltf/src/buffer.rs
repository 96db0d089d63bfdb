//! Buffer resolver
//!
//! The single enforcement point for memory safety: every byte the decoder
//! reads comes from a slice handed out here, so a malformed (or unvalidated)
//! document can produce errors but never an out-of-range read.

use crate::error::{GltfError, Path, Result};
use crate::schema::Document;

/// Resident byte data, one entry per document buffer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buffers {
    data: Vec<Vec<u8>>,
}

impl Buffers {
    pub fn new(data: Vec<Vec<u8>>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Full contents of buffer `index`
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.data.get(index).map(Vec::as_slice)
    }

    /// Borrow `byte_length` bytes of buffer `buffer` starting at `byte_offset`
    ///
    /// # Errors
    ///
    /// - `UnknownIndex` if no bytes were supplied for `buffer`
    /// - `OutOfBounds` if the range exceeds the buffer
    pub fn resolve(&self, buffer: usize, byte_offset: usize, byte_length: usize) -> Result<&[u8]> {
        let path = Path::item("buffers", buffer);
        let bytes = self.get(buffer).ok_or_else(|| GltfError::UnknownIndex {
            path: path.clone(),
            kind: "buffer",
            index: buffer,
        })?;
        checked_range(bytes, byte_offset, byte_length, path)
    }

    /// Borrow the bytes covered by buffer view `view`
    pub fn resolve_view<'a>(&'a self, document: &Document, view: usize) -> Result<&'a [u8]> {
        let buffer_view =
            document
                .buffer_views
                .get(view)
                .ok_or_else(|| GltfError::UnknownIndex {
                    path: Path::new().field("bufferViews"),
                    kind: "bufferView",
                    index: view,
                })?;
        self.resolve(
            buffer_view.buffer,
            buffer_view.byte_offset,
            buffer_view.byte_length,
        )
    }
}

impl From<Vec<Vec<u8>>> for Buffers {
    fn from(data: Vec<Vec<u8>>) -> Self {
        Self::new(data)
    }
}

/// `bytes[offset..offset + length]` or `OutOfBounds` at `path`
pub(crate) fn checked_range(bytes: &[u8], offset: usize, length: usize, path: Path) -> Result<&[u8]> {
    let out_of_bounds = |end: usize| GltfError::OutOfBounds {
        path: path.clone(),
        offset,
        end,
        length: bytes.len(),
    };
    let end = offset
        .checked_add(length)
        .ok_or_else(|| out_of_bounds(usize::MAX))?;
    bytes.get(offset..end).ok_or_else(|| out_of_bounds(end))
}
