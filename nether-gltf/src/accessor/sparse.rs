//! Sparse overlay applier
//!
//! Replaces base elements at the listed indices with the sparse values. Each
//! index may appear once, so application order does not matter.

use crate::buffer::{Buffers, checked_range};
use crate::error::{GltfError, Path, Result};
use crate::schema::{Document, IndexType, Sparse};

use super::layout::ElementLayout;

/// Read the raw `count` sparse indices without checking them
pub(crate) fn read_indices(
    document: &Document,
    buffers: &Buffers,
    sparse: &Sparse,
    path: &Path,
) -> Result<Vec<u32>> {
    let indices = &sparse.indices;
    let path = path.field("indices");
    let bytes = buffers.resolve_view(document, indices.buffer_view)?;
    let size = indices.component_type.size();
    let length = sparse
        .count
        .checked_mul(size)
        .ok_or_else(|| GltfError::OutOfBounds {
            path: path.clone(),
            offset: indices.byte_offset,
            end: usize::MAX,
            length: bytes.len(),
        })?;
    let raw = checked_range(bytes, indices.byte_offset, length, path)?;

    Ok(match indices.component_type {
        IndexType::U8 => raw.iter().map(|&b| b as u32).collect(),
        IndexType::U16 => raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
            .collect(),
        IndexType::U32 => raw
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    })
}

/// Every ordering/range violation among `indices`
pub(crate) fn index_violations(indices: &[u32], element_count: usize, path: &Path) -> Vec<GltfError> {
    let path = path.field("indices");
    let mut errors = Vec::new();
    for (position, &index) in indices.iter().enumerate() {
        if index as usize >= element_count {
            errors.push(GltfError::SparseIndexOutOfRange {
                path: path.clone(),
                position,
                index,
                count: element_count,
            });
        }
        if position > 0 && index <= indices[position - 1] {
            errors.push(GltfError::NonMonotonicSparseIndex {
                path: path.clone(),
                position,
                index,
                previous: indices[position - 1],
            });
        }
    }
    errors
}

/// Overlay `sparse` onto `packed` (tightly packed base elements)
pub(crate) fn apply(
    document: &Document,
    buffers: &Buffers,
    sparse: &Sparse,
    layout: &ElementLayout,
    element_count: usize,
    packed: &mut [u8],
    path: &Path,
) -> Result<()> {
    let indices = read_indices(document, buffers, sparse, path)?;
    if let Some(err) = index_violations(&indices, element_count, path).into_iter().next() {
        return Err(err);
    }

    let values_path = path.field("values");
    let bytes = buffers.resolve_view(document, sparse.values.buffer_view)?;
    let values = layout.gather(
        bytes,
        sparse.values.byte_offset,
        sparse.count,
        layout.stored_size(),
        &values_path,
    )?;

    let size = layout.packed_size();
    for (k, &index) in indices.iter().enumerate() {
        let index = index as usize;
        let dst = packed
            .get_mut(index * size..(index + 1) * size)
            .ok_or_else(|| GltfError::SparseIndexOutOfRange {
                path: path.field("indices"),
                position: k,
                index: index as u32,
                count: element_count,
            })?;
        let src = values
            .get(k * size..(k + 1) * size)
            .ok_or_else(|| GltfError::ShapeMismatch {
                path: values_path.clone(),
                expected: sparse.count,
                actual: k,
            })?;
        dst.copy_from_slice(src);
    }
    Ok(())
}
