//! Accessor decoder
//!
//! Turns one accessor (plus its buffer view, or a zero base) into `count`
//! typed tuples, applying normalization and the sparse overlay. Decoding is a
//! pure function of the document and buffers: the result is a fresh value and
//! nothing shared is mutated.

mod layout;
mod sparse;

use crate::buffer::Buffers;
use crate::error::{GltfError, Path, Result};
use crate::schema::{Accessor, ComponentType, Document, ElementType};

pub use layout::{ElementLayout, MAX_DECODED_BYTES, normalize_i8, normalize_i16, normalize_u8, normalize_u16};
pub(crate) use sparse::{index_violations, read_indices};

/// Flat component storage of a decoded accessor
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    /// FLOAT components and normalized integers
    Float(Vec<f32>),
    /// BYTE/SHORT components
    Signed(Vec<i32>),
    /// UNSIGNED_BYTE/UNSIGNED_SHORT/UNSIGNED_INT components
    Unsigned(Vec<u32>),
}

impl Values {
    /// Number of components (not elements)
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Signed(v) => v.len(),
            Self::Unsigned(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All components widened to `f32`
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            Self::Float(v) => v.clone(),
            Self::Signed(v) => v.iter().map(|&x| x as f32).collect(),
            Self::Unsigned(v) => v.iter().map(|&x| x as f32).collect(),
        }
    }
}

/// One decoded element
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tuple<'a> {
    Float(&'a [f32]),
    Signed(&'a [i32]),
    Unsigned(&'a [u32]),
}

/// Output of [`decode`]
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAccessor {
    pub element_type: ElementType,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Number of elements
    pub count: usize,
    pub values: Values,
}

impl DecodedAccessor {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Components per element
    pub fn components(&self) -> usize {
        self.element_type.components()
    }

    /// Element `index`, column-major for matrices
    pub fn tuple(&self, index: usize) -> Option<Tuple<'_>> {
        let n = self.components();
        let range = index * n..(index + 1) * n;
        match &self.values {
            Values::Float(v) => v.get(range).map(Tuple::Float),
            Values::Signed(v) => v.get(range).map(Tuple::Signed),
            Values::Unsigned(v) => v.get(range).map(Tuple::Unsigned),
        }
    }

    /// Element `index` when the components are floats
    pub fn f32_tuple(&self, index: usize) -> Option<&[f32]> {
        match self.tuple(index)? {
            Tuple::Float(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.values {
            Values::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<&[u32]> {
        match &self.values {
            Values::Unsigned(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<&[i32]> {
        match &self.values {
            Values::Signed(v) => Some(v),
            _ => None,
        }
    }

    /// Flat components widened to `f32`
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.values.to_f32_vec()
    }
}

/// Decode accessor `index` of `document`
///
/// # Errors
///
/// Fails closed on any structural problem (dangling view, out-of-range bytes,
/// bad sparse indices, illegal normalization) rather than returning partial
/// or substituted data.
pub fn decode(document: &Document, buffers: &Buffers, index: usize) -> Result<DecodedAccessor> {
    let accessor = document
        .accessors
        .get(index)
        .ok_or_else(|| GltfError::UnknownIndex {
            path: Path::new().field("accessors"),
            kind: "accessor",
            index,
        })?;
    decode_accessor(document, buffers, accessor, &Path::item("accessors", index))
}

/// Decode an accessor that may not live in `document.accessors`
///
/// `path` is only used to label errors.
pub fn decode_accessor(
    document: &Document,
    buffers: &Buffers,
    accessor: &Accessor,
    path: &Path,
) -> Result<DecodedAccessor> {
    if accessor.normalized && !accessor.component_type.is_normalizable() {
        return Err(GltfError::InvalidNormalization {
            path: path.field("normalized"),
            component_type: accessor.component_type,
        });
    }

    let layout = ElementLayout::of(accessor);
    let count = accessor.count;

    let mut packed = match accessor.buffer_view {
        None => vec![0u8; layout.packed_length(count, path)?],
        Some(view_index) => {
            let view = document.buffer_views.get(view_index).ok_or_else(|| {
                GltfError::UnknownIndex {
                    path: path.field("bufferView"),
                    kind: "bufferView",
                    index: view_index,
                }
            })?;
            let bytes = buffers.resolve(view.buffer, view.byte_offset, view.byte_length)?;
            let stride = view.byte_stride.unwrap_or_else(|| layout.stored_size());
            layout.gather(bytes, accessor.byte_offset, count, stride, path)?
        }
    };

    if let Some(sparse) = &accessor.sparse {
        sparse::apply(
            document,
            buffers,
            sparse,
            &layout,
            count,
            &mut packed,
            &path.field("sparse"),
        )?;
    }

    tracing::trace!(
        "Decoded {}: {} x {} {:?}",
        path,
        count,
        layout.element_type.name(),
        layout.component_type
    );

    Ok(DecodedAccessor {
        element_type: layout.element_type,
        component_type: accessor.component_type,
        normalized: accessor.normalized,
        count,
        values: layout::convert(&packed, accessor.component_type, accessor.normalized),
    })
}
