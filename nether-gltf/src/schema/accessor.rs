//! Accessor descriptors: component types, element types and sparse storage

use serde::{Deserialize, Serialize};

use super::Opaque;

/// Numeric type of one accessor component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ComponentType {
    /// BYTE (5120)
    I8,
    /// UNSIGNED_BYTE (5121)
    U8,
    /// SHORT (5122)
    I16,
    /// UNSIGNED_SHORT (5123)
    U16,
    /// UNSIGNED_INT (5125)
    U32,
    /// FLOAT (5126)
    F32,
}

impl ComponentType {
    /// Size of one component in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    /// Whether `normalized: true` is permitted for this type
    pub const fn is_normalizable(self) -> bool {
        !matches!(self, Self::U32 | Self::F32)
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16)
    }

    pub const fn code(self) -> u32 {
        match self {
            Self::I8 => 5120,
            Self::U8 => 5121,
            Self::I16 => 5122,
            Self::U16 => 5123,
            Self::U32 => 5125,
            Self::F32 => 5126,
        }
    }
}

impl TryFrom<u32> for ComponentType {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            5120 => Ok(Self::I8),
            5121 => Ok(Self::U8),
            5122 => Ok(Self::I16),
            5123 => Ok(Self::U16),
            5125 => Ok(Self::U32),
            5126 => Ok(Self::F32),
            other => Err(format!("unknown componentType {}", other)),
        }
    }
}

impl From<ComponentType> for u32 {
    fn from(value: ComponentType) -> Self {
        value.code()
    }
}

/// Component type of sparse indices (unsigned only)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum IndexType {
    U8,
    U16,
    U32,
}

impl IndexType {
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    pub const fn component_type(self) -> ComponentType {
        match self {
            Self::U8 => ComponentType::U8,
            Self::U16 => ComponentType::U16,
            Self::U32 => ComponentType::U32,
        }
    }
}

impl TryFrom<u32> for IndexType {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match ComponentType::try_from(code)? {
            ComponentType::U8 => Ok(Self::U8),
            ComponentType::U16 => Ok(Self::U16),
            ComponentType::U32 => Ok(Self::U32),
            other => Err(format!("{:?} is not a valid sparse index type", other)),
        }
    }
}

impl From<IndexType> for u32 {
    fn from(value: IndexType) -> Self {
        value.component_type().code()
    }
}

/// Shape of one accessor element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// Number of components per element
    pub const fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// (columns, rows); vectors are a single column
    pub const fn columns_rows(self) -> (usize, usize) {
        match self {
            Self::Scalar => (1, 1),
            Self::Vec2 => (1, 2),
            Self::Vec3 => (1, 3),
            Self::Vec4 => (1, 4),
            Self::Mat2 => (2, 2),
            Self::Mat3 => (3, 3),
            Self::Mat4 => (4, 4),
        }
    }

    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }
}

/// Accessor `type` together with its `min`/`max`, whose arity the type fixes
///
/// `min`/`max` are informational only and never consulted during decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccessorKind {
    #[serde(rename = "SCALAR")]
    Scalar {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 1]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 1]>,
    },
    #[serde(rename = "VEC2")]
    Vec2 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 2]>,
    },
    #[serde(rename = "VEC3")]
    Vec3 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 3]>,
    },
    #[serde(rename = "VEC4")]
    Vec4 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 4]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 4]>,
    },
    #[serde(rename = "MAT2")]
    Mat2 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 4]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 4]>,
    },
    #[serde(rename = "MAT3")]
    Mat3 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 9]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 9]>,
    },
    #[serde(rename = "MAT4")]
    Mat4 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<[f64; 16]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<[f64; 16]>,
    },
}

impl AccessorKind {
    /// Kind of the given element type without bounds
    pub const fn unbounded(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Scalar => Self::Scalar { min: None, max: None },
            ElementType::Vec2 => Self::Vec2 { min: None, max: None },
            ElementType::Vec3 => Self::Vec3 { min: None, max: None },
            ElementType::Vec4 => Self::Vec4 { min: None, max: None },
            ElementType::Mat2 => Self::Mat2 { min: None, max: None },
            ElementType::Mat3 => Self::Mat3 { min: None, max: None },
            ElementType::Mat4 => Self::Mat4 { min: None, max: None },
        }
    }

    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Scalar { .. } => ElementType::Scalar,
            Self::Vec2 { .. } => ElementType::Vec2,
            Self::Vec3 { .. } => ElementType::Vec3,
            Self::Vec4 { .. } => ElementType::Vec4,
            Self::Mat2 { .. } => ElementType::Mat2,
            Self::Mat3 { .. } => ElementType::Mat3,
            Self::Mat4 { .. } => ElementType::Mat4,
        }
    }

    /// `(min, max)` as slices of exactly `components()` values
    pub fn bounds(&self) -> (Option<&[f64]>, Option<&[f64]>) {
        fn pair<'a, const N: usize>(
            min: &'a Option<[f64; N]>,
            max: &'a Option<[f64; N]>,
        ) -> (Option<&'a [f64]>, Option<&'a [f64]>) {
            (
                min.as_ref().map(|m| m.as_slice()),
                max.as_ref().map(|m| m.as_slice()),
            )
        }

        match self {
            Self::Scalar { min, max } => pair(min, max),
            Self::Vec2 { min, max } => pair(min, max),
            Self::Vec3 { min, max } => pair(min, max),
            Self::Vec4 { min, max } | Self::Mat2 { min, max } => pair(min, max),
            Self::Mat3 { min, max } => pair(min, max),
            Self::Mat4 { min, max } => pair(min, max),
        }
    }
}

/// Typed view over a buffer view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    /// Offset relative to the buffer view; 0 when `buffer_view` is absent
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: ComponentType,
    #[serde(default)]
    pub normalized: bool,
    pub count: usize,
    #[serde(flatten)]
    pub kind: AccessorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse: Option<Sparse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Accessor {
    /// Zero-filled accessor (no buffer view) of `count` elements
    pub fn new(component_type: ComponentType, element_type: ElementType, count: usize) -> Self {
        Self {
            buffer_view: None,
            byte_offset: 0,
            component_type,
            normalized: false,
            count,
            kind: AccessorKind::unbounded(element_type),
            sparse: None,
            name: None,
            extensions: None,
            extras: None,
        }
    }

    /// Back the accessor with `buffer_view` starting at `byte_offset`
    pub fn with_view(mut self, buffer_view: usize, byte_offset: usize) -> Self {
        self.buffer_view = Some(buffer_view);
        self.byte_offset = byte_offset;
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn with_sparse(mut self, sparse: Sparse) -> Self {
        self.sparse = Some(sparse);
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }
}

/// Sparse overlay: `count` (index, value) pairs replacing base elements
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Sparse {
    pub fn new(count: usize, indices: SparseIndices, values: SparseValues) -> Self {
        Self {
            count,
            indices,
            values,
            extensions: None,
            extras: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseIndices {
    pub buffer_view: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: IndexType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl SparseIndices {
    pub fn new(buffer_view: usize, component_type: IndexType) -> Self {
        Self {
            buffer_view,
            byte_offset: 0,
            component_type,
            extensions: None,
            extras: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseValues {
    pub buffer_view: usize,
    #[serde(default)]
    pub byte_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl SparseValues {
    pub fn new(buffer_view: usize) -> Self {
        Self {
            buffer_view,
            byte_offset: 0,
            extensions: None,
            extras: None,
        }
    }
}
