//! Error types for decoding and validation
//!
//! Every error carries a [`Path`] naming the offending document location,
//! e.g. `accessors[3].sparse.indices.bufferView`.

use std::fmt;

use crate::schema::{ComponentType, TargetPath};

/// Result alias used throughout the core
pub type Result<T, E = GltfError> = std::result::Result<T, E>;

/// Index path into the document tree
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(String);

impl Path {
    /// Empty path (the document root)
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Path to `name` under this path
    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Path to element `index` of the array at this path
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Shorthand for `Path::new().field(name).index(index)`
    pub fn item(name: &str, index: usize) -> Self {
        Self::new().field(name).index(index)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// A single structural or decode failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GltfError {
    /// Dangling reference to a document array
    #[error("{path}: unknown {kind} index {index}")]
    UnknownIndex {
        path: Path,
        kind: &'static str,
        index: usize,
    },

    /// Byte range exceeds the enclosing buffer or buffer view
    #[error("{path}: byte range {offset}..{end} exceeds available length {length}")]
    OutOfBounds {
        path: Path,
        offset: usize,
        end: usize,
        length: usize,
    },

    /// Buffer bytes do not match the declared `byteLength`
    #[error("{path}: declared byteLength {declared} but {actual} bytes were provided")]
    BufferLengthMismatch {
        path: Path,
        declared: usize,
        actual: usize,
    },

    /// Offset not a multiple of the component size
    #[error("{path}: byte offset {offset} is not a multiple of {alignment}")]
    MisalignedOffset {
        path: Path,
        offset: usize,
        alignment: usize,
    },

    /// Missing, out-of-range or too-small `byteStride`
    #[error("{path}: invalid byteStride {stride:?} (element size {element_size})")]
    InvalidStride {
        path: Path,
        stride: Option<usize>,
        element_size: usize,
    },

    /// `normalized` set on FLOAT or UINT components
    #[error("{path}: normalized is not allowed for {component_type:?} components")]
    InvalidNormalization {
        path: Path,
        component_type: ComponentType,
    },

    /// Sparse indices not strictly increasing
    #[error("{path}: sparse index {index} at position {position} does not exceed previous index {previous}")]
    NonMonotonicSparseIndex {
        path: Path,
        position: usize,
        index: u32,
        previous: u32,
    },

    /// Sparse index not below the accessor's element count
    #[error("{path}: sparse index {index} at position {position} is out of range for {count} elements")]
    SparseIndexOutOfRange {
        path: Path,
        position: usize,
        index: u32,
        count: usize,
    },

    /// Sparse buffer view declares `target` or `byteStride`
    #[error("{path}: buffer view used by sparse storage must not define target or byteStride")]
    InvalidSparseView { path: Path },

    /// `count` must be at least one
    #[error("{path}: count must be at least 1")]
    InvalidCount { path: Path },

    /// Decoded accessor would exceed the decode size limit
    #[error("{path}: {count} elements of {element_size} bytes exceed the {limit} byte decode limit")]
    DecodeLimit {
        path: Path,
        count: usize,
        element_size: usize,
        limit: usize,
    },

    /// Node graph contains a cycle through `node`
    #[error("{path}: node hierarchy contains a cycle through node {node}")]
    CyclicGraph { path: Path, node: usize },

    /// Node lists the same child twice
    #[error("{path}: child {child} listed more than once")]
    DuplicateChild { path: Path, child: usize },

    /// Node defines both `matrix` and TRS properties
    #[error("{path}: matrix and translation/rotation/scale are mutually exclusive")]
    ConflictingTransform { path: Path },

    /// Node has `skin` without `mesh`
    #[error("{path}: skin requires a mesh on the same node")]
    SkinWithoutMesh { path: Path },

    /// Animation targets a node that uses `matrix`
    #[error("{path}: animated node {node} must not define matrix")]
    AnimatedMatrixNode { path: Path, node: usize },

    /// Two channels of one animation drive the same node property
    #[error("{path}: node {node} {target:?} is already targeted by another channel")]
    DuplicateAnimationTarget {
        path: Path,
        node: usize,
        target: TargetPath,
    },

    /// Keyframe timestamps not finite and strictly increasing
    #[error("{path}: keyframe time at position {position} is not finite or does not increase")]
    NonMonotonicKeyframes { path: Path, position: usize },

    /// Baking would produce more frames than allowed
    #[error("{path}: baking {end}s at {frame_rate} fps exceeds the {limit} frame limit")]
    FrameLimit {
        path: Path,
        end: f32,
        frame_rate: f32,
        limit: usize,
    },

    /// Accessor type/component type unfit for its use
    #[error("{path}: expected {expected}")]
    UnexpectedAccessorFormat {
        path: Path,
        expected: &'static str,
    },

    /// Element count does not fit its counterpart
    #[error("{path}: expected {expected} elements, found {actual}")]
    ShapeMismatch {
        path: Path,
        expected: usize,
        actual: usize,
    },
}

impl GltfError {
    /// Document location of the failure
    pub fn path(&self) -> &Path {
        match self {
            Self::UnknownIndex { path, .. }
            | Self::OutOfBounds { path, .. }
            | Self::BufferLengthMismatch { path, .. }
            | Self::MisalignedOffset { path, .. }
            | Self::InvalidStride { path, .. }
            | Self::InvalidNormalization { path, .. }
            | Self::NonMonotonicSparseIndex { path, .. }
            | Self::SparseIndexOutOfRange { path, .. }
            | Self::InvalidSparseView { path }
            | Self::InvalidCount { path }
            | Self::DecodeLimit { path, .. }
            | Self::CyclicGraph { path, .. }
            | Self::DuplicateChild { path, .. }
            | Self::ConflictingTransform { path }
            | Self::SkinWithoutMesh { path }
            | Self::AnimatedMatrixNode { path, .. }
            | Self::DuplicateAnimationTarget { path, .. }
            | Self::NonMonotonicKeyframes { path, .. }
            | Self::FrameLimit { path, .. }
            | Self::UnexpectedAccessorFormat { path, .. }
            | Self::ShapeMismatch { path, .. } => path,
        }
    }
}

/// Every violation found by one validation run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("document failed validation with {} error(s)", .errors.len())]
pub struct ValidationReport {
    pub errors: Vec<GltfError>,
}

impl ValidationReport {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GltfError> {
        self.errors.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a GltfError;
    type IntoIter = std::slice::Iter<'a, GltfError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
