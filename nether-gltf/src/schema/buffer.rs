//! Buffers and buffer views

use serde::{Deserialize, Serialize};

use super::Opaque;

/// Smallest legal `byteStride`
pub const MIN_BYTE_STRIDE: usize = 4;

/// Largest legal `byteStride`
pub const MAX_BYTE_STRIDE: usize = 252;

/// Raw binary blob declaration; bytes arrive separately
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Buffer {
    pub fn new(byte_length: usize) -> Self {
        Self {
            byte_length,
            ..Default::default()
        }
    }
}

/// GPU binding hint for a buffer view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Target {
    /// ARRAY_BUFFER (34962)
    ArrayBuffer,
    /// ELEMENT_ARRAY_BUFFER (34963)
    ElementArrayBuffer,
}

impl TryFrom<u32> for Target {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            34962 => Ok(Self::ArrayBuffer),
            34963 => Ok(Self::ElementArrayBuffer),
            other => Err(format!("unknown buffer view target {}", other)),
        }
    }
}

impl From<Target> for u32 {
    fn from(value: Target) -> Self {
        match value {
            Target::ArrayBuffer => 34962,
            Target::ElementArrayBuffer => 34963,
        }
    }
}

/// Byte range within a buffer, optionally strided
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl BufferView {
    pub fn new(buffer: usize, byte_offset: usize, byte_length: usize) -> Self {
        Self {
            buffer,
            byte_offset,
            byte_length,
            ..Default::default()
        }
    }

    pub fn with_stride(mut self, byte_stride: usize) -> Self {
        self.byte_stride = Some(byte_stride);
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
}
