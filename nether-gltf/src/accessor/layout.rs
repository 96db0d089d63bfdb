//! Element byte layout and component conversion

use crate::buffer::checked_range;
use crate::error::{GltfError, Path, Result};
use crate::schema::{Accessor, ComponentType, ElementType};

use super::Values;

/// Largest packed byte length a single accessor may decode to
pub const MAX_DECODED_BYTES: usize = u32::MAX as usize;

/// Round up to the next multiple of 4
const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// How one element of an accessor is laid out in memory
///
/// Matrix columns each start on a 4-byte boundary, so MAT2/MAT3 with 1-byte
/// components and MAT3 with 2-byte components carry padding after each column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementLayout {
    pub component_type: ComponentType,
    pub element_type: ElementType,
}

impl ElementLayout {
    pub const fn new(component_type: ComponentType, element_type: ElementType) -> Self {
        Self {
            component_type,
            element_type,
        }
    }

    pub fn of(accessor: &Accessor) -> Self {
        Self::new(accessor.component_type, accessor.element_type())
    }

    pub const fn components(&self) -> usize {
        self.element_type.components()
    }

    /// Bytes per element with padding removed
    pub const fn packed_size(&self) -> usize {
        self.components() * self.component_type.size()
    }

    /// Distance between column starts
    const fn column_stride(&self) -> usize {
        let (_, rows) = self.element_type.columns_rows();
        let column = rows * self.component_type.size();
        if self.element_type.is_matrix() {
            align4(column)
        } else {
            column
        }
    }

    /// Bytes per element as stored, including column padding
    pub const fn stored_size(&self) -> usize {
        let (columns, _) = self.element_type.columns_rows();
        columns * self.column_stride()
    }

    /// Byte span of `count` elements at `stride`; `None` on overflow
    pub fn extent(&self, count: usize, stride: usize) -> Option<usize> {
        match count {
            0 => Some(0),
            n => stride.checked_mul(n - 1)?.checked_add(self.stored_size()),
        }
    }

    /// Packed byte length of `count` elements
    ///
    /// Fails with `DecodeLimit` past [`MAX_DECODED_BYTES`].
    pub fn packed_length(&self, count: usize, path: &Path) -> Result<usize> {
        count
            .checked_mul(self.packed_size())
            .filter(|&length| length <= MAX_DECODED_BYTES)
            .ok_or_else(|| GltfError::DecodeLimit {
                path: path.field("count"),
                count,
                element_size: self.packed_size(),
                limit: MAX_DECODED_BYTES,
            })
    }

    /// Copy `count` elements starting at `offset` into a tightly packed vector
    ///
    /// Fails with `OutOfBounds` if the last element ends past `bytes`.
    pub fn gather(
        &self,
        bytes: &[u8],
        offset: usize,
        count: usize,
        stride: usize,
        path: &Path,
    ) -> Result<Vec<u8>> {
        let extent = self.extent(count, stride).ok_or_else(|| GltfError::OutOfBounds {
            path: path.clone(),
            offset,
            end: usize::MAX,
            length: bytes.len(),
        })?;
        let region = checked_range(bytes, offset, extent, path.clone())?;

        let (columns, rows) = self.element_type.columns_rows();
        let column_bytes = rows * self.component_type.size();
        let column_stride = self.column_stride();

        let mut packed = Vec::with_capacity(self.packed_length(count, path)?);
        for i in 0..count {
            for column in 0..columns {
                let start = i * stride + column * column_stride;
                let src = region
                    .get(start..start + column_bytes)
                    .ok_or_else(|| GltfError::OutOfBounds {
                        path: path.clone(),
                        offset: offset + start,
                        end: offset + start + column_bytes,
                        length: bytes.len(),
                    })?;
                packed.extend_from_slice(src);
            }
        }
        Ok(packed)
    }
}

/// BYTE -> [-1, 1]
pub fn normalize_i8(value: i8) -> f32 {
    (value as f32 / 127.0).max(-1.0)
}

/// UNSIGNED_BYTE -> [0, 1]
pub fn normalize_u8(value: u8) -> f32 {
    value as f32 / 255.0
}

/// SHORT -> [-1, 1]
pub fn normalize_i16(value: i16) -> f32 {
    (value as f32 / 32767.0).max(-1.0)
}

/// UNSIGNED_SHORT -> [0, 1]
pub fn normalize_u16(value: u16) -> f32 {
    value as f32 / 65535.0
}

/// Interpret little-endian packed components
pub(crate) fn convert(packed: &[u8], component_type: ComponentType, normalized: bool) -> Values {
    match (component_type, normalized) {
        (ComponentType::F32, _) => Values::Float(
            packed
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        (ComponentType::U32, _) => Values::Unsigned(
            packed
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        (ComponentType::I8, true) => Values::Float(
            packed
                .iter()
                .map(|&b| normalize_i8(i8::from_le_bytes([b])))
                .collect(),
        ),
        (ComponentType::I8, false) => Values::Signed(
            packed
                .iter()
                .map(|&b| i8::from_le_bytes([b]) as i32)
                .collect(),
        ),
        (ComponentType::U8, true) => Values::Float(packed.iter().map(|&b| normalize_u8(b)).collect()),
        (ComponentType::U8, false) => Values::Unsigned(packed.iter().map(|&b| b as u32).collect()),
        (ComponentType::I16, true) => Values::Float(
            packed
                .chunks_exact(2)
                .map(|c| normalize_i16(i16::from_le_bytes([c[0], c[1]])))
                .collect(),
        ),
        (ComponentType::I16, false) => Values::Signed(
            packed
                .chunks_exact(2)
                .map(|c| i16::from_le_bytes([c[0], c[1]]) as i32)
                .collect(),
        ),
        (ComponentType::U16, true) => Values::Float(
            packed
                .chunks_exact(2)
                .map(|c| normalize_u16(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
        ),
        (ComponentType::U16, false) => Values::Unsigned(
            packed
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_sizes_with_column_padding() {
        let size = |ct, et| ElementLayout::new(ct, et).stored_size();
        assert_eq!(size(ComponentType::U8, ElementType::Mat2), 8);
        assert_eq!(size(ComponentType::U8, ElementType::Mat3), 12);
        assert_eq!(size(ComponentType::I16, ElementType::Mat3), 24);
        assert_eq!(size(ComponentType::I16, ElementType::Mat2), 8);
        assert_eq!(size(ComponentType::F32, ElementType::Mat4), 64);
        assert_eq!(size(ComponentType::U8, ElementType::Vec3), 3);
        assert_eq!(
            ElementLayout::new(ComponentType::U8, ElementType::Mat3).packed_size(),
            9
        );
    }

    #[test]
    fn test_gather_skips_column_padding() {
        // MAT2 of bytes: column 0 = [1, 2], pad, pad, column 1 = [3, 4], pad, pad
        let bytes = [1, 2, 0xAA, 0xAA, 3, 4, 0xBB, 0xBB];
        let layout = ElementLayout::new(ComponentType::U8, ElementType::Mat2);
        let packed = layout.gather(&bytes, 0, 1, 8, &Path::new()).unwrap();
        assert_eq!(packed, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_gather_strided() {
        let bytes = [1, 2, 0, 0, 3, 4, 0, 0, 5, 6];
        let layout = ElementLayout::new(ComponentType::U8, ElementType::Vec2);
        let packed = layout.gather(&bytes, 0, 3, 4, &Path::new()).unwrap();
        assert_eq!(packed, vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            layout.gather(&bytes, 2, 3, 4, &Path::new()),
            Err(GltfError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_signed_normalization_clamps_min() {
        assert_eq!(normalize_i8(-128), -1.0);
        assert_eq!(normalize_i8(-127), -1.0);
        assert_eq!(normalize_i8(127), 1.0);
        assert_eq!(normalize_i16(i16::MIN), -1.0);
        assert_eq!(normalize_u16(u16::MAX), 1.0);
        assert_eq!(normalize_u8(0), 0.0);
    }

    #[test]
    fn test_convert_little_endian() {
        let values = convert(&[0x34, 0x12, 0xFF, 0xFF], ComponentType::I16, false);
        assert_eq!(values, Values::Signed(vec![0x1234, -1]));
        let values = convert(&1.5f32.to_le_bytes(), ComponentType::F32, false);
        assert_eq!(values, Values::Float(vec![1.5]));
    }
}
