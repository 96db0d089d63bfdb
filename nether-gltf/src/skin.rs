//! Skin joint matrices
//!
//! Reads inverse bind matrices from a skin's MAT4 accessor and combines them
//! with the joints' world transforms.

use glam::Mat4;

use crate::accessor::decode;
use crate::buffer::Buffers;
use crate::error::{GltfError, Path, Result};
use crate::scene::world_transform;
use crate::schema::{ComponentType, Document, ElementType, Skin};

fn skin_at(document: &Document, skin: usize) -> Result<&Skin> {
    document.skins.get(skin).ok_or_else(|| GltfError::UnknownIndex {
        path: Path::new().field("skins"),
        kind: "skin",
        index: skin,
    })
}

/// Inverse bind matrix per joint of skin `skin`
///
/// A skin without an `inverseBindMatrices` accessor uses identity for every
/// joint.
pub fn inverse_bind_matrices(
    document: &Document,
    buffers: &Buffers,
    skin: usize,
) -> Result<Vec<Mat4>> {
    let data = skin_at(document, skin)?;
    let joint_count = data.joints.len();
    let Some(accessor) = data.inverse_bind_matrices else {
        return Ok(vec![Mat4::IDENTITY; joint_count]);
    };

    let path = Path::item("skins", skin).field("inverseBindMatrices");
    let decoded = decode(document, buffers, accessor)?;
    if decoded.element_type != ElementType::Mat4 || decoded.component_type != ComponentType::F32 {
        return Err(GltfError::UnexpectedAccessorFormat {
            path,
            expected: "MAT4 FLOAT inverse bind matrices",
        });
    }
    if decoded.count < joint_count {
        return Err(GltfError::ShapeMismatch {
            path,
            expected: joint_count,
            actual: decoded.count,
        });
    }

    // Column-major, 16 floats per joint
    Ok((0..joint_count)
        .filter_map(|joint| decoded.f32_tuple(joint))
        .map(Mat4::from_cols_slice)
        .collect())
}

/// `world(joint) * inverseBind(joint)` for each joint of skin `skin`
pub fn joint_matrices(document: &Document, buffers: &Buffers, skin: usize) -> Result<Vec<Mat4>> {
    let data = skin_at(document, skin)?;
    let inverse_binds = inverse_bind_matrices(document, buffers, skin)?;

    let matrices = data
        .joints
        .iter()
        .zip(&inverse_binds)
        .map(|(&joint, ibm)| Ok(world_transform(document, joint)? * *ibm))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Skin {}: {} joint matrices", skin, matrices.len());
    Ok(matrices)
}
