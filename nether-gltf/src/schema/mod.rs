//! In-memory glTF 2.0 document model
//!
//! Pure data: every cross-reference is an index into one of the flat arrays on
//! [`Document`]. Parsing JSON into this model is plain `serde`; nothing here
//! interprets bytes or checks invariants (see [`crate::validation`]).

mod accessor;
mod animation;
mod buffer;
mod node;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use accessor::{
    Accessor, AccessorKind, ComponentType, ElementType, IndexType, Sparse, SparseIndices,
    SparseValues,
};
pub use animation::{Animation, Channel, ChannelTarget, Interpolation, Sampler, TargetPath};
pub use buffer::{Buffer, BufferView, MAX_BYTE_STRIDE, MIN_BYTE_STRIDE, Target};
pub use node::{IDENTITY_ROTATION, IDENTITY_SCALE, IDENTITY_TRANSLATION, Node, Scene, Skin};

/// Untyped passthrough value (extensions, extras, materials, ...)
///
/// Stored and forwarded, never interpreted.
pub type Opaque = serde_json::Value;

/// Asset metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            generator: Some(concat!("nether-gltf ", env!("CARGO_PKG_VERSION")).to_string()),
            copyright: None,
            min_version: None,
            extensions: None,
            extras: None,
        }
    }
}

/// Camera; projection parameters are carried opaquely
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthographic: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

/// Image reference; pixel data is never decoded here
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

/// Attribute semantic -> accessor index
pub type AttributeMap = BTreeMap<String, usize>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    /// Morph targets (attribute semantic -> displacement accessor)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Mesh {
    /// Morph target count of the first primitive; validation checks the rest agree
    pub fn morph_target_count(&self) -> usize {
        self.primitives.first().map_or(0, |p| p.targets.len())
    }
}

/// Root of a glTF document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
    pub asset: Asset,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<Camera>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Opaque>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skins: Vec<Skin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Document {
    /// Parse a document from glTF JSON text
    pub fn from_slice(json: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(json)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
