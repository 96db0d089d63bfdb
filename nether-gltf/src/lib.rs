//! nether-gltf library
//!
//! Resolves glTF 2.0 binary data: validates a document against its buffers,
//! decodes accessors (strides, normalization, sparse overlays), composes the
//! node hierarchy into world transforms and samples animation channels.
//!
//! ```no_run
//! use nether_gltf::{Model, import};
//!
//! # fn main() -> anyhow::Result<()> {
//! let (document, buffers) = import::import("character.glb".as_ref())?;
//! let model = Model::new(document, buffers)?;
//! let positions = model.decode_accessor(0)?;
//! let rotation = model.sample(0, 0, 0.5)?;
//! # let _ = (positions, rotation);
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod animation;
pub mod buffer;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod scene;
pub mod schema;
pub mod skin;
pub mod validation;

// Re-export the types most callers need
pub use accessor::{DecodedAccessor, Tuple, Values, decode};
pub use animation::{ChannelSampler, Pose};
pub use buffer::Buffers;
pub use config::Config;
pub use error::{GltfError, Path, Result, ValidationReport};
pub use model::{BakedChannel, Model};
pub use scene::{NodeTransform, Transform};
pub use schema::Document;
pub use validation::validate;
