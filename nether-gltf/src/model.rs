//! Validated document facade
//!
//! A [`Model`] pairs a document with its resident buffers. Construction runs
//! the validation gate once; afterwards every query is read-only, so a model
//! can be cloned into worker threads freely.

use std::sync::Arc;

use glam::Mat4;

use crate::accessor::{self, DecodedAccessor};
use crate::animation::{self, ChannelSampler, Pose};
use crate::buffer::Buffers;
use crate::config::Config;
use crate::error::{GltfError, Path, Result, ValidationReport};
use crate::scene::{self, NodeTransform};
use crate::schema::{Document, TargetPath};
use crate::skin;
use crate::validation::validate;

/// Frames of one baked channel
#[derive(Clone, Debug, PartialEq)]
pub struct BakedChannel {
    pub channel: usize,
    pub node: usize,
    pub path: TargetPath,
    /// One value per frame, frame `i` sampled at `i / frame_rate`
    pub frames: Vec<Vec<f32>>,
}

/// Document plus buffers, shared behind `Arc`
#[derive(Clone, Debug)]
pub struct Model {
    document: Arc<Document>,
    buffers: Arc<Buffers>,
}

impl Model {
    /// Validate and wrap `document` and `buffers`
    ///
    /// # Errors
    ///
    /// Every structural violation found, collected into one report.
    pub fn new(document: Document, buffers: Buffers) -> std::result::Result<Self, ValidationReport> {
        validate(&document, &buffers)?;
        tracing::debug!(
            "Validated document: {} accessor(s), {} node(s), {} animation(s)",
            document.accessors.len(),
            document.nodes.len(),
            document.animations.len()
        );
        Ok(Self::new_unchecked(document, buffers))
    }

    /// Wrap without validating
    ///
    /// Decoding still cannot read out of range, but errors surface per query
    /// instead of up front.
    pub fn new_unchecked(document: Document, buffers: Buffers) -> Self {
        Self {
            document: Arc::new(document),
            buffers: Arc::new(buffers),
        }
    }

    /// [`Model::new`], or [`Model::new_unchecked`] when validation is disabled
    pub fn with_config(
        document: Document,
        buffers: Buffers,
        config: &Config,
    ) -> std::result::Result<Self, ValidationReport> {
        if config.validation.enabled {
            Self::new(document, buffers)
        } else {
            tracing::warn!("Validation disabled; decoding unchecked document");
            Ok(Self::new_unchecked(document, buffers))
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    pub fn decode_accessor(&self, index: usize) -> Result<DecodedAccessor> {
        accessor::decode(&self.document, &self.buffers, index)
    }

    /// Decode every accessor in parallel, one result per accessor index
    pub fn decode_all(&self) -> Vec<Result<DecodedAccessor>> {
        use rayon::prelude::*;

        (0..self.document.accessors.len())
            .into_par_iter()
            .map(|index| self.decode_accessor(index))
            .collect()
    }

    pub fn world_transform(&self, node: usize) -> Result<Mat4> {
        scene::world_transform(&self.document, node)
    }

    pub fn compose(&self, roots: &[usize]) -> Result<Vec<NodeTransform>> {
        scene::compose(&self.document, roots)
    }

    pub fn compose_scene(&self, scene: usize) -> Result<Vec<NodeTransform>> {
        scene::compose_scene(&self.document, scene)
    }

    /// Compose the default scene, or every parentless node without one
    pub fn compose_default(&self) -> Result<Vec<NodeTransform>> {
        scene::compose(&self.document, &scene::default_roots(&self.document))
    }

    pub fn channel_sampler(&self, animation: usize, channel: usize) -> Result<ChannelSampler> {
        ChannelSampler::new(&self.document, &self.buffers, animation, channel)
    }

    pub fn sample(&self, animation: usize, channel: usize, time: f32) -> Result<Vec<f32>> {
        animation::sample(&self.document, &self.buffers, animation, channel, time)
    }

    pub fn duration(&self, animation: usize) -> Result<f32> {
        animation::duration(&self.document, &self.buffers, animation)
    }

    pub fn pose(&self, animation: usize, time: f32) -> Result<Pose> {
        animation::pose(&self.document, &self.buffers, animation, time)
    }

    /// Rest hierarchy of the default roots with `animation` applied at `time`
    pub fn compose_posed(&self, animation: usize, time: f32) -> Result<Vec<NodeTransform>> {
        let pose = self.pose(animation, time)?;
        scene::compose_posed(&self.document, &scene::default_roots(&self.document), &pose)
    }

    /// Bake every channel of `animation` at `frame_rate`, channels in parallel
    pub fn bake_animation(&self, animation: usize, frame_rate: f32) -> Result<Vec<BakedChannel>> {
        use rayon::prelude::*;

        let anim = self
            .document
            .animations
            .get(animation)
            .ok_or_else(|| GltfError::UnknownIndex {
                path: Path::new().field("animations"),
                kind: "animation",
                index: animation,
            })?;

        let baked: Result<Vec<_>> = anim
            .channels
            .par_iter()
            .enumerate()
            .map(|(c, channel)| {
                let sampler = self.channel_sampler(animation, c)?;
                Ok(BakedChannel {
                    channel: c,
                    node: channel.target.node,
                    path: channel.target.path,
                    frames: sampler.bake(frame_rate)?,
                })
            })
            .collect();
        let baked = baked?;

        tracing::debug!(
            "Baked animation {}: {} channel(s) at {} fps",
            animation,
            baked.len(),
            frame_rate
        );
        Ok(baked)
    }

    pub fn inverse_bind_matrices(&self, skin: usize) -> Result<Vec<Mat4>> {
        skin::inverse_bind_matrices(&self.document, &self.buffers, skin)
    }

    pub fn joint_matrices(&self, skin: usize) -> Result<Vec<Mat4>> {
        skin::joint_matrices(&self.document, &self.buffers, skin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Node;

    #[test]
    fn test_model_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Model>();
    }

    #[test]
    fn test_cycle_rejected_unless_disabled() {
        let document = Document {
            nodes: vec![
                Node::default().with_children(vec![1]),
                Node::default().with_children(vec![0]),
            ],
            ..Default::default()
        };

        let report = Model::new(document.clone(), Buffers::default()).unwrap_err();
        assert!(
            report
                .iter()
                .any(|e| matches!(e, GltfError::CyclicGraph { .. }))
        );

        let mut config = Config::default();
        config.validation.enabled = false;
        let model = Model::with_config(document, Buffers::default(), &config).unwrap();
        assert!(matches!(
            model.compose(&[0]),
            Err(GltfError::CyclicGraph { node: 0, .. })
        ));
    }

    #[test]
    fn test_bake_unknown_animation() {
        let model = Model::new(Document::default(), Buffers::default()).unwrap();
        assert!(matches!(
            model.bake_animation(0, 30.0),
            Err(GltfError::UnknownIndex {
                kind: "animation",
                ..
            })
        ));
        assert!(model.decode_all().is_empty());
    }
}
