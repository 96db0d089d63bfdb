//! Animation sampler
//!
//! Evaluates a channel's value at an arbitrary time. Keyframes are decoded
//! once into a [`ChannelSampler`], which can then be evaluated any number of
//! times (and shared across threads).

mod interpolate;

use hashbrown::HashMap;

use crate::accessor::decode;
use crate::buffer::Buffers;
use crate::error::{GltfError, Path, Result};
use crate::scene::Transform;
use crate::schema::{Document, Interpolation, TargetPath};

pub use interpolate::{hermite, lerp, normalize_quat, slerp};

/// Upper bound on the frames [`ChannelSampler::bake`] produces
pub const MAX_BAKED_FRAMES: usize = 1 << 20;

/// Position of the first keyframe time that is not finite or does not
/// exceed the one before it
pub fn first_unordered_key(times: &[f32]) -> Option<usize> {
    times
        .iter()
        .enumerate()
        .position(|(i, &t)| !t.is_finite() || (i > 0 && !(t > times[i - 1])))
}

/// Decoded keyframes of one channel
///
/// Invariants (checked on construction): at least one keyframe, timestamps
/// finite and strictly increasing, `values.len() == keys * values_per_key * width`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSampler {
    path: TargetPath,
    interpolation: Interpolation,
    times: Vec<f32>,
    values: Vec<f32>,
    width: usize,
    source: Path,
}

impl ChannelSampler {
    /// Decode channel `channel` of animation `animation`
    pub fn new(
        document: &Document,
        buffers: &Buffers,
        animation: usize,
        channel: usize,
    ) -> Result<Self> {
        let anim = document
            .animations
            .get(animation)
            .ok_or_else(|| GltfError::UnknownIndex {
                path: Path::new().field("animations"),
                kind: "animation",
                index: animation,
            })?;
        let anim_path = Path::item("animations", animation);
        let chan = anim
            .channels
            .get(channel)
            .ok_or_else(|| GltfError::UnknownIndex {
                path: anim_path.field("channels"),
                kind: "channel",
                index: channel,
            })?;
        let sampler = anim
            .samplers
            .get(chan.sampler)
            .ok_or_else(|| GltfError::UnknownIndex {
                path: anim_path.field("channels").index(channel).field("sampler"),
                kind: "sampler",
                index: chan.sampler,
            })?;

        let times = decode(document, buffers, sampler.input)?.to_f32_vec();
        let values = decode(document, buffers, sampler.output)?.to_f32_vec();

        Self::from_parts(
            chan.target.path,
            sampler.interpolation,
            times,
            values,
            &anim_path.field("samplers").index(chan.sampler),
        )
    }

    /// Build from already decoded keyframes; `path` labels errors
    pub fn from_parts(
        target: TargetPath,
        interpolation: Interpolation,
        times: Vec<f32>,
        values: Vec<f32>,
        path: &Path,
    ) -> Result<Self> {
        let keys = times.len();
        if keys == 0 {
            return Err(GltfError::ShapeMismatch {
                path: path.field("input"),
                expected: 1,
                actual: 0,
            });
        }
        if let Some(position) = first_unordered_key(&times) {
            return Err(GltfError::NonMonotonicKeyframes {
                path: path.field("input"),
                position,
            });
        }

        let per_key = interpolation.values_per_key();
        let width = target
            .width()
            .unwrap_or_else(|| values.len() / (keys * per_key));
        let expected = keys * per_key * width;
        if width == 0 || values.len() != expected {
            return Err(GltfError::ShapeMismatch {
                path: path.field("output"),
                expected: expected.max(keys * per_key),
                actual: values.len(),
            });
        }

        Ok(Self {
            path: target,
            interpolation,
            times,
            values,
            width,
            source: path.clone(),
        })
    }

    pub fn target_path(&self) -> TargetPath {
        self.path
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Components per evaluated value (3, 4 or the morph target count)
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn start(&self) -> f32 {
        self.times[0]
    }

    pub fn end(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    /// Output element `slot` of keyframe `key` (slot 0 = value, or in-tangent
    /// for cubic splines)
    fn element(&self, key: usize, slot: usize) -> &[f32] {
        let start = (key * self.interpolation.values_per_key() + slot) * self.width;
        &self.values[start..start + self.width]
    }

    fn vertex(&self, key: usize) -> &[f32] {
        match self.interpolation {
            Interpolation::CubicSpline => self.element(key, 1),
            _ => self.element(key, 0),
        }
    }

    /// Value at `time`, clamped to the first/last keyframe outside the range
    pub fn evaluate(&self, time: f32) -> Vec<f32> {
        let last = self.times.len() - 1;
        // Also catches NaN
        if !(time > self.times[0]) {
            return self.vertex(0).to_vec();
        }
        if time >= self.times[last] {
            return self.vertex(last).to_vec();
        }

        // t[i] <= time < t[i + 1]
        let i = self.times.partition_point(|&t| t <= time) - 1;
        let t0 = self.times[i];
        let dt = self.times[i + 1] - t0;
        let u = (time - t0) / dt;

        if self.interpolation == Interpolation::Step || u == 0.0 {
            return self.vertex(i).to_vec();
        }

        let mut out = vec![0.0; self.width];
        match self.interpolation {
            Interpolation::Linear if self.path == TargetPath::Rotation => {
                let (a, b) = (self.vertex(i), self.vertex(i + 1));
                out.copy_from_slice(&slerp(
                    [a[0], a[1], a[2], a[3]],
                    [b[0], b[1], b[2], b[3]],
                    u,
                ));
            }
            Interpolation::CubicSpline => {
                hermite(
                    self.element(i, 1),
                    self.element(i, 2),
                    self.element(i + 1, 1),
                    self.element(i + 1, 0),
                    dt,
                    u,
                    &mut out,
                );
                if self.path == TargetPath::Rotation {
                    let q = normalize_quat([out[0], out[1], out[2], out[3]]);
                    out.copy_from_slice(&q);
                }
            }
            _ => lerp(self.vertex(i), self.vertex(i + 1), u, &mut out),
        }
        out
    }

    /// Sample at `frame / frame_rate` for every frame up to and including the
    /// one that covers the last keyframe
    ///
    /// A non-positive or non-finite `frame_rate` bakes nothing.
    ///
    /// # Errors
    ///
    /// `FrameLimit` when more than [`MAX_BAKED_FRAMES`] frames would be needed.
    pub fn bake(&self, frame_rate: f32) -> Result<Vec<Vec<f32>>> {
        if !(frame_rate > 0.0) || !frame_rate.is_finite() {
            return Ok(Vec::new());
        }
        let last_frame = (f64::from(self.end().max(0.0)) * f64::from(frame_rate)).ceil();
        if !(last_frame < MAX_BAKED_FRAMES as f64) {
            return Err(GltfError::FrameLimit {
                path: self.source.clone(),
                end: self.end(),
                frame_rate,
                limit: MAX_BAKED_FRAMES,
            });
        }
        let frame_count = last_frame as usize + 1;
        Ok((0..frame_count)
            .map(|frame| self.evaluate(frame as f32 / frame_rate))
            .collect())
    }
}

/// Value of channel `channel` of animation `animation` at `time`
pub fn sample(
    document: &Document,
    buffers: &Buffers,
    animation: usize,
    channel: usize,
    time: f32,
) -> Result<Vec<f32>> {
    Ok(ChannelSampler::new(document, buffers, animation, channel)?.evaluate(time))
}

/// Last keyframe time across every sampler of `animation`
pub fn duration(document: &Document, buffers: &Buffers, animation: usize) -> Result<f32> {
    let anim = document
        .animations
        .get(animation)
        .ok_or_else(|| GltfError::UnknownIndex {
            path: Path::new().field("animations"),
            kind: "animation",
            index: animation,
        })?;

    let mut max_time = 0.0f32;
    for sampler in &anim.samplers {
        let times = decode(document, buffers, sampler.input)?.to_f32_vec();
        if let Some(&t) = times.last() {
            max_time = max_time.max(t);
        }
    }
    Ok(max_time)
}

/// Animated node state at one instant
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    /// Node index -> local TRS (rest pose with animated properties applied)
    pub transforms: HashMap<usize, Transform>,
    /// Node index -> morph target weights
    pub weights: HashMap<usize, Vec<f32>>,
}

impl Pose {
    pub fn transform(&self, node: usize) -> Option<&Transform> {
        self.transforms.get(&node)
    }
}

/// Evaluate every channel of `animation` at `time`
///
/// Properties a channel does not drive keep the node's rest value.
pub fn pose(document: &Document, buffers: &Buffers, animation: usize, time: f32) -> Result<Pose> {
    let anim = document
        .animations
        .get(animation)
        .ok_or_else(|| GltfError::UnknownIndex {
            path: Path::new().field("animations"),
            kind: "animation",
            index: animation,
        })?;

    let mut pose = Pose::default();
    for (c, channel) in anim.channels.iter().enumerate() {
        let node_index = channel.target.node;
        let node = document
            .nodes
            .get(node_index)
            .ok_or_else(|| GltfError::UnknownIndex {
                path: Path::item("animations", animation)
                    .field("channels")
                    .index(c)
                    .field("target")
                    .field("node"),
                kind: "node",
                index: node_index,
            })?;
        let value = ChannelSampler::new(document, buffers, animation, c)?.evaluate(time);

        if channel.target.path == TargetPath::Weights {
            pose.weights.insert(node_index, value);
            continue;
        }
        let transform = pose
            .transforms
            .entry(node_index)
            .or_insert_with(|| Transform::from_node(node));
        match channel.target.path {
            TargetPath::Translation => transform.translation = [value[0], value[1], value[2]],
            TargetPath::Rotation => {
                transform.rotation = [value[0], value[1], value[2], value[3]]
            }
            TargetPath::Scale => transform.scale = [value[0], value[1], value[2]],
            TargetPath::Weights => {}
        }
    }

    tracing::debug!(
        "Posed animation {} at t={}: {} node(s), {} weight set(s)",
        animation,
        time,
        pose.transforms.len(),
        pose.weights.len()
    );
    Ok(pose)
}
