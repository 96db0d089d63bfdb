//! Animations, channels and keyframe samplers

use serde::{Deserialize, Serialize};

use super::Opaque;

/// Keyframe blending rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    #[serde(rename = "LINEAR")]
    Linear,
    #[serde(rename = "STEP")]
    Step,
    #[serde(rename = "CUBICSPLINE")]
    CubicSpline,
}

impl Interpolation {
    /// Output elements stored per keyframe
    pub const fn values_per_key(self) -> usize {
        match self {
            Self::Linear | Self::Step => 1,
            Self::CubicSpline => 3,
        }
    }
}

/// Node property driven by a channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    /// Components per keyframe value, `None` for weights (per morph target)
    pub const fn width(self) -> Option<usize> {
        match self {
            Self::Translation | Self::Scale => Some(3),
            Self::Rotation => Some(4),
            Self::Weights => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelTarget {
    pub node: usize,
    pub path: TargetPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

/// Binds one sampler to one (node, path) target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub sampler: usize,
    pub target: ChannelTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Channel {
    pub fn new(sampler: usize, node: usize, path: TargetPath) -> Self {
        Self {
            sampler,
            target: ChannelTarget {
                node,
                path,
                extensions: None,
                extras: None,
            },
            extensions: None,
            extras: None,
        }
    }
}

/// Input (timestamps) and output (values) accessors plus interpolation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sampler {
    pub input: usize,
    #[serde(default)]
    pub interpolation: Interpolation,
    pub output: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}

impl Sampler {
    pub fn new(input: usize, output: usize, interpolation: Interpolation) -> Self {
        Self {
            input,
            interpolation,
            output,
            extensions: None,
            extras: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub channels: Vec<Channel>,
    pub samplers: Vec<Sampler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Opaque>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Opaque>,
}
