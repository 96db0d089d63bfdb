//! Phases 7, 9 and 10: animation targets, samplers and skins

use hashbrown::HashSet;

use crate::accessor::decode;
use crate::animation::first_unordered_key;
use crate::error::{GltfError, Path};
use crate::schema::{Accessor, ComponentType, ElementType, Interpolation, TargetPath};

use super::Validator;

/// Whether `accessor` can carry values for `path`
fn fits_target(accessor: &Accessor, path: TargetPath) -> bool {
    let float_or_normalized = accessor.component_type == ComponentType::F32
        || (accessor.normalized && accessor.component_type.is_normalizable());
    match path {
        TargetPath::Translation | TargetPath::Scale => {
            accessor.element_type() == ElementType::Vec3
                && accessor.component_type == ComponentType::F32
        }
        TargetPath::Rotation => accessor.element_type() == ElementType::Vec4 && float_or_normalized,
        TargetPath::Weights => accessor.element_type() == ElementType::Scalar && float_or_normalized,
    }
}

const fn target_format(path: TargetPath) -> &'static str {
    match path {
        TargetPath::Translation | TargetPath::Scale => "VEC3 FLOAT output",
        TargetPath::Rotation => "VEC4 FLOAT or normalized integer output",
        TargetPath::Weights => "SCALAR FLOAT or normalized integer output",
    }
}

impl Validator<'_> {
    pub(super) fn check_animation_targets(&mut self) {
        let doc = self.document;
        for (a, animation) in doc.animations.iter().enumerate() {
            let mut targets = HashSet::new();
            for (c, channel) in animation.channels.iter().enumerate() {
                let target = (channel.target.node, channel.target.path);
                if !targets.insert(target) {
                    self.report(GltfError::DuplicateAnimationTarget {
                        path: Path::item("animations", a)
                            .field("channels")
                            .index(c)
                            .field("target"),
                        node: target.0,
                        target: target.1,
                    });
                }
            }
        }
    }

    pub(super) fn check_samplers(&mut self) {
        let doc = self.document;
        let buffers = self.buffers;

        for (a, animation) in doc.animations.iter().enumerate() {
            let path = Path::item("animations", a);

            for (s, sampler) in animation.samplers.iter().enumerate() {
                if self.is_broken(sampler.input) {
                    continue;
                }
                let input_path = path.field("samplers").index(s).field("input");
                let input = &doc.accessors[sampler.input];
                if input.element_type() != ElementType::Scalar
                    || input.component_type != ComponentType::F32
                {
                    self.report_accessor(
                        sampler.input,
                        GltfError::UnexpectedAccessorFormat {
                            path: input_path,
                            expected: "SCALAR FLOAT keyframe times",
                        },
                    );
                    continue;
                }
                let times = match decode(doc, buffers, sampler.input) {
                    Ok(decoded) => decoded.to_f32_vec(),
                    Err(err) => {
                        self.report_accessor(sampler.input, err);
                        continue;
                    }
                };
                if let Some(position) = first_unordered_key(&times) {
                    self.report_accessor(
                        sampler.input,
                        GltfError::NonMonotonicKeyframes {
                            path: input_path,
                            position,
                        },
                    );
                }
            }

            for (c, channel) in animation.channels.iter().enumerate() {
                let Some(sampler) = animation.samplers.get(channel.sampler) else {
                    continue;
                };
                if self.is_broken(sampler.input) || self.is_broken(sampler.output) {
                    continue;
                }
                let sampler_path = path.field("samplers").index(channel.sampler);
                let output = &doc.accessors[sampler.output];
                if !fits_target(output, channel.target.path) {
                    self.report(GltfError::UnexpectedAccessorFormat {
                        path: sampler_path.field("output"),
                        expected: target_format(channel.target.path),
                    });
                    continue;
                }

                let keys = doc.accessors[sampler.input].count;
                let per_key = match channel.target.path {
                    TargetPath::Weights => doc
                        .nodes
                        .get(channel.target.node)
                        .and_then(|node| node.mesh)
                        .and_then(|m| doc.meshes.get(m))
                        .map_or(0, |mesh| mesh.morph_target_count()),
                    _ => 1,
                };
                let expected = keys
                    .saturating_mul(sampler.interpolation.values_per_key())
                    .saturating_mul(per_key);
                if output.count != expected {
                    self.report(GltfError::ShapeMismatch {
                        path: path.field("channels").index(c),
                        expected,
                        actual: output.count,
                    });
                }
                if sampler.interpolation == Interpolation::CubicSpline && keys < 2 {
                    self.report(GltfError::ShapeMismatch {
                        path: sampler_path.field("input"),
                        expected: 2,
                        actual: keys,
                    });
                }
            }
        }
    }

    pub(super) fn check_skins(&mut self) {
        let doc = self.document;
        for (s, skin) in doc.skins.iter().enumerate() {
            let Some(ibm) = skin.inverse_bind_matrices else {
                continue;
            };
            if self.is_broken(ibm) {
                continue;
            }
            let path = Path::item("skins", s).field("inverseBindMatrices");
            let accessor = &doc.accessors[ibm];
            if accessor.element_type() != ElementType::Mat4
                || accessor.component_type != ComponentType::F32
            {
                self.report(GltfError::UnexpectedAccessorFormat {
                    path,
                    expected: "MAT4 FLOAT inverse bind matrices",
                });
            } else if accessor.count < skin.joints.len() {
                self.report(GltfError::ShapeMismatch {
                    path,
                    expected: skin.joints.len(),
                    actual: accessor.count,
                });
            }
        }
    }
}
