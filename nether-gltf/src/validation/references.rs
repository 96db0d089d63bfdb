//! Phase 1: every index points at an existing array entry

use crate::error::{GltfError, Path};

use super::Validator;

impl Validator<'_> {
    /// Returns whether `index < len`, reporting `UnknownIndex` otherwise
    fn check_index(&mut self, path: Path, kind: &'static str, index: usize, len: usize) -> bool {
        if index < len {
            true
        } else {
            self.report(GltfError::UnknownIndex { path, kind, index });
            false
        }
    }

    fn check_accessor_ref(&mut self, path: Path, index: usize) -> bool {
        let len = self.document.accessors.len();
        self.check_index(path, "accessor", index, len)
    }

    pub(super) fn check_references(&mut self) {
        let doc = self.document;
        let view_count = doc.buffer_views.len();
        let node_count = doc.nodes.len();

        for index in 0..doc.buffers.len() {
            if self.buffers.get(index).is_none() {
                self.report(GltfError::UnknownIndex {
                    path: Path::item("buffers", index),
                    kind: "buffer data",
                    index,
                });
            }
        }

        for (i, view) in doc.buffer_views.iter().enumerate() {
            let path = Path::item("bufferViews", i).field("buffer");
            self.check_index(path, "buffer", view.buffer, doc.buffers.len());
        }

        for (i, accessor) in doc.accessors.iter().enumerate() {
            let path = Path::item("accessors", i);
            let mut ok = true;
            if let Some(view) = accessor.buffer_view {
                ok &= self.check_index(path.field("bufferView"), "bufferView", view, view_count);
            }
            if let Some(sparse) = &accessor.sparse {
                let sparse_path = path.field("sparse");
                ok &= self.check_index(
                    sparse_path.field("indices").field("bufferView"),
                    "bufferView",
                    sparse.indices.buffer_view,
                    view_count,
                );
                ok &= self.check_index(
                    sparse_path.field("values").field("bufferView"),
                    "bufferView",
                    sparse.values.buffer_view,
                    view_count,
                );
            }
            if !ok {
                self.broken_accessors.insert(i);
            }
        }

        for (i, image) in doc.images.iter().enumerate() {
            if let Some(view) = image.buffer_view {
                let path = Path::item("images", i).field("bufferView");
                self.check_index(path, "bufferView", view, view_count);
            }
        }

        for (m, mesh) in doc.meshes.iter().enumerate() {
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                let path = Path::item("meshes", m).field("primitives").index(p);
                for (semantic, &accessor) in &primitive.attributes {
                    self.check_accessor_ref(path.field("attributes").field(semantic), accessor);
                }
                if let Some(indices) = primitive.indices {
                    self.check_accessor_ref(path.field("indices"), indices);
                }
                if let Some(material) = primitive.material {
                    self.check_index(
                        path.field("material"),
                        "material",
                        material,
                        doc.materials.len(),
                    );
                }
                for (t, target) in primitive.targets.iter().enumerate() {
                    for (semantic, &accessor) in target {
                        self.check_accessor_ref(
                            path.field("targets").index(t).field(semantic),
                            accessor,
                        );
                    }
                }
            }
        }

        for (n, node) in doc.nodes.iter().enumerate() {
            let path = Path::item("nodes", n);
            if let Some(mesh) = node.mesh {
                self.check_index(path.field("mesh"), "mesh", mesh, doc.meshes.len());
            }
            if let Some(skin) = node.skin {
                self.check_index(path.field("skin"), "skin", skin, doc.skins.len());
            }
            if let Some(camera) = node.camera {
                self.check_index(path.field("camera"), "camera", camera, doc.cameras.len());
            }
            for (k, &child) in node.children.iter().enumerate() {
                self.check_index(path.field("children").index(k), "node", child, node_count);
            }
        }

        for (s, skin) in doc.skins.iter().enumerate() {
            let path = Path::item("skins", s);
            if let Some(ibm) = skin.inverse_bind_matrices {
                self.check_accessor_ref(path.field("inverseBindMatrices"), ibm);
            }
            if let Some(skeleton) = skin.skeleton {
                self.check_index(path.field("skeleton"), "node", skeleton, node_count);
            }
            for (j, &joint) in skin.joints.iter().enumerate() {
                self.check_index(path.field("joints").index(j), "node", joint, node_count);
            }
        }

        for (a, animation) in doc.animations.iter().enumerate() {
            let path = Path::item("animations", a);
            for (s, sampler) in animation.samplers.iter().enumerate() {
                let sampler_path = path.field("samplers").index(s);
                self.check_accessor_ref(sampler_path.field("input"), sampler.input);
                self.check_accessor_ref(sampler_path.field("output"), sampler.output);
            }
            for (c, channel) in animation.channels.iter().enumerate() {
                let channel_path = path.field("channels").index(c);
                self.check_index(
                    channel_path.field("sampler"),
                    "sampler",
                    channel.sampler,
                    animation.samplers.len(),
                );
                self.check_index(
                    channel_path.field("target").field("node"),
                    "node",
                    channel.target.node,
                    node_count,
                );
            }
        }

        for (s, scene) in doc.scenes.iter().enumerate() {
            for (k, &node) in scene.nodes.iter().enumerate() {
                let path = Path::item("scenes", s).field("nodes").index(k);
                self.check_index(path, "node", node, node_count);
            }
        }

        if let Some(scene) = doc.scene {
            self.check_index(Path::new().field("scene"), "scene", scene, doc.scenes.len());
        }
    }
}
