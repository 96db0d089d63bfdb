//! Scene graph composer
//!
//! Resolves the node hierarchy into local and world transforms. Nodes live in
//! one flat table and reference children by index; traversal is depth-first,
//! children in array order, with `world = parent_world * local`.

use glam::{Mat4, Quat, Vec3};

use crate::animation::Pose;
use crate::error::{GltfError, Path, Result};
use crate::schema::{
    Document, IDENTITY_ROTATION, IDENTITY_SCALE, IDENTITY_TRANSLATION, Node,
};

/// Local TRS transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: [f32; 3],
    /// Quaternion rotation [x, y, z, w]
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: IDENTITY_TRANSLATION,
            rotation: IDENTITY_ROTATION,
            scale: IDENTITY_SCALE,
        }
    }
}

impl Transform {
    /// Rest transform of `node`; a `matrix` is decomposed into TRS
    pub fn from_node(node: &Node) -> Self {
        match node.matrix {
            Some(m) => {
                let (scale, rotation, translation) =
                    Mat4::from_cols_array(&m).to_scale_rotation_translation();
                Self {
                    translation: translation.to_array(),
                    rotation: rotation.to_array(),
                    scale: scale.to_array(),
                }
            }
            None => {
                let (translation, rotation, scale) = node.trs();
                Self {
                    translation,
                    rotation,
                    scale,
                }
            }
        }
    }

    /// `T * R * S`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.scale),
            Quat::from_array(self.rotation),
            Vec3::from_array(self.translation),
        )
    }
}

/// Local matrix of `node`: `matrix` verbatim, else `T * R * S`
pub fn local_matrix(node: &Node) -> Mat4 {
    match node.matrix {
        Some(m) => Mat4::from_cols_array(&m),
        None => Transform::from_node(node).to_matrix(),
    }
}

/// One node as reached along one traversal path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    pub node: usize,
    /// Parent along this path, `None` for a root
    pub parent: Option<usize>,
    pub local: Mat4,
    pub world: Mat4,
}

fn unknown_node(path: Path, index: usize) -> GltfError {
    GltfError::UnknownIndex {
        path,
        kind: "node",
        index,
    }
}

/// Compose world transforms for every node reachable from `roots`
///
/// A node reachable through several parents appears once per path.
///
/// # Errors
///
/// `CyclicGraph` naming the first node found again while still on the
/// current path; `UnknownIndex` for dangling root or child indices.
pub fn compose(document: &Document, roots: &[usize]) -> Result<Vec<NodeTransform>> {
    compose_with(document, roots, |_, node| local_matrix(node))
}

/// [`compose`] with animated TRS from `pose` replacing rest transforms
pub fn compose_posed(
    document: &Document,
    roots: &[usize],
    pose: &Pose,
) -> Result<Vec<NodeTransform>> {
    compose_with(document, roots, |index, node| match pose.transform(index) {
        Some(transform) => transform.to_matrix(),
        None => local_matrix(node),
    })
}

fn compose_with<F>(document: &Document, roots: &[usize], local_of: F) -> Result<Vec<NodeTransform>>
where
    F: Fn(usize, &Node) -> Mat4,
{
    let nodes = &document.nodes;
    let mut on_path = vec![false; nodes.len()];
    let mut out = Vec::with_capacity(nodes.len());

    struct Frame {
        node: usize,
        world: Mat4,
        next: usize,
    }

    for (r, &root) in roots.iter().enumerate() {
        let root_node = nodes
            .get(root)
            .ok_or_else(|| unknown_node(Path::new().field("roots").index(r), root))?;
        let local = local_of(root, root_node);
        out.push(NodeTransform {
            node: root,
            parent: None,
            local,
            world: local,
        });
        on_path[root] = true;
        let mut stack = vec![Frame {
            node: root,
            world: local,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let parent = frame.node;
            let Some(&child) = nodes[parent].children.get(frame.next) else {
                on_path[parent] = false;
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent_world = frame.world;

            let child_node = nodes
                .get(child)
                .ok_or_else(|| unknown_node(Path::item("nodes", parent).field("children"), child))?;
            if on_path[child] {
                return Err(GltfError::CyclicGraph {
                    path: Path::item("nodes", parent).field("children"),
                    node: child,
                });
            }

            let local = local_of(child, child_node);
            let world = parent_world * local;
            out.push(NodeTransform {
                node: child,
                parent: Some(parent),
                local,
                world,
            });
            on_path[child] = true;
            stack.push(Frame {
                node: child,
                world,
                next: 0,
            });
        }
    }

    tracing::debug!(
        "Composed {} transform(s) from {} root(s)",
        out.len(),
        roots.len()
    );
    Ok(out)
}

/// Root nodes of scene `scene`
pub fn scene_nodes(document: &Document, scene: usize) -> Result<&[usize]> {
    document
        .scenes
        .get(scene)
        .map(|s| s.nodes.as_slice())
        .ok_or_else(|| GltfError::UnknownIndex {
            path: Path::new().field("scenes"),
            kind: "scene",
            index: scene,
        })
}

/// Roots of the default scene, or every node without a parent
pub fn default_roots(document: &Document) -> Vec<usize> {
    if let Some(scene) = document.scene.and_then(|s| document.scenes.get(s)) {
        return scene.nodes.clone();
    }
    parent_map(document)
        .iter()
        .enumerate()
        .filter(|(_, parent)| parent.is_none())
        .map(|(node, _)| node)
        .collect()
}

/// Compose every node of scene `scene`
pub fn compose_scene(document: &Document, scene: usize) -> Result<Vec<NodeTransform>> {
    compose(document, scene_nodes(document, scene)?)
}

/// First parent of each node (lowest parent index wins for shared nodes)
pub fn parent_map(document: &Document) -> Vec<Option<usize>> {
    let mut parents = vec![None; document.nodes.len()];
    for (index, node) in document.nodes.iter().enumerate() {
        for &child in &node.children {
            if let Some(slot) = parents.get_mut(child) {
                if slot.is_none() {
                    *slot = Some(index);
                }
            }
        }
    }
    parents
}

/// World transform of `node` along its first-parent chain
///
/// # Errors
///
/// `UnknownIndex` for a bad node index, `CyclicGraph` if the ancestor chain
/// loops back on itself.
pub fn world_transform(document: &Document, node: usize) -> Result<Mat4> {
    let nodes = &document.nodes;
    if node >= nodes.len() {
        return Err(unknown_node(Path::new().field("nodes"), node));
    }

    let parents = parent_map(document);
    let mut visited = vec![false; nodes.len()];
    let mut chain = Vec::new();
    let mut current = Some(node);
    while let Some(index) = current {
        if visited[index] {
            return Err(GltfError::CyclicGraph {
                path: Path::item("nodes", index),
                node: index,
            });
        }
        visited[index] = true;
        chain.push(index);
        current = parents[index];
    }

    Ok(chain
        .iter()
        .rev()
        .fold(Mat4::IDENTITY, |world, &index| world * local_matrix(&nodes[index])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_matrix_verbatim() {
        let m = [
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 6.0, 7.0, 1.0,
        ];
        let node = Node::default().with_matrix(m);
        assert_eq!(local_matrix(&node).to_cols_array(), m);
    }

    #[test]
    fn test_trs_order() {
        // Scale first, then rotate 90 deg about Z, then translate
        let q = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let node = Node::default()
            .with_translation([10.0, 0.0, 0.0])
            .with_rotation(q.to_array())
            .with_scale([2.0, 2.0, 2.0]);
        let p = local_matrix(&node).transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(10.0, 2.0, 0.0), 1e-5), "{:?}", p);
    }

    #[test]
    fn test_transform_from_matrix_node() {
        let expected = Transform {
            translation: [1.0, 2.0, 3.0],
            rotation: IDENTITY_ROTATION,
            scale: [2.0, 2.0, 2.0],
        };
        let node = Node::default().with_matrix(expected.to_matrix().to_cols_array());
        let t = Transform::from_node(&node);
        assert!(Vec3::from(t.translation).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
        assert!(Vec3::from(t.scale).abs_diff_eq(Vec3::splat(2.0), 1e-5));
    }

    #[test]
    fn test_parent_map_first_parent() {
        let document = Document {
            nodes: vec![
                Node::default().with_children(vec![2]),
                Node::default().with_children(vec![2]),
                Node::default(),
            ],
            ..Default::default()
        };
        assert_eq!(parent_map(&document), vec![None, None, Some(0)]);
        assert_eq!(default_roots(&document), vec![0, 1]);
    }
}
