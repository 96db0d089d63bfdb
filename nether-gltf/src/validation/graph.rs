//! Phases 6 and 8: node hierarchy and per-node rules

use hashbrown::HashSet;

use crate::error::{GltfError, Path};

use super::Validator;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl Validator<'_> {
    /// Depth-first search with an on-stack marker; reaching a node that is
    /// still on the stack closes a cycle.
    pub(super) fn check_graph(&mut self) {
        let doc = self.document;
        let nodes = &doc.nodes;

        for (n, node) in nodes.iter().enumerate() {
            let mut seen = HashSet::new();
            for &child in &node.children {
                if !seen.insert(child) {
                    self.report(GltfError::DuplicateChild {
                        path: Path::item("nodes", n).field("children"),
                        child,
                    });
                }
            }
        }

        let mut marks = vec![Mark::Unvisited; nodes.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnStack;
            stack.push((root, 0));

            while let Some(&(node, next)) = stack.last() {
                let Some(&child) = nodes[node].children.get(next) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                match marks.get(child) {
                    Some(Mark::OnStack) => self.report(GltfError::CyclicGraph {
                        path: Path::item("nodes", node).field("children"),
                        node: child,
                    }),
                    Some(Mark::Unvisited) => {
                        marks[child] = Mark::OnStack;
                        stack.push((child, 0));
                    }
                    // Finished subtree, or a dangling index from phase 1
                    Some(Mark::Done) | None => {}
                }
            }
        }
    }

    pub(super) fn check_nodes(&mut self) {
        let doc = self.document;

        let animated: HashSet<usize> = doc
            .animations
            .iter()
            .flat_map(|a| a.channels.iter().map(|c| c.target.node))
            .collect();

        for (n, node) in doc.nodes.iter().enumerate() {
            let path = Path::item("nodes", n);

            if node.matrix.is_some() && node.has_trs() {
                self.report(GltfError::ConflictingTransform {
                    path: path.field("matrix"),
                });
            }
            if node.skin.is_some() && node.mesh.is_none() {
                self.report(GltfError::SkinWithoutMesh {
                    path: path.field("skin"),
                });
            }
            if node.matrix.is_some() && animated.contains(&n) {
                self.report(GltfError::AnimatedMatrixNode {
                    path: path.field("matrix"),
                    node: n,
                });
            }
            if let Some(weights) = &node.weights {
                let targets = node
                    .mesh
                    .and_then(|m| doc.meshes.get(m))
                    .map_or(0, |mesh| mesh.morph_target_count());
                if weights.len() != targets {
                    self.report(GltfError::ShapeMismatch {
                        path: path.field("weights"),
                        expected: targets,
                        actual: weights.len(),
                    });
                }
            }
        }

        for (m, mesh) in doc.meshes.iter().enumerate() {
            let targets = mesh.morph_target_count();
            for (p, primitive) in mesh.primitives.iter().enumerate().skip(1) {
                if primitive.targets.len() != targets {
                    self.report(GltfError::ShapeMismatch {
                        path: Path::item("meshes", m)
                            .field("primitives")
                            .index(p)
                            .field("targets"),
                        expected: targets,
                        actual: primitive.targets.len(),
                    });
                }
            }
            if let Some(weights) = &mesh.weights {
                let targets = mesh.morph_target_count();
                if weights.len() != targets {
                    self.report(GltfError::ShapeMismatch {
                        path: Path::item("meshes", m).field("weights"),
                        expected: targets,
                        actual: weights.len(),
                    });
                }
            }
        }
    }
}
