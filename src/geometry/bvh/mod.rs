// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used to shortlist face pairs before any exact intersection test
//!
//! The hierarchy is implicit: node relationships follow from the node index
//! (see [`implicit`]) and only the real nodes' boxes are stored, packed
//! breadth first into one array that is sized once.

pub mod implicit;
pub mod morton;

pub use implicit::ImplicitLayout;

use super::descriptor::FaceDescriptor;
use super::{BoundingBox, HalfEdgeMesh};
use rayon::prelude::*;

/// Primitive count from which Morton codes are computed on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Implicit bounding volume hierarchy over a set of boxes
#[derive(Debug, Clone)]
pub struct ImplicitBvh {
    /// `None` for an empty hierarchy
    layout: Option<ImplicitLayout>,
    /// Boxes of the real nodes, indexed by storage slot
    nodes: Vec<BoundingBox>,
    /// Primitive owned by each leaf, in Morton order
    leaf_primitives: Vec<usize>,
    /// Sorted Morton codes, parallel to `leaf_primitives`
    morton_codes: Vec<u32>,
}

impl ImplicitBvh {
    /// Build over `boxes`; primitive `i` is `boxes[i]`
    pub fn build(boxes: &[BoundingBox]) -> Self {
        Self::build_with_threshold(boxes, DEFAULT_PARALLEL_THRESHOLD)
    }

    /// Build, computing and sorting Morton codes in parallel when there are at
    /// least `parallel_threshold` primitives
    pub fn build_with_threshold(boxes: &[BoundingBox], parallel_threshold: usize) -> Self {
        let t = boxes.len();
        if t == 0 {
            return Self {
                layout: None,
                nodes: Vec::new(),
                leaf_primitives: Vec::new(),
                morton_codes: Vec::new(),
            };
        }

        let scene = boxes
            .iter()
            .fold(BoundingBox::empty(), |acc, b| acc.union(b));
        let code = |(i, b): (usize, &BoundingBox)| {
            (morton::morton3d_point(&scene.normalize(&b.center())), i)
        };

        let parallel = t >= parallel_threshold;
        let mut keyed: Vec<(u32, usize)> = if parallel {
            boxes.par_iter().enumerate().map(code).collect()
        } else {
            boxes.iter().enumerate().map(code).collect()
        };
        if parallel {
            keyed.par_sort_unstable();
        } else {
            keyed.sort_unstable();
        }

        let layout = ImplicitLayout::new(t);
        let mut nodes = vec![BoundingBox::empty(); layout.size()];

        for (j, &(_, primitive)) in keyed.iter().enumerate() {
            if let Some(slot) = layout.mem_index(layout.leaf_node(j)) {
                nodes[slot] = boxes[primitive];
            }
        }

        // internal nodes, deepest level first
        for level in (0..layout.leaf_level()).rev() {
            let leftmost = implicit::get_level_leftmost_node(level);
            for node in leftmost..=layout.rightmost_real_on_level(level) {
                let bbox = layout
                    .children(node)
                    .filter_map(|c| layout.mem_index(c))
                    .fold(BoundingBox::empty(), |acc, slot| acc.union(&nodes[slot]));
                if let Some(slot) = layout.mem_index(node) {
                    nodes[slot] = bbox;
                }
            }
        }

        log::debug!(
            "built implicit BVH: {} primitives, {} real nodes, {} levels{}",
            t,
            layout.size(),
            layout.leaf_level() + 1,
            if parallel { " (parallel)" } else { "" }
        );

        let (morton_codes, leaf_primitives): (Vec<u32>, Vec<usize>) = keyed.into_iter().unzip();
        Self {
            layout: Some(layout),
            nodes,
            leaf_primitives,
            morton_codes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none()
    }

    pub fn primitive_count(&self) -> usize {
        self.leaf_primitives.len()
    }

    /// Number of stored (real) nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn layout(&self) -> Option<&ImplicitLayout> {
        self.layout.as_ref()
    }

    /// Primitive indices in Morton order
    pub fn primitive_order(&self) -> &[usize] {
        &self.leaf_primitives
    }

    pub fn morton_codes(&self) -> &[u32] {
        &self.morton_codes
    }

    pub fn is_real_node(&self, node: usize) -> bool {
        self.layout.map_or(false, |l| l.is_real(node))
    }

    pub fn node_mem_index(&self, node: usize) -> Option<usize> {
        self.layout.and_then(|l| l.mem_index(node))
    }

    pub fn node_bbox(&self, node: usize) -> Option<&BoundingBox> {
        self.node_mem_index(node).map(|slot| &self.nodes[slot])
    }

    pub fn is_leaf(&self, node: usize) -> bool {
        self.layout.map_or(false, |l| l.is_leaf(node))
    }

    /// Primitive stored at a real leaf
    pub fn leaf_primitive(&self, node: usize) -> Option<usize> {
        let layout = self.layout?;
        if !layout.is_leaf(node) {
            return None;
        }
        let first = implicit::get_level_leftmost_node(layout.leaf_level());
        self.leaf_primitives.get(node - first).copied()
    }

    pub fn root_bbox(&self) -> Option<&BoundingBox> {
        self.node_bbox(0)
    }

    /// Primitives whose box overlaps `bbox`
    pub fn query_box(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        let Some(layout) = self.layout else {
            return result;
        };

        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if !self.nodes[self.slot(&layout, node)].intersects(bbox) {
                continue;
            }
            if layout.is_leaf(node) {
                result.extend(self.leaf_primitive(node));
            } else {
                stack.extend(layout.children(node));
            }
        }
        result
    }

    /// Pairs `(mine, theirs)` of primitives whose leaf boxes overlap
    pub fn query_overlap(&self, other: &ImplicitBvh) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let (Some(a), Some(b)) = (self.layout, other.layout) else {
            return pairs;
        };

        let mut stack = vec![(0usize, 0usize)];
        while let Some((na, nb)) = stack.pop() {
            let box_a = &self.nodes[self.slot(&a, na)];
            let box_b = &other.nodes[other.slot(&b, nb)];
            if !box_a.intersects(box_b) {
                continue;
            }

            let (leaf_a, leaf_b) = (a.is_leaf(na), b.is_leaf(nb));
            if leaf_a && leaf_b {
                if let (Some(pa), Some(pb)) = (self.leaf_primitive(na), other.leaf_primitive(nb)) {
                    pairs.push((pa, pb));
                }
                continue;
            }

            // descend into the shallower node so both sides shrink evenly
            let descend_a = !leaf_a
                && (leaf_b
                    || implicit::get_level_from_implicit_idx(na)
                        <= implicit::get_level_from_implicit_idx(nb));
            if descend_a {
                stack.extend(a.children(na).map(|ca| (ca, nb)));
            } else {
                stack.extend(b.children(nb).map(|cb| (na, cb)));
            }
        }
        pairs
    }

    #[inline]
    fn slot(&self, layout: &ImplicitLayout, node: usize) -> usize {
        // traversal only visits real nodes
        layout
            .mem_index(node)
            .unwrap_or_else(|| unreachable!("virtual node {} reached during traversal", node))
    }
}

/// Implicit BVH over the faces of a half-edge mesh
#[derive(Debug, Clone)]
pub struct MeshBvh {
    faces: Vec<FaceDescriptor>,
    bvh: ImplicitBvh,
}

impl MeshBvh {
    pub fn build(mesh: &HalfEdgeMesh) -> Self {
        Self::build_with_threshold(mesh, DEFAULT_PARALLEL_THRESHOLD)
    }

    pub fn build_with_threshold(mesh: &HalfEdgeMesh, parallel_threshold: usize) -> Self {
        let faces: Vec<FaceDescriptor> = mesh.faces().collect();
        let boxes: Vec<BoundingBox> = faces.iter().map(|&f| mesh.face_bounding_box(f)).collect();
        Self {
            bvh: ImplicitBvh::build_with_threshold(&boxes, parallel_threshold),
            faces,
        }
    }

    pub fn bvh(&self) -> &ImplicitBvh {
        &self.bvh
    }

    /// Face owned by primitive index `i`
    pub fn face(&self, i: usize) -> FaceDescriptor {
        self.faces[i]
    }

    /// Faces whose box overlaps `bbox`
    pub fn query_box(&self, bbox: &BoundingBox) -> Vec<FaceDescriptor> {
        self.bvh
            .query_box(bbox)
            .into_iter()
            .map(|i| self.faces[i])
            .collect()
    }

    /// Candidate `(self face, other face)` pairs whose boxes overlap
    pub fn overlapping_faces(&self, other: &MeshBvh) -> Vec<(FaceDescriptor, FaceDescriptor)> {
        self.bvh
            .query_overlap(&other.bvh)
            .into_iter()
            .map(|(a, b)| (self.faces[a], other.faces[b]))
            .collect()
    }
}
