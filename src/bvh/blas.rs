//! Bottom-level BVH: a packed node array built over a single typed
//! primitive array, with binned-SAH splitting and stackless traversal.

use crate::aabb::Aabb;
use crate::bvh::sah;
use crate::primitive::{Hit, Primitive};
use crate::ray::{Interval, Ray};
use log::{debug, trace};

/// A node never holding both children and a primitive range at once:
/// `primitive_count > 0` marks a leaf, whose primitives live at
/// `primitive_indices[left_first .. left_first + primitive_count]`.
/// `primitive_count == 0` marks an interior node whose two children are
/// `left_first` and `left_first + 1` (always adjacent, a build invariant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bbox: Aabb,
    pub left_first: u32,
    pub primitive_count: u32,
}

impl BvhNode {
    fn is_leaf(&self) -> bool {
        self.primitive_count > 0
    }
}

/// A bottom-level acceleration structure over a single array of `T`.
pub struct Blas<T: Primitive> {
    primitives: Vec<T>,
    nodes: Vec<BvhNode>,
    primitive_indices: Vec<u32>,
    nodes_used: usize,
}

const STACK_SIZE: usize = 64;

impl<T: Primitive> Blas<T> {
    /// Builds a BLAS over `primitives`, consuming the array. Recurses at
    /// build time; tree depth is logarithmic in practice for SAH-built
    /// trees over realistic inputs.
    pub fn build(primitives: Vec<T>) -> Self {
        let n = primitives.len();
        let mut nodes = vec![
            BvhNode {
                bbox: Aabb::empty(),
                left_first: 0,
                primitive_count: 0,
            };
            (2 * n).max(1)
        ];
        let mut primitive_indices: Vec<u32> = (0..n as u32).collect();

        nodes[0].left_first = 0;
        nodes[0].primitive_count = n as u32;

        let mut blas = Self {
            primitives,
            nodes,
            primitive_indices,
            nodes_used: 1,
        };
        if n > 0 {
            blas.update_node_bounds(0);
            blas.subdivide(0);
        }
        debug!(
            "blas build: {} primitives, {} nodes used",
            blas.primitives.len(),
            blas.nodes_used
        );
        blas
    }

    pub fn root_bounds(&self) -> Aabb {
        self.nodes[0].bbox
    }

    /// The nodes actually written during the build, for build-determinism
    /// and sibling-adjacency checks.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes[..self.nodes_used]
    }

    /// The primitive-index permutation the build partitioned in place.
    pub fn primitive_indices(&self) -> &[u32] {
        &self.primitive_indices
    }

    fn update_node_bounds(&mut self, node_idx: usize) {
        let node = self.nodes[node_idx];
        let mut bbox = Aabb::empty();
        for i in 0..node.primitive_count {
            let prim_idx = self.primitive_indices[(node.left_first + i) as usize] as usize;
            bbox = bbox.union(&self.primitives[prim_idx].bounding_box());
        }
        self.nodes[node_idx].bbox = bbox;
    }

    fn subdivide(&mut self, node_idx: usize) {
        let node = self.nodes[node_idx];
        let range = node.left_first as usize..(node.left_first + node.primitive_count) as usize;

        let centroids: Vec<_> = range
            .clone()
            .map(|i| self.primitives[self.primitive_indices[i] as usize].centroid())
            .collect();
        let bounds: Vec<_> = range
            .clone()
            .map(|i| self.primitives[self.primitive_indices[i] as usize].bounding_box())
            .collect();

        let split = match sah::find_best_split(&centroids, &bounds) {
            Some(s) => s,
            None => return,
        };

        let no_split_cost = node.primitive_count as f32 * node.bbox.surface_area_half();
        if split.cost >= no_split_cost {
            return;
        }

        let mut i = node.left_first as usize;
        let mut j = (node.left_first + node.primitive_count - 1) as usize;
        while i <= j {
            let prim_idx = self.primitive_indices[i] as usize;
            if self.primitives[prim_idx].centroid()[split.axis] < split.pos {
                i += 1;
            } else {
                self.primitive_indices.swap(i, j);
                if j == 0 {
                    break;
                }
                j -= 1;
            }
        }

        let left_count = i as u32 - node.left_first;
        if left_count == 0 || left_count == node.primitive_count {
            return;
        }

        let left_idx = self.nodes_used;
        let right_idx = self.nodes_used + 1;
        self.nodes_used += 2;

        self.nodes[left_idx] = BvhNode {
            bbox: Aabb::empty(),
            left_first: node.left_first,
            primitive_count: left_count,
        };
        self.nodes[right_idx] = BvhNode {
            bbox: Aabb::empty(),
            left_first: i as u32,
            primitive_count: node.primitive_count - left_count,
        };
        self.nodes[node_idx].left_first = left_idx as u32;
        self.nodes[node_idx].primitive_count = 0;

        self.update_node_bounds(left_idx);
        self.update_node_bounds(right_idx);
        trace!(
            "subdivide node {}: axis {} -> left {} ({} prims), right {} ({} prims)",
            node_idx,
            split.axis,
            left_idx,
            left_count,
            right_idx,
            node.primitive_count - left_count
        );
        self.subdivide(left_idx);
        self.subdivide(right_idx);
    }

    /// Stackless iterative traversal: descends to the nearer child first,
    /// pushing the farther one only when it can still contain a closer hit
    /// than what has been found so far. Every node, whether just descended
    /// into or popped back off the stack, is re-tested against the current
    /// `closest_t` before being visited, since a hit found deeper in one
    /// subtree can make a sibling pushed earlier no longer worth entering.
    pub fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit> {
        if self.primitives.is_empty() {
            return None;
        }

        let mut stack = [0u32; STACK_SIZE];
        let mut stack_len = 0usize;
        let mut node_idx = 0u32;

        let mut closest_t = t_interval.max;
        let mut best: Option<Hit> = None;

        loop {
            let node = self.nodes[node_idx as usize];

            let narrowed = Interval::new(t_interval.min, closest_t);
            if node.bbox.intersect(ray, narrowed) == f32::INFINITY {
                if stack_len == 0 {
                    return best;
                }
                stack_len -= 1;
                node_idx = stack[stack_len];
                continue;
            }

            if node.is_leaf() {
                for i in 0..node.primitive_count {
                    let prim_idx = self.primitive_indices[(node.left_first + i) as usize] as usize;
                    let narrowed = Interval::new(t_interval.min, closest_t);
                    if let Some(hit) = self.primitives[prim_idx].intersect(ray, narrowed) {
                        closest_t = hit.t;
                        best = Some(hit);
                    }
                }
                if stack_len == 0 {
                    return best;
                }
                stack_len -= 1;
                node_idx = stack[stack_len];
                continue;
            }

            let child_a = node.left_first;
            let child_b = node.left_first + 1;
            let bbox_a = self.nodes[child_a as usize].bbox;
            let bbox_b = self.nodes[child_b as usize].bbox;
            let dist_a = bbox_a.intersect(ray, narrowed);
            let dist_b = bbox_b.intersect(ray, narrowed);

            let (near, near_dist, far, far_dist) = if dist_a <= dist_b {
                (child_a, dist_a, child_b, dist_b)
            } else {
                (child_b, dist_b, child_a, dist_a)
            };

            if near_dist == f32::INFINITY {
                if stack_len == 0 {
                    return best;
                }
                stack_len -= 1;
                node_idx = stack[stack_len];
                continue;
            }

            node_idx = near;
            if far_dist != f32::INFINITY {
                debug_assert!(stack_len < STACK_SIZE, "BVH traversal stack overflow");
                if stack_len < STACK_SIZE {
                    stack[stack_len] = far;
                    stack_len += 1;
                }
            }
        }
    }
}
