//! Top-level acceleration structure over heterogeneous instances, built by
//! agglomerative clustering rather than top-down splitting: with instance
//! counts in the hundreds to low thousands, repeatedly merging mutual
//! nearest neighbors produces a better tree than a median split and
//! tolerates arbitrary instance overlap.

use crate::aabb::Aabb;
use crate::instance::Instance;
use crate::ray::{Interval, Ray};
use crate::primitive::Hit;
use log::debug;
use std::sync::Arc;

/// `left_right == 0` marks a leaf (its instance is `blas`); otherwise the
/// low 16 bits are the left child node index and the high 16 the right.
#[derive(Clone, Copy)]
struct TlasNode {
    bbox: Aabb,
    left_right: u32,
    blas: u32,
}

impl TlasNode {
    fn is_leaf(&self) -> bool {
        self.left_right == 0
    }

    fn left(&self) -> u32 {
        self.left_right & 0xFFFF
    }

    fn right(&self) -> u32 {
        self.left_right >> 16
    }
}

const STACK_SIZE: usize = 64;

/// The top-level structure, owning its instances by `Arc` so a TLAS is a
/// self-contained value rather than a borrow tied to a scene builder's
/// stack frame.
pub struct Tlas {
    nodes: Vec<TlasNode>,
    instances: Vec<Arc<dyn Instance>>,
}

impl Tlas {
    /// Builds a TLAS over `instances` by agglomerative clustering. `M == 0`
    /// produces a root that always misses; `M == 1` produces a root that
    /// is a leaf pointing directly at the one instance.
    pub fn build(instances: Vec<Arc<dyn Instance>>) -> Self {
        let m = instances.len();

        if m == 0 {
            debug!("tlas build: 0 instances, empty root");
            return Self {
                nodes: vec![TlasNode {
                    bbox: Aabb::empty(),
                    left_right: 0,
                    blas: 0,
                }],
                instances,
            };
        }

        let mut nodes = vec![
            TlasNode {
                bbox: Aabb::empty(),
                left_right: 0,
                blas: 0,
            };
            2 * m
        ];
        let mut nodes_used = 1usize;
        let mut list: Vec<u32> = Vec::with_capacity(m);
        for (i, instance) in instances.iter().enumerate() {
            let idx = nodes_used;
            nodes_used += 1;
            nodes[idx] = TlasNode {
                bbox: instance.world_bounds(),
                left_right: 0,
                blas: i as u32,
            };
            list.push(idx as u32);
        }

        if m == 1 {
            nodes[0] = nodes[list[0] as usize];
        } else {
            let mut a = 0usize;
            let mut b = find_best_match(&nodes, &list, a);
            while list.len() > 1 {
                let c = find_best_match(&nodes, &list, b);
                if a == c {
                    let node_a_idx = list[a];
                    let node_b_idx = list[b];
                    let merged_bbox = nodes[node_a_idx as usize]
                        .bbox
                        .union(&nodes[node_b_idx as usize].bbox);
                    let new_idx = nodes_used;
                    nodes_used += 1;
                    nodes[new_idx] = TlasNode {
                        bbox: merged_bbox,
                        left_right: node_a_idx | (node_b_idx << 16),
                        blas: 0,
                    };
                    list[a] = new_idx as u32;
                    list.swap_remove(b);
                    b = find_best_match(&nodes, &list, a);
                } else {
                    a = b;
                    b = c;
                }
            }
            nodes[0] = nodes[list[a] as usize];
        }

        debug!("tlas build: {} instances, {} nodes used", m, nodes_used);
        Self { nodes, instances }
    }

    /// Mirrors [`crate::bvh::Blas::intersect`]'s stackless traversal: every
    /// node visited, pushed or popped, is re-tested against `closest_t`.
    pub fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit> {
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
                if !self.instances.is_empty() {
                    if let Some(hit) = self.instances[node.blas as usize].intersect(ray, narrowed) {
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

            let child_a = node.left();
            let child_b = node.right();
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
                debug_assert!(stack_len < STACK_SIZE, "TLAS traversal stack overflow");
                if stack_len < STACK_SIZE {
                    stack[stack_len] = far;
                    stack_len += 1;
                }
            }
        }
    }
}

/// The position in `list` (not a node index) whose bounds union with
/// `list[x]` has the smallest half-surface-area, excluding `x` itself.
fn find_best_match(nodes: &[TlasNode], list: &[u32], x: usize) -> usize {
    let mut best_pos = usize::MAX;
    let mut best_half_area = f32::INFINITY;
    let bbox_x = nodes[list[x] as usize].bbox;
    for (pos, &node_idx) in list.iter().enumerate() {
        if pos == x {
            continue;
        }
        let half_area = bbox_x.union(&nodes[node_idx as usize].bbox).surface_area_half();
        if half_area < best_half_area {
            best_half_area = half_area;
            best_pos = pos;
        }
    }
    best_pos
}
