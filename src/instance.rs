//! Placing a BLAS in world space without duplicating its geometry.

use crate::aabb::Aabb;
use crate::bvh::Blas;
use crate::primitive::{Hit, Primitive};
use crate::ray::{Interval, Ray};
use cgmath::{Matrix4, SquareMatrix, Transform};
use std::sync::Arc;

/// The object-space-to-world-space placement of a BLAS.
///
/// The BLAS is held by `Arc` rather than by reference: a scene commonly
/// instances the same geometry many times (the whole point of this
/// module), and `Arc` lets every instance share one BLAS without
/// threading a borrow-checker lifetime from the scene builder through the
/// TLAS, while staying `Send + Sync` for the parallel renderer.
///
/// `t` is preserved under affine transforms only when the direction is
/// not renormalized after being carried into object space, so this
/// carries the raw (non-unit) transformed direction into the BLAS query:
/// under a rigid transform `t` stays in world units, but under
/// non-uniform scale it is measured in object-space units. That is
/// correct for ordering hits within a single instance but can be
/// inconsistent when comparing `t` across instances with different
/// scales. Likewise, the hit normal is carried back by the forward
/// transform rather than its inverse-transpose, which is only exact for
/// rigid transforms (rotation/translation, possibly uniform scale); this
/// crate does not correct for non-uniform scale.
pub struct BvhInstance<T: Primitive> {
    blas: Arc<Blas<T>>,
    transform: Matrix4<f32>,
    inverse_transform: Matrix4<f32>,
    world_bounds: Aabb,
}

impl<T: Primitive> BvhInstance<T> {
    pub fn new(blas: Arc<Blas<T>>, transform: Matrix4<f32>) -> Self {
        let inverse_transform = transform
            .invert()
            .expect("instance transform must be invertible");
        let world_bounds = blas.root_bounds().transform_by_corners(&transform);
        Self {
            blas,
            transform,
            inverse_transform,
            world_bounds,
        }
    }

    pub fn world_bounds(&self) -> Aabb {
        self.world_bounds
    }
}

/// The dynamic-dispatch seam the TLAS needs: it holds instances over
/// heterogeneous primitive types behind one trait object per instance.
pub trait Instance: Send + Sync {
    fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit>;
    fn world_bounds(&self) -> Aabb;
}

impl<T: Primitive> Instance for BvhInstance<T> {
    fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit> {
        let object_origin = self.inverse_transform.transform_point(ray.origin);
        let object_direction = self.inverse_transform.transform_vector(ray.direction);
        let object_ray = Ray::new(object_origin, object_direction);

        self.blas.intersect(&object_ray, t_interval).map(|hit| Hit {
            t: hit.t,
            point: self.transform.transform_point(hit.point),
            normal: self.transform.transform_vector(hit.normal),
            front_face: hit.front_face,
            u: hit.u,
            v: hit.v,
            material: hit.material,
        })
    }

    fn world_bounds(&self) -> Aabb {
        self.world_bounds
    }
}
