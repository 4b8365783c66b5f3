//! The contract every hittable leaf satisfies, and the record produced by a
//! successful intersection.

use crate::aabb::Aabb;
use crate::material::Material;
use crate::ray::{Interval, Ray};
use cgmath::{Point3, Vector3};
use std::sync::Arc;

/// A single ray/primitive intersection.
///
/// `material` is a shared, reference-counted handle: the acceleration
/// structures that produce `Hit`s never inspect it, they only carry it
/// back out to the renderer's shading step. Sharing by `Arc` rather than
/// borrowing lets a scene's BLASes, instances, and TLAS all be owned
/// independently without threading a borrow-checker lifetime through the
/// whole crate, and keeps everything `Send + Sync` for the parallel
/// renderer.
pub struct Hit {
    pub t: f32,
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
    pub front_face: bool,
    pub u: f32,
    pub v: f32,
    pub material: Arc<dyn Material>,
}

impl Hit {
    /// Builds a hit record, flipping `normal` so it always points against
    /// the incoming ray and recording whether the original outward normal
    /// already did (`front_face`).
    pub fn new(
        ray: &Ray,
        t: f32,
        point: Point3<f32>,
        outward_normal: Vector3<f32>,
        u: f32,
        v: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        use cgmath::InnerSpace;
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            t,
            point,
            normal,
            front_face,
            u,
            v,
            material,
        }
    }
}

/// Any value that can be intersected by a ray, bounded by an AABB, and
/// reduced to a single representative point for BVH partitioning.
pub trait Primitive: Send + Sync {
    fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit>;
    fn bounding_box(&self) -> Aabb;
    fn centroid(&self) -> Point3<f32>;
}
