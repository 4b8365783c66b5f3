use crate::aabb::Aabb;
use crate::material::Material;
use crate::primitive::{Hit, Primitive};
use crate::ray::{Interval, Ray};
use cgmath::{InnerSpace, Point3};
use std::sync::Arc;

/// Intersection tolerance for the Moller-Trumbore determinant test.
const EPSILON: f32 = 1e-7;

pub struct Triangle {
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
    material: Arc<dyn Material>,
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>, material: Arc<dyn Material>) -> Self {
        Self { v0, v1, v2, material }
    }
}

impl Primitive for Triangle {
    /// Moller-Trumbore, non-culling variant: hits a triangle from either
    /// side, since this crate has no notion of backface culling.
    fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let pvec = ray.direction.cross(edge2);
        let det = edge1.dot(pvec);

        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - self.v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(edge1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(qvec) * inv_det;
        if !t_interval.contains(t) {
            return None;
        }

        let point = ray.at(t);
        let outward_normal = edge1.cross(edge2).normalize();
        Some(Hit::new(ray, t, point, outward_normal, u, v, self.material.clone()))
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.v0, self.v1)
            .union_point(self.v2)
            .pad()
    }

    fn centroid(&self) -> Point3<f32> {
        Point3::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
            (self.v0.z + self.v1.z + self.v2.z) / 3.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::material::Lambertian;
    use cgmath::Vector3;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn mat() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(color::white()))
    }

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            mat(),
        )
    }

    #[test]
    fn ray_through_centroid_hits() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = tri.intersect(&ray, Interval::new(0.0, f32::INFINITY)).unwrap();
        assert!(approx(hit.t, 1.0));
    }

    #[test]
    fn ray_outside_edge_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(2.0, 2.0, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray, Interval::new(0.0, f32::INFINITY)).is_none());
    }

    #[test]
    fn back_facing_ray_still_hits_since_culling_is_disabled() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&ray, Interval::new(0.0, f32::INFINITY)).is_some());
    }

    #[test]
    fn bounding_box_contains_all_vertices() {
        let tri = unit_triangle();
        let bbox = tri.bounding_box();
        assert!(bbox.bmin.x <= 0.0 && bbox.bmax.x >= 1.0);
        assert!(bbox.bmin.y <= 0.0 && bbox.bmax.y >= 1.0);
    }
}
