use crate::aabb::Aabb;
use crate::material::Material;
use crate::primitive::{Hit, Primitive};
use crate::ray::{Interval, Ray};
use cgmath::{InnerSpace, Point3};
use std::sync::Arc;

/// A sphere fixed in object space; world placement, if any, is applied by
/// wrapping it in a [`crate::instance::BvhInstance`].
pub struct Sphere {
    center: Point3<f32>,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// `(u, v)` texture coordinates of a point on the unit sphere centered
    /// at the origin, matching the reference mapping (`u` around Y from
    /// `x=-1`, `v` from the south pole to the north pole).
    fn uv(p: cgmath::Vector3<f32>) -> (f32, f32) {
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + std::f32::consts::PI;
        (phi / (2.0 * std::f32::consts::PI), theta / std::f32::consts::PI)
    }
}

impl Primitive for Sphere {
    fn intersect(&self, ray: &Ray, t_interval: Interval) -> Option<Hit> {
        let oc = ray.origin - self.center;
        let a = ray.direction.magnitude2();
        let half_b = oc.dot(ray.direction);
        let c = oc.magnitude2() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (-half_b - sqrtd) / a;
        if !t_interval.contains(root) {
            root = (-half_b + sqrtd) / a;
            if !t_interval.contains(root) {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - self.center) / self.radius;
        let (u, v) = Self::uv(outward_normal);
        Some(Hit::new(ray, root, point, outward_normal, u, v, self.material.clone()))
    }

    fn bounding_box(&self) -> Aabb {
        let r = cgmath::Vector3::new(self.radius, self.radius, self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }

    fn centroid(&self) -> Point3<f32> {
        self.center
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

    #[test]
    fn ray_through_center_hits_at_two_roots_nearest_first() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, mat());
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray, Interval::new(0.0, f32::INFINITY)).unwrap();
        assert!(approx(hit.t, 0.5));
        assert!(hit.front_face);
    }

    #[test]
    fn tangent_ray_just_grazes() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, mat());
        let ray = Ray::new(Point3::new(0.0, 0.5, 0.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray, Interval::new(0.0, f32::INFINITY)).is_some());
    }

    #[test]
    fn ray_that_misses_returns_none() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, mat());
        let ray = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray, Interval::new(0.0, f32::INFINITY)).is_none());
    }

    #[test]
    fn ray_originating_inside_returns_far_root() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0, mat());
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = sphere.intersect(&ray, Interval::new(0.0, f32::INFINITY)).unwrap();
        assert!(approx(hit.t, 1.0));
        assert!(!hit.front_face);
    }

    #[test]
    fn bounding_box_matches_center_and_radius() {
        let sphere = Sphere::new(Point3::new(1.0, 2.0, 3.0), 2.0, mat());
        let bbox = sphere.bounding_box();
        assert!(approx(bbox.bmin.x, -1.0));
        assert!(approx(bbox.bmax.x, 3.0));
    }
}
