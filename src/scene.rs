//! Compiled-in scene constructors. There is no scene file format: a scene
//! is a function that builds a primitive array, wraps it in a BLAS,
//! places instances of that BLAS in the world, and clusters the instances
//! into a TLAS.

use crate::bvh::Blas;
use crate::color::Color;
use crate::instance::{BvhInstance, Instance};
use crate::material::{Lambertian, Metal};
use crate::shapes::Sphere;
use crate::tlas::Tlas;
use cgmath::{Matrix4, Point3, SquareMatrix};
use std::sync::Arc;

/// Two spheres: a large "ground" sphere and a smaller one resting on it,
/// each its own instance of a single-primitive BLAS. Used by the
/// single-hit and nearest-hit end-to-end scenarios.
pub fn demo_scene() -> Tlas {
    let ground_material: Arc<dyn crate::material::Material> =
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    let sphere_material: Arc<dyn crate::material::Material> =
        Arc::new(Lambertian::new(Color::new(0.7, 0.3, 0.3)));

    let ground_blas = Arc::new(Blas::build(vec![Sphere::new(
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        ground_material,
    )]));
    let sphere_blas = Arc::new(Blas::build(vec![Sphere::new(
        Point3::new(0.0, 0.0, -1.0),
        0.5,
        sphere_material,
    )]));

    let instances: Vec<Arc<dyn Instance>> = vec![
        Arc::new(BvhInstance::new(ground_blas, Matrix4::identity())),
        Arc::new(BvhInstance::new(sphere_blas, Matrix4::identity())),
    ];

    Tlas::build(instances)
}

/// A 16x16 grid of 256 unit spheres, each instanced from its own
/// single-primitive BLAS via a translation, used to cross-check TLAS
/// traversal against a linear scan over many rays.
pub fn grid_scene() -> Tlas {
    let material: Arc<dyn crate::material::Material> = Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 0.1));

    let mut instances: Vec<Arc<dyn Instance>> = Vec::with_capacity(16 * 16);
    for gx in 0..16 {
        for gz in 0..16 {
            let blas = Arc::new(Blas::build(vec![Sphere::new(
                Point3::new(0.0, 0.0, 0.0),
                0.4,
                material.clone(),
            )]));
            let translation = cgmath::Vector3::new(
                (gx as f32 - 7.5) * 2.0,
                0.0,
                -(gz as f32) * 2.0 - 2.0,
            );
            instances.push(Arc::new(BvhInstance::new(blas, Matrix4::from_translation(translation))));
        }
    }

    Tlas::build(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray::{Interval, Ray};
    use cgmath::Vector3;

    #[test]
    fn demo_scene_is_hit_by_a_central_ray() {
        let tlas = demo_scene();
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(tlas.intersect(&ray, Interval::new(0.0, f32::INFINITY)).is_some());
    }

    #[test]
    fn grid_scene_has_256_instances_reachable_by_rays() {
        let tlas = grid_scene();
        let mut hits = 0;
        for gx in 0..16 {
            let x = (gx as f32 - 7.5) * 2.0;
            let ray = Ray::new(Point3::new(x, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
            if tlas.intersect(&ray, Interval::new(0.0, f32::INFINITY)).is_some() {
                hits += 1;
            }
        }
        assert_eq!(hits, 16);
    }
}
