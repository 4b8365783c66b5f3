//! Material shading is out of this crate's scope in depth, but the
//! renderer needs something to call: a small `scatter`/`emitted` contract
//! (matching the reference path tracer's `material` interface) and four
//! concrete materials sufficient to exercise the BVH/TLAS pipeline
//! end-to-end.

use crate::color::{self, Color};
use crate::primitive::Hit;
use crate::ray::Ray;
use crate::rng::Rng;
use cgmath::{InnerSpace, Point3};

/// `scatter` returns the attenuation and the next ray if the surface
/// scatters incoming light; `emitted` returns any light the surface itself
/// contributes regardless of scattering.
pub trait Material: Send + Sync {
    fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn Rng) -> Option<(Color, Ray)>;

    fn emitted(&self, _u: f32, _v: f32, _p: Point3<f32>) -> Color {
        color::black()
    }
}

/// A uniformly random unit vector, via rejection sampling in the unit
/// cube. Used for cosine-weighted-ish diffuse scatter.
fn random_unit_vector(rng: &mut dyn Rng) -> cgmath::Vector3<f32> {
    loop {
        let v = cgmath::Vector3::new(
            rng.random_range(-1.0, 1.0),
            rng.random_range(-1.0, 1.0),
            rng.random_range(-1.0, 1.0),
        );
        let len2 = v.magnitude2();
        if len2 > 1e-12 && len2 <= 1.0 {
            return v / len2.sqrt();
        }
    }
}

/// Perfect diffuse reflection: scatters towards `normal + random_unit_vector`.
pub struct Lambertian {
    pub albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, hit: &Hit, rng: &mut dyn Rng) -> Option<(Color, Ray)> {
        let mut scatter_direction = hit.normal + random_unit_vector(rng);
        if scatter_direction.magnitude2() < 1e-12 {
            scatter_direction = hit.normal;
        }
        Some((self.albedo, Ray::new(hit.point, scatter_direction)))
    }
}

/// Specular reflection with a fuzz radius; absorbs rays that would bounce
/// back into the surface after fuzzing.
pub struct Metal {
    pub albedo: Color,
    pub fuzz: f32,
}

impl Metal {
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.min(1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn Rng) -> Option<(Color, Ray)> {
        let unit_dir = ray_in.direction.normalize();
        let reflected = unit_dir - 2.0 * unit_dir.dot(hit.normal) * hit.normal;
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);
        if scattered_dir.dot(hit.normal) > 0.0 {
            Some((self.albedo, Ray::new(hit.point, scattered_dir)))
        } else {
            None
        }
    }
}

/// Refracts or reflects according to Schlick's approximation; never
/// absorbs.
pub struct Dielectric {
    pub refraction_index: f32,
}

impl Dielectric {
    pub fn new(refraction_index: f32) -> Self {
        Self { refraction_index }
    }

    fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
        let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
        let r0 = r0 * r0;
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn Rng) -> Option<(Color, Ray)> {
        let ri = if hit.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_dir = ray_in.direction.normalize();
        let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        let cannot_refract = ri * sin_theta > 1.0;
        let direction = if cannot_refract || Self::reflectance(cos_theta, ri) > rng.random_f32() {
            unit_dir - 2.0 * unit_dir.dot(hit.normal) * hit.normal
        } else {
            let r_out_perp = ri * (unit_dir + cos_theta * hit.normal);
            let r_out_parallel = -(1.0 - r_out_perp.magnitude2()).abs().sqrt() * hit.normal;
            r_out_perp + r_out_parallel
        };

        Some((color::white(), Ray::new(hit.point, direction)))
    }
}

/// Emits a constant color and never scatters.
pub struct DiffuseLight {
    pub emit: Color,
}

impl DiffuseLight {
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _hit: &Hit, _rng: &mut dyn Rng) -> Option<(Color, Ray)> {
        None
    }

    fn emitted(&self, _u: f32, _v: f32, _p: Point3<f32>) -> Color {
        self.emit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ChaChaRng;

    #[test]
    fn metal_absorbs_rays_that_would_bounce_into_the_surface() {
        let metal: std::sync::Arc<dyn Material> = std::sync::Arc::new(Metal::new(color::white(), 0.0));
        let ray_in = Ray::new(Point3::new(0.0, 1.0, 0.0), cgmath::Vector3::new(0.0, -1.0, 0.0));
        let hit = Hit::new(
            &ray_in,
            1.0,
            Point3::new(0.0, 0.0, 0.0),
            cgmath::Vector3::new(0.0, 1.0, 0.0),
            0.0,
            0.0,
            metal.clone(),
        );
        let mut rng = ChaChaRng::for_task(0, 0);
        let scattered = metal.scatter(&ray_in, &hit, &mut rng);
        assert!(scattered.is_some());
    }

    #[test]
    fn diffuse_light_never_scatters_but_emits() {
        let light: std::sync::Arc<dyn Material> =
            std::sync::Arc::new(DiffuseLight::new(Color::new(4.0, 4.0, 4.0)));
        let ray_in = Ray::new(Point3::new(0.0, 0.0, 0.0), cgmath::Vector3::new(0.0, 0.0, -1.0));
        let hit = Hit::new(
            &ray_in,
            1.0,
            Point3::new(0.0, 0.0, -1.0),
            cgmath::Vector3::new(0.0, 0.0, 1.0),
            0.0,
            0.0,
            light.clone(),
        );
        let mut rng = ChaChaRng::for_task(0, 0);
        assert!(light.scatter(&ray_in, &hit, &mut rng).is_none());
        assert_eq!(light.emitted(0.0, 0.0, Point3::new(0.0, 0.0, 0.0)), Color::new(4.0, 4.0, 4.0));
    }
}
