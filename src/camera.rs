//! Camera basis derivation and per-pixel ray generation, including the
//! defocus-disk depth-of-field model.

use crate::ray::Ray;
use crate::rng::Rng;
use cgmath::{InnerSpace, Point3, Vector3};

/// The user-facing knobs; [`Camera::new`] derives the orthonormal basis,
/// viewport, and pixel deltas from these once per render.
#[derive(Clone, Copy)]
pub struct CameraConfig {
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub vfov_degrees: f32,
    pub lookfrom: Point3<f32>,
    pub lookat: Point3<f32>,
    pub vup: Vector3<f32>,
    pub defocus_angle_degrees: f32,
    pub focus_dist: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            vfov_degrees: 90.0,
            lookfrom: Point3::new(0.0, 0.0, -1.0),
            lookat: Point3::new(0.0, 0.0, 0.0),
            vup: Vector3::new(0.0, 1.0, 0.0),
            defocus_angle_degrees: 0.0,
            focus_dist: 10.0,
        }
    }
}

pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    center: Point3<f32>,
    pixel00_loc: Point3<f32>,
    pixel_delta_u: Vector3<f32>,
    pixel_delta_v: Vector3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    defocus_angle_degrees: f32,
    defocus_disk_u: Vector3<f32>,
    defocus_disk_v: Vector3<f32>,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let image_height = ((config.image_width as f32 / config.aspect_ratio) as u32).max(1);

        let center = config.lookfrom;

        let theta = config.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (config.image_width as f32 / image_height as f32);

        let w = (config.lookfrom - config.lookat).normalize();
        let u = config.vup.cross(w).normalize();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * -v;

        let pixel_delta_u = viewport_u / config.image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            center - config.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = config.focus_dist * (config.defocus_angle_degrees / 2.0).to_radians().tan();
        let defocus_disk_u = defocus_radius * u;
        let defocus_disk_v = defocus_radius * v;

        Self {
            image_width: config.image_width,
            image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            defocus_angle_degrees: config.defocus_angle_degrees,
            defocus_disk_u,
            defocus_disk_v,
        }
    }

    /// A randomly jittered ray through pixel `(i, j)`, originating from the
    /// defocus disk when depth of field is enabled.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn Rng) -> Ray {
        let pixel_center =
            self.pixel00_loc + (i as f32) * self.pixel_delta_u + (j as f32) * self.pixel_delta_v;
        let pixel_sample = pixel_center + self.pixel_sample_square(rng);

        let ray_origin = if self.defocus_angle_degrees <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };
        let ray_direction = pixel_sample - ray_origin;

        Ray::new(ray_origin, ray_direction)
    }

    fn pixel_sample_square(&self, rng: &mut dyn Rng) -> Vector3<f32> {
        let px = -0.5 + rng.random_f32();
        let py = -0.5 + rng.random_f32();
        px * self.pixel_delta_u + py * self.pixel_delta_v
    }

    fn defocus_disk_sample(&self, rng: &mut dyn Rng) -> Point3<f32> {
        let (px, py) = rng.random_in_unit_disk();
        self.center + px * self.defocus_disk_u + py * self.defocus_disk_v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ChaChaRng;

    #[test]
    fn image_height_follows_aspect_ratio() {
        let config = CameraConfig {
            image_width: 200,
            aspect_ratio: 2.0,
            ..CameraConfig::default()
        };
        let camera = Camera::new(&config);
        assert_eq!(camera.image_height, 100);
    }

    #[test]
    fn image_height_never_rounds_to_zero() {
        let config = CameraConfig {
            image_width: 1,
            aspect_ratio: 1000.0,
            ..CameraConfig::default()
        };
        let camera = Camera::new(&config);
        assert_eq!(camera.image_height, 1);
    }

    #[test]
    fn rays_without_defocus_all_share_the_camera_center() {
        let camera = Camera::new(&CameraConfig::default());
        let mut rng = ChaChaRng::for_task(0, 0);
        let ray = camera.get_ray(5, 5, &mut rng);
        assert_eq!(ray.origin, camera.center);
    }
}
