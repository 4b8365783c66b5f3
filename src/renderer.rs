//! Ties the camera, materials, and TLAS together into a parallel Monte
//! Carlo path tracer. Each sample is an independent task dispatched across
//! `rayon`'s thread pool; there is no shared mutable state on the hot
//! path, only a final reduction.

use crate::camera::{Camera, CameraConfig};
use crate::color::{self, Color};
use crate::error::{Error, Result};
use crate::ray::{Interval, Ray};
use crate::rng::{ChaChaRng, Rng};
use crate::tlas::Tlas;
use log::info;
use rayon::prelude::*;

/// Fixed per-render salt mixed into each sample task's seed so distinct
/// renders of the same scene don't happen to share a noise pattern.
const RNG_SALT: u64 = 0xC0FF_EE15_BAD5_EED;

/// The shadow-acne epsilon: the lower bound of the ray interval queried
/// against the world must be strictly positive.
const SHADOW_ACNE_EPSILON: f32 = 0.001;

#[derive(Clone, Copy)]
pub struct RenderConfig {
    pub camera: CameraConfig,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub background: Color,
}

impl RenderConfig {
    /// Rejects a configuration that would otherwise fail much later (or
    /// silently misbehave): a zero `image_width` or non-positive
    /// `aspect_ratio` drives [`Camera::new`]'s height computation to zero or
    /// `u32::MAX`, and a zero `samples_per_pixel`/`max_depth` renders a
    /// meaningless image instead of failing fast.
    pub fn validate(&self) -> Result<()> {
        if self.camera.image_width == 0 {
            return Err(Error::InvalidConfig("image_width must be positive".into()));
        }
        if !(self.camera.aspect_ratio > 0.0) {
            return Err(Error::InvalidConfig("aspect_ratio must be positive".into()));
        }
        if self.samples_per_pixel == 0 {
            return Err(Error::InvalidConfig("samples_per_pixel must be positive".into()));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig("max_depth must be positive".into()));
        }
        Ok(())
    }
}

/// The summed (not yet averaged) per-pixel color buffer a render
/// produces, laid out column-major (`i * height + j`) to match the
/// reference implementation; `encode` is responsible for dividing by
/// `samples_per_pixel` and transposing to row-major scanlines.
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub pixels: Vec<Color>,
}

impl Image {
    fn index(&self, i: u32, j: u32) -> usize {
        (i * self.height + j) as usize
    }
}

/// Renders `world` under `config`, returning the summed sample buffer.
pub fn render(config: &RenderConfig, world: &Tlas) -> Image {
    let camera = Camera::new(&config.camera);
    let width = camera.image_width;
    let height = camera.image_height;
    let pixel_count = (width * height) as usize;

    let buffers: Vec<Vec<Color>> = (0..config.samples_per_pixel)
        .into_par_iter()
        .map(|task_index| {
            let mut rng = ChaChaRng::for_task(task_index as u64, RNG_SALT);
            let mut buffer = vec![color::black(); pixel_count];
            for i in 0..width {
                for j in 0..height {
                    let ray = camera.get_ray(i, j, &mut rng);
                    let idx = (i * height + j) as usize;
                    buffer[idx] = ray_color(&ray, config.max_depth, world, config.background, &mut rng);
                }
            }
            info!("completed sample {}/{}", task_index + 1, config.samples_per_pixel);
            buffer
        })
        .collect();

    let mut pixels = vec![color::black(); pixel_count];
    for buffer in &buffers {
        for (acc, sample) in pixels.iter_mut().zip(buffer.iter()) {
            *acc += *sample;
        }
    }

    Image {
        width,
        height,
        samples_per_pixel: config.samples_per_pixel,
        pixels,
    }
}

/// Recursive radiance estimate: emission plus attenuated recursive
/// scatter, or plain emission if the surface doesn't scatter, or the
/// background color on a miss.
fn ray_color(ray: &Ray, depth: u32, world: &Tlas, background: Color, rng: &mut dyn Rng) -> Color {
    if depth == 0 {
        return color::black();
    }

    let hit = match world.intersect(ray, Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY)) {
        Some(hit) => hit,
        None => return background,
    };

    let emitted = hit.material.emitted(hit.u, hit.v, hit.point);

    match hit.material.scatter(ray, &hit, rng) {
        None => emitted,
        Some((attenuation, scattered)) => {
            let recursed = ray_color(&scattered, depth - 1, world, background, rng);
            emitted + Color::new(
                attenuation.x * recursed.x,
                attenuation.y * recursed.y,
                attenuation.z * recursed.z,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Blas;
    use crate::camera::CameraConfig;
    use crate::instance::{BvhInstance, Instance};
    use crate::material::Lambertian;
    use crate::shapes::Sphere;
    use cgmath::{Matrix4, Point3, Vector3};

    #[test]
    fn validate_rejects_zero_image_width() {
        let config = RenderConfig {
            camera: CameraConfig {
                image_width: 0,
                ..CameraConfig::default()
            },
            samples_per_pixel: 1,
            max_depth: 1,
            background: color::black(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_aspect_ratio() {
        let config = RenderConfig {
            camera: CameraConfig {
                aspect_ratio: 0.0,
                ..CameraConfig::default()
            },
            samples_per_pixel: 1,
            max_depth: 1,
            background: color::black(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_samples_or_depth() {
        let base = RenderConfig {
            camera: CameraConfig::default(),
            samples_per_pixel: 1,
            max_depth: 1,
            background: color::black(),
        };
        assert!(RenderConfig { samples_per_pixel: 0, ..base }.validate().is_err());
        assert!(RenderConfig { max_depth: 0, ..base }.validate().is_err());
    }

    #[test]
    fn validate_accepts_a_sane_config() {
        let config = RenderConfig {
            camera: CameraConfig::default(),
            samples_per_pixel: 1,
            max_depth: 1,
            background: color::black(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn render_of_empty_tlas_is_solid_background() {
        let tlas = Tlas::build(vec![]);
        let background = Color::new(0.5, 0.7, 1.0);
        let config = RenderConfig {
            camera: CameraConfig {
                image_width: 4,
                aspect_ratio: 1.0,
                ..CameraConfig::default()
            },
            samples_per_pixel: 1,
            max_depth: 5,
            background,
        };
        let image = render(&config, &tlas);
        for pixel in &image.pixels {
            assert_eq!(*pixel, background);
        }
    }

    #[test]
    fn render_pixel_buffer_is_column_major() {
        let mat: std::sync::Arc<dyn crate::material::Material> =
            std::sync::Arc::new(Lambertian::new(color::white()));
        let blas = std::sync::Arc::new(Blas::build(vec![Sphere::new(Point3::new(0.0, 0.0, -1.0), 50.0, mat)]));
        let instance: std::sync::Arc<dyn Instance> = std::sync::Arc::new(BvhInstance::new(
            blas,
            Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)),
        ));
        let tlas = Tlas::build(vec![instance]);

        let config = RenderConfig {
            camera: CameraConfig {
                image_width: 3,
                aspect_ratio: 1.0,
                ..CameraConfig::default()
            },
            samples_per_pixel: 1,
            max_depth: 5,
            background: Color::new(0.0, 0.0, 0.0),
        };
        let image = render(&config, &tlas);
        assert_eq!(image.pixels.len(), (image.width * image.height) as usize);
        assert_eq!(image.index(1, 1), image.height as usize + 1);
    }
}
