//! Command-line entry point: renders the compiled-in demo scene and
//! writes it either to a `.png` file named by the first positional
//! argument, or as a binary PPM on standard output.

use std::path::Path;
use std::process;

use tracer::camera::CameraConfig;
use tracer::color::Color;
use tracer::renderer::{self, RenderConfig};
use tracer::scene;
use tracer::{encode, Result};
use cgmath::{Point3, Vector3};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("tracer: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let output_path = std::env::args().nth(1);

    let config = RenderConfig {
        camera: CameraConfig {
            aspect_ratio: 16.0 / 9.0,
            image_width: 400,
            vfov_degrees: 20.0,
            lookfrom: Point3::new(-2.0, 2.0, 1.0),
            lookat: Point3::new(0.0, 0.0, -1.0),
            vup: Vector3::new(0.0, 1.0, 0.0),
            defocus_angle_degrees: 0.6,
            focus_dist: 10.0,
        },
        samples_per_pixel: 50,
        max_depth: 10,
        background: Color::new(0.7, 0.8, 1.0),
    };

    config.validate()?;

    let world = scene::demo_scene();
    let image = renderer::render(&config, &world);

    match output_path {
        Some(path) if path.ends_with(".png") => {
            log::info!("writing PNG to {}", path);
            encode::write_png(Path::new(&path), &image)?;
        }
        Some(path) => {
            return Err(tracer::Error::InvalidConfig(format!(
                "unsupported output extension for {:?}, expected .png",
                path
            )));
        }
        None => {
            log::info!("writing PPM to standard output");
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            encode::write_ppm(&mut handle, &image)?;
        }
    }

    Ok(())
}
