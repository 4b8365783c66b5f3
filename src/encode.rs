//! Turns a renderer [`Image`] (summed samples, column-major) into bytes:
//! a hand-written binary PPM for standard output, or a PNG file via the
//! `image` crate. Both branches divide by `samples_per_pixel`, apply
//! gamma-2 correction, and transpose into row-major scanline order.

use crate::error::Result;
use crate::renderer::Image;
use std::io::Write;
use std::path::Path;

/// Converts one linear, possibly multi-sample-summed color channel into
/// a gamma-corrected byte, clamping before the scale to 256 avoids
/// rounding a channel exactly at 1.0 up to 256.
fn to_byte(channel: f32, samples_per_pixel: u32) -> u8 {
    let averaged = channel / samples_per_pixel as f32;
    let gamma_corrected = averaged.max(0.0).sqrt();
    (gamma_corrected.clamp(0.0, 0.999) * 256.0) as u8
}

/// Row-major `width * height * 3` RGB bytes, averaged and gamma-corrected
/// from the column-major sample buffer.
fn to_rgb_bytes(image: &Image) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((image.width * image.height * 3) as usize);
    for j in 0..image.height {
        for i in 0..image.width {
            let pixel = image.pixels[(i * image.height + j) as usize];
            bytes.push(to_byte(pixel.x, image.samples_per_pixel));
            bytes.push(to_byte(pixel.y, image.samples_per_pixel));
            bytes.push(to_byte(pixel.z, image.samples_per_pixel));
        }
    }
    bytes
}

/// Writes a binary (P6) PPM to `writer`: a tiny fixed header followed by
/// raw RGB bytes, needing no external crate.
pub fn write_ppm<W: Write>(writer: &mut W, image: &Image) -> Result<()> {
    write!(writer, "P6\n{} {}\n255\n", image.width, image.height)?;
    writer.write_all(&to_rgb_bytes(image))?;
    Ok(())
}

/// Writes `image` as a PNG at `path`, via the `image` crate.
pub fn write_png(path: &Path, image: &Image) -> Result<()> {
    let bytes = to_rgb_bytes(image);
    let buffer = image::RgbImage::from_raw(image.width, image.height, bytes)
        .ok_or_else(|| crate::error::Error::InvalidConfig("image buffer size mismatch".into()))?;
    buffer.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn single_pixel_image(color: Color, samples_per_pixel: u32) -> Image {
        Image {
            width: 1,
            height: 1,
            samples_per_pixel,
            pixels: vec![color],
        }
    }

    #[test]
    fn full_white_averages_to_opaque_white() {
        let image = single_pixel_image(Color::new(3.0, 3.0, 3.0), 3);
        let bytes = to_rgb_bytes(&image);
        assert_eq!(bytes, vec![255, 255, 255]);
    }

    #[test]
    fn black_stays_black() {
        let image = single_pixel_image(Color::new(0.0, 0.0, 0.0), 1);
        let bytes = to_rgb_bytes(&image);
        assert_eq!(bytes, vec![0, 0, 0]);
    }

    #[test]
    fn ppm_header_matches_dimensions() {
        let image = single_pixel_image(Color::new(1.0, 1.0, 1.0), 1);
        let mut out = Vec::new();
        write_ppm(&mut out, &image).unwrap();
        assert!(out.starts_with(b"P6\n1 1\n255\n"));
    }
}
