//! Color arithmetic is out of scope for this crate (materials, tone
//! mapping, and texture sampling live in a full renderer, not its
//! acceleration structures); `Color` is a bare alias over the vector type
//! `cgmath` already supplies arithmetic for.

use cgmath::Vector3;

pub type Color = Vector3<f32>;

pub fn black() -> Color {
    Color::new(0.0, 0.0, 0.0)
}

pub fn white() -> Color {
    Color::new(1.0, 1.0, 1.0)
}
