//! A ray and the parametric interval along it that is still of interest.

use cgmath::{Point3, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// The point at parametric distance `t` along the ray.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// A parametric range `[min, max]` along a ray that is still eligible to
/// produce a hit. Narrowed as closer hits are found so farther primitives
/// can be rejected without a full intersection test.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn with_max(&self, max: f32) -> Self {
        Self { min: self.min, max }
    }

    pub fn contains(&self, t: f32) -> bool {
        self.min <= t && t <= self.max
    }
}
