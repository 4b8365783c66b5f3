//! The random-number interface the camera and materials depend on. The BVH,
//! TLAS, and renderer code only ever see the [`Rng`] trait; [`ChaChaRng`] is
//! the one concrete source this crate provides, seeded independently per
//! sample task (see `renderer`).

use rand::{Rng as _, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait Rng {
    /// A uniform random value in `[0, 1)`.
    fn random_f32(&mut self) -> f32;

    /// A uniform random point in the unit disk (`|p| < 1`, `p.z == 0`),
    /// returned as `(x, y)`, via rejection sampling.
    fn random_in_unit_disk(&mut self) -> (f32, f32) {
        loop {
            let x = 2.0 * self.random_f32() - 1.0;
            let y = 2.0 * self.random_f32() - 1.0;
            if x * x + y * y < 1.0 {
                return (x, y);
            }
        }
    }

    /// A uniform random value in `[min, max)`.
    fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.random_f32()
    }
}

/// A `ChaCha8`-backed [`Rng`], one per render sample task.
pub struct ChaChaRng(ChaCha8Rng);

impl ChaChaRng {
    /// Derives an independent generator for `task_index` using a fixed
    /// per-render `salt`, so sample tasks never share RNG state.
    pub fn for_task(task_index: u64, salt: u64) -> Self {
        let seed = task_index
            .wrapping_mul(0x9E3779B97F4A7C15)
            .wrapping_add(salt);
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Rng for ChaChaRng {
    fn random_f32(&mut self) -> f32 {
        self.0.gen_range(0.0..1.0)
    }
}
