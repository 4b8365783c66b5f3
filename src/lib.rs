//! A two-level bounding-volume hierarchy (BLAS + TLAS) built with the
//! surface area heuristic, queried by a stackless iterative traversal, and
//! fed by an embarrassingly parallel Monte Carlo path tracer.
//!
//! Module layout, leaves first: [`aabb`] and [`ray`] are the geometric
//! primitives everything else is built from; [`primitive`] defines the
//! contract every hittable leaf satisfies; [`bvh`] builds and traverses a
//! per-primitive-type bottom-level acceleration structure; [`instance`]
//! wraps a BLAS in a world transform; [`tlas`] clusters instances into a
//! top-level acceleration structure; [`camera`] and [`renderer`] turn a
//! [`tlas::Tlas`] into a finished image.

pub mod aabb;
pub mod bvh;
pub mod camera;
pub mod color;
pub mod encode;
pub mod error;
pub mod instance;
pub mod material;
pub mod primitive;
pub mod ray;
pub mod renderer;
pub mod rng;
pub mod scene;
pub mod shapes;
pub mod tlas;

pub use error::{Error, Result};
