//! Axis-aligned bounding box: slab-test ray intersection, union, padding,
//! and the surface area the SAH cost function needs.

use crate::ray::{Interval, Ray};
use cgmath::{Matrix4, Point3, Transform};

/// Any axis whose extent is narrower than this is padded symmetrically so
/// the slab test never divides by a degenerate (zero-width) interval.
const PAD_DELTA: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub bmin: Point3<f32>,
    pub bmax: Point3<f32>,
}

impl Aabb {
    /// The canonical empty box. `+inf/-inf` extrema make `union` idempotent
    /// on an empty box without a special case.
    pub fn empty() -> Self {
        Self {
            bmin: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            bmax: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bmin.x > self.bmax.x || self.bmin.y > self.bmax.y || self.bmin.z > self.bmax.z
    }

    /// Treats `a` and `b` as extrema, so either order produces the same box.
    pub fn from_points(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            bmin: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            bmax: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            bmin: Point3::new(
                self.bmin.x.min(other.bmin.x),
                self.bmin.y.min(other.bmin.y),
                self.bmin.z.min(other.bmin.z),
            ),
            bmax: Point3::new(
                self.bmax.x.max(other.bmax.x),
                self.bmax.y.max(other.bmax.y),
                self.bmax.z.max(other.bmax.z),
            ),
        }
    }

    pub fn union_point(&self, p: Point3<f32>) -> Aabb {
        self.union(&Aabb { bmin: p, bmax: p })
    }

    pub fn extent(&self) -> (f32, f32, f32) {
        (
            self.bmax.x - self.bmin.x,
            self.bmax.y - self.bmin.y,
            self.bmax.z - self.bmin.z,
        )
    }

    /// Half the surface area: `dx*dy + dy*dz + dz*dx`. Sufficient for SAH
    /// cost comparisons, which only ever compare relative costs.
    pub fn surface_area_half(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let (dx, dy, dz) = self.extent();
        dx * dy + dy * dz + dz * dx
    }

    pub fn surface_area(&self) -> f32 {
        2.0 * self.surface_area_half()
    }

    pub fn centroid(&self) -> Point3<f32> {
        Point3::new(
            (self.bmin.x + self.bmax.x) * 0.5,
            (self.bmin.y + self.bmax.y) * 0.5,
            (self.bmin.z + self.bmax.z) * 0.5,
        )
    }

    /// Expand any axis narrower than [`PAD_DELTA`] symmetrically, avoiding
    /// degenerate slabs for axis-aligned geometry (a flat triangle or a
    /// plane primitive).
    pub fn pad(&self) -> Aabb {
        let mut bmin = self.bmin;
        let mut bmax = self.bmax;
        for axis in 0..3 {
            if bmax[axis] - bmin[axis] < PAD_DELTA {
                let half = PAD_DELTA * 0.5;
                bmin[axis] -= half;
                bmax[axis] += half;
            }
        }
        Aabb { bmin, bmax }
    }

    /// Transforms the eight corners of the box by `m` and returns the AABB
    /// of the result. Used to compute an instance's world-space bounds from
    /// its BLAS's object-space root box.
    pub fn transform_by_corners(&self, m: &Matrix4<f32>) -> Aabb {
        let corners = [
            Point3::new(self.bmin.x, self.bmin.y, self.bmin.z),
            Point3::new(self.bmax.x, self.bmin.y, self.bmin.z),
            Point3::new(self.bmin.x, self.bmax.y, self.bmin.z),
            Point3::new(self.bmax.x, self.bmax.y, self.bmin.z),
            Point3::new(self.bmin.x, self.bmin.y, self.bmax.z),
            Point3::new(self.bmax.x, self.bmin.y, self.bmax.z),
            Point3::new(self.bmin.x, self.bmax.y, self.bmax.z),
            Point3::new(self.bmax.x, self.bmax.y, self.bmax.z),
        ];
        let mut result = Aabb::empty();
        for c in corners.iter() {
            result = result.union_point(m.transform_point(*c));
        }
        result
    }

    /// Three-slab ray/box intersection. Returns the entry distance (not a
    /// bool): traversal uses it both to order children and to prune
    /// against the current closest hit. Returns `+inf` on a miss, so a
    /// caller never needs to special-case "didn't hit" versus "hit very
    /// far away" when comparing distances.
    pub fn intersect(&self, ray: &Ray, t_interval: Interval) -> f32 {
        let mut tmin = t_interval.min;
        let mut tmax = t_interval.max;

        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let orig = ray.origin[axis];

            let mut t0 = (self.bmin[axis] - orig) * inv_d;
            let mut t1 = (self.bmax[axis] - orig) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            tmin = tmin.max(t0);
            tmax = tmax.min(t1);

            if tmax <= tmin {
                return f32::INFINITY;
            }
        }

        if tmax > 0.0 {
            tmin
        } else {
            f32::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn union_is_associative() {
        let a = Aabb::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::from_points(Point3::new(-1.0, 2.0, 0.0), Point3::new(2.0, 3.0, 1.0));
        let c = Aabb::from_points(Point3::new(5.0, -5.0, 5.0), Point3::new(6.0, -4.0, 6.0));

        let left = a.union(&b.union(&c));
        let right = a.union(&b).union(&c);
        assert_eq!(left, right);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let a = Aabb::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(a.union(&Aabb::empty()), a);
    }

    #[test]
    fn intersect_returns_entry_distance() {
        let bbox = Aabb::from_points(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = bbox.intersect(&ray, Interval::new(0.0, f32::INFINITY));
        assert!(approx(t, 4.0), "expected ~4.0, got {}", t);
    }

    #[test]
    fn intersect_misses_returns_infinity() {
        let bbox = Aabb::from_points(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = bbox.intersect(&ray, Interval::new(0.0, f32::INFINITY));
        assert_eq!(t, f32::INFINITY);
    }

    #[test]
    fn ray_starting_inside_returns_tmin() {
        let bbox = Aabb::from_points(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let t = bbox.intersect(&ray, Interval::new(0.0, f32::INFINITY));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn pad_expands_degenerate_axis() {
        let flat = Aabb::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 1.0));
        let padded = flat.pad();
        assert!(padded.bmax.y - padded.bmin.y >= PAD_DELTA - 1e-9);
    }

    #[test]
    fn surface_area_half_matches_formula() {
        let b = Aabb::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
        let expected = 2.0 * 3.0 + 3.0 * 4.0 + 4.0 * 2.0;
        assert!(approx(b.surface_area_half(), expected));
    }

    #[test]
    fn surface_area_is_double_the_half() {
        let b = Aabb::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
        assert!(approx(b.surface_area(), 2.0 * b.surface_area_half()));
    }
}
