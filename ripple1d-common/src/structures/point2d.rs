/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A simple 2-D planar point, used throughout the geometry graph for
/// cut-line vertices, centerline vertices, and projected intersection
/// points.
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

/// The four cardinal directions, used when classifying which side of a
/// cross-section a bank or centerline point falls on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        (self.x - other.x) * (self.x - other.x) + (self.y - other.y) * (self.y - other.y)
    }

    /// Compares two points allowing for floating-point round-off, rather
    /// than requiring bit-for-bit equality.
    pub fn nearly_equals(&self, other: &Point2D) -> bool {
        (self.x - other.x).abs() < 1e-9 && (self.y - other.y).abs() < 1e-9
    }

    /// The 2-D cross product (z-component) of self × other, treating both
    /// as vectors from the origin.
    pub fn cross(&self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// True if `self` lies within the axis-aligned bounding box defined by
    /// `a` and `b` (inclusive), regardless of which of `a`/`b` is the
    /// min/max corner.
    pub fn is_between(&self, a: &Point2D, b: &Point2D) -> bool {
        self.x >= a.x.min(b.x)
            && self.x <= a.x.max(b.x)
            && self.y >= a.y.min(b.y)
            && self.y <= a.y.max(b.y)
    }

    /// Offsets the point one unit in the given cardinal direction; used by
    /// the cross-section direction check (spec §4.2) which offsets a
    /// section "one unit to its geometric right".
    pub fn offset(&self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }

    /// Tests whether `self` is left of, on, or right of the infinite line
    /// through `p0` and `p1`; positive for left, zero for on, negative for
    /// right. Used by the concave-hull interior-point search.
    pub fn is_left(&self, p0: &Point2D, p1: &Point2D) -> f64 {
        (p1.x - p0.x) * (self.y - p0.y) - (self.x - p0.x) * (p1.y - p0.y)
    }

    pub fn midpoint(a: &Point2D, b: &Point2D) -> Point2D {
        Point2D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Average of a set of points, e.g. the centroid of a triangle.
    pub fn centre_point(points: &[Point2D]) -> Point2D {
        let n = points.len() as f64;
        let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2D::new(sx / n, sy / n)
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, other: Point2D) -> Point2D {
        Point2D::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, other: Point2D) -> Point2D {
        Point2D::new(self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
        assert!((a.distance(&b) - b.distance(&a)).abs() < 1e-12);
    }

    #[test]
    fn is_between_accepts_either_corner_order() {
        let p = Point2D::new(1.0, 1.0);
        assert!(p.is_between(&Point2D::new(0.0, 0.0), &Point2D::new(2.0, 2.0)));
        assert!(p.is_between(&Point2D::new(2.0, 2.0), &Point2D::new(0.0, 0.0)));
    }
}
