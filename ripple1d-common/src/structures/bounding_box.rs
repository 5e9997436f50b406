/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

use super::Point2D;

/// An axis-aligned bounding box, used for coarse overlap tests before the
/// more expensive exact intersection routines in `algorithms::line_ops` and
/// `algorithms::poly_ops` run.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn from_two_points(p1: Point2D, p2: Point2D) -> BoundingBox {
        BoundingBox {
            min_x: p1.x.min(p2.x),
            max_x: p1.x.max(p2.x),
            min_y: p1.y.min(p2.y),
            max_y: p1.y.max(p2.y),
        }
    }

    pub fn from_points(points: &[Point2D]) -> BoundingBox {
        let mut bb = BoundingBox {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for p in points {
            bb.min_x = bb.min_x.min(p.x);
            bb.max_x = bb.max_x.max(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_y = bb.max_y.max(p.y);
        }
        bb
    }

    /// Grows this box (in place) so that it also contains `other`.
    pub fn expand_to(&mut self, other: BoundingBox) {
        if other.min_x < self.min_x {
            self.min_x = other.min_x;
        }
        if other.max_x > self.max_x {
            self.max_x = other.max_x;
        }
        if other.min_y < self.min_y {
            self.min_y = other.min_y;
        }
        if other.max_y > self.max_y {
            self.max_y = other.max_y;
        }
    }

    pub fn contains_point(&self, p: Point2D) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn overlaps(&self, other: BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Buffers the box uniformly by `dist` in each direction; used by the
    /// terrain builder (spec §4.6) and the conflator's envelope extraction
    /// (spec §4.4).
    pub fn buffered(&self, dist: f64) -> BoundingBox {
        BoundingBox::new(
            self.min_x - dist,
            self.max_x + dist,
            self.min_y - dist,
            self.max_y + dist,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overlap_is_symmetric() {
        let a = BoundingBox::new(0.0, 1.0, 0.0, 1.0);
        let b = BoundingBox::new(0.5, 1.5, 0.5, 1.5);
        let c = BoundingBox::new(2.0, 3.0, 2.0, 3.0);
        assert!(a.overlaps(b));
        assert!(b.overlaps(a));
        assert!(!a.overlaps(c));
    }
}
