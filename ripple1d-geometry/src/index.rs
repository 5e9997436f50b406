use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ripple1d_common::structures::{Point2D, Polyline};

/// A polyline paired with an opaque ID, indexable by an [`rstar::RTree`] so
/// that `nearest_line_to_point` (spec §4.3) and the conflator's envelope
/// extraction (spec §4.4) can run as bounded-box then exact-distance
/// queries rather than a linear scan of every network reach.
pub struct IndexedPolyline {
    pub id: i64,
    pub polyline: Polyline,
}

impl RTreeObject for IndexedPolyline {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let bb = self.polyline.get_bounding_box();
        AABB::from_corners([bb.min_x, bb.min_y], [bb.max_x, bb.max_y])
    }
}

impl PointDistance for IndexedPolyline {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (_, nearest) = self.polyline.project(Point2D::new(point[0], point[1]));
        nearest.distance_squared(&Point2D::new(point[0], point[1]))
    }
}

/// A spatial index over a set of network-reach polylines.
pub struct PolylineIndex {
    tree: RTree<IndexedPolyline>,
}

impl PolylineIndex {
    pub fn build(items: Vec<IndexedPolyline>) -> PolylineIndex {
        PolylineIndex {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The `k` nearest polylines to `point`, ordered nearest-first
    /// (spec §4.3 `nearest_line_to_point`).
    pub fn nearest(&self, point: Point2D, k: usize) -> Vec<&IndexedPolyline> {
        self.tree
            .nearest_neighbor_iter(&[point.x, point.y])
            .take(k)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(id: i64, pts: &[(f64, f64)]) -> IndexedPolyline {
        let verts: Vec<Point2D> = pts.iter().map(|&(x, y)| Point2D::new(x, y)).collect();
        IndexedPolyline {
            id,
            polyline: Polyline::new(&verts, id as usize),
        }
    }

    #[test]
    fn nearest_orders_by_distance_to_point() {
        let index = PolylineIndex::build(vec![
            line(1, &[(0.0, 0.0), (10.0, 0.0)]),
            line(2, &[(0.0, 100.0), (10.0, 100.0)]),
            line(3, &[(0.0, 5.0), (10.0, 5.0)]),
        ]);
        let nearest = index.nearest(Point2D::new(5.0, 0.0), 2);
        assert_eq!(nearest[0].id, 1);
        assert_eq!(nearest[1].id, 3);
    }
}
