use ripple1d_common::structures::{Point2D, Polyline};

/// One planar unit, used to offset a cut-line to its geometric right for
/// the direction check (spec §4.2).
const OFFSET_UNIT: f64 = 1.0;

/// Tests whether a cross-section's cut-line is drawn right-to-left looking
/// downstream: offsetting the whole cut-line one unit to its own geometric
/// right (the side you'd pass walking from its first vertex to its last)
/// must land the crossing further upstream along `centerline` than the
/// unoffset cut-line (spec §4.2).
///
/// Sections failing this check must be reversed before hull construction.
/// Returns `true` (benefit of the doubt) when the cut-line or centerline
/// degenerates to a point, or when neither offset direction crosses the
/// centerline at all.
pub fn is_correctly_drawn(cut_line: &Polyline, centerline: &Polyline) -> bool {
    if cut_line.len() < 2 || centerline.len() < 2 {
        return true;
    }
    let Some(intersection) = intersect_with_centerline(cut_line, centerline) else {
        return true;
    };
    let xs_rs = centerline.project(intersection).0;

    let tangent = cutline_tangent(cut_line);
    let right = Point2D::new(tangent.y, -tangent.x);

    if let Some(offset_point) = intersect_with_centerline(&offset(cut_line, right), centerline) {
        let offset_rs = centerline.project(offset_point).0;
        return xs_rs > offset_rs;
    }
    // the cut-line may run past the opposite bank of the reach; retry to the left.
    if let Some(offset_point) = intersect_with_centerline(&offset(cut_line, Point2D::new(-right.x, -right.y)), centerline) {
        let offset_rs = centerline.project(offset_point).0;
        return xs_rs < offset_rs;
    }
    true
}

/// The unit tangent from the cut-line's first vertex to its last.
fn cutline_tangent(cut_line: &Polyline) -> Point2D {
    let first = cut_line.first_vertex();
    let last = cut_line.last_vertex();
    let dx = last.x - first.x;
    let dy = last.y - first.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        Point2D::new(1.0, 0.0)
    } else {
        Point2D::new(dx / len, dy / len)
    }
}

fn offset(line: &Polyline, vector: Point2D) -> Polyline {
    let shifted: Vec<Point2D> = (0..line.len())
        .map(|i| {
            let p = line.get(i);
            Point2D::new(p.x + vector.x * OFFSET_UNIT, p.y + vector.y * OFFSET_UNIT)
        })
        .collect();
    Polyline::new(&shifted, 0)
}

/// The first point where `line` crosses `centerline`, scanning segment pairs
/// in order. `None` if the two never cross.
pub fn intersect_with_centerline(line: &Polyline, centerline: &Polyline) -> Option<Point2D> {
    use ripple1d_common::structures::LineSegment;

    for a in 0..line.len().saturating_sub(1) {
        let seg_a = LineSegment::new(line.get(a), line.get(a + 1));
        for b in 0..centerline.len().saturating_sub(1) {
            let seg_b = LineSegment::new(centerline.get(b), centerline.get(b + 1));
            if let Some(intersection) = seg_a.get_intersection(&seg_b) {
                return Some(intersection.p1);
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    fn straight_centerline() -> Polyline {
        // runs due north, upstream (south) to downstream (north)
        Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(0.0, 100.0)], 0)
    }

    #[test]
    fn correctly_drawn_section_points_to_geometric_right() {
        let centerline = straight_centerline();
        // walking from the first vertex (west) to the last (east), the
        // geometric right is south (upstream on this centerline); the
        // station-0 end should sit on the left bank looking downstream.
        let cut_line = Polyline::new(&[Point2D::new(-10.0, 50.0), Point2D::new(10.0, 50.0)], 1);
        assert!(is_correctly_drawn(&cut_line, &centerline));
    }

    #[test]
    fn reversed_cut_line_fails_the_check() {
        let centerline = straight_centerline();
        let cut_line = Polyline::new(&[Point2D::new(10.0, 50.0), Point2D::new(-10.0, 50.0)], 1);
        assert!(!is_correctly_drawn(&cut_line, &centerline));
    }
}
