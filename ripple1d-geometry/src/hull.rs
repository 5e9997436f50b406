use ripple1d_common::structures::Point2D;
use ripple1d_model::types::CrossSection;

/// Builds the closing polygon for a run of cross-sections, ordered from
/// upstream to downstream (spec §4.2): the first cross-section's cut-line
/// reversed, then the left-bank endpoint of every cross-section in order,
/// then the last cross-section's cut-line, then the right-bank endpoint of
/// every cross-section in reverse order. The cut-lines must already be
/// oriented left-bank-first (see [`crate::direction::is_correctly_drawn`]).
///
/// Returns `None` if `cross_sections` is empty or either bounding
/// cross-section has fewer than two cut-line vertices.
pub fn concave_hull(cross_sections: &[&CrossSection]) -> Option<Vec<Point2D>> {
    let first = *cross_sections.first()?;
    let last = *cross_sections.last()?;
    if first.cut_line.len() < 2 || last.cut_line.len() < 2 {
        return None;
    }

    let mut ring: Vec<Point2D> = first.cut_line.iter().rev().copied().collect();
    for xs in cross_sections {
        ring.push(xs.cut_line[0]);
    }
    ring.extend(last.cut_line.iter().copied());
    for xs in cross_sections.iter().rev() {
        ring.push(*xs.cut_line.last().expect("checked non-empty above"));
    }
    Some(ring)
}

/// Closing polygons for a set of reaches meeting at a junction: each
/// reach's run of cross-sections closes independently, since the junction
/// itself has no cut-lines of its own to stitch the hulls together (spec
/// §4.2 "for a set spanning a junction, combine the closing hulls of
/// contributing reaches").
pub fn concave_hulls_for_reaches(reaches: &[Vec<&CrossSection>]) -> Vec<Vec<Point2D>> {
    reaches.iter().filter_map(|xs| concave_hull(xs)).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_common::structures::StationSeries;

    fn xs(river_station: f64, left_x: f64, right_x: f64, y: f64) -> CrossSection {
        CrossSection {
            river: "Test River".to_string(),
            reach: "Test Reach".to_string(),
            river_station,
            interpolated: false,
            left_reach_length: 0.0,
            channel_reach_length: 0.0,
            right_reach_length: 0.0,
            cut_line: vec![Point2D::new(left_x, y), Point2D::new(right_x, y)],
            station_elevation: StationSeries::new(Vec::new()),
            left_bank_station: 0.0,
            right_bank_station: 0.0,
            mannings: Vec::new(),
            source_block: Vec::new(),
        }
    }

    #[test]
    fn hull_closes_a_two_section_reach() {
        let a = xs(200.0, -10.0, 10.0, 0.0);
        let b = xs(100.0, -8.0, 8.0, 100.0);
        let hull = concave_hull(&[&a, &b]).unwrap();
        // reversed first cut-line (right, left) + left endpoints (a, b) +
        // last cut-line (left, right) + right endpoints reversed (b, a)
        assert_eq!(
            hull,
            vec![
                Point2D::new(10.0, 0.0),
                Point2D::new(-10.0, 0.0),
                Point2D::new(-10.0, 0.0),
                Point2D::new(-8.0, 100.0),
                Point2D::new(-8.0, 100.0),
                Point2D::new(8.0, 100.0),
                Point2D::new(8.0, 100.0),
                Point2D::new(10.0, 0.0),
            ]
        );
    }

    #[test]
    fn hull_is_none_for_empty_input() {
        assert!(concave_hull(&[]).is_none());
    }
}
