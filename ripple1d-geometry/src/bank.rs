use ripple1d_common::structures::Polyline;
use ripple1d_model::types::CrossSection;

use crate::direction::intersect_with_centerline;

/// Tests whether a cross-section's banks encompass the channel: the point
/// where its cut-line crosses `centerline` must fall strictly between the
/// left and right bank stations (spec §4.2).
///
/// The intersection is located in the cut-line's own geometric units (the
/// distance from its first vertex), then shifted into station space by
/// adding the first station-elevation point's station — the two scales
/// coincide because HEC-RAS assigns stations as distance along the cut-line
/// starting from that first point. Returns `false` if the cut-line does not
/// cross the centerline at all.
pub fn banks_encompass_channel(xs: &CrossSection, centerline: &Polyline) -> bool {
    if xs.cut_line.len() < 2 || xs.station_elevation.is_empty() {
        return false;
    }
    let cut_line = Polyline::new(&xs.cut_line, 0);
    let Some(intersection) = intersect_with_centerline(&cut_line, centerline) else {
        return false;
    };
    let (distance_along_cutline, _) = cut_line.project(intersection);
    let first_station = xs.station_elevation.points[0].station;
    let intersection_station = first_station + distance_along_cutline;

    intersection_station > xs.left_bank_station && intersection_station < xs.right_bank_station
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_common::structures::{Point2D, StationElevation, StationSeries};

    fn cross_section(cut_line: Vec<Point2D>, left_bank: f64, right_bank: f64) -> CrossSection {
        CrossSection {
            river: "Test River".to_string(),
            reach: "Test Reach".to_string(),
            river_station: 100.0,
            interpolated: false,
            left_reach_length: 0.0,
            channel_reach_length: 0.0,
            right_reach_length: 0.0,
            cut_line,
            station_elevation: StationSeries::new(vec![
                StationElevation { station: 0.0, elevation: 10.0 },
                StationElevation { station: 20.0, elevation: 0.0 },
                StationElevation { station: 40.0, elevation: 10.0 },
            ]),
            left_bank_station: left_bank,
            right_bank_station: right_bank,
            mannings: Vec::new(),
            source_block: Vec::new(),
        }
    }

    #[test]
    fn channel_centerline_within_banks_passes() {
        let centerline = Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(0.0, 100.0)], 0);
        // cut-line runs station 0 at x=-20 to station 40 at x=20; crosses
        // the centerline at x=0, i.e. station 20, which is within [10, 30].
        let cut_line = vec![Point2D::new(-20.0, 50.0), Point2D::new(20.0, 50.0)];
        let xs = cross_section(cut_line, 10.0, 30.0);
        assert!(banks_encompass_channel(&xs, &centerline));
    }

    #[test]
    fn channel_centerline_outside_banks_fails() {
        let centerline = Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(0.0, 100.0)], 0);
        let cut_line = vec![Point2D::new(-20.0, 50.0), Point2D::new(20.0, 50.0)];
        // narrow the bank window so the centerline crossing (station 20)
        // falls outside it.
        let xs = cross_section(cut_line, 22.0, 30.0);
        assert!(!banks_encompass_channel(&xs, &centerline));
    }
}
