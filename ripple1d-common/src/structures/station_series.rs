/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

use serde::{Deserialize, Serialize};

/// A single (station, elevation) pair from a cross-section's `#Sta/Elev=`
/// block (spec §4.1).
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationElevation {
    pub station: f64,
    pub elevation: f64,
}

/// The station-ordered elevation profile of a cross-section cut-line.
/// Stations increase monotonically from the left end of the cut-line to the
/// right end; this is independent of river-station ordering (spec §4.2),
/// which orders cross-sections *along the reach*, not points *along one
/// cut-line*.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationSeries {
    pub points: Vec<StationElevation>,
}

impl StationSeries {
    pub fn new(points: Vec<StationElevation>) -> StationSeries {
        StationSeries { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The thalweg (spec §4.2): the minimum elevation between the bank
    /// stations, and the station at which it occurs. Returns `None` for an
    /// empty series or a window with no points.
    pub fn thalweg(&self, left_bank: f64, right_bank: f64) -> Option<StationElevation> {
        let (lo, hi) = (left_bank.min(right_bank), left_bank.max(right_bank));
        self.points
            .iter()
            .filter(|p| p.station >= lo && p.station <= hi)
            .copied()
            .min_by(|a, b| a.elevation.partial_cmp(&b.elevation).unwrap())
    }

    /// Linear interpolation of elevation at an arbitrary station. Returns
    /// `None` if `station` falls outside the series' range.
    pub fn elevation_at(&self, station: f64) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        if station < self.points[0].station || station > self.points[self.points.len() - 1].station
        {
            return None;
        }
        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            if station >= a.station && station <= b.station {
                if (b.station - a.station).abs() < f64::EPSILON {
                    return Some(a.elevation);
                }
                let t = (station - a.station) / (b.station - a.station);
                return Some(a.elevation + t * (b.elevation - a.elevation));
            }
        }
        Some(self.points[self.points.len() - 1].elevation)
    }

    /// Resamples the series so that no gap between consecutive stations
    /// exceeds `max_gap`, inserting linearly-interpolated points as needed
    /// (spec §4.6 terrain agreement preprocessing).
    pub fn resampled(&self, max_gap: f64) -> StationSeries {
        if self.points.len() < 2 || max_gap <= 0.0 {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.points.len());
        out.push(self.points[0]);
        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            let gap = b.station - a.station;
            if gap > max_gap {
                let n = (gap / max_gap).ceil() as usize;
                for i in 1..n {
                    let t = i as f64 / n as f64;
                    out.push(StationElevation {
                        station: a.station + t * gap,
                        elevation: a.elevation + t * (b.elevation - a.elevation),
                    });
                }
            }
            out.push(b);
        }
        StationSeries::new(out)
    }

    pub fn min_elevation(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.elevation)
            .fold(None, |acc, e| Some(acc.map_or(e, |m: f64| m.min(e))))
    }

    pub fn max_elevation(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.elevation)
            .fold(None, |acc, e| Some(acc.map_or(e, |m: f64| m.max(e))))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn series() -> StationSeries {
        StationSeries::new(vec![
            StationElevation { station: 0.0, elevation: 10.0 },
            StationElevation { station: 10.0, elevation: 2.0 },
            StationElevation { station: 20.0, elevation: 8.0 },
            StationElevation { station: 30.0, elevation: 12.0 },
        ])
    }

    #[test]
    fn thalweg_is_min_within_banks() {
        let s = series();
        let t = s.thalweg(0.0, 30.0).unwrap();
        assert_eq!(t.station, 10.0);
        assert_eq!(t.elevation, 2.0);
    }

    #[test]
    fn thalweg_respects_bank_window() {
        let s = series();
        // exclude the global minimum by narrowing the bank window
        let t = s.thalweg(15.0, 30.0).unwrap();
        assert_eq!(t.station, 20.0);
    }

    #[test]
    fn elevation_at_interpolates() {
        let s = series();
        let e = s.elevation_at(5.0).unwrap();
        assert!((e - 6.0).abs() < 1e-9);
    }

    #[test]
    fn resample_respects_max_gap() {
        let s = series();
        let r = s.resampled(3.0);
        for w in r.points.windows(2) {
            assert!(w[1].station - w[0].station <= 3.0 + 1e-9);
        }
    }
}
