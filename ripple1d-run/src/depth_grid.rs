use std::path::{Path, PathBuf};

/// Buckets a depth in ft into the directory name used under
/// `<submodel>/<depth_bucket>/<flow_bucket>.tif` (spec §4.7 "Depth-grid
/// post-processing").
pub fn depth_bucket(depth: f64) -> String {
    format!("{:.1}", (depth * 10.0).round() / 10.0)
}

pub fn flow_bucket(flow: f64) -> String {
    format!("{}", flow.round() as i64)
}

pub fn depth_grid_path(submodel_dir: &Path, depth: f64, flow: f64) -> PathBuf {
    submodel_dir.join(depth_bucket(depth)).join(format!("{}.tif", flow_bucket(flow)))
}

/// Tracks which `(plan, profile)` depth grids are missing so the
/// rating-curve writer can exclude them (spec §4.7: "Missing grids are
/// tracked per plan and excluded from the rating-curve write").
#[derive(Debug, Default, Clone)]
pub struct MissingGridTracker {
    missing: Vec<(String, String)>,
}

impl MissingGridTracker {
    pub fn new() -> MissingGridTracker {
        MissingGridTracker::default()
    }

    pub fn record_missing(&mut self, plan: &str, profile: &str) {
        self.missing.push((plan.to_string(), profile.to_string()));
    }

    pub fn is_missing(&self, plan: &str, profile: &str) -> bool {
        self.missing.iter().any(|(p, pr)| p == plan && pr == profile)
    }

    pub fn missing(&self) -> &[(String, String)] {
        &self.missing
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_the_nested_bucket_path() {
        let path = depth_grid_path(Path::new("/data/2823960"), 3.27, 1499.6);
        assert_eq!(path, Path::new("/data/2823960/3.3/1500.tif"));
    }

    #[test]
    fn tracks_missing_grids_per_plan() {
        let mut tracker = MissingGridTracker::new();
        tracker.record_missing("2823960_nd", "f_500-z_10_0");
        assert!(tracker.is_missing("2823960_nd", "f_500-z_10_0"));
        assert!(!tracker.is_missing("2823960_nd", "f_600-z_10_0"));
    }
}
