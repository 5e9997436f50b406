use std::path::Path;

use ripple1d_common::{Result, RippleError};
use ripple1d_conflation::ConflationParams;
use ripple1d_model::types::FlowFile;
use serde::{Deserialize, Serialize};

/// The `.ripple.json` sidecar written alongside each reach geopackage:
/// conflation params plus `crs`, flow bounds, source-model paths, and the
/// engine version that produced it (spec §3 "Subsetter outputs").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RippleSidecar {
    pub nwm_id: i64,
    pub crs: String,
    pub high_flow: f64,
    pub low_flow: f64,
    pub source_models: Vec<String>,
    pub engine_version: String,
    pub k_low: f64,
    pub k_high: f64,
}

/// Widens `high_flow`/`low_flow` to also cover any flow annotated directly
/// on the source cross-sections (spec §4.5: "updates the sidecar with
/// `high_flow = max(conflation_high, observed_max_flow)` and `low_flow =
/// min(conflation_low, observed_min_flow)`").
pub fn reconcile_flow_bounds(conflation_high: f64, conflation_low: f64, flow_file: Option<&FlowFile>) -> (f64, f64) {
    let Some(flow_file) = flow_file else {
        return (conflation_high, conflation_low);
    };
    let observed: Vec<f64> = flow_file
        .flow_change_locations
        .iter()
        .flat_map(|fcl| fcl.flows.iter().copied())
        .collect();
    let observed_max = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let observed_min = observed.iter().cloned().fold(f64::INFINITY, f64::min);
    let high = if observed_max.is_finite() { conflation_high.max(observed_max) } else { conflation_high };
    let low = if observed_min.is_finite() { conflation_low.min(observed_min) } else { conflation_low };
    (high, low)
}

pub fn build_sidecar(
    nwm_id: i64,
    crs: &str,
    params: &ConflationParams,
    conflation_high: f64,
    conflation_low: f64,
    flow_file: Option<&FlowFile>,
    source_models: Vec<String>,
    engine_version: &str,
) -> RippleSidecar {
    let (high_flow, low_flow) = reconcile_flow_bounds(conflation_high, conflation_low, flow_file);
    RippleSidecar {
        nwm_id,
        crs: crs.to_string(),
        high_flow,
        low_flow,
        source_models,
        engine_version: engine_version.to_string(),
        k_low: params.k_low,
        k_high: params.k_high,
    }
}

pub fn write_sidecar(path: &Path, sidecar: &RippleSidecar) -> Result<()> {
    let json = serde_json::to_string_pretty(sidecar)?;
    std::fs::write(path, json).map_err(RippleError::Io)
}

pub fn read_sidecar(path: &Path) -> Result<RippleSidecar> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_model::types::FlowChangeLocation;

    #[test]
    fn widens_bounds_to_observed_flows() {
        let flow_file = FlowFile {
            title: "Test".to_string(),
            profile_names: vec!["PF1".to_string()],
            flow_change_locations: vec![FlowChangeLocation {
                river: "Test River".to_string(),
                reach: "Test Reach".to_string(),
                river_station: 100.0,
                flows: vec![5000.0],
            }],
            known_water_surface_elevations: vec![None],
            normal_depth_slope: Some(0.001),
        };
        let (high, low) = reconcile_flow_bounds(3000.0, 200.0, Some(&flow_file));
        assert_eq!(high, 5000.0);
        assert_eq!(low, 200.0);
    }

    #[test]
    fn round_trips_through_disk() {
        let params = ConflationParams::default();
        let sidecar = build_sidecar(123, "EPSG:5070", &params, 3000.0, 200.0, None, vec!["model.prj".to_string()], "0.1.0");
        let dir = std::env::temp_dir().join(format!("ripple1d-sidecar-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("123.ripple.json");
        write_sidecar(&path, &sidecar).unwrap();
        let read_back = read_sidecar(&path).unwrap();
        assert_eq!(read_back.nwm_id, 123);
        assert_eq!(read_back.high_flow, 3000.0);
        std::fs::remove_dir_all(&dir).ok();
    }
}
