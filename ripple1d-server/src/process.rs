use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ripple1d_common::structures::Polyline;
use ripple1d_common::{Result, RippleError};
use ripple1d_geometry::NetworkReach;

/// One registered operation (spec §4.8: "Registered process names map 1:1
/// to §4.1-4.7 operations plus a `noop`"): a JSON-in/JSON-out boundary
/// suited to an HTTP job server rather than a CLI argument vector.
pub trait Process: Send + Sync {
    fn name(&self) -> &'static str;
    fn required_params(&self) -> &'static [&'static str];
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value>;
}

/// Checks that the JSON object's keys exactly match `process`'s declared
/// parameter set (spec §4.8: "the set of JSON keys must match the target
/// operation's parameter set exactly").
pub fn validate_params(process: &dyn Process, params: &serde_json::Value) -> Result<()> {
    let obj = params.as_object().ok_or_else(|| RippleError::BadRequestParameters {
        unexpected: Vec::new(),
        missing: process.required_params().iter().map(|s| s.to_string()).collect(),
    })?;
    let required: HashSet<&str> = process.required_params().iter().copied().collect();
    let provided: HashSet<&str> = obj.keys().map(|s| s.as_str()).collect();
    let missing: Vec<String> = required.difference(&provided).map(|s| s.to_string()).collect();
    let unexpected: Vec<String> = provided.difference(&required).map(|s| s.to_string()).collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(RippleError::BadRequestParameters { unexpected, missing });
    }
    Ok(())
}

fn field<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a serde_json::Value> {
    params.get(key).ok_or_else(|| RippleError::Other(format!("missing field {key}")))
}

fn string_field(params: &serde_json::Value, key: &str) -> Result<String> {
    field(params, key)?.as_str().map(str::to_string).ok_or_else(|| RippleError::Other(format!("field {key} must be a string")))
}

fn f64_field(params: &serde_json::Value, key: &str) -> Result<f64> {
    field(params, key)?.as_f64().ok_or_else(|| RippleError::Other(format!("field {key} must be a number")))
}

fn usize_field(params: &serde_json::Value, key: &str) -> Result<usize> {
    field(params, key)?.as_u64().map(|v| v as usize).ok_or_else(|| RippleError::Other(format!("field {key} must be a non-negative integer")))
}

struct NoopProcess;

impl Process for NoopProcess {
    fn name(&self) -> &'static str {
        "noop"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &[]
    }
    fn run(&self, _params: serde_json::Value) -> Result<serde_json::Value> {
        Ok(serde_json::json!({"ok": true}))
    }
}

/// Conflates a source model's geometry against a stream network (spec
/// §4.4). Network reaches and centerlines are supplied inline as JSON
/// since reading the hydrofabric geopackage is an external collaborator's
/// responsibility.
struct ConflateModelProcess;

impl Process for ConflateModelProcess {
    fn name(&self) -> &'static str {
        "conflate_model"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &["geometry_file", "crs", "network_reaches", "centerlines"]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let geometry_file = PathBuf::from(string_field(&params, "geometry_file")?);
        let crs = string_field(&params, "crs")?;
        let geometry = ripple1d_model::parse_geometry(&geometry_file, &crs)?;

        let network: Vec<NetworkReach> = serde_json::from_value(field(&params, "network_reaches")?.clone())?;
        let centerlines_raw: Vec<(String, String, Polyline)> = serde_json::from_value(field(&params, "centerlines")?.clone())?;
        let centerlines: HashMap<(String, String), Polyline> = centerlines_raw.into_iter().map(|(r, c, p)| ((r, c), p)).collect();

        let conflation_params = ripple1d_conflation::ConflationParams::default();
        let result = ripple1d_conflation::conflate(&geometry, &centerlines, &network, &conflation_params);
        serde_json::to_value(result).map_err(RippleError::Json)
    }
}

/// Recomputes per-reach conflation metrics without rewriting `us_xs`/
/// `ds_xs` selection (spec §4.4 "Metrics"; `compute_conflation_metrics` in
/// `ops/metrics.py`). Takes the same inputs as `conflate_model` and
/// returns only the `metrics` field of each non-eclipsed reach, since this
/// workspace keeps conflation results in memory rather than rereading a
/// `<model>.conflation.json` sidecar from disk.
struct ComputeConflationMetricsProcess;

impl Process for ComputeConflationMetricsProcess {
    fn name(&self) -> &'static str {
        "compute_conflation_metrics"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &["geometry_file", "crs", "network_reaches", "centerlines"]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let geometry_file = PathBuf::from(string_field(&params, "geometry_file")?);
        let crs = string_field(&params, "crs")?;
        let geometry = ripple1d_model::parse_geometry(&geometry_file, &crs)?;

        let network: Vec<NetworkReach> = serde_json::from_value(field(&params, "network_reaches")?.clone())?;
        let centerlines_raw: Vec<(String, String, Polyline)> = serde_json::from_value(field(&params, "centerlines")?.clone())?;
        let centerlines: HashMap<(String, String), Polyline> = centerlines_raw.into_iter().map(|(r, c, p)| ((r, c), p)).collect();

        let conflation_params = ripple1d_conflation::ConflationParams::default();
        let result = ripple1d_conflation::conflate(&geometry, &centerlines, &network, &conflation_params);
        let metrics: HashMap<i64, &ripple1d_conflation::ConflationMetrics> =
            result.iter().filter_map(|(id, reach)| reach.metrics.as_ref().map(|m| (*id, m))).collect();
        serde_json::to_value(metrics).map_err(RippleError::Json)
    }
}

/// Writes a reach sub-model's geometry out as a geopackage (spec §4.5
/// "Subsetter outputs"; `ras_to_gpkg.gpkg_from_ras` in the original). The
/// sub-model is supplied inline as JSON rather than this process also
/// owning the parse/conflate/subset pipeline that produced it.
struct GpkgFromRasProcess;

impl Process for GpkgFromRasProcess {
    fn name(&self) -> &'static str {
        "gpkg_from_ras"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &["submodel", "crs", "output_path"]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let submodel: ripple1d_subset::SubModelGeometry = serde_json::from_value(field(&params, "submodel")?.clone())?;
        let crs = string_field(&params, "crs")?;
        let output_path = PathBuf::from(string_field(&params, "output_path")?);
        ripple1d_subset::write_geopackage(&output_path, &submodel, &crs)?;
        Ok(serde_json::json!({"output_path": output_path}))
    }
}

/// Builds a reach-scoped sub-model geometry from a conflation result
/// (spec §4.5). As with `conflate_model`, the centerlines are supplied
/// inline rather than read from a geopackage here.
struct ExtractSubmodelProcess;

impl Process for ExtractSubmodelProcess {
    fn name(&self) -> &'static str {
        "extract_submodel"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &["geometry_file", "crs", "centerlines", "us_xs", "ds_xs", "nwm_id", "max_hops"]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let geometry_file = PathBuf::from(string_field(&params, "geometry_file")?);
        let crs = string_field(&params, "crs")?;
        let geometry = ripple1d_model::parse_geometry(&geometry_file, &crs)?;

        let centerlines_raw: Vec<(String, String, Polyline)> = serde_json::from_value(field(&params, "centerlines")?.clone())?;
        let centerlines: HashMap<(String, String), Polyline> = centerlines_raw.into_iter().map(|(r, c, p)| ((r, c), p)).collect();

        let us_xs: ripple1d_conflation::XsRef = serde_json::from_value(field(&params, "us_xs")?.clone())?;
        let ds_xs: ripple1d_conflation::XsRef = serde_json::from_value(field(&params, "ds_xs")?.clone())?;
        let nwm_id = field(&params, "nwm_id")?.as_i64().ok_or_else(|| RippleError::Other("nwm_id must be an integer".to_string()))?;
        let max_hops = usize_field(&params, "max_hops")?;

        let submodel = ripple1d_subset::build_submodel(&geometry, &centerlines, &us_xs, &ds_xs, nwm_id, max_hops)?;
        serde_json::to_value(submodel).map_err(RippleError::Json)
    }
}

/// Builds the terrain for a sub-model hull by invoking the external
/// terrain tool (spec §4.6).
struct CreateRasTerrainProcess;

impl Process for CreateRasTerrainProcess {
    fn name(&self) -> &'static str {
        "create_ras_terrain"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &["hull", "buffer_distance", "units", "projection_wkt", "output_path", "source_rasters", "tool_binary"]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let hull: Vec<ripple1d_common::structures::Point2D> = serde_json::from_value(field(&params, "hull")?.clone())?;
        let buffer_distance = f64_field(&params, "buffer_distance")?;
        let units = string_field(&params, "units")?;
        let projection_wkt = string_field(&params, "projection_wkt")?;
        let output_path = PathBuf::from(string_field(&params, "output_path")?);
        let source_rasters: Vec<String> = serde_json::from_value(field(&params, "source_rasters")?.clone())?;
        let tool_binary = PathBuf::from(string_field(&params, "tool_binary")?);

        let request = ripple1d_terrain::TerrainRequest { hull, buffer_distance, units, projection_wkt, output_path, source_rasters };
        let tool = ripple1d_terrain::CommandLineTerrainTool::new(tool_binary);
        let extent = ripple1d_terrain::build_terrain(&tool, &request)?;
        Ok(serde_json::json!({
            "min": {"x": extent.min_x, "y": extent.min_y},
            "max": {"x": extent.max_x, "y": extent.max_y},
        }))
    }
}

fn run_orchestrator_context(params: &serde_json::Value) -> Result<ripple1d_run::SubmodelContext> {
    Ok(ripple1d_run::SubmodelContext {
        directory: PathBuf::from(string_field(params, "directory")?),
        project_file: PathBuf::from(string_field(params, "project_file")?),
        geom_file: string_field(params, "geom_file")?,
        nwm_id: string_field(params, "nwm_id")?,
        us_station: f64_field(params, "us_station")?,
        ds_station: f64_field(params, "ds_station")?,
        us_thalweg: f64_field(params, "us_thalweg")?,
        ds_thalweg: f64_field(params, "ds_thalweg")?,
        low_flow: f64_field(params, "low_flow")?,
        high_flow: f64_field(params, "high_flow")?,
        ras_version: string_field(params, "ras_version")?,
        timeout: Duration::from_secs(field(params, "timeout_seconds")?.as_u64().unwrap_or(1800)),
    })
}

fn simulator_for(params: &serde_json::Value) -> Result<ripple1d_run::CommandLineSimulator> {
    Ok(ripple1d_run::CommandLineSimulator { binary: PathBuf::from(string_field(params, "simulator_binary")?) })
}

struct CreateModelRunNormalDepthProcess;

impl Process for CreateModelRunNormalDepthProcess {
    fn name(&self) -> &'static str {
        "create_model_run_normal_depth"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &[
            "directory", "project_file", "geom_file", "nwm_id", "us_station", "ds_station", "us_thalweg", "ds_thalweg", "low_flow", "high_flow",
            "ras_version", "timeout_seconds", "simulator_binary", "suffix", "n_profiles",
        ]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let ctx = run_orchestrator_context(&params)?;
        let simulator = simulator_for(&params)?;
        let suffix = string_field(&params, "suffix")?;
        let n_profiles = usize_field(&params, "n_profiles")?;
        let short_id = ripple1d_run::normal_depth_initial(&ctx, &simulator, &suffix, n_profiles)?;
        Ok(serde_json::json!({"plan_short_id": short_id}))
    }
}

/// `run_incremental_normal_depth` (spec §4.7): reads the prior `_ind`
/// plan's observed `(flow, depth)` rating-curve points (supplied inline,
/// since reading them back is the caller's `rating_curve::rows_for_reach`
/// call) and writes a new normal-depth plan at the incremented depths.
struct RunIncrementalNormalDepthProcess;

impl Process for RunIncrementalNormalDepthProcess {
    fn name(&self) -> &'static str {
        "run_incremental_normal_depth"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &[
            "directory", "project_file", "geom_file", "nwm_id", "us_station", "ds_station", "us_thalweg", "ds_thalweg", "low_flow", "high_flow",
            "ras_version", "timeout_seconds", "simulator_binary", "suffix", "depth_inc", "observed",
        ]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let ctx = run_orchestrator_context(&params)?;
        let simulator = simulator_for(&params)?;
        let suffix = string_field(&params, "suffix")?;
        let depth_inc = f64_field(&params, "depth_inc")?;
        let observed: Vec<(f64, f64)> = serde_json::from_value(field(&params, "observed")?.clone())?;
        let observed: Vec<ripple1d_run::FlowDepth> = observed.into_iter().map(|(flow, depth)| ripple1d_run::FlowDepth { flow, depth }).collect();
        let short_id = ripple1d_run::normal_depth_incremental(&ctx, &simulator, &suffix, depth_inc, &observed)?;
        Ok(serde_json::json!({"plan_short_id": short_id}))
    }
}

struct RunKnownWseProcess;

impl Process for RunKnownWseProcess {
    fn name(&self) -> &'static str {
        "run_known_wse"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &[
            "directory",
            "project_file",
            "geom_file",
            "nwm_id",
            "us_station",
            "ds_station",
            "us_thalweg",
            "ds_thalweg",
            "low_flow",
            "high_flow",
            "ras_version",
            "timeout_seconds",
            "simulator_binary",
            "suffix",
            "min_el",
            "max_el",
            "depth_inc",
            "normal_depth_flows",
        ]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let ctx = run_orchestrator_context(&params)?;
        let simulator = simulator_for(&params)?;
        let suffix = string_field(&params, "suffix")?;
        let min_el = f64_field(&params, "min_el")?;
        let max_el = f64_field(&params, "max_el")?;
        let depth_inc = f64_field(&params, "depth_inc")?;
        let normal_depth_flows: Vec<(f64, f64)> = serde_json::from_value(field(&params, "normal_depth_flows")?.clone())?;
        let normal_depth_flows: Vec<ripple1d_run::FlowDepth> = normal_depth_flows.into_iter().map(|(flow, depth)| ripple1d_run::FlowDepth { flow, depth }).collect();
        let short_id = ripple1d_run::known_wse(&ctx, &simulator, &suffix, min_el, max_el, depth_inc, &normal_depth_flows)?;
        Ok(serde_json::json!({"plan_short_id": short_id}))
    }
}

/// `create_rating_curves_db` (spec §4.7/§4.8): extracts one plan's result
/// HDF into rating-curve rows and upserts them into the FIM library
/// sqlite.
struct CreateRatingCurvesDbProcess;

impl Process for CreateRatingCurvesDbProcess {
    fn name(&self) -> &'static str {
        "create_rating_curves_db"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &[
            "directory",
            "project_file",
            "geom_file",
            "nwm_id",
            "us_station",
            "ds_station",
            "us_thalweg",
            "ds_thalweg",
            "low_flow",
            "high_flow",
            "ras_version",
            "timeout_seconds",
            "hdf_path",
            "boundary_condition",
            "plan_short_id",
            "db_path",
        ]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let ctx = run_orchestrator_context(&params)?;
        let hdf_path = PathBuf::from(string_field(&params, "hdf_path")?);
        let boundary_condition = string_field(&params, "boundary_condition")?;
        let plan_short_id = string_field(&params, "plan_short_id")?;
        let db_path = PathBuf::from(string_field(&params, "db_path")?);
        let rows_written = ripple1d_run::create_rating_curves_db(&ctx, &hdf_path, &boundary_condition, None, &plan_short_id, &db_path)?;
        Ok(serde_json::json!({"rows_written": rows_written}))
    }
}

/// `create_fim_lib` (spec §4.8): folds every plan's rating curve for a
/// reach into a single FIM library sqlite (`create_fim_lib` in
/// `ops/fim_lib.py`, minus the depth-grid raster reprojection step, which
/// is the terrain builder's external-tool territory per spec §4.6).
struct CreateFimLibProcess;

impl Process for CreateFimLibProcess {
    fn name(&self) -> &'static str {
        "create_fim_lib"
    }
    fn required_params(&self) -> &'static [&'static str] {
        &[
            "directory",
            "project_file",
            "geom_file",
            "nwm_id",
            "us_station",
            "ds_station",
            "us_thalweg",
            "ds_thalweg",
            "low_flow",
            "high_flow",
            "ras_version",
            "timeout_seconds",
            "plans",
            "db_path",
        ]
    }
    fn run(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        let ctx = run_orchestrator_context(&params)?;
        let plans_raw: Vec<(String, String, String)> = serde_json::from_value(field(&params, "plans")?.clone())?;
        let plans: Vec<ripple1d_run::FimLibPlan> = plans_raw
            .into_iter()
            .map(|(hdf_path, boundary_condition, plan_short_id)| ripple1d_run::FimLibPlan { hdf_path: PathBuf::from(hdf_path), boundary_condition, plan_short_id })
            .collect();
        let db_path = PathBuf::from(string_field(&params, "db_path")?);
        let rows_written = ripple1d_run::create_fim_lib(&ctx, &plans, None, &db_path)?;
        Ok(serde_json::json!({"rows_written": rows_written}))
    }
}

/// Dispatches process names to implementations (spec §4.8: "registered
/// process names map 1:1 to §4.1-4.7 operations plus a `noop`").
pub struct ProcessRegistry {
    processes: HashMap<&'static str, Box<dyn Process>>,
}

impl ProcessRegistry {
    pub fn new() -> ProcessRegistry {
        let mut processes: HashMap<&'static str, Box<dyn Process>> = HashMap::new();
        let all: Vec<Box<dyn Process>> = vec![
            Box::new(NoopProcess),
            Box::new(ConflateModelProcess),
            Box::new(ComputeConflationMetricsProcess),
            Box::new(GpkgFromRasProcess),
            Box::new(ExtractSubmodelProcess),
            Box::new(CreateRasTerrainProcess),
            Box::new(CreateModelRunNormalDepthProcess),
            Box::new(RunIncrementalNormalDepthProcess),
            Box::new(RunKnownWseProcess),
            Box::new(CreateRatingCurvesDbProcess),
            Box::new(CreateFimLibProcess),
        ];
        for process in all {
            processes.insert(process.name(), process);
        }
        // `test` is the original's self-check alias for `noop` (spec §4.8:
        // "a `noop` used by `/processes/test/execution` for self-check").
        processes.insert("test", Box::new(NoopProcess));
        ProcessRegistry { processes }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Process> {
        self.processes.get(name).map(|b| b.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.processes.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProcessRegistry {
    fn default() -> ProcessRegistry {
        ProcessRegistry::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn noop_process_reports_ok() {
        let registry = ProcessRegistry::new();
        let process = registry.get("noop").unwrap();
        let result = process.run(serde_json::json!({})).unwrap();
        assert_eq!(result["ok"], true);
    }

    #[test]
    fn validate_params_reports_missing_and_unexpected() {
        let registry = ProcessRegistry::new();
        let process = registry.get("noop").unwrap();
        let err = validate_params(process, &serde_json::json!({"extra": 1})).unwrap_err();
        match err {
            RippleError::BadRequestParameters { unexpected, missing } => {
                assert_eq!(unexpected, vec!["extra".to_string()]);
                assert!(missing.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_process_name_is_absent_from_registry() {
        let registry = ProcessRegistry::new();
        assert!(registry.get("does_not_exist").is_none());
    }
}
