use std::path::{Path, PathBuf};
use std::time::Duration;

use ripple1d_common::{Result, RippleError};
use ripple1d_model::types::{FlowChangeLocation, FlowFile, PlanFile};
use ripple1d_model::{write_flow, write_plan};

use crate::depth_grid::MissingGridTracker;
use crate::flows::{incremental_flow_depths, initial_discharges, known_wse_combinations, known_wse_profile_name, wse_grid as known_wse_grid, FlowDepth};
use crate::naming::next_extension;
use crate::rating_curve::{self, extract_known_wse_rows, extract_normal_depth_rows, RatingCurveRow};
use crate::simulator::{classify_compute_messages, SteadyFlowSimulator};

/// The minimal sub-model context the orchestrator needs: enough to write
/// flow/plan text and to shift WSEs into depths (spec §4.7's three public
/// operations all key off a single reach-scoped sub-model).
pub struct SubmodelContext {
    pub directory: PathBuf,
    pub project_file: PathBuf,
    pub geom_file: String,
    pub nwm_id: String,
    pub us_station: f64,
    pub ds_station: f64,
    pub us_thalweg: f64,
    pub ds_thalweg: f64,
    pub low_flow: f64,
    pub high_flow: f64,
    pub ras_version: String,
    pub timeout: Duration,
}

fn write_and_run(
    ctx: &SubmodelContext,
    simulator: &dyn SteadyFlowSimulator,
    suffix: &str,
    flow_change_locations: Vec<FlowChangeLocation>,
    profile_names: Vec<String>,
    known_wses: Vec<Option<f64>>,
    normal_depth_slope: Option<f64>,
) -> Result<String> {
    let short_id = format!("{}_{}", ctx.nwm_id, suffix);
    let flow_ext = next_extension(&ctx.directory, &ctx.nwm_id, 'f');
    let plan_ext = next_extension(&ctx.directory, &ctx.nwm_id, 'p');

    let flow_file = FlowFile {
        title: short_id.clone(),
        profile_names: profile_names.clone(),
        flow_change_locations,
        known_water_surface_elevations: known_wses,
        normal_depth_slope,
    };
    std::fs::write(ctx.directory.join(format!("{}.{flow_ext}", ctx.nwm_id)), write_flow(&flow_file))?;

    let plan_file = PlanFile {
        title: short_id.clone(),
        short_id: short_id.clone(),
        version: ctx.ras_version.clone(),
        geom_file: ctx.geom_file.clone(),
        flow_file: flow_ext.clone(),
    };
    std::fs::write(ctx.directory.join(format!("{}.{plan_ext}", ctx.nwm_id)), write_plan(&plan_file))?;

    simulator.compute_plan(&ctx.project_file, &short_id, ctx.timeout)?;

    let messages_path = ctx.directory.join(format!("{}.{plan_ext}.computeMsgs.txt", ctx.nwm_id));
    if let Ok(messages) = std::fs::read_to_string(&messages_path) {
        if let Some(err) = classify_compute_messages(&messages) {
            if !matches!(err, RippleError::RasStoreAllMapsError(_)) {
                return Err(err);
            }
            tracing::warn!(plan = %short_id, "ignoring StoreAllMaps failure");
        }
    }

    Ok(short_id)
}

/// `normal_depth_initial` (spec §4.7): discharges linearly spaced from
/// `max(low_flow, 1)` to `high_flow`, normal-depth boundary at slope
/// 0.001.
pub fn normal_depth_initial(ctx: &SubmodelContext, simulator: &dyn SteadyFlowSimulator, suffix: &str, n_profiles: usize) -> Result<String> {
    let flows = initial_discharges(ctx.low_flow, ctx.high_flow, n_profiles);
    let profile_names: Vec<String> = flows.iter().map(|f| f.to_string()).collect();
    let fcl = FlowChangeLocation {
        river: ctx.nwm_id.clone(),
        reach: ctx.nwm_id.clone(),
        river_station: ctx.us_station,
        flows: flows.iter().map(|&f| f as f64).collect(),
    };
    let known_wses = vec![None; profile_names.len()];
    write_and_run(ctx, simulator, suffix, vec![fcl], profile_names, known_wses, Some(0.001))
}

/// `normal_depth_incremental` (spec §4.7): flows interpolated for depths
/// incremented by `depth_inc` ft from the prior `_ind` run's rating curve.
pub fn normal_depth_incremental(ctx: &SubmodelContext, simulator: &dyn SteadyFlowSimulator, suffix: &str, depth_inc: f64, observed: &[FlowDepth]) -> Result<String> {
    let grid = incremental_flow_depths(observed, depth_inc);
    if grid.is_empty() {
        return Err(RippleError::Other(format!("no observed rating-curve points to derive incremental flows for {}", ctx.nwm_id)));
    }
    let flows: Vec<f64> = grid.iter().map(|fd| fd.flow.round()).collect();
    let profile_names: Vec<String> = flows.iter().map(|f| (*f as i64).to_string()).collect();
    let fcl = FlowChangeLocation {
        river: ctx.nwm_id.clone(),
        reach: ctx.nwm_id.clone(),
        river_station: ctx.us_station,
        flows,
    };
    let known_wses = vec![None; profile_names.len()];
    write_and_run(ctx, simulator, suffix, vec![fcl], profile_names, known_wses, Some(0.001))
}

/// `known_wse` (spec §4.7): crosses a downstream WSE grid with the
/// incremental-normal-depth flows, keeping only combinations whose target
/// depth exceeds what the normal-depth run produced.
pub fn known_wse(ctx: &SubmodelContext, simulator: &dyn SteadyFlowSimulator, suffix: &str, min_el: f64, max_el: f64, depth_inc: f64, normal_depth_flows: &[FlowDepth]) -> Result<String> {
    let grid = known_wse_grid(min_el, max_el, depth_inc);
    let combos = known_wse_combinations(&grid, ctx.ds_thalweg, normal_depth_flows);
    if combos.is_empty() {
        return Err(RippleError::Other(format!(
            "no controlling known water-surface elevations identified for {}",
            ctx.nwm_id
        )));
    }

    let flows: Vec<f64> = combos.iter().map(|c| c.flow).collect();
    let profile_names: Vec<String> = combos.iter().map(|c| known_wse_profile_name(c.flow, c.wse)).collect();
    let known_wses: Vec<Option<f64>> = combos.iter().map(|c| Some(c.wse)).collect();
    let fcl = FlowChangeLocation {
        river: ctx.nwm_id.clone(),
        reach: ctx.nwm_id.clone(),
        river_station: ctx.us_station,
        flows,
    };
    write_and_run(ctx, simulator, suffix, vec![fcl], profile_names, known_wses, None)
}

fn us_river_reach_rs(ctx: &SubmodelContext) -> String {
    format!("{} {} {}", ctx.nwm_id, ctx.nwm_id, ctx.us_station)
}

fn ds_river_reach_rs(ctx: &SubmodelContext) -> String {
    format!("{} {} {}", ctx.nwm_id, ctx.nwm_id, ctx.ds_station)
}

fn reach_id(ctx: &SubmodelContext) -> Result<i64> {
    ctx.nwm_id.parse().map_err(|_| RippleError::Other(format!("nwm_id {} is not a numeric reach id", ctx.nwm_id)))
}

/// Rating-curve extraction (spec §4.7): reads a plan's result HDF, joins
/// the us_xs/ds_xs readings by profile, subtracts thalwegs to depths, and
/// returns the rows ready for `rating_curve::upsert`. `boundary_condition`
/// is `"nd"` for a normal-depth plan or `"kwse"` for a known-WSE plan
/// (`zero_depth_to_sqlite`/`rating_curves_to_sqlite` in `sqlite_utils.py`).
pub fn extract_rating_curve_rows(
    ctx: &SubmodelContext,
    hdf_path: &Path,
    boundary_condition: &str,
    missing: Option<&MissingGridTracker>,
    plan_short_id: &str,
) -> Result<Vec<RatingCurveRow>> {
    let reach = reach_id(ctx)?;
    let tracker = missing.map(|m| (m, plan_short_id));
    match boundary_condition {
        "nd" => extract_normal_depth_rows(hdf_path, reach, &us_river_reach_rs(ctx), &ds_river_reach_rs(ctx), ctx.us_thalweg, ctx.ds_thalweg, tracker),
        "kwse" => extract_known_wse_rows(hdf_path, reach, &us_river_reach_rs(ctx), ctx.us_thalweg, ctx.ds_thalweg, tracker),
        other => Err(RippleError::Other(format!("unknown boundary condition {other}"))),
    }
}

/// `create_rating_curves_db` (spec §4.7/§4.8): extracts one plan's rating
/// curve and upserts it into the FIM library sqlite at `db_path`, creating
/// the database if needed. Returns the number of rows written.
pub fn create_rating_curves_db(
    ctx: &SubmodelContext,
    hdf_path: &Path,
    boundary_condition: &str,
    missing: Option<&MissingGridTracker>,
    plan_short_id: &str,
    db_path: &Path,
) -> Result<usize> {
    let rows = extract_rating_curve_rows(ctx, hdf_path, boundary_condition, missing, plan_short_id)?;
    let conn = rating_curve::open(db_path)?;
    for row in &rows {
        rating_curve::upsert(&conn, row, boundary_condition)?;
    }
    Ok(rows.len())
}

/// One plan's rating-curve extraction inputs, as consumed by
/// `create_fim_lib`.
pub struct FimLibPlan {
    pub hdf_path: PathBuf,
    pub boundary_condition: String,
    pub plan_short_id: String,
}

/// `create_fim_lib` (spec §4.8): folds every plan's rating curve into a
/// single FIM library sqlite at `db_path` (the original's `create_fim_lib`
/// calling `zero_depth_to_sqlite` for the `_ind`/`_nd` plans and
/// `rating_curves_to_sqlite` for the `_kwse` plan into the same database).
/// Missing depth grids are excluded per plan, matching "Missing grids are
/// tracked per plan and excluded from the rating-curve write" (spec §4.7).
pub fn create_fim_lib(ctx: &SubmodelContext, plans: &[FimLibPlan], missing: Option<&MissingGridTracker>, db_path: &Path) -> Result<usize> {
    let conn = rating_curve::open(db_path)?;
    let mut total = 0usize;
    for plan in plans {
        let rows = extract_rating_curve_rows(ctx, &plan.hdf_path, &plan.boundary_condition, missing, &plan.plan_short_id)?;
        for row in &rows {
            rating_curve::upsert(&conn, row, &plan.boundary_condition)?;
        }
        total += rows.len();
    }
    Ok(total)
}

pub fn project_file(submodel_directory: &Path, nwm_id: &str) -> PathBuf {
    submodel_directory.join(format!("{nwm_id}.prj"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::simulator::StubSimulator;

    fn context(dir: &Path) -> SubmodelContext {
        SubmodelContext {
            directory: dir.to_path_buf(),
            project_file: dir.join("2823960.prj"),
            geom_file: "g01".to_string(),
            nwm_id: "2823960".to_string(),
            us_station: 3.0,
            ds_station: 1.0,
            us_thalweg: 97.0,
            ds_thalweg: 95.0,
            low_flow: 100.0,
            high_flow: 1000.0,
            ras_version: "6.31".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn normal_depth_initial_writes_flow_and_plan_files() {
        let dir = std::env::temp_dir().join(format!("ripple1d-orchestrator-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let ctx = context(&dir);
        let sim = StubSimulator { compute: |_p, _s| Ok(()) };
        let short_id = normal_depth_initial(&ctx, &sim, "ind", 5).unwrap();
        assert_eq!(short_id, "2823960_ind");
        assert!(dir.join("2823960.f00").exists());
        assert!(dir.join("2823960.p00").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn extract_rating_curve_rows_rejects_unknown_boundary_condition() {
        let dir = std::env::temp_dir().join(format!("ripple1d-orchestrator-test-bc-{}", std::process::id()));
        let ctx = context(&dir);
        let result = extract_rating_curve_rows(&ctx, Path::new("missing.hdf"), "bogus", None, "2823960_bogus");
        assert!(result.is_err());
    }

    #[test]
    fn river_reach_rs_keys_use_the_renamed_submodel_river_and_reach() {
        let dir = std::env::temp_dir().join("unused");
        let ctx = context(&dir);
        assert_eq!(us_river_reach_rs(&ctx), "2823960 2823960 3");
        assert_eq!(ds_river_reach_rs(&ctx), "2823960 2823960 1");
    }

    #[test]
    fn known_wse_fails_with_no_controlling_elevations() {
        let dir = std::env::temp_dir().join(format!("ripple1d-orchestrator-test-kwse-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let ctx = context(&dir);
        let sim = StubSimulator { compute: |_p, _s| Ok(()) };
        let observed = vec![FlowDepth { flow: 100.0, depth: 50.0 }];
        let result = known_wse(&ctx, &sim, "kwse", 10.0, 12.0, 2.0, &observed);
        assert!(result.is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
