/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

pub mod depth_grid;
pub mod flows;
pub mod hdf;
pub mod naming;
pub mod orchestrator;
pub mod rating_curve;
pub mod simulator;

pub use depth_grid::{depth_bucket, depth_grid_path, flow_bucket, MissingGridTracker};
pub use flows::{
    incremental_flow_depths, initial_discharges, known_wse_combinations, known_wse_profile_name, wse_grid, FlowDepth, KnownWseProfile, MIN_FLOW,
};
pub use hdf::{read_cross_section_profiles, ProfileReading};
pub use naming::next_extension;
pub use orchestrator::{
    create_fim_lib, create_rating_curves_db, extract_rating_curve_rows, known_wse, normal_depth_incremental, normal_depth_initial, project_file, FimLibPlan,
    SubmodelContext,
};
pub use rating_curve::{open as open_rating_curve_db, parse_known_wse_profile_name, rows_for_reach, upsert as upsert_rating_curve, RatingCurveRow};
pub use simulator::{classify_compute_messages, CommandLineSimulator, StubSimulator, SteadyFlowSimulator};
