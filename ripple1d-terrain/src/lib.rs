/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

pub mod agreement;
pub mod builder;
pub mod precision;
pub mod report;
pub mod tool;

pub use agreement::{
    correlation, flow_area, flow_area_agreement, flow_area_overlap, hydraulic_radius, hydraulic_radius_agreement, inundation_overlap, max_cross_correlation,
    r_squared, residual_metrics, spectral_angle, spectral_correlation, thalweg_elevation_difference, top_width_agreement, wetted_perimeter, wetted_top_width,
    wse_grid, ResidualStats, Sample,
};
pub use builder::{build_terrain, buffered_extent, TerrainRequest};
pub use precision::round_metric;
pub use report::{reach_averages, section_agreement, write_agreement_json, write_agreement_sqlite, SectionAgreement, SectionSummary, WseMetrics};
pub use tool::{CommandLineTerrainTool, ExternalTerrainTool, TerrainToolArgs};
