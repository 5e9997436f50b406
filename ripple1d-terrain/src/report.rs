use std::collections::HashMap;
use std::path::Path;

use ripple1d_common::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::agreement::{
    correlation, flow_area_agreement, flow_area_overlap, hydraulic_radius_agreement, inundation_overlap, max_cross_correlation, r_squared, residual_metrics,
    spectral_angle, spectral_correlation, thalweg_elevation_difference, top_width_agreement, wse_grid, ResidualStats, Sample,
};
use crate::precision::round_metric;

/// Metrics computed at one water-surface elevation (spec §4.6 step 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WseMetrics {
    pub wse: f64,
    pub inundation_overlap: f64,
    pub flow_area_overlap: f64,
    pub top_width_agreement: f64,
    pub flow_area_agreement: f64,
    pub hydraulic_radius_agreement: f64,
}

/// Whole-section summary metrics (spec §4.6 step 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub r_squared: f64,
    pub spectral_angle: f64,
    pub spectral_correlation: f64,
    pub correlation: f64,
    pub max_cross_correlation: f64,
    pub thalweg_elevation_difference: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAgreement {
    pub river: String,
    pub reach: String,
    pub river_station: f64,
    pub summary: SectionSummary,
    pub residuals: ResidualStats,
    pub at_wse: Vec<WseMetrics>,
}

/// Computes the full agreement report for one cross-section (spec §4.6
/// step 4). `src` and `dem` must share the same station grid, as produced
/// by resampling the DEM at the cross-section's stations.
pub fn section_agreement(river: &str, reach: &str, river_station: f64, src: &[Sample], dem: &[Sample]) -> SectionAgreement {
    let src_el: Vec<f64> = src.iter().map(|s| s.elevation).collect();
    let dem_el: Vec<f64> = dem.iter().map(|s| s.elevation).collect();
    let residuals: Vec<f64> = src_el.iter().zip(&dem_el).map(|(a, b)| a - b).collect();

    let summary = SectionSummary {
        r_squared: r_squared(&src_el, &dem_el),
        spectral_angle: spectral_angle(&src_el, &dem_el),
        spectral_correlation: spectral_correlation(&src_el, &dem_el),
        correlation: correlation(&src_el, &dem_el),
        max_cross_correlation: max_cross_correlation(&src_el, &dem_el),
        thalweg_elevation_difference: thalweg_elevation_difference(&src_el, &dem_el),
    };

    let at_wse: Vec<WseMetrics> = wse_grid(src, 5, 2.0, 0.5)
        .into_iter()
        .map(|wse| WseMetrics {
            wse,
            inundation_overlap: inundation_overlap(src, dem, wse),
            flow_area_overlap: flow_area_overlap(src, dem, wse),
            top_width_agreement: top_width_agreement(src, dem, wse),
            flow_area_agreement: flow_area_agreement(src, dem, wse),
            hydraulic_radius_agreement: hydraulic_radius_agreement(src, dem, wse),
        })
        .collect();

    SectionAgreement {
        river: river.to_string(),
        reach: reach.to_string(),
        river_station,
        summary,
        residuals: residual_metrics(&residuals),
        at_wse,
    }
}

/// Per-reach averages across all of its cross-sections (spec §4.6 step 4:
/// "aggregate per-reach averages").
pub fn reach_averages(sections: &[SectionAgreement]) -> HashMap<String, f64> {
    let mut sums: HashMap<String, f64> = HashMap::new();
    let n = sections.len().max(1) as f64;
    for section in sections {
        *sums.entry("r_squared".to_string()).or_default() += section.summary.r_squared;
        *sums.entry("spectral_angle".to_string()).or_default() += section.summary.spectral_angle;
        *sums.entry("spectral_correlation".to_string()).or_default() += section.summary.spectral_correlation;
        *sums.entry("correlation".to_string()).or_default() += section.summary.correlation;
        *sums.entry("max_cross_correlation".to_string()).or_default() += section.summary.max_cross_correlation;
        *sums.entry("thalweg_elevation_difference".to_string()).or_default() += section.summary.thalweg_elevation_difference;
        *sums.entry("rmse".to_string()).or_default() += section.residuals.rmse;
    }
    sums.into_iter().map(|(k, v)| (format!("avg_{k}"), round_metric(&format!("avg_{k}"), v / n))).collect()
}

/// Writes per-section summary rows to a sqlite database (spec §4.6 step 4:
/// "emit to sqlite (preferred)").
pub fn write_agreement_sqlite(path: &Path, sections: &[SectionAgreement]) -> Result<()> {
    use ripple1d_common::RippleError;

    let to_ripple_error = |e: rusqlite::Error| RippleError::Other(format!("terrain agreement sqlite write: {e}"));

    let conn = Connection::open(path).map_err(to_ripple_error)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS terrain_agreement (
            river TEXT NOT NULL,
            reach TEXT NOT NULL,
            river_station REAL NOT NULL,
            r_squared REAL NOT NULL,
            spectral_angle REAL NOT NULL,
            spectral_correlation REAL NOT NULL,
            correlation REAL NOT NULL,
            max_cross_correlation REAL NOT NULL,
            thalweg_elevation_difference REAL NOT NULL,
            rmse REAL NOT NULL
        );",
    )
    .map_err(to_ripple_error)?;
    let tx = conn.unchecked_transaction().map_err(to_ripple_error)?;
    for section in sections {
        tx.execute(
            "INSERT INTO terrain_agreement
             (river, reach, river_station, r_squared, spectral_angle, spectral_correlation, correlation, max_cross_correlation, thalweg_elevation_difference, rmse)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                section.river,
                section.reach,
                section.river_station,
                round_metric("r_squared", section.summary.r_squared),
                round_metric("spectral_angle", section.summary.spectral_angle),
                round_metric("spectral_correlation", section.summary.spectral_correlation),
                round_metric("correlation", section.summary.correlation),
                round_metric("max_cross_correlation", section.summary.max_cross_correlation),
                round_metric("thalweg_elevation_difference", section.summary.thalweg_elevation_difference),
                round_metric("rmse", section.residuals.rmse),
            ],
        )
        .map_err(to_ripple_error)?;
    }
    tx.commit().map_err(to_ripple_error)?;
    Ok(())
}

pub fn write_agreement_json(path: &Path, sections: &[SectionAgreement]) -> Result<()> {
    let json = serde_json::to_string_pretty(sections)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn samples(elevations: &[f64]) -> Vec<Sample> {
        elevations.iter().enumerate().map(|(i, &elevation)| Sample { station: i as f64 * 10.0, elevation }).collect()
    }

    #[test]
    fn identical_sections_score_perfectly() {
        let src = samples(&[20.0, 5.0, 3.0, 5.0, 20.0]);
        let dem = src.clone();
        let agreement = section_agreement("Test River", "Test Reach", 100.0, &src, &dem);
        assert!((agreement.summary.r_squared - 1.0).abs() < 1e-9);
        assert!((agreement.summary.thalweg_elevation_difference).abs() < 1e-9);
        assert!(!agreement.at_wse.is_empty());
    }

    #[test]
    fn averages_are_rounded() {
        let src = samples(&[20.0, 5.0, 3.0, 5.0, 20.0]);
        let dem = samples(&[20.0, 6.0, 4.0, 6.0, 20.0]);
        let sections = vec![section_agreement("Test River", "Test Reach", 100.0, &src, &dem)];
        let averages = reach_averages(&sections);
        assert!(averages.contains_key("avg_r_squared"));
    }
}
