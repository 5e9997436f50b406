use std::collections::HashMap;
use std::path::Path;

use ripple1d_common::{Result, RippleError};
use rusqlite::{params, Connection};

use crate::depth_grid::MissingGridTracker;
use crate::hdf::read_cross_section_profiles;

/// One row of the FIM library's rating-curve table (spec §4.7 "Rating-curve
/// table schema").
#[derive(Debug, Clone, Copy)]
pub struct RatingCurveRow {
    pub reach_id: i64,
    pub ds_depth: f64,
    pub ds_wse: f64,
    pub us_flow: i64,
    pub us_depth: f64,
    pub us_wse: f64,
}

fn to_ripple_error(e: rusqlite::Error) -> RippleError {
    RippleError::Other(format!("rating curve sqlite: {e}"))
}

/// Opens (creating if needed) the FIM library's rating-curve database at
/// `path` and ensures its schema exists.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).map_err(to_ripple_error)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS rating_curves (
            reach_id INT NOT NULL,
            ds_depth REAL NOT NULL,
            ds_wse REAL NOT NULL,
            us_flow INT NOT NULL,
            us_depth REAL NOT NULL,
            us_wse REAL NOT NULL,
            boundary_condition TEXT NOT NULL,
            UNIQUE(reach_id, us_flow, ds_wse, boundary_condition)
        );",
    )
    .map_err(to_ripple_error)?;
    Ok(conn)
}

/// Inserts or replaces one rating-curve row, rounding depths/WSEs to
/// 0.1 ft (spec §4.7: "subtract thalwegs to depths, round to 0.1 ft").
pub fn upsert(conn: &Connection, row: &RatingCurveRow, boundary_condition: &str) -> Result<()> {
    let round1 = |v: f64| (v * 10.0).round() / 10.0;
    conn.execute(
        "INSERT OR REPLACE INTO rating_curves (reach_id, ds_depth, ds_wse, us_flow, us_depth, us_wse, boundary_condition)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![row.reach_id, round1(row.ds_depth), round1(row.ds_wse), row.us_flow, round1(row.us_depth), round1(row.us_wse), boundary_condition],
    )
    .map_err(to_ripple_error)?;
    Ok(())
}

/// Inverse of `known_wse_profile_name`: recovers `(us_flow, ds_wse)` from a
/// `f_<flow>-z_<wse with '_' for '.'>` profile name (mirrors
/// `parse_stage_flow` in `sqlite_utils.py`).
pub fn parse_known_wse_profile_name(name: &str) -> Option<(f64, f64)> {
    let (flow_part, wse_part) = name.split_once('-')?;
    let flow: f64 = flow_part.strip_prefix("f_")?.parse().ok()?;
    let wse: f64 = wse_part.strip_prefix("z_")?.replace('_', ".").parse().ok()?;
    Some((flow, wse))
}

/// Extracts rating-curve rows from a normal-depth ("nd") plan's result
/// HDF: profile names are the upstream flow written as a bare string
/// (`normal_depth_initial`/`normal_depth_incremental`), so both upstream
/// and downstream WSEs are read straight off their cross-sections' HDF
/// columns and joined by profile name (spec §4.7 "Rating-curve
/// extraction", `zero_depth_to_sqlite` in `sqlite_utils.py`).
pub fn extract_normal_depth_rows(
    hdf_path: &Path,
    reach_id: i64,
    us_river_reach_rs: &str,
    ds_river_reach_rs: &str,
    us_thalweg: f64,
    ds_thalweg: f64,
    missing: Option<(&MissingGridTracker, &str)>,
) -> Result<Vec<RatingCurveRow>> {
    let us_readings = read_cross_section_profiles(hdf_path, us_river_reach_rs)?;
    let ds_readings = read_cross_section_profiles(hdf_path, ds_river_reach_rs)?;
    let ds_by_profile: HashMap<&str, f64> = ds_readings.iter().map(|r| (r.profile_name.as_str(), r.water_surface)).collect();

    let mut rows = Vec::with_capacity(us_readings.len());
    for us in &us_readings {
        if let Some((tracker, plan)) = missing {
            if tracker.is_missing(plan, &us.profile_name) {
                continue;
            }
        }
        let Some(&ds_wse) = ds_by_profile.get(us.profile_name.as_str()) else { continue };
        let Ok(us_flow) = us.profile_name.trim().parse::<f64>() else { continue };
        rows.push(RatingCurveRow {
            reach_id,
            us_flow: us_flow.round() as i64,
            us_wse: us.water_surface,
            us_depth: us.water_surface - us_thalweg,
            ds_wse,
            ds_depth: ds_wse - ds_thalweg,
        });
    }
    Ok(rows)
}

/// Extracts rating-curve rows from a known-WSE ("kwse") plan's result
/// HDF: `us_flow`/`ds_wse` are parsed directly out of the profile name, so
/// only the us_xs HDF column needs to be read (spec §4.7,
/// `rating_curves_to_sqlite` in `sqlite_utils.py`).
pub fn extract_known_wse_rows(
    hdf_path: &Path,
    reach_id: i64,
    us_river_reach_rs: &str,
    us_thalweg: f64,
    ds_thalweg: f64,
    missing: Option<(&MissingGridTracker, &str)>,
) -> Result<Vec<RatingCurveRow>> {
    let us_readings = read_cross_section_profiles(hdf_path, us_river_reach_rs)?;
    let mut rows = Vec::with_capacity(us_readings.len());
    for us in &us_readings {
        if let Some((tracker, plan)) = missing {
            if tracker.is_missing(plan, &us.profile_name) {
                continue;
            }
        }
        let Some((us_flow, ds_wse)) = parse_known_wse_profile_name(&us.profile_name) else { continue };
        rows.push(RatingCurveRow {
            reach_id,
            us_flow: us_flow.round() as i64,
            us_wse: us.water_surface,
            us_depth: us.water_surface - us_thalweg,
            ds_wse,
            ds_depth: ds_wse - ds_thalweg,
        });
    }
    Ok(rows)
}

/// Reads back all rows for one reach, ordered by upstream flow (used by
/// `determine_flow_increments`-style callers rebuilding a flow/depth
/// series from a prior run).
pub fn rows_for_reach(conn: &Connection, reach_id: i64) -> Result<Vec<RatingCurveRow>> {
    let mut stmt = conn
        .prepare("SELECT reach_id, ds_depth, ds_wse, us_flow, us_depth, us_wse FROM rating_curves WHERE reach_id = ?1 ORDER BY us_flow")
        .map_err(to_ripple_error)?;
    let rows = stmt
        .query_map(params![reach_id], |r| {
            Ok(RatingCurveRow {
                reach_id: r.get(0)?,
                ds_depth: r.get(1)?,
                ds_wse: r.get(2)?,
                us_flow: r.get(3)?,
                us_depth: r.get(4)?,
                us_wse: r.get(5)?,
            })
        })
        .map_err(to_ripple_error)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(to_ripple_error)?);
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_a_row_through_sqlite() {
        let dir = std::env::temp_dir().join(format!("ripple1d-rating-curve-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fim.db");
        let conn = open(&path).unwrap();
        let row = RatingCurveRow { reach_id: 123, ds_depth: 2.34, ds_wse: 98.76, us_flow: 500, us_depth: 3.21, us_wse: 100.01 };
        upsert(&conn, &row, "nd").unwrap();
        let rows = rows_for_reach(&conn, 123).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ds_depth, 2.3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn parses_known_wse_profile_name_back_into_flow_and_wse() {
        assert_eq!(parse_known_wse_profile_name("f_1500-z_102_3"), Some((1500.0, 102.3)));
    }

    #[test]
    fn rejects_profile_names_without_the_known_wse_encoding() {
        assert_eq!(parse_known_wse_profile_name("500"), None);
        assert_eq!(parse_known_wse_profile_name("garbage"), None);
    }

    #[test]
    fn unique_constraint_replaces_duplicate_combinations() {
        let dir = std::env::temp_dir().join(format!("ripple1d-rating-curve-test-dup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fim.db");
        let conn = open(&path).unwrap();
        let row = RatingCurveRow { reach_id: 1, ds_depth: 1.0, ds_wse: 10.0, us_flow: 100, us_depth: 1.0, us_wse: 11.0 };
        upsert(&conn, &row, "nd").unwrap();
        let row2 = RatingCurveRow { reach_id: 1, ds_depth: 1.5, ds_wse: 10.0, us_flow: 100, us_depth: 1.5, us_wse: 11.5 };
        upsert(&conn, &row2, "nd").unwrap();
        let rows = rows_for_reach(&conn, 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ds_depth, 1.5);
        std::fs::remove_dir_all(&dir).ok();
    }
}
