use std::path::Path;

use ripple1d_common::{Result, RippleError};

/// One `(profile, water surface, flow)` reading extracted from a result
/// HDF's steady-flow tables (spec §4.7 "Rating-curve extraction").
#[derive(Debug, Clone)]
pub struct ProfileReading {
    pub profile_name: String,
    pub water_surface: f64,
    pub flow: f64,
}

fn to_ripple_error(e: hdf5::Error) -> RippleError {
    RippleError::Other(format!("reading result HDF: {e}"))
}

/// Reads the steady-flow `Water Surface` and `Flow` tables for one
/// cross-section (`river_reach_rs`, e.g. `"2823960 2823960 3"`) out of a
/// plan's result HDF (spec §4.7: "read the result HDF; tables
/// `/Results/Steady/.../Water Surface` and `.../Flow` are indexed by
/// profile name and cross-section name").
pub fn read_cross_section_profiles(hdf_path: &Path, river_reach_rs: &str) -> Result<Vec<ProfileReading>> {
    let file = hdf5::File::open(hdf_path).map_err(to_ripple_error)?;
    let profile_names = read_profile_names(&file)?;

    let ws_dataset = file
        .dataset("Results/Steady/Output/Output Blocks/Base Output/Steady Profiles/Cross Sections/Water Surface")
        .map_err(to_ripple_error)?;
    let flow_dataset = file
        .dataset("Results/Steady/Output/Output Blocks/Base Output/Steady Profiles/Cross Sections/Flow")
        .map_err(to_ripple_error)?;
    let xs_names: Vec<String> = file
        .dataset("Results/Steady/Output/Geometry Info/Cross Section Only")
        .map_err(to_ripple_error)?
        .read_1d::<hdf5::types::VarLenUnicode>()
        .map_err(to_ripple_error)?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let Some(column) = xs_names.iter().position(|name| name.trim() == river_reach_rs.trim()) else {
        return Err(RippleError::Other(format!("cross-section {river_reach_rs} not found in result HDF")));
    };

    let ws: Vec<Vec<f64>> = ws_dataset.read_2d::<f64>().map_err(to_ripple_error)?.outer_iter().map(|row| row.to_vec()).collect();
    let flows: Vec<Vec<f64>> = flow_dataset.read_2d::<f64>().map_err(to_ripple_error)?.outer_iter().map(|row| row.to_vec()).collect();

    let mut readings = Vec::with_capacity(profile_names.len());
    for (i, profile_name) in profile_names.into_iter().enumerate() {
        readings.push(ProfileReading {
            profile_name,
            water_surface: ws[i][column],
            flow: flows[i][column],
        });
    }
    Ok(readings)
}

fn read_profile_names(file: &hdf5::File) -> Result<Vec<String>> {
    file.dataset("Results/Steady/Output/Output Blocks/Base Output/Steady Profiles/Profile Names")
        .map_err(to_ripple_error)?
        .read_1d::<hdf5::types::VarLenUnicode>()
        .map_err(to_ripple_error)
        .map(|names| names.iter().map(|s| s.to_string()).collect())
}
