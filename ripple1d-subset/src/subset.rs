use std::collections::HashMap;

use ripple1d_common::structures::{Point2D, Polyline};
use ripple1d_common::{Result, RippleError};
use ripple1d_conflation::XsRef;
use ripple1d_geometry::concave_hull;
use ripple1d_model::types::{CrossSection, GeometryFile, Structure, StructureType};

use crate::chain::{walk_reach_chain, ChainHop};

/// A reach-scoped geometry produced by the subsetter (spec §4.5): a single
/// renamed river/reach plus the clipped centerline and closing hull needed
/// to write the sub-model's geopackage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubModelGeometry {
    pub nwm_id: i64,
    pub cross_sections: Vec<CrossSection>,
    pub structures: Vec<Structure>,
    pub centerline: Polyline,
    pub hull: Vec<Point2D>,
}

fn find_xs<'a>(reach: &'a ripple1d_model::types::Reach, xs_id: f64) -> Option<&'a CrossSection> {
    reach.cross_sections.iter().find(|xs| (xs.xs_id() - xs_id).abs() < 1e-6)
}

/// Concatenates each hop's source centerline end-to-end, in chain order.
fn concatenated_centerline(centerlines: &HashMap<(String, String), Polyline>, hops: &[ChainHop]) -> Polyline {
    let mut vertices = Vec::new();
    for hop in hops {
        if let Some(line) = centerlines.get(&(hop.river.clone(), hop.reach.clone())) {
            for i in 0..line.len() {
                vertices.push(line.get(i));
            }
        }
    }
    Polyline::new(&vertices, 0)
}

/// Builds the reach-scoped geometry for one conflated network reach (spec
/// §4.5 steps 1-7).
pub fn build_submodel(
    geometry: &GeometryFile,
    centerlines: &HashMap<(String, String), Polyline>,
    us_xs: &XsRef,
    ds_xs: &XsRef,
    nwm_id: i64,
    max_hops: usize,
) -> Result<SubModelGeometry> {
    let hops = walk_reach_chain(geometry, (&us_xs.river, &us_xs.reach), (&ds_xs.river, &ds_xs.reach), max_hops)?;

    let mut combined_xs: Vec<(f64, f64, &CrossSection)> = Vec::new();
    let mut combined_structs: Vec<(f64, &Structure)> = Vec::new();
    let mut running_max = f64::NEG_INFINITY;

    for (i, hop) in hops.iter().enumerate() {
        let Some(reach) = geometry.reach(&hop.river, &hop.reach) else {
            return Err(RippleError::ParseError {
                file: format!("{}/{}", hop.river, hop.reach),
                message: "reach referenced by junction chain not found in geometry".to_string(),
            });
        };
        let shift = if i == 0 { 0.0 } else { running_max + hop.junction_length_into };

        for xs in &reach.cross_sections {
            let keep = if i == 0 {
                xs.river_station <= us_xs.xs_id
            } else if i == hops.len() - 1 {
                xs.river_station >= ds_xs.xs_id
            } else {
                true
            };
            if !keep {
                continue;
            }
            let shifted = xs.river_station + shift;
            running_max = running_max.max(shifted);
            combined_xs.push((shifted, xs.river_station, xs));
        }
        for structure in &reach.structures {
            combined_structs.push((structure.river_station + shift, structure));
        }
    }

    combined_xs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
    if combined_xs.len() < 2 {
        return Err(RippleError::SingleXsModel { reach_id: nwm_id });
    }

    let n = combined_xs.len();
    let new_xs_stations: Vec<f64> = (0..n).map(|i| (n - i) as f64).collect();
    let min_shifted = combined_xs.last().unwrap().0;
    let max_shifted = combined_xs.first().unwrap().0;

    let mut retained_structs: Vec<(f64, &Structure)> = combined_structs
        .into_iter()
        .filter(|(shifted, _)| *shifted > min_shifted && *shifted < max_shifted)
        .filter(|(_, structure)| {
            if structure.structure_type == StructureType::Lateral {
                tracing::warn!(river_station = structure.river_station, "dropping lateral structure during subset");
                false
            } else {
                true
            }
        })
        .collect();
    retained_structs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

    let cross_sections: Vec<CrossSection> = combined_xs
        .iter()
        .zip(new_xs_stations.iter())
        .map(|((_, _, xs), &new_station)| {
            let mut xs = (*xs).clone();
            xs.river = nwm_id.to_string();
            xs.reach = nwm_id.to_string();
            xs.river_station = new_station;
            xs
        })
        .collect();

    let structures: Vec<Structure> = retained_structs
        .iter()
        .map(|(shifted, structure)| {
            let idx = combined_xs.iter().position(|(s, _, _)| s < shifted).unwrap_or(n - 1);
            let mut structure = (*structure).clone();
            structure.river = nwm_id.to_string();
            structure.reach = nwm_id.to_string();
            structure.river_station = new_xs_stations[idx].floor() + 0.5;
            structure
        })
        .collect();

    let first_reach = geometry.reach(&us_xs.river, &us_xs.reach).unwrap();
    let last_reach = geometry.reach(&ds_xs.river, &ds_xs.reach).unwrap();
    let us_source_xs = find_xs(first_reach, us_xs.xs_id);
    let ds_source_xs = find_xs(last_reach, ds_xs.xs_id);

    let mut centerline = concatenated_centerline(centerlines, &hops);
    if let (Some(us), Some(ds)) = (us_source_xs, ds_source_xs) {
        if centerline.len() >= 2 {
            let us_cut = Polyline::new(&us.cut_line, 0);
            let ds_cut = Polyline::new(&ds.cut_line, 0);
            let us_point = ripple1d_geometry::intersect_with_centerline(&us_cut, &centerline);
            let ds_point = ripple1d_geometry::intersect_with_centerline(&ds_cut, &centerline);
            if let (Some(a), Some(b)) = (us_point, ds_point) {
                let (along_a, _) = centerline.project(a);
                let (along_b, _) = centerline.project(b);
                let (from, to) = (along_a.min(along_b), along_a.max(along_b));
                centerline = centerline.clipped(from, to);
            }
        }
    }

    let xs_refs: Vec<&CrossSection> = combined_xs.iter().map(|(_, _, xs)| *xs).collect();
    let hull = concave_hull(&xs_refs).unwrap_or_default();

    Ok(SubModelGeometry { nwm_id, cross_sections, structures, centerline, hull })
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_common::structures::{StationElevation, StationSeries};
    use ripple1d_model::types::{Reach, River};

    fn xs(river_station: f64) -> CrossSection {
        CrossSection {
            river: "Test River".to_string(),
            reach: "Test Reach".to_string(),
            river_station,
            interpolated: false,
            left_reach_length: 0.0,
            channel_reach_length: 0.0,
            right_reach_length: 0.0,
            cut_line: vec![Point2D::new(-50.0, river_station), Point2D::new(50.0, river_station)],
            station_elevation: StationSeries::new(vec![
                StationElevation { station: 0.0, elevation: 10.0 },
                StationElevation { station: 100.0, elevation: 10.0 },
            ]),
            left_bank_station: 40.0,
            right_bank_station: 60.0,
            mannings: Vec::new(),
            source_block: Vec::new(),
        }
    }

    fn single_reach_geometry() -> GeometryFile {
        GeometryFile {
            title: "Test".to_string(),
            version: "6.31".to_string(),
            rivers: vec![River {
                name: "Test River".to_string(),
                reaches: vec![Reach {
                    river: "Test River".to_string(),
                    reach: "Test Reach".to_string(),
                    cross_sections: vec![xs(400.0), xs(300.0), xs(200.0), xs(100.0)],
                    structures: Vec::new(),
                }],
            }],
            junctions: Vec::new(),
            crs: "EPSG:2277".to_string(),
        }
    }

    #[test]
    fn renumbers_stations_from_n_to_one() {
        let geometry = single_reach_geometry();
        let mut centerlines = HashMap::new();
        centerlines.insert(
            ("Test River".to_string(), "Test Reach".to_string()),
            Polyline::new(&[Point2D::new(0.0, 500.0), Point2D::new(0.0, 0.0)], 0),
        );
        let us_xs = XsRef { river: "Test River".to_string(), reach: "Test Reach".to_string(), xs_id: 300.0, min_elevation: 10.0, max_elevation: 10.0 };
        let ds_xs = XsRef { river: "Test River".to_string(), reach: "Test Reach".to_string(), xs_id: 100.0, min_elevation: 10.0, max_elevation: 10.0 };

        let submodel = build_submodel(&geometry, &centerlines, &us_xs, &ds_xs, 2823960, 100).unwrap();
        assert_eq!(submodel.cross_sections.len(), 3);
        let stations: Vec<f64> = submodel.cross_sections.iter().map(|xs| xs.river_station).collect();
        assert_eq!(stations, vec![3.0, 2.0, 1.0]);
        assert!(submodel.cross_sections.iter().all(|xs| xs.river == "2823960"));
    }

    #[test]
    fn fewer_than_two_cross_sections_fails() {
        let geometry = single_reach_geometry();
        let centerlines = HashMap::new();
        let us_xs = XsRef { river: "Test River".to_string(), reach: "Test Reach".to_string(), xs_id: 100.0, min_elevation: 10.0, max_elevation: 10.0 };
        let ds_xs = us_xs.clone();
        let result = build_submodel(&geometry, &centerlines, &us_xs, &ds_xs, 1, 100);
        assert!(matches!(result, Err(RippleError::SingleXsModel { .. })));
    }
}
