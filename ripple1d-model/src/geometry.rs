use std::fs;
use std::path::Path;

use ripple1d_common::structures::{Point2D, StationElevation, StationSeries};
use ripple1d_common::utils::RecordReader;
use ripple1d_common::{Result, RippleError};

use crate::types::{CrossSection, GeometryFile, Junction, ManningSubdivision, River, Structure, StructureType};

fn parse_error(path: &Path, message: impl Into<String>) -> RippleError {
    RippleError::ParseError {
        file: path.display().to_string(),
        message: message.into(),
    }
}

/// Parses a HEC-RAS geometry (`.gNN`) file into a [`GeometryFile`].
///
/// Scans the file once, top to bottom: a `River Reach=` line establishes
/// the river/reach context for subsequent records, and a
/// `Type RM Length L Ch R =` header opens either a cross-section (type 1)
/// or a structure (type 2-6) record, which is then closed by its trailing
/// block (bank stations for a cross-section, the next header for a
/// structure) per the block decoding contract (spec §4.1).
pub fn parse_geometry(path: &Path, crs: &str) -> Result<GeometryFile> {
    let contents = fs::read_to_string(path).map_err(RippleError::Io)?;
    let mut reader = RecordReader::new(&contents);

    let title = reader.find_one_value("Geom Title=").unwrap_or_default().to_string();
    let version = reader.find_one_value("Program Version=").unwrap_or_default().to_string();

    let mut rivers: Vec<River> = Vec::new();
    let mut junctions: Vec<Junction> = Vec::new();

    let mut current_river = String::new();
    let mut current_reach = String::new();

    while !reader.at_end() {
        let line = reader.next_line().unwrap().to_string();

        if let Some(rest) = line.strip_prefix("River Reach=") {
            let mut parts = rest.split(',');
            current_river = parts.next().unwrap_or_default().trim().to_string();
            current_reach = parts.next().unwrap_or_default().trim().to_string();
            get_or_create_reach(&mut rivers, &current_river, &current_reach);
            continue;
        }

        if let Some(rest) = line.strip_prefix("Type RM Length L Ch R =").or_else(|| line.strip_prefix("Type RM Length L Ch R=")) {
            let fields: Vec<&str> = rest.split(',').collect();
            if fields.len() < 5 {
                return Err(parse_error(path, format!("malformed cross-section header: {}", line)));
            }
            let type_code: i32 = fields[0].trim().parse().map_err(|_| {
                parse_error(path, format!("non-numeric type code in header: {}", line))
            })?;
            let rs_raw = fields[1].trim();
            let interpolated = rs_raw.ends_with('*');
            let river_station: f64 = rs_raw.trim_end_matches('*').trim().parse().map_err(|_| {
                parse_error(path, format!("non-numeric river station in header: {}", line))
            })?;
            let left_reach_length: f64 = fields[2].trim().parse().unwrap_or(0.0);
            let channel_reach_length: f64 = fields[3].trim().parse().unwrap_or(0.0);
            let right_reach_length: f64 = fields[4].trim().parse().unwrap_or(0.0);

            if type_code == 1 {
                let xs = parse_cross_section_body(
                    &mut reader,
                    path,
                    &current_river,
                    &current_reach,
                    river_station,
                    interpolated,
                    left_reach_length,
                    channel_reach_length,
                    right_reach_length,
                )?;
                get_or_create_reach(&mut rivers, &current_river, &current_reach)
                    .cross_sections
                    .push(xs);
            } else {
                let structure_type = StructureType::from_code(type_code).ok_or_else(|| {
                    parse_error(path, format!("unrecognized structure type code {}", type_code))
                })?;
                let structure = parse_structure_body(
                    &mut reader,
                    &current_river,
                    &current_reach,
                    river_station,
                    structure_type,
                );
                get_or_create_reach(&mut rivers, &current_river, &current_reach)
                    .structures
                    .push(structure);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("Junct Name=") {
            let name = rest.trim().to_string();
            let junction = parse_junction_body(&mut reader, name);
            junctions.push(junction);
            continue;
        }
    }

    for river in &mut rivers {
        for reach in &mut river.reaches {
            reach
                .cross_sections
                .sort_by(|a, b| b.river_station.partial_cmp(&a.river_station).unwrap());
            reach
                .structures
                .sort_by(|a, b| b.river_station.partial_cmp(&a.river_station).unwrap());
        }
    }

    Ok(GeometryFile {
        title,
        version,
        rivers,
        junctions,
        crs: crs.to_string(),
    })
}

fn get_or_create_reach<'a>(rivers: &'a mut Vec<River>, river: &str, reach: &str) -> &'a mut crate::types::Reach {
    let river_idx = match rivers.iter().position(|r| r.name == river) {
        Some(i) => i,
        None => {
            rivers.push(River {
                name: river.to_string(),
                reaches: Vec::new(),
            });
            rivers.len() - 1
        }
    };
    let reaches = &mut rivers[river_idx].reaches;
    let reach_idx = match reaches.iter().position(|r| r.reach == reach) {
        Some(i) => i,
        None => {
            reaches.push(crate::types::Reach {
                river: river.to_string(),
                reach: reach.to_string(),
                cross_sections: Vec::new(),
                structures: Vec::new(),
            });
            reaches.len() - 1
        }
    };
    &mut reaches[reach_idx]
}

#[allow(clippy::too_many_arguments)]
fn parse_cross_section_body(
    reader: &mut RecordReader,
    path: &Path,
    river: &str,
    reach: &str,
    river_station: f64,
    interpolated: bool,
    left_reach_length: f64,
    channel_reach_length: f64,
    right_reach_length: f64,
) -> Result<CrossSection> {
    let mut cut_line = Vec::new();
    let mut station_elevation = Vec::new();
    let mut mannings = Vec::new();
    let mut left_bank_station = 0.0;
    let mut right_bank_station = 0.0;
    let mut source_block = Vec::new();

    loop {
        if reader.at_end() {
            break;
        }
        let line = reader.peek().unwrap().to_string();

        if line.starts_with("Type RM Length L Ch R =")
            || line.starts_with("Type RM Length L Ch R=")
            || line.starts_with("River Reach=")
            || line.starts_with("Junct Name=")
        {
            break;
        }

        reader.next_line();
        source_block.push(line.clone());

        if let Some(rest) = line.strip_prefix("XS GIS Cut Line=") {
            let n: usize = rest.trim().parse().map_err(|_| {
                parse_error(path, format!("non-numeric coordinate count: {}", line))
            })?;
            let n_lines = n.div_ceil(2);
            let coord_lines = reader.take_lines(n_lines).map_err(|_| {
                parse_error(path, "XS GIS Cut Line block truncated".to_string())
            })?;
            source_block.extend(coord_lines.iter().cloned());
            let mut fields = Vec::new();
            for l in &coord_lines {
                fields.extend(RecordReader::split_fixed_width(l, 16));
            }
            for pair in fields.chunks(2) {
                if pair.len() == 2 && cut_line.len() < n {
                    let x: f64 = pair[0].parse().unwrap_or(0.0);
                    let y: f64 = pair[1].parse().unwrap_or(0.0);
                    cut_line.push(Point2D::new(x, y));
                }
            }
        } else if let Some(rest) = line.strip_prefix("#Sta/Elev=") {
            let n: usize = rest.trim().split(',').next().unwrap_or("0").trim().parse().map_err(|_| {
                parse_error(path, format!("non-numeric station-elevation count: {}", line))
            })?;
            let n_lines = n.div_ceil(5);
            let data_lines = reader.take_lines(n_lines).map_err(|_| {
                parse_error(path, "#Sta/Elev block truncated".to_string())
            })?;
            source_block.extend(data_lines.iter().cloned());
            let mut fields = Vec::new();
            for l in &data_lines {
                fields.extend(RecordReader::split_fixed_width(l, 8));
            }
            for pair in fields.chunks(2) {
                if pair.len() == 2 && station_elevation.len() < n {
                    let station: f64 = pair[0].parse().unwrap_or(0.0);
                    let elevation: f64 = pair[1].parse().unwrap_or(0.0);
                    station_elevation.push(StationElevation { station, elevation });
                }
            }
        } else if let Some(rest) = line.strip_prefix("#Mann=") {
            let n: usize = rest.trim().split(',').next().unwrap_or("0").trim().parse().map_err(|_| {
                parse_error(path, format!("non-numeric Manning's count: {}", line))
            })?;
            let n_lines = n.div_ceil(3);
            let data_lines = reader.take_lines(n_lines).map_err(|_| {
                parse_error(path, "#Mann block truncated".to_string())
            })?;
            source_block.extend(data_lines.iter().cloned());
            let mut fields = Vec::new();
            for l in &data_lines {
                fields.extend(RecordReader::split_fixed_width(l, 8));
            }
            for triplet in fields.chunks(3) {
                if triplet.len() == 3 && mannings.len() < n {
                    mannings.push(ManningSubdivision {
                        station: triplet[0].parse().unwrap_or(0.0),
                        n: triplet[1].parse().unwrap_or(0.0),
                        code: triplet[2].parse().unwrap_or(0),
                    });
                }
            }
        } else if let Some(rest) = line.strip_prefix("Bank Sta=") {
            let mut parts = rest.split(',');
            left_bank_station = parts.next().unwrap_or("0").trim().parse().unwrap_or(0.0);
            right_bank_station = parts.next().unwrap_or("0").trim().parse().unwrap_or(0.0);
            // Bank Sta closes the cross-section record.
            break;
        }
    }

    Ok(CrossSection {
        river: river.to_string(),
        reach: reach.to_string(),
        river_station,
        interpolated,
        left_reach_length,
        channel_reach_length,
        right_reach_length,
        cut_line,
        station_elevation: StationSeries::new(station_elevation),
        left_bank_station,
        right_bank_station,
        mannings,
        source_block,
    })
}

fn parse_structure_body(
    reader: &mut RecordReader,
    river: &str,
    reach: &str,
    river_station: f64,
    structure_type: StructureType,
) -> Structure {
    let mut source_block = Vec::new();
    let mut distance_to_upstream_xs = 0.0;
    let mut width = 0.0;

    loop {
        if reader.at_end() {
            break;
        }
        let line = reader.peek().unwrap().to_string();
        if line.starts_with("Type RM Length L Ch R =")
            || line.starts_with("Type RM Length L Ch R=")
            || line.starts_with("River Reach=")
            || line.starts_with("Junct Name=")
        {
            break;
        }
        reader.next_line();
        if line.trim().is_empty() {
            source_block.push(line);
            continue;
        }
        if let Some(rest) = line.strip_prefix("BR Dist=") {
            distance_to_upstream_xs = rest.trim().parse().unwrap_or(0.0);
        } else if let Some(rest) = line.strip_prefix("Culvert Width=") {
            width = rest.trim().parse().unwrap_or(0.0);
        }
        source_block.push(line);
    }

    Structure {
        river: river.to_string(),
        reach: reach.to_string(),
        river_station,
        structure_type,
        distance_to_upstream_xs,
        width,
        source_block,
    }
}

fn parse_junction_body(reader: &mut RecordReader, name: String) -> Junction {
    let mut upstream = Vec::new();
    let mut downstream = Vec::new();
    let mut junction_lengths = Vec::new();

    loop {
        if reader.at_end() {
            break;
        }
        let line = reader.peek().unwrap().to_string();
        if line.trim().is_empty() {
            reader.next_line();
            break;
        }
        if line.starts_with("Junct Name=") {
            break;
        }
        reader.next_line();
        if let Some(rest) = line.strip_prefix("Up River,Reach=") {
            let mut parts = rest.split(',');
            let river = parts.next().unwrap_or_default().trim().to_string();
            let reach = parts.next().unwrap_or_default().trim().to_string();
            upstream.push((river, reach));
        } else if let Some(rest) = line.strip_prefix("Dn River,Reach=") {
            let mut parts = rest.split(',');
            let river = parts.next().unwrap_or_default().trim().to_string();
            let reach = parts.next().unwrap_or_default().trim().to_string();
            downstream.push((river, reach));
        } else if let Some(rest) = line.strip_prefix("Junc L&A=") {
            let length: f64 = rest.split(',').next().unwrap_or("0").trim().parse().unwrap_or(0.0);
            junction_lengths.push(length);
        }
    }

    Junction {
        name,
        upstream,
        downstream,
        junction_lengths,
    }
}

/// Emits a geometry file's text from an unchanged [`GeometryFile`],
/// reconstructing each record's header and replaying its preserved
/// `source_block` for the fields this parser does not model explicitly.
pub fn write_geometry(geom: &GeometryFile) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Geom Title={}", geom.title));
    lines.push(format!("Program Version={}", geom.version));

    for river in &geom.rivers {
        for reach in &river.reaches {
            lines.push(format!(
                "River Reach={},{}",
                river.name, reach.reach
            ));
            for xs in &reach.cross_sections {
                let rs_field = if xs.interpolated {
                    format!("{}*", xs.river_station)
                } else {
                    format!("{}", xs.river_station)
                };
                lines.push(format!(
                    "Type RM Length L Ch R ={} ,{} ,{},{},{}",
                    1, rs_field, xs.left_reach_length, xs.channel_reach_length, xs.right_reach_length
                ));
                lines.extend(xs.source_block.iter().cloned());
            }
            for st in &reach.structures {
                lines.push(format!(
                    "Type RM Length L Ch R ={} ,{} ,0,0,0",
                    st.structure_type.code(),
                    st.river_station
                ));
                lines.extend(st.source_block.iter().cloned());
            }
        }
    }

    for junction in &geom.junctions {
        lines.push(format!("Junct Name={}", junction.name));
        for (river, reach) in &junction.upstream {
            lines.push(format!("Up River,Reach={},{}", river, reach));
        }
        for (river, reach) in &junction.downstream {
            lines.push(format!("Dn River,Reach={},{}", river, reach));
        }
        for length in &junction.junction_lengths {
            lines.push(format!("Junc L&A={},0", length));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_geometry() -> String {
        let mut s = String::new();
        s.push_str("Geom Title=Test Geometry\n");
        s.push_str("Program Version=6.31\n");
        s.push_str("River Reach=Test River ,Reach1   \n");
        s.push_str("Type RM Length L Ch R =1 ,100. ,500,500,500\n");
        s.push_str("XS GIS Cut Line=2\n");
        s.push_str(&format!("{:>16}{:>16}{:>16}{:>16}\n", "0.0", "0.0", "100.0", "0.0"));
        s.push_str("#Sta/Elev= 3 \n");
        s.push_str(&format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}\n",
            "0.0", "10.0", "50.0", "2.0", "100.0", "10.0"
        ));
        s.push_str("Bank Sta=20.0,80.0\n");
        s.push_str("Type RM Length L Ch R =1 ,50. ,400,400,400\n");
        s.push_str("XS GIS Cut Line=2\n");
        s.push_str(&format!("{:>16}{:>16}{:>16}{:>16}\n", "0.0", "0.0", "100.0", "0.0"));
        s.push_str("#Sta/Elev= 3 \n");
        s.push_str(&format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}\n",
            "0.0", "9.0", "50.0", "1.0", "100.0", "9.0"
        ));
        s.push_str("Bank Sta=20.0,80.0\n");
        s
    }

    #[test]
    fn parse_geometry_builds_one_reach_with_two_cross_sections() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_geom");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.g01");
        fs::write(&path, sample_geometry()).unwrap();

        let geom = parse_geometry(&path, "EPSG:2277").unwrap();
        assert_eq!(geom.rivers.len(), 1);
        let reach = &geom.rivers[0].reaches[0];
        assert_eq!(reach.cross_sections.len(), 2);
        // decreasing river station, upstream-most first
        assert_eq!(reach.cross_sections[0].river_station, 100.0);
        assert_eq!(reach.cross_sections[1].river_station, 50.0);
        assert_eq!(reach.cross_sections[0].cut_line.len(), 2);
        assert_eq!(reach.cross_sections[0].station_elevation.len(), 3);
        assert_eq!(reach.cross_sections[0].left_bank_station, 20.0);
        assert_eq!(reach.cross_sections[0].right_bank_station, 80.0);
    }

    #[test]
    fn parse_geometry_marks_interpolated_station() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_geom_interp");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.g01");
        let mut s = sample_geometry();
        s = s.replace("Type RM Length L Ch R =1 ,50. ,", "Type RM Length L Ch R =1 ,50.* ,");
        fs::write(&path, s).unwrap();

        let geom = parse_geometry(&path, "EPSG:2277").unwrap();
        let reach = &geom.rivers[0].reaches[0];
        assert!(reach.cross_sections[1].interpolated);
    }

    #[test]
    fn truncated_block_fails_with_parse_error() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_geom_truncated");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.g01");
        let mut s = String::new();
        s.push_str("Geom Title=Bad\n");
        s.push_str("River Reach=R ,1   \n");
        s.push_str("Type RM Length L Ch R =1 ,100. ,0,0,0\n");
        s.push_str("XS GIS Cut Line=4\n");
        s.push_str(&format!("{:>16}{:>16}{:>16}{:>16}\n", "0.0", "0.0", "100.0", "0.0"));
        fs::write(&path, s).unwrap();

        let result = parse_geometry(&path, "EPSG:2277");
        assert!(result.is_err());
    }
}
