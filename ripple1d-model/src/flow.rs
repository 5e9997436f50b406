use std::fs;
use std::path::Path;

use ripple1d_common::utils::RecordReader;
use ripple1d_common::{Result, RippleError};

use crate::types::{FlowChangeLocation, FlowFile};

fn parse_error(path: &Path, message: impl Into<String>) -> RippleError {
    RippleError::ParseError {
        file: path.display().to_string(),
        message: message.into(),
    }
}

/// Parses a HEC-RAS steady-flow (`.fNN`) file into a [`FlowFile`].
pub fn parse_flow(path: &Path) -> Result<FlowFile> {
    let contents = fs::read_to_string(path).map_err(RippleError::Io)?;
    let mut reader = RecordReader::new(&contents);

    let title = reader
        .find_one_value("Flow Title=")
        .ok_or_else(|| parse_error(path, "missing Flow Title= record"))?
        .to_string();

    let num_profiles: usize = reader
        .find_one_value("Number of Profiles=")
        .ok_or_else(|| parse_error(path, "missing Number of Profiles= record"))?
        .trim()
        .parse()
        .map_err(|_| parse_error(path, "non-numeric Number of Profiles="))?;

    let profile_names: Vec<String> = reader
        .find_one_value("Profile Names=")
        .ok_or_else(|| parse_error(path, "missing Profile Names= record"))?
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();

    let mut flow_change_locations = Vec::new();
    let mut known_water_surface_elevations = vec![None; num_profiles];
    let mut normal_depth_slope = None;

    while !reader.at_end() {
        let line = reader.next_line().unwrap().to_string();

        if let Some(rest) = line.strip_prefix("River Rch & RM=") {
            let mut parts = rest.split(',');
            let river = parts.next().unwrap_or_default().trim().to_string();
            let reach = parts.next().unwrap_or_default().trim().to_string();
            let river_station: f64 = parts
                .next()
                .unwrap_or("0")
                .trim()
                .parse()
                .map_err(|_| parse_error(path, format!("non-numeric river station: {}", line)))?;

            let mut flows = Vec::with_capacity(num_profiles);
            while flows.len() < num_profiles {
                if reader.at_end() {
                    return Err(parse_error(path, "discharge block truncated"));
                }
                let peeked = reader.peek().unwrap();
                if peeked.starts_with("River Rch & RM=") || peeked.starts_with("Boundary for River Rch & Prof#=") {
                    break;
                }
                let data_line = reader.next_line().unwrap();
                for field in RecordReader::split_fixed_width(data_line, 8) {
                    if !field.is_empty() {
                        flows.push(field.parse::<f64>().map_err(|_| {
                            parse_error(path, format!("non-numeric discharge field: {}", field))
                        })?);
                    }
                    if flows.len() == num_profiles {
                        break;
                    }
                }
            }

            flow_change_locations.push(FlowChangeLocation {
                river,
                reach,
                river_station,
                flows,
            });
            continue;
        }

        if let Some(rest) = line.strip_prefix("Boundary for River Rch & Prof#=") {
            let profile_idx: usize = rest
                .rsplit(',')
                .next()
                .unwrap_or("1")
                .trim()
                .parse::<usize>()
                .unwrap_or(1)
                - 1;
            if reader.at_end() {
                continue;
            }
            reader.next_line(); // "Up Type= 0 "
            if reader.at_end() {
                continue;
            }
            let dn_type_line = reader.next_line().unwrap_or_default().to_string();
            if dn_type_line.trim_start().starts_with("Dn Type= 1") {
                if let Some(wse_line) = reader.next_line() {
                    if let Some(rest) = wse_line.strip_prefix("Dn Known WS=") {
                        if let Some(slot) = known_water_surface_elevations.get_mut(profile_idx) {
                            *slot = rest.trim().parse().ok();
                        }
                    }
                }
            } else if dn_type_line.trim_start().starts_with("Dn Type= 3") {
                if let Some(slope_line) = reader.next_line() {
                    if let Some(rest) = slope_line.strip_prefix("Dn Slope=") {
                        normal_depth_slope = rest.trim().parse().ok();
                    }
                }
            }
            continue;
        }
    }

    Ok(FlowFile {
        title,
        profile_names,
        flow_change_locations,
        known_water_surface_elevations,
        normal_depth_slope,
    })
}

/// Emits a steady-flow file's text from an unchanged [`FlowFile`].
pub fn write_flow(flow: &FlowFile) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Flow Title={}", flow.title));
    lines.push(format!("Number of Profiles= {}", flow.num_profiles()));
    lines.push(format!("Profile Names={}", flow.profile_names.join(",")));

    for fcl in &flow.flow_change_locations {
        lines.push(format!(
            "River Rch & RM={},{:<16},{:<8}",
            fcl.river, fcl.reach, fcl.river_station
        ));
        for chunk in fcl.flows.chunks(10) {
            let line: String = chunk.iter().map(|f| format!("{:>8}", f)).collect();
            lines.push(line);
        }
    }

    for (i, wse) in flow.known_water_surface_elevations.iter().enumerate() {
        if let Some(wse) = wse {
            if let Some(fcl) = flow.flow_change_locations.last() {
                lines.push(format!(
                    "Boundary for River Rch & Prof#={},{:<16}, {}",
                    fcl.river,
                    fcl.reach,
                    i + 1
                ));
                lines.push("Up Type= 0 ".to_string());
                lines.push("Dn Type= 1 ".to_string());
                lines.push(format!("Dn Known WS={}", wse));
            }
        } else if let Some(slope) = flow.normal_depth_slope {
            if let Some(fcl) = flow.flow_change_locations.last() {
                lines.push(format!(
                    "Boundary for River Rch & Prof#={},{:<16}, {}",
                    fcl.river,
                    fcl.reach,
                    i + 1
                ));
                lines.push("Up Type= 0 ".to_string());
                lines.push("Dn Type= 3 ".to_string());
                lines.push(format!("Dn Slope={}", slope));
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_flow_normal_depth() -> String {
        let mut s = String::new();
        s.push_str("Flow Title=Test Flow\n");
        s.push_str("Number of Profiles= 2\n");
        s.push_str("Profile Names=PF1,PF2\n");
        s.push_str("River Rch & RM=Test River ,Reach1          ,100.0   \n");
        s.push_str(&format!("{:>8}{:>8}\n", "500.0", "1000.0"));
        s.push_str("Boundary for River Rch & Prof#=Test River ,Reach1          , 1\n");
        s.push_str("Up Type= 0 \n");
        s.push_str("Dn Type= 3 \n");
        s.push_str("Dn Slope=0.001\n");
        s.push_str("Boundary for River Rch & Prof#=Test River ,Reach1          , 2\n");
        s.push_str("Up Type= 0 \n");
        s.push_str("Dn Type= 3 \n");
        s.push_str("Dn Slope=0.001\n");
        s
    }

    #[test]
    fn parse_flow_reads_discharges_and_normal_depth() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_flow");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.f01");
        fs::write(&path, sample_flow_normal_depth()).unwrap();

        let flow = parse_flow(&path).unwrap();
        assert_eq!(flow.profile_names, vec!["PF1", "PF2"]);
        assert_eq!(flow.flow_change_locations.len(), 1);
        assert_eq!(flow.flow_change_locations[0].flows, vec![500.0, 1000.0]);
        assert_eq!(flow.normal_depth_slope, Some(0.001));
        assert!(flow.known_water_surface_elevations.iter().all(|w| w.is_none()));
    }

    #[test]
    fn parse_flow_reads_known_wse_boundary() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_flow_kwse");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.f01");
        let mut s = String::new();
        s.push_str("Flow Title=KWSE Flow\n");
        s.push_str("Number of Profiles= 1\n");
        s.push_str("Profile Names=PF1\n");
        s.push_str("River Rch & RM=Test River ,Reach1          ,100.0   \n");
        s.push_str(&format!("{:>8}\n", "500.0"));
        s.push_str("Boundary for River Rch & Prof#=Test River ,Reach1          , 1\n");
        s.push_str("Up Type= 0 \n");
        s.push_str("Dn Type= 1 \n");
        s.push_str("Dn Known WS=12.5\n");
        fs::write(&path, s).unwrap();

        let flow = parse_flow(&path).unwrap();
        assert_eq!(flow.known_water_surface_elevations, vec![Some(12.5)]);
    }
}
