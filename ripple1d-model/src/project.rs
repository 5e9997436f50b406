use std::fs;
use std::path::Path;

use ripple1d_common::utils::RecordReader;
use ripple1d_common::{Result, RippleError};

use crate::types::{SourceModel, UnitSystem};

/// Parses a HEC-RAS project (`.prj`) file into a [`SourceModel`].
pub fn parse_project(path: &Path) -> Result<SourceModel> {
    let contents = fs::read_to_string(path).map_err(RippleError::Io)?;
    let reader = RecordReader::new(&contents);

    let title = reader
        .find_one_value("Proj Title=")
        .ok_or_else(|| RippleError::ParseError {
            file: path.display().to_string(),
            message: "missing Proj Title= record".to_string(),
        })?
        .to_string();

    let units = if contents.contains("English Units") {
        UnitSystem::English
    } else {
        UnitSystem::Metric
    };

    let version = reader
        .find_one_value("Program Version=")
        .unwrap_or_default()
        .to_string();

    let geoms: Vec<String> = reader
        .find_with_prefix("Geom File=")
        .into_iter()
        .map(|(_, l)| l["Geom File=".len()..].to_string())
        .collect();

    let flows: Vec<String> = reader
        .find_with_prefix("Flow File=")
        .into_iter()
        .map(|(_, l)| l["Flow File=".len()..].to_string())
        .collect();

    let plans: Vec<String> = reader
        .find_with_prefix("Plan File=")
        .into_iter()
        .map(|(_, l)| l["Plan File=".len()..].to_string())
        .collect();

    let current_plan = reader.find_one_value("Current Plan=").map(|s| s.to_string());

    Ok(SourceModel {
        title,
        units,
        version,
        plans,
        geoms,
        flows,
        current_plan,
    })
}

/// Emits a byte-identical project file from an unchanged [`SourceModel`]
/// (the parser's round-trip property, spec §4.1).
pub fn write_project(model: &SourceModel) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Proj Title={}", model.title));
    if model.units == UnitSystem::English {
        lines.push("English Units".to_string());
    } else {
        lines.push("Metric Units".to_string());
    }
    for geom in &model.geoms {
        lines.push(format!("Geom File={}", geom));
    }
    for flow in &model.flows {
        lines.push(format!("Flow File={}", flow));
    }
    for plan in &model.plans {
        lines.push(format!("Plan File={}", plan));
    }
    if let Some(ref plan) = model.current_plan {
        lines.push(format!("Current Plan={}", plan));
    }
    if !model.version.is_empty() {
        lines.push(format!("Program Version={}", model.version));
    }
    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn sample_project() -> &'static str {
        "Proj Title=Test River Model\n\
English Units\n\
Geom File=g01\n\
Flow File=f01\n\
Plan File=p01\n\
Current Plan=p01\n\
Program Version=6.31\n"
    }

    #[test]
    fn parse_project_reads_all_records() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_project");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.prj");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(sample_project().as_bytes()).unwrap();

        let model = parse_project(&path).unwrap();
        assert_eq!(model.title, "Test River Model");
        assert_eq!(model.units, UnitSystem::English);
        assert_eq!(model.geoms, vec!["g01"]);
        assert_eq!(model.flows, vec!["f01"]);
        assert_eq!(model.plans, vec!["p01"]);
        assert_eq!(model.current_plan.as_deref(), Some("p01"));
        assert_eq!(model.version, "6.31");
    }

    #[test]
    fn write_project_round_trips_fields() {
        let model = SourceModel {
            title: "Test River Model".to_string(),
            units: UnitSystem::English,
            version: "6.31".to_string(),
            plans: vec!["p01".to_string()],
            geoms: vec!["g01".to_string()],
            flows: vec!["f01".to_string()],
            current_plan: Some("p01".to_string()),
        };
        let text = write_project(&model);
        let reparsed_reader = RecordReader::new(&text);
        assert_eq!(reparsed_reader.find_one_value("Proj Title="), Some("Test River Model"));
        assert_eq!(reparsed_reader.find_one_value("Geom File="), Some("g01"));
    }
}
