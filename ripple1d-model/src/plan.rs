use std::fs;
use std::path::Path;

use ripple1d_common::utils::RecordReader;
use ripple1d_common::{Result, RippleError};

use crate::types::PlanFile;

/// Parses a HEC-RAS plan (`.pNN`) file into a [`PlanFile`].
pub fn parse_plan(path: &Path) -> Result<PlanFile> {
    let contents = fs::read_to_string(path).map_err(RippleError::Io)?;
    let reader = RecordReader::new(&contents);

    let title = reader
        .find_one_value("Plan Title=")
        .ok_or_else(|| RippleError::ParseError {
            file: path.display().to_string(),
            message: "missing Plan Title= record".to_string(),
        })?
        .to_string();

    let short_id = reader.find_one_value("Short Identifier=").unwrap_or_default().to_string();
    let version = reader.find_one_value("Program Version=").unwrap_or_default().to_string();

    let geom_file = reader
        .find_one_value("Geom File=")
        .ok_or_else(|| RippleError::ParseError {
            file: path.display().to_string(),
            message: "missing Geom File= record".to_string(),
        })?
        .to_string();

    let flow_file = reader
        .find_one_value("Flow File=")
        .ok_or_else(|| RippleError::ParseError {
            file: path.display().to_string(),
            message: "missing Flow File= record".to_string(),
        })?
        .to_string();

    Ok(PlanFile {
        title,
        short_id,
        version,
        geom_file,
        flow_file,
    })
}

/// Emits a plan file's text from an unchanged [`PlanFile`].
pub fn write_plan(plan: &PlanFile) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Plan Title={}", plan.title));
    lines.push(format!("Short Identifier={}", plan.short_id));
    lines.push(format!("Program Version={}", plan.version));
    lines.push(format!("Geom File={}", plan.geom_file));
    lines.push(format!("Flow File={}", plan.flow_file));
    lines.push("Run HTab= 1".to_string());
    lines.push("Run UNet= 0".to_string());
    lines.push("Run Sediment= 0".to_string());
    lines.push("Run PostProcess= 1".to_string());
    lines.push("Run WQNET= 0".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_plan_reads_geom_and_flow_references() {
        let dir = std::env::temp_dir().join("ripple1d_model_test_plan");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.p01");
        fs::write(
            &path,
            "Plan Title=Test Plan\nShort Identifier=TestP\nProgram Version=6.31\nGeom File=g01\nFlow File=f01\n",
        )
        .unwrap();

        let plan = parse_plan(&path).unwrap();
        assert_eq!(plan.title, "Test Plan");
        assert_eq!(plan.geom_file, "g01");
        assert_eq!(plan.flow_file, "f01");
    }

    #[test]
    fn write_plan_includes_run_flags() {
        let plan = PlanFile {
            title: "Test Plan".to_string(),
            short_id: "TestP".to_string(),
            version: "6.31".to_string(),
            geom_file: "g01".to_string(),
            flow_file: "f01".to_string(),
        };
        let text = write_plan(&plan);
        assert!(text.contains("Run HTab= 1"));
        assert!(text.contains("Geom File=g01"));
    }
}
