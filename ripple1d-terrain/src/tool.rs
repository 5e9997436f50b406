use std::path::{Path, PathBuf};
use std::process::Command;

use ripple1d_common::{Result, RippleError};

/// Arguments passed to the external terrain tool (spec §4.6 step 3):
/// `{units, stitch, prj=<wkt>, out=<path>, src...}`.
#[derive(Debug, Clone)]
pub struct TerrainToolArgs {
    pub units: String,
    pub stitch: bool,
    pub projection_wkt: String,
    pub output_path: PathBuf,
    pub source_rasters: Vec<String>,
}

/// The terrain builder's one external collaborator: a black-box binary that
/// clips, reprojects, and resamples a DEM (spec §1 "Out of scope: ... the
/// DEM raster source").
pub trait ExternalTerrainTool {
    fn run(&self, args: &TerrainToolArgs) -> Result<()>;
}

/// Invokes a terrain binary found on `PATH` (spec §4.6 step 3: capture
/// stdout/stderr, fail on non-zero exit).
pub struct CommandLineTerrainTool {
    pub binary: PathBuf,
}

impl CommandLineTerrainTool {
    pub fn new(binary: impl Into<PathBuf>) -> CommandLineTerrainTool {
        CommandLineTerrainTool { binary: binary.into() }
    }
}

impl ExternalTerrainTool for CommandLineTerrainTool {
    fn run(&self, args: &TerrainToolArgs) -> Result<()> {
        let mut command = Command::new(&self.binary);
        command
            .arg(format!("--units={}", args.units))
            .arg(format!("--stitch={}", args.stitch))
            .arg(format!("--prj={}", args.projection_wkt))
            .arg(format!("--out={}", args.output_path.display()));
        for src in &args.source_rasters {
            command.arg(format!("--src={src}"));
        }

        let output = command
            .output()
            .map_err(|e| RippleError::RasTerrainFailure { exit_code: None, output: e.to_string() })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push('\n');
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(RippleError::RasTerrainFailure { exit_code: output.status.code(), output: combined });
        }
        Ok(())
    }
}

pub fn write_projection_file(wkt: &str, directory: &Path) -> Result<PathBuf> {
    let path = directory.join("projection.prj");
    std::fs::write(&path, wkt)?;
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;

    struct FakeTool {
        should_fail: bool,
    }

    impl ExternalTerrainTool for FakeTool {
        fn run(&self, _args: &TerrainToolArgs) -> Result<()> {
            if self.should_fail {
                Err(RippleError::RasTerrainFailure { exit_code: Some(1), output: "boom".to_string() })
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn fake_tool_reports_failure_through_ripple_error() {
        let tool = FakeTool { should_fail: true };
        let args = TerrainToolArgs {
            units: "Feet".to_string(),
            stitch: true,
            projection_wkt: "EPSG:5070".to_string(),
            output_path: PathBuf::from("/tmp/out.tif"),
            source_rasters: vec!["s3://dem".to_string()],
        };
        let err = tool.run(&args).unwrap_err();
        assert!(matches!(err, RippleError::RasTerrainFailure { .. }));
    }
}
