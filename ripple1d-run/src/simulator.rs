use std::path::Path;
use std::process::Command;
use std::time::Duration;

use ripple1d_common::{Result, RippleError};

/// The external HEC-RAS compute engine (spec §1 "Out of scope: the HEC-RAS
/// native compute engine (a black-box binary)"). Implementors own the
/// actual process/COM invocation and polling loop; this trait only
/// specifies the contract the orchestrator depends on.
pub trait SteadyFlowSimulator {
    /// Computes the given plan, enforcing `timeout`
    /// (`fails with RASComputeTimeoutError`, spec §4.7).
    fn compute_plan(&self, project_file: &Path, plan_short_id: &str, timeout: Duration) -> Result<()>;
}

/// Classifies a `<plan>.computeMsgs.txt` transcript into the error taxonomy
/// of spec §4.7 ("Simulator invocation contract"). Checked in the order
/// the spec lists; `StoreAllMaps` failures are reported but the caller may
/// choose to treat them as non-fatal ("optionally ignorable").
pub fn classify_compute_messages(messages: &str) -> Option<RippleError> {
    let lower = messages.to_lowercase();
    if lower.contains("error generating mesh") {
        Some(RippleError::RasComputeMeshError(messages.to_string()))
    } else if lower.contains("geometry writer failed") || lower.contains("error processing geometry") {
        Some(RippleError::RasGeometryError(messages.to_string()))
    } else if lower.contains("error executing: storeallmaps") {
        Some(RippleError::RasStoreAllMapsError(messages.to_string()))
    } else if lower.contains("error:") {
        Some(RippleError::RasComputeError(messages.to_string()))
    } else {
        None
    }
}

/// A simulator stub for tests and non-Windows development: "computes" a
/// plan by running a caller-supplied closure, so orchestrator tests don't
/// need an actual HEC-RAS install (spec §9 "isolation of platform-specific
/// control logic").
pub struct StubSimulator<F: Fn(&Path, &str) -> Result<()>> {
    pub compute: F,
}

impl<F: Fn(&Path, &str) -> Result<()>> SteadyFlowSimulator for StubSimulator<F> {
    fn compute_plan(&self, project_file: &Path, plan_short_id: &str, _timeout: Duration) -> Result<()> {
        (self.compute)(project_file, plan_short_id)
    }
}

/// A portable simulator that shells out to an external compute binary
/// rather than driving HEC-RAS via COM, mirroring the `CommandLineTerrainTool`
/// invocation idiom. Useful on platforms without the native COM controller;
/// `timeout` is enforced by killing the child if it runs over.
pub struct CommandLineSimulator {
    pub binary: std::path::PathBuf,
}

impl SteadyFlowSimulator for CommandLineSimulator {
    fn compute_plan(&self, project_file: &Path, plan_short_id: &str, timeout: Duration) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .arg("--project")
            .arg(project_file)
            .arg("--plan")
            .arg(plan_short_id)
            .spawn()
            .map_err(|e| RippleError::Other(format!("failed to launch compute binary: {e}")))?;

        let start = std::time::Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if status.success() {
                        return Ok(());
                    }
                    return Err(RippleError::RasComputeError(format!("compute process exited with {status}")));
                }
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        return Err(RippleError::RasComputeTimeout(timeout.as_secs()));
                    }
                    std::thread::sleep(Duration::from_millis(200));
                }
                Err(e) => return Err(RippleError::Other(format!("failed to poll compute process: {e}"))),
            }
        }
    }
}

/// The Windows COM-backed simulator (spec §4.7: "bind a COM object
/// `RAS{ver}.HECRASCONTROLLER`..."). COM bindings are platform-specific
/// and out of scope for this crate's portable build; callers on Windows
/// supply their own implementation of [`SteadyFlowSimulator`] backed by a
/// COM automation crate.
#[cfg(windows)]
pub struct HecRasComController {
    pub ras_version: String,
    pub poll_interval: Duration,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mesh_error_takes_precedence() {
        let err = classify_compute_messages("WARNING: something\nError generating mesh for 2D area").unwrap();
        assert!(matches!(err, RippleError::RasComputeMeshError(_)));
    }

    #[test]
    fn generic_error_is_detected() {
        let err = classify_compute_messages("ERROR: could not converge").unwrap();
        assert!(matches!(err, RippleError::RasComputeError(_)));
    }

    #[test]
    fn clean_log_has_no_error() {
        assert!(classify_compute_messages("Computations complete").is_none());
    }

    #[test]
    fn stub_simulator_runs_the_closure() {
        let sim = StubSimulator { compute: |_path, _plan| Ok(()) };
        assert!(sim.compute_plan(Path::new("model.prj"), "plan_01", Duration::from_secs(60)).is_ok());
    }
}
