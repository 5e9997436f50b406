use thiserror::Error;

/// The unified error taxonomy for the workspace (spec §7). Each component
/// crate returns `Result<T, RippleError>`; the job server (component H)
/// reports the `Display` string as `result.err` and, on request, a captured
/// backtrace as the job's traceback.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("parse error in {file}: {message}")]
    ParseError { file: String, message: String },

    #[error("no projection found for {0}")]
    ProjectionNotFound(String),

    #[error("no default EPSG code is known for unit system {0:?}")]
    NoDefaultEpsg(String),

    #[error("bad conflation for network reach {reach_id}: {message}")]
    BadConflation { reach_id: i64, message: String },

    #[error("no valid network path from {from} to {to} within {max_hops} hops")]
    InvalidNetworkPath { from: i64, to: i64, max_hops: usize },

    #[error("sub-model for reach {reach_id} has fewer than 2 cross-sections")]
    SingleXsModel { reach_id: i64 },

    #[error("RAS terrain tool failed (exit {exit_code:?}): {output}")]
    RasTerrainFailure { exit_code: Option<i32>, output: String },

    #[error("RAS compute timed out after {0} seconds")]
    RasComputeTimeout(u64),

    #[error("RAS compute mesh error: {0}")]
    RasComputeMeshError(String),

    #[error("RAS geometry error: {0}")]
    RasGeometryError(String),

    #[error("RAS compute error: {0}")]
    RasComputeError(String),

    #[error("RAS StoreAllMaps error: {0}")]
    RasStoreAllMapsError(String),

    #[error("depth grid not found for plan {plan}, profile {profile}")]
    DepthGridNotFound { plan: String, profile: String },

    #[error("unexpected request parameters: unexpected={unexpected:?}, missing={missing:?}")]
    BadRequestParameters { unexpected: Vec<String>, missing: Vec<String> },

    #[error("unknown process {0}")]
    UnknownProcess(String),

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RippleError>;
