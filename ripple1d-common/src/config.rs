use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};

/// Process-wide settings, backed by a `ripple1d.json` file in the working
/// directory: read-or-default, then optionally persist, covering the
/// fields this engine's job server and run orchestrator need (spec §5, §6).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub verbose: bool,
    pub working_directory: String,
    pub num_workers: usize,
    pub default_timeout_seconds: u64,
    pub queue_directory: String,
    /// Overridden by `MINIO_S3_ENDPOINT` when set (spec §6).
    pub s3_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            verbose: false,
            working_directory: String::new(),
            num_workers: 1,
            default_timeout_seconds: 1800,
            queue_directory: "jobs".to_string(),
            s3_endpoint: None,
        }
    }
}

impl Config {
    /// Loads `path` if it exists, else returns `Config::default()`, then
    /// applies any recognized environment-variable overrides (spec §6:
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`,
    /// `MINIO_S3_ENDPOINT`). The AWS credential variables are consumed by
    /// the (external) object-store client, not stored here; only
    /// `MINIO_S3_ENDPOINT` affects engine behavior directly.
    pub fn load(path: &Path) -> Result<Config, Error> {
        let mut cfg: Config = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::new(std::io::ErrorKind::InvalidData, e))?,
            Err(_) => Config::default(),
        };
        if let Ok(endpoint) = std::env::var("MINIO_S3_ENDPOINT") {
            cfg.s3_endpoint = Some(endpoint);
        }
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    pub fn queue_path(&self) -> PathBuf {
        Path::new(&self.working_directory).join(&self.queue_directory)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_has_single_worker() {
        let cfg = Config::default();
        assert_eq!(cfg.num_workers, 1);
        assert_eq!(cfg.default_timeout_seconds, 1800);
    }

    #[test]
    fn load_falls_back_to_default_when_missing() {
        let cfg = Config::load(Path::new("/does/not/exist/ripple1d.json")).unwrap();
        assert_eq!(cfg.num_workers, 1);
    }
}
