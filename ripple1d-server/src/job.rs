use serde::{Deserialize, Serialize};

/// OGC API - Processes job status vocabulary (spec §4.8: "all returning
/// OGC-style job metadata").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Accepted,
    Running,
    Successful,
    Failed,
    Dismissed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Successful | JobStatus::Failed | JobStatus::Dismissed)
    }
}

/// A queued or completed job (spec §4.8, §5). `params` are the original
/// request kwargs; `logs` accumulates lines captured while the process ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub process_id: String,
    pub status: JobStatus,
    pub created: String,
    pub updated: String,
    pub params: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub traceback: Option<String>,
    pub logs: Vec<String>,
}

impl Job {
    pub fn new(job_id: String, process_id: String, params: serde_json::Value, now: &str) -> Job {
        Job {
            job_id,
            process_id,
            status: JobStatus::Accepted,
            created: now.to_string(),
            updated: now.to_string(),
            params,
            result: None,
            error: None,
            traceback: None,
            logs: Vec::new(),
        }
    }

    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "jobID": self.job_id,
            "processID": self.process_id,
            "status": self.status,
            "created": self.created,
            "updated": self.updated,
        })
    }
}
