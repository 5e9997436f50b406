use std::fs;
use std::path::{Path, PathBuf};

use ripple1d_common::{Result, RippleError};

use crate::job::{Job, JobStatus};

/// A persistent, file-backed job queue: one JSON document per job under
/// `directory`, written via write-to-temp-then-rename so a reader never
/// observes a partially-written file (spec §4.8, §5: "enqueued to a
/// persistent queue"; generalizes `Config::save`'s plain write to an
/// atomic one, since many workers read/write concurrently here).
#[derive(Clone)]
pub struct JobStore {
    directory: PathBuf,
}

impl JobStore {
    pub fn new(directory: PathBuf) -> Result<JobStore> {
        fs::create_dir_all(&directory).map_err(RippleError::Io)?;
        Ok(JobStore { directory })
    }

    fn path(&self, job_id: &str) -> PathBuf {
        self.directory.join(format!("{job_id}.json"))
    }

    pub fn save(&self, job: &Job) -> Result<()> {
        let final_path = self.path(&job.job_id);
        let tmp_path = self.directory.join(format!("{}.json.tmp", job.job_id));
        let json = serde_json::to_string_pretty(job)?;
        fs::write(&tmp_path, json).map_err(RippleError::Io)?;
        fs::rename(&tmp_path, &final_path).map_err(RippleError::Io)?;
        Ok(())
    }

    pub fn load(&self, job_id: &str) -> Result<Job> {
        let contents = fs::read_to_string(self.path(job_id)).map_err(|_| RippleError::JobNotFound(job_id.to_string()))?;
        serde_json::from_str(&contents).map_err(RippleError::Json)
    }

    pub fn list(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(RippleError::Io)? {
            let entry = entry.map_err(RippleError::Io)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Ok(contents) = fs::read_to_string(&path) {
                if let Ok(job) = serde_json::from_str::<Job>(&contents) {
                    jobs.push(job);
                }
            }
        }
        jobs.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(jobs)
    }

    pub fn delete(&self, job_id: &str) -> Result<()> {
        fs::remove_file(self.path(job_id)).map_err(|_| RippleError::JobNotFound(job_id.to_string()))
    }

    /// The oldest job still `Accepted`, i.e. the next one a worker should
    /// dequeue (spec §5 "queue dequeue" is a suspension point).
    pub fn next_queued(&self) -> Result<Option<Job>> {
        Ok(self.list()?.into_iter().find(|j| j.status == JobStatus::Accepted))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_store() -> (JobStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("ripple1d-jobstore-test-{}-{}", std::process::id(), rand_suffix()));
        (JobStore::new(dir.clone()).unwrap(), dir)
    }

    // Avoids depending on the `rand` crate just for test uniqueness.
    fn rand_suffix() -> u128 {
        std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_nanos()
    }

    #[test]
    fn round_trips_a_job_through_disk() {
        let (store, dir) = temp_store();
        let job = Job::new("job-1".to_string(), "noop".to_string(), serde_json::json!({}), "2026-01-01T00:00:00Z");
        store.save(&job).unwrap();
        let loaded = store.load("job-1").unwrap();
        assert_eq!(loaded.process_id, "noop");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn next_queued_skips_terminal_jobs() {
        let (store, dir) = temp_store();
        let mut done = Job::new("job-done".to_string(), "noop".to_string(), serde_json::json!({}), "2026-01-01T00:00:00Z");
        done.status = JobStatus::Successful;
        store.save(&done).unwrap();
        let mut pending = Job::new("job-pending".to_string(), "noop".to_string(), serde_json::json!({}), "2026-01-01T00:00:01Z");
        pending.status = JobStatus::Accepted;
        store.save(&pending).unwrap();
        let next = store.next_queued().unwrap().unwrap();
        assert_eq!(next.job_id, "job-pending");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_job_reports_job_not_found() {
        let (store, dir) = temp_store();
        let err = store.load("does-not-exist").unwrap_err();
        assert!(matches!(err, RippleError::JobNotFound(_)));
        fs::remove_dir_all(&dir).ok();
    }
}
