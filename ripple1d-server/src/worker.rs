use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::job::JobStatus;
use crate::process::{validate_params, ProcessRegistry};
use crate::store::JobStore;

fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Spawns `num_workers` OS threads that poll `store` for the oldest
/// `Accepted` job, run it through `registry`, and persist the outcome
/// (spec §5: "a configurable pool of worker processes (default 1)...
/// each worker executes one task at a time"). Threads rather than real
/// processes are used here; the one-task-at-a-time and queue-dequeue
/// suspension-point properties the spec requires are preserved either way.
pub fn spawn_workers(store: Arc<JobStore>, registry: Arc<ProcessRegistry>, num_workers: usize, poll_interval: Duration) -> Vec<thread::JoinHandle<()>> {
    (0..num_workers.max(1))
        .map(|id| {
            let store = store.clone();
            let registry = registry.clone();
            thread::spawn(move || worker_loop(id, store, registry, poll_interval))
        })
        .collect()
}

fn worker_loop(id: usize, store: Arc<JobStore>, registry: Arc<ProcessRegistry>, poll_interval: Duration) {
    loop {
        match store.next_queued() {
            Ok(Some(mut job)) => {
                job.status = JobStatus::Running;
                job.updated = now_iso8601();
                if store.save(&job).is_err() {
                    continue;
                }
                tracing::info!(worker = id, job = %job.job_id, process = %job.process_id, "running job");
                run_job(&registry, &mut job);
                job.updated = now_iso8601();
                let _ = store.save(&job);
            }
            Ok(None) => thread::sleep(poll_interval),
            Err(e) => {
                tracing::error!(worker = id, error = %e, "failed to poll job queue");
                thread::sleep(poll_interval);
            }
        }
    }
}

fn run_job(registry: &ProcessRegistry, job: &mut crate::job::Job) {
    let Some(process) = registry.get(&job.process_id) else {
        job.status = JobStatus::Failed;
        job.error = Some(format!("unknown process {}", job.process_id));
        return;
    };
    if let Err(e) = validate_params(process, &job.params) {
        job.status = JobStatus::Failed;
        job.error = Some(e.to_string());
        return;
    }
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| process.run(job.params.clone()))) {
        Ok(Ok(result)) => {
            job.status = JobStatus::Successful;
            job.result = Some(result);
        }
        Ok(Err(e)) => {
            job.status = JobStatus::Failed;
            job.error = Some(e.to_string());
        }
        Err(panic_payload) => {
            job.status = JobStatus::Failed;
            let message = panic_payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "process panicked".to_string());
            job.error = Some("process panicked".to_string());
            job.traceback = Some(message);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::job::Job;

    #[test]
    fn run_job_marks_unknown_process_as_failed() {
        let registry = ProcessRegistry::new();
        let mut job = Job::new("job-1".to_string(), "does_not_exist".to_string(), serde_json::json!({}), "2026-01-01T00:00:00Z");
        run_job(&registry, &mut job);
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.is_some());
    }

    #[test]
    fn run_job_marks_bad_params_as_failed() {
        let registry = ProcessRegistry::new();
        let mut job = Job::new("job-2".to_string(), "noop".to_string(), serde_json::json!({"unexpected": 1}), "2026-01-01T00:00:00Z");
        run_job(&registry, &mut job);
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn run_job_succeeds_for_noop() {
        let registry = ProcessRegistry::new();
        let mut job = Job::new("job-3".to_string(), "noop".to_string(), serde_json::json!({}), "2026-01-01T00:00:00Z");
        run_job(&registry, &mut job);
        assert_eq!(job.status, JobStatus::Successful);
        assert_eq!(job.result.unwrap()["ok"], true);
    }
}
