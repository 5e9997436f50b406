/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

pub mod api;
pub mod job;
pub mod process;
pub mod store;
pub mod worker;

pub use api::{build_router, AppState};
pub use job::{Job, JobStatus};
pub use process::{Process, ProcessRegistry};
pub use store::JobStore;
pub use worker::spawn_workers;
