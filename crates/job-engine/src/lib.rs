//! Framecast Job Engine
//!
//! Async orchestration for render jobs: bounded-concurrency submission,
//! live status tracking, kill-on-delete cancellation, and artifact
//! retrieval. Storage and the render backend sit behind traits so the
//! pipeline is testable without a real encoder.

pub mod job;
pub mod orchestrator;
pub mod store;

pub use job::{Job, JobPhase, JobState, JobStatus};
pub use orchestrator::Orchestrator;
pub use store::{JobStore, MemoryJobStore};
