//! Render job records and their lifecycle.
//!
//! A job moves `Pending -> Processing -> Completed | Failed`. Terminal
//! states are absorbing: no update touches a job once it is done.
//! Progress and phase only ever move forward, regardless of the order
//! engine reports arrive in.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use framecast_render::RenderPhase;
use framecast_timeline::RenderRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the stored job error message.
pub const JOB_ERROR_CAP: usize = 512;

/// Coarse job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Fine-grained pipeline phase, strictly ordered for monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Queued,
    Preparing,
    Rendering,
    Encoding,
    Finalizing,
    Done,
}

impl JobPhase {
    fn rank(self) -> u8 {
        match self {
            JobPhase::Queued => 0,
            JobPhase::Preparing => 1,
            JobPhase::Rendering => 2,
            JobPhase::Encoding => 3,
            JobPhase::Finalizing => 4,
            JobPhase::Done => 5,
        }
    }
}

impl From<RenderPhase> for JobPhase {
    fn from(phase: RenderPhase) -> Self {
        match phase {
            RenderPhase::Preparing => JobPhase::Preparing,
            RenderPhase::Rendering => JobPhase::Rendering,
            RenderPhase::Encoding => JobPhase::Encoding,
            RenderPhase::Finalizing => JobPhase::Finalizing,
        }
    }
}

/// One tracked render job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub state: JobState,
    pub phase: JobPhase,
    /// Overall progress, 0-100.
    pub progress: u8,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: RenderRequest,
    /// Raised on delete; the render worker kills the engine process when
    /// it observes the flag.
    pub cancel: Arc<AtomicBool>,
}

impl Job {
    pub fn new(request: RenderRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: JobState::Pending,
            phase: JobPhase::Queued,
            progress: 0,
            output_path: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
            request,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Apply an engine progress report. No-op once terminal; phase and
    /// progress never regress even if reports arrive out of order.
    pub fn advance(&mut self, phase: JobPhase, progress: u8) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Processing;
        if phase.rank() > self.phase.rank() {
            self.phase = phase;
        }
        if progress > self.progress {
            self.progress = progress.min(100);
        }
    }

    pub fn complete(&mut self, output_path: PathBuf) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Completed;
        self.phase = JobPhase::Done;
        self.progress = 100;
        self.output_path = Some(output_path);
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Failed;
        self.error = Some(truncate_error(&error.into()));
        self.completed_at = Some(Utc::now());
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            job_id: self.id,
            status: self.state,
            progress: self.progress,
            phase: self.phase,
            output_file: self
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            error: self.error.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

/// Client-facing job snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub job_id: Uuid,
    pub status: JobState,
    pub progress: u8,
    pub phase: JobPhase,
    pub output_file: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn truncate_error(raw: &str) -> String {
    if raw.len() <= JOB_ERROR_CAP {
        return raw.to_string();
    }
    let mut cut = JOB_ERROR_CAP;
    while !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    raw[..cut].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new(RenderRequest::default())
    }

    #[test]
    fn advance_moves_pending_to_processing() {
        let mut j = job();
        j.advance(JobPhase::Preparing, 5);
        assert_eq!(j.state, JobState::Processing);
        assert_eq!(j.phase, JobPhase::Preparing);
        assert_eq!(j.progress, 5);
    }

    #[test]
    fn phase_and_progress_never_regress() {
        let mut j = job();
        j.advance(JobPhase::Encoding, 60);
        j.advance(JobPhase::Preparing, 10);
        assert_eq!(j.phase, JobPhase::Encoding);
        assert_eq!(j.progress, 60);
    }

    #[test]
    fn terminal_states_are_absorbing() {
        let mut j = job();
        j.complete(PathBuf::from("/out/a.mp4"));
        j.advance(JobPhase::Rendering, 30);
        j.fail("late failure");
        assert_eq!(j.state, JobState::Completed);
        assert_eq!(j.progress, 100);
        assert!(j.error.is_none());
    }

    #[test]
    fn failure_detail_is_bounded() {
        let mut j = job();
        j.fail("x".repeat(JOB_ERROR_CAP * 2));
        assert_eq!(j.error.as_ref().map(String::len), Some(JOB_ERROR_CAP));
        assert_eq!(j.state, JobState::Failed);
        assert!(j.completed_at.is_some());
    }

    #[test]
    fn status_snapshot_serializes_camel_case() {
        let mut j = job();
        j.complete(PathBuf::from("/out/a.mp4"));
        let json = serde_json::to_value(j.status()).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["phase"], "done");
        assert_eq!(json["outputFile"], "/out/a.mp4");
        assert!(json["jobId"].is_string());
    }
}
