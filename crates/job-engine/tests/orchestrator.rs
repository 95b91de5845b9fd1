//! End-to-end orchestrator behavior against fake render engines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use framecast_common::error::{FramecastError, FramecastResult};
use framecast_jobs::{JobPhase, JobState, JobStatus, MemoryJobStore, Orchestrator};
use framecast_render::{ProgressSink, RenderContext, RenderEngine, RenderPhase, RenderPlan};
use framecast_timeline::RenderRequest;
use uuid::Uuid;

fn write_output(ctx: &RenderContext) -> FramecastResult<()> {
    std::fs::create_dir_all(&ctx.work_dir)?;
    std::fs::write(&ctx.output_path, b"rendered bytes")?;
    Ok(())
}

/// Walks every phase and produces an artifact.
struct SucceedingEngine;

impl RenderEngine for SucceedingEngine {
    fn render(
        &self,
        _plan: &RenderPlan,
        ctx: &RenderContext,
        progress: ProgressSink<'_>,
    ) -> FramecastResult<()> {
        progress(RenderPhase::Preparing, 10);
        progress(RenderPhase::Rendering, 35);
        progress(RenderPhase::Encoding, 70);
        write_output(ctx)?;
        progress(RenderPhase::Finalizing, 100);
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "succeeding"
    }
}

/// Always fails mid-encode.
struct FailingEngine;

impl RenderEngine for FailingEngine {
    fn render(
        &self,
        _plan: &RenderPlan,
        _ctx: &RenderContext,
        progress: ProgressSink<'_>,
    ) -> FramecastResult<()> {
        progress(RenderPhase::Preparing, 10);
        Err(FramecastError::render_failure(Some(1), "filter graph boom"))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Holds mid-render until released, honoring cancellation like a real
/// subprocess supervisor would.
struct BlockingEngine {
    release: Arc<AtomicBool>,
}

impl RenderEngine for BlockingEngine {
    fn render(
        &self,
        _plan: &RenderPlan,
        ctx: &RenderContext,
        progress: ProgressSink<'_>,
    ) -> FramecastResult<()> {
        if !progress(RenderPhase::Preparing, 10) {
            return Ok(());
        }
        while !self.release.load(Ordering::Relaxed) {
            if ctx.cancel.load(Ordering::Relaxed) {
                return Ok(());
            }
            if !progress(RenderPhase::Rendering, 30) {
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        write_output(ctx)?;
        progress(RenderPhase::Finalizing, 100);
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "blocking"
    }
}

struct Harness {
    orchestrator: Arc<Orchestrator>,
    export_dir: tempfile::TempDir,
}

fn harness(engine: Arc<dyn RenderEngine>, max_concurrent: usize) -> Harness {
    let export_dir = tempfile::tempdir().unwrap();
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(MemoryJobStore::new()),
        engine,
        export_dir.path(),
        max_concurrent,
    ));
    Harness {
        orchestrator,
        export_dir,
    }
}

async fn wait_for_terminal(orchestrator: &Orchestrator, id: Uuid) -> JobStatus {
    for _ in 0..1000 {
        let status = orchestrator.status(id).unwrap();
        if status.status.is_terminal() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {id} did not reach a terminal state");
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_timeline_renders_to_completion() {
    let h = harness(Arc::new(SucceedingEngine), 2);

    let submitted = h.orchestrator.submit(RenderRequest::default()).unwrap();
    assert_eq!(submitted.status, JobState::Pending);
    assert_eq!(submitted.phase, JobPhase::Queued);
    assert_eq!(submitted.progress, 0);

    let done = wait_for_terminal(&h.orchestrator, submitted.job_id).await;
    assert_eq!(done.status, JobState::Completed);
    assert_eq!(done.phase, JobPhase::Done);
    assert_eq!(done.progress, 100);
    assert!(done.error.is_none());
    assert!(done.completed_at.is_some());

    let (path, content_type) = h.orchestrator.output(submitted.job_id).unwrap();
    assert!(path.starts_with(h.export_dir.path()));
    assert!(path.exists());
    assert_eq!(content_type, "video/mp4");
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_timeline_is_rejected_without_a_job() {
    let h = harness(Arc::new(SucceedingEngine), 2);

    let mut request = RenderRequest::default();
    request.settings.duration = 0.0;

    let err = h.orchestrator.submit(request).unwrap_err();
    assert!(matches!(err, FramecastError::InvalidTimeline { .. }));
    assert!(h.orchestrator.list().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_failure_marks_job_failed_with_detail() {
    let h = harness(Arc::new(FailingEngine), 2);

    let submitted = h.orchestrator.submit(RenderRequest::default()).unwrap();
    let done = wait_for_terminal(&h.orchestrator, submitted.job_id).await;

    assert_eq!(done.status, JobState::Failed);
    assert!(done.error.as_deref().unwrap().contains("filter graph boom"));
    assert!(done.error.as_deref().unwrap().contains("exit code 1"));

    let err = h.orchestrator.output(submitted.job_id).unwrap_err();
    assert!(matches!(err, FramecastError::PreconditionFailed { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_during_processing_cancels_and_cleans_up() {
    let release = Arc::new(AtomicBool::new(false));
    let h = harness(
        Arc::new(BlockingEngine {
            release: Arc::clone(&release),
        }),
        2,
    );

    let submitted = h.orchestrator.submit(RenderRequest::default()).unwrap();
    let id = submitted.job_id;

    let orchestrator = Arc::clone(&h.orchestrator);
    wait_until(move || {
        orchestrator
            .status(id)
            .map(|s| s.status == JobState::Processing)
            .unwrap_or(false)
    })
    .await;

    h.orchestrator.delete(id).unwrap();

    let err = h.orchestrator.status(id).unwrap_err();
    assert!(matches!(err, FramecastError::NotFound { .. }));
    assert!(matches!(
        h.orchestrator.delete(id).unwrap_err(),
        FramecastError::NotFound { .. }
    ));

    // The worker notices the cancellation and leaves no artifacts behind.
    let job_dir = h.export_dir.path().join(id.to_string());
    wait_until(move || !job_dir.exists()).await;
    assert!(h.orchestrator.list().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn output_before_completion_is_a_precondition_failure() {
    let release = Arc::new(AtomicBool::new(false));
    let h = harness(
        Arc::new(BlockingEngine {
            release: Arc::clone(&release),
        }),
        2,
    );

    let submitted = h.orchestrator.submit(RenderRequest::default()).unwrap();
    let err = h.orchestrator.output(submitted.job_id).unwrap_err();
    assert!(matches!(err, FramecastError::PreconditionFailed { .. }));

    release.store(true, Ordering::Relaxed);
    let done = wait_for_terminal(&h.orchestrator, submitted.job_id).await;
    assert_eq!(done.status, JobState::Completed);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrency_is_bounded_by_the_permit_count() {
    let release = Arc::new(AtomicBool::new(false));
    let h = harness(
        Arc::new(BlockingEngine {
            release: Arc::clone(&release),
        }),
        1,
    );

    let first = h.orchestrator.submit(RenderRequest::default()).unwrap();
    let second = h.orchestrator.submit(RenderRequest::default()).unwrap();

    let orchestrator = Arc::clone(&h.orchestrator);
    let first_id = first.job_id;
    wait_until(move || {
        orchestrator
            .status(first_id)
            .map(|s| s.status == JobState::Processing)
            .unwrap_or(false)
    })
    .await;

    // With a single permit the second job never starts early.
    let waiting = h.orchestrator.status(second.job_id).unwrap();
    assert_eq!(waiting.status, JobState::Pending);
    assert_eq!(waiting.phase, JobPhase::Queued);

    release.store(true, Ordering::Relaxed);
    let first_done = wait_for_terminal(&h.orchestrator, first.job_id).await;
    let second_done = wait_for_terminal(&h.orchestrator, second.job_id).await;
    assert_eq!(first_done.status, JobState::Completed);
    assert_eq!(second_done.status, JobState::Completed);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_job_id_is_not_found() {
    let h = harness(Arc::new(SucceedingEngine), 2);
    let id = Uuid::new_v4();

    assert!(matches!(
        h.orchestrator.status(id).unwrap_err(),
        FramecastError::NotFound { .. }
    ));
    assert!(matches!(
        h.orchestrator.output(id).unwrap_err(),
        FramecastError::NotFound { .. }
    ));
    assert!(matches!(
        h.orchestrator.delete(id).unwrap_err(),
        FramecastError::NotFound { .. }
    ));
}
