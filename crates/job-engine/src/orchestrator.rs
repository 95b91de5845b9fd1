//! The orchestrator: submission, tracking, cancellation, and artifact
//! retrieval for render jobs.
//!
//! One tokio task per job, gated by a semaphore so at most
//! `max_concurrent` renders run at once; excess submissions wait in
//! Pending. The engine itself is blocking (subprocess supervision), so
//! it runs on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use uuid::Uuid;

use framecast_common::error::{FramecastError, FramecastResult};
use framecast_render::{build_plan, RenderContext, RenderEngine, UploadedMedia};
use framecast_timeline::RenderRequest;

use crate::job::{Job, JobStatus};
use crate::store::JobStore;

pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    engine: Arc<dyn RenderEngine>,
    export_dir: PathBuf,
    permits: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        engine: Arc<dyn RenderEngine>,
        export_dir: impl Into<PathBuf>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            engine,
            export_dir: export_dir.into(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Validate and enqueue a render. Invalid timelines are rejected
    /// here; no job record is created for them.
    pub fn submit(self: &Arc<Self>, request: RenderRequest) -> FramecastResult<JobStatus> {
        request.validate()?;

        let job = Job::new(request);
        let id = job.id;
        let status = job.status();
        self.store.insert(job);

        tracing::info!(job = %id, "Render job submitted");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_pipeline(id).await;
        });

        Ok(status)
    }

    pub fn status(&self, id: Uuid) -> FramecastResult<JobStatus> {
        self.store
            .get(id)
            .map(|job| job.status())
            .ok_or_else(|| FramecastError::not_found(format!("job {id}")))
    }

    pub fn list(&self) -> Vec<JobStatus> {
        self.store.list()
    }

    /// Remove a job. An in-flight render is killed and its artifacts are
    /// deleted; the id stops resolving immediately.
    pub fn delete(&self, id: Uuid) -> FramecastResult<()> {
        let job = self
            .store
            .remove(id)
            .ok_or_else(|| FramecastError::not_found(format!("job {id}")))?;

        job.cancel
            .store(true, std::sync::atomic::Ordering::Relaxed);
        remove_artifacts(&self.export_dir.join(id.to_string()));
        tracing::info!(job = %id, "Render job deleted");
        Ok(())
    }

    /// Path and content type of a finished artifact.
    pub fn output(&self, id: Uuid) -> FramecastResult<(PathBuf, &'static str)> {
        let job = self
            .store
            .get(id)
            .ok_or_else(|| FramecastError::not_found(format!("job {id}")))?;

        if job.state != crate::job::JobState::Completed {
            return Err(FramecastError::precondition(format!(
                "job {id} is not completed"
            )));
        }
        let path = job
            .output_path
            .ok_or_else(|| FramecastError::not_found(format!("output of job {id}")))?;
        if !path.exists() {
            return Err(FramecastError::not_found(format!("output of job {id}")));
        }
        Ok((path, job.request.settings.format.content_type()))
    }

    async fn run_pipeline(self: Arc<Self>, id: Uuid) {
        let _permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        // Deleted while queued.
        let Some(job) = self.store.get(id) else {
            return;
        };

        let resolver = UploadedMedia::from_request(&job.request);
        let plan = match build_plan(&job.request, &resolver) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(job = %id, error = %err, "Planning failed");
                self.store.update(id, &mut |j| j.fail(err.to_string()));
                return;
            }
        };

        let job_dir = self.export_dir.join(id.to_string());
        let output_path = job_dir.join(format!(
            "output.{}",
            job.request.settings.format.extension()
        ));
        let ctx = RenderContext {
            work_dir: job_dir.clone(),
            output_path: output_path.clone(),
            cancel: Arc::clone(&job.cancel),
        };

        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let plan = plan;
            engine.render(&plan, &ctx, &|phase, progress| {
                store.update(id, &mut |j| j.advance(phase.into(), progress))
            })
        })
        .await;

        match result {
            Ok(Ok(())) => {
                let recorded = self
                    .store
                    .update(id, &mut |j| j.complete(output_path.clone()));
                if recorded {
                    tracing::info!(job = %id, output = %output_path.display(), "Render job completed");
                } else {
                    // Deleted mid-render; the engine aborted quietly.
                    remove_artifacts(&job_dir);
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(job = %id, error = %err, "Render job failed");
                if !self.store.update(id, &mut |j| j.fail(err.to_string())) {
                    remove_artifacts(&job_dir);
                }
            }
            Err(join_err) => {
                tracing::error!(job = %id, error = %join_err, "Render task panicked");
                if !self.store.update(id, &mut |j| j.fail("render task panicked")) {
                    remove_artifacts(&job_dir);
                }
            }
        }
    }
}

fn remove_artifacts(job_dir: &std::path::Path) {
    if let Err(err) = std::fs::remove_dir_all(job_dir) {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(dir = %job_dir.display(), error = %err, "Failed to remove job artifacts");
        }
    }
}
