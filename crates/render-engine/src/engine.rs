//! Render engine abstraction.
//!
//! The engine consumes a finished [`RenderPlan`] and produces the output
//! artifact, reporting phase/progress transitions as it goes. Keeping it
//! behind a trait lets the job orchestrator run against a fake engine in
//! tests and keeps subprocess handling out of the planning code.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use framecast_common::error::FramecastResult;

use crate::plan::RenderPlan;

/// Phases of a render, strictly ordered. Progress within a phase is
/// monotonic and phases never regress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderPhase {
    /// Constructing the base canvas asset (progress 0-20).
    Preparing,
    /// Synthesizing intermediate layers (progress 20-50).
    Rendering,
    /// The single external encode pass (progress 50-90).
    Encoding,
    /// Output verification (progress 90-100).
    Finalizing,
}

/// Per-job execution context for one render.
///
/// `work_dir` is exclusively owned by the job for its lifetime;
/// concurrent jobs never share one.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Scratch directory for intermediate assets.
    pub work_dir: PathBuf,

    /// Where the finished artifact must land.
    pub output_path: PathBuf,

    /// Set when the job was deleted mid-render; the engine must kill the
    /// external process and stop producing output.
    pub cancel: Arc<AtomicBool>,
}

/// Progress sink: `(phase, overall percent)`.
///
/// A `false` return means the job record no longer exists; the engine
/// must abort further work and return without error, discarding output.
pub type ProgressSink<'a> = &'a (dyn Fn(RenderPhase, u8) -> bool + Send + Sync);

/// A backend that can execute a render plan.
pub trait RenderEngine: Send + Sync {
    /// Execute the plan. Phase/progress reports flow through `progress`.
    fn render(
        &self,
        plan: &RenderPlan,
        ctx: &RenderContext,
        progress: ProgressSink<'_>,
    ) -> FramecastResult<()>;

    /// Whether this backend is usable on the current system.
    fn is_available(&self) -> bool;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
