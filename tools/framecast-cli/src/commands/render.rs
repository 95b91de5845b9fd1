//! Render a timeline file through the job pipeline.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use framecast_common::config::AppConfig;
use framecast_jobs::{JobState, MemoryJobStore, Orchestrator};
use framecast_render::{FfmpegEngine, RenderEngine};
use framecast_timeline::RenderRequest;

pub async fn run(
    timeline: PathBuf,
    output: Option<PathBuf>,
    engine_binary: PathBuf,
) -> anyhow::Result<()> {
    println!("Rendering timeline: {}", timeline.display());

    let content = std::fs::read_to_string(&timeline)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", timeline.display()))?;
    let request: RenderRequest = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    let engine = FfmpegEngine::new(engine_binary);
    if !engine.is_available() {
        return Err(anyhow::anyhow!(
            "Render engine '{}' is not available on this system",
            engine.name()
        ));
    }

    let config = AppConfig::load();
    config.ensure_dirs()?;

    let extension = request.settings.format.extension();
    let output_path = output.unwrap_or_else(|| {
        let stem = timeline
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        PathBuf::from(format!("{stem}.{extension}"))
    });

    println!("  Output: {}", output_path.display());
    println!("  Resolution: {:?}", request.settings.resolution);
    println!("  Duration: {}s", request.settings.duration);

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(MemoryJobStore::new()),
        Arc::new(engine),
        &config.export_dir,
        config.max_concurrent_jobs,
    ));

    let submitted = orchestrator
        .submit(request)
        .map_err(|e| anyhow::anyhow!("Submission rejected: {e}"))?;
    let id = submitted.job_id;

    loop {
        let status = orchestrator.status(id)?;
        let mut stdout = std::io::stdout();
        write_progress_line(&mut stdout, status.progress, status.phase)?;
        stdout.flush().ok();
        if status.status.is_terminal() {
            println!();
            match status.status {
                JobState::Failed => {
                    return Err(anyhow::anyhow!(
                        "Render failed: {}",
                        status.error.unwrap_or_else(|| "unknown error".to_string())
                    ));
                }
                _ => break,
            }
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let (artifact, _content_type) = orchestrator.output(id)?;
    std::fs::copy(&artifact, &output_path)?;
    orchestrator.delete(id)?;

    println!("Render complete: {}", output_path.display());
    Ok(())
}

/// In-place progress line; the caller flushes so the carriage-return
/// update is visible before the next newline.
fn write_progress_line(
    out: &mut impl Write,
    progress: u8,
    phase: framecast_jobs::JobPhase,
) -> std::io::Result<()> {
    write!(out, "\r  Progress: {progress:>3}% ({phase:?})      ")
}
