//! FFmpeg render backend: argument construction and subprocess
//! supervision.
//!
//! FFmpeg is treated as an untrusted external process: every invocation
//! captures stderr on a dedicated drain thread (so the child never
//! blocks on a full pipe), non-zero exits surface a bounded diagnostic,
//! and a zero exit with a missing or empty output file is still a
//! failure.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use framecast_common::error::{FramecastError, FramecastResult};

use crate::engine::{ProgressSink, RenderContext, RenderEngine, RenderPhase};
use crate::plan::{OpSource, RenderPlan, PIXEL_FORMAT};

/// Maximum number of engine stderr bytes retained in a failure
/// diagnostic. Full engine output can be arbitrarily large; only this
/// prefix is kept for operator/user visibility.
pub const ENGINE_DIAGNOSTIC_CAP: usize = 2048;

/// Overall progress at the end of each phase.
const PREPARING_END: u8 = 20;
const RENDERING_END: u8 = 50;
const ENCODING_END: u8 = 90;

/// Poll interval while waiting on a child process.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Outcome of one supervised subprocess run.
enum RunOutcome {
    Completed,
    /// The job was deleted mid-run; the child was killed.
    Canceled,
}

/// FFmpeg-based render engine.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    binary: PathBuf,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run a short invocation (base canvas, text layers) to completion,
    /// killing the child if the job is canceled.
    fn run_quiet(&self, args: &[String], cancel: &AtomicBool) -> FramecastResult<RunOutcome> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                FramecastError::render_failure(
                    None,
                    format!("failed to start {}: {e}", self.binary.display()),
                )
            })?;

        let drain = drain_stderr(&mut child)?;

        loop {
            if cancel.load(Ordering::Relaxed) {
                child.kill().ok();
                child.wait().ok();
                drain.join().ok();
                return Ok(RunOutcome::Canceled);
            }
            match child.try_wait()? {
                Some(status) => {
                    let stderr_output = drain
                        .join()
                        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());
                    if !status.success() {
                        return Err(FramecastError::render_failure(
                            status.code(),
                            truncate_diagnostics(&stderr_output),
                        ));
                    }
                    return Ok(RunOutcome::Completed);
                }
                None => std::thread::sleep(WAIT_POLL),
            }
        }
    }

    /// Run the final encode, parsing `-progress pipe:1` key/value lines
    /// from stdout into encoding-phase progress reports.
    fn run_encode(
        &self,
        plan: &RenderPlan,
        args: &[String],
        cancel: &AtomicBool,
        progress: ProgressSink<'_>,
    ) -> FramecastResult<RunOutcome> {
        tracing::debug!(args = ?args, "Running final encode");
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                FramecastError::render_failure(
                    None,
                    format!("failed to start {}: {e}", self.binary.display()),
                )
            })?;

        tracing::info!(
            pid = child.id(),
            total_frames = plan.total_frames(),
            "Encode process started"
        );

        let drain = drain_stderr(&mut child)?;
        let stdout = child.stdout.take().ok_or_else(|| {
            FramecastError::render_failure(None, "failed to capture engine stdout")
        })?;

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut out_time_secs = 0.0f64;

        loop {
            if cancel.load(Ordering::Relaxed) {
                child.kill().ok();
                child.wait().ok();
                drain.join().ok();
                return Ok(RunOutcome::Canceled);
            }

            line.clear();
            let bytes = reader.read_line(&mut line).map_err(|e| {
                FramecastError::render_failure(None, format!("failed reading engine progress: {e}"))
            })?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            match key {
                // out_time_ms is in microseconds despite the name.
                "out_time_ms" => {
                    if let Ok(us) = value.parse::<i64>() {
                        out_time_secs = (us.max(0) as f64) / 1_000_000.0;
                    }
                }
                "progress" => {
                    let pct = encode_progress(out_time_secs, plan.duration);
                    if !progress(RenderPhase::Encoding, pct) {
                        child.kill().ok();
                        child.wait().ok();
                        drain.join().ok();
                        return Ok(RunOutcome::Canceled);
                    }
                }
                _ => {}
            }
        }

        let status = child.wait()?;
        let stderr_output = drain
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(FramecastError::render_failure(
                status.code(),
                truncate_diagnostics(&stderr_output),
            ));
        }
        Ok(RunOutcome::Completed)
    }
}

impl RenderEngine for FfmpegEngine {
    fn render(
        &self,
        plan: &RenderPlan,
        ctx: &RenderContext,
        progress: ProgressSink<'_>,
    ) -> FramecastResult<()> {
        let started = std::time::Instant::now();

        if !progress(RenderPhase::Preparing, 0) {
            return Ok(());
        }
        std::fs::create_dir_all(&ctx.work_dir)?;

        tracing::info!(
            canvas = format!("{}x{}", plan.canvas_width, plan.canvas_height),
            fps = plan.fps,
            ops = plan.ops.len(),
            audio = plan.audio_enabled,
            "Render started"
        );

        let base_path = ctx.work_dir.join("base.mp4");
        match self.run_quiet(&base_canvas_args(plan, &base_path), &ctx.cancel)? {
            RunOutcome::Canceled => return Ok(()),
            RunOutcome::Completed => {}
        }
        if !progress(RenderPhase::Preparing, PREPARING_END) {
            return Ok(());
        }

        // Synthesize text glyph layers; media ops need no intermediate.
        if !progress(RenderPhase::Rendering, PREPARING_END) {
            return Ok(());
        }
        let text_total = plan
            .ops
            .iter()
            .filter(|op| matches!(op.source, OpSource::TextLayer { .. }))
            .count();
        let mut text_done = 0usize;
        let mut inputs: Vec<PathBuf> = Vec::with_capacity(plan.ops.len());
        for (idx, op) in plan.ops.iter().enumerate() {
            match &op.source {
                OpSource::Media(path) => inputs.push(path.clone()),
                OpSource::TextLayer {
                    content,
                    font_size,
                    color,
                } => {
                    let layer_path = ctx.work_dir.join(format!("text_{idx}.mov"));
                    let args = text_layer_args(
                        plan,
                        content,
                        *font_size,
                        color,
                        op.window.duration(),
                        &layer_path,
                    );
                    match self.run_quiet(&args, &ctx.cancel)? {
                        RunOutcome::Canceled => return Ok(()),
                        RunOutcome::Completed => {}
                    }
                    inputs.push(layer_path);
                    text_done += 1;
                    let span = (RENDERING_END - PREPARING_END) as usize;
                    let pct = PREPARING_END + (span * text_done / text_total.max(1)) as u8;
                    if !progress(RenderPhase::Rendering, pct) {
                        return Ok(());
                    }
                }
            }
        }

        if !progress(RenderPhase::Encoding, RENDERING_END) {
            return Ok(());
        }
        let args = encode_args(plan, &base_path, &inputs, &ctx.output_path);
        match self.run_encode(plan, &args, &ctx.cancel, progress)? {
            RunOutcome::Canceled => return Ok(()),
            RunOutcome::Completed => {}
        }

        if !progress(RenderPhase::Finalizing, ENCODING_END) {
            return Ok(());
        }
        let output_size = std::fs::metadata(&ctx.output_path)
            .map(|m| m.len())
            .unwrap_or(0);
        if output_size == 0 {
            // A clean exit without an artifact is still a failure.
            return Err(FramecastError::render_failure(None, "no output produced"));
        }

        tracing::info!(
            output = %ctx.output_path.display(),
            size = output_size,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Render finished"
        );
        progress(RenderPhase::Finalizing, 100);
        Ok(())
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Spawn the stderr drain thread for a child process.
fn drain_stderr(child: &mut std::process::Child) -> FramecastResult<std::thread::JoinHandle<String>> {
    let stderr = child.stderr.take().ok_or_else(|| {
        FramecastError::render_failure(None, "failed to capture engine stderr")
    })?;
    Ok(std::thread::spawn(move || -> String {
        let mut reader = BufReader::new(stderr);
        let mut output = String::new();
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read engine stderr: {err}>"),
        }
    }))
}

/// Map encode out-time to overall progress within the encoding band.
fn encode_progress(out_time_secs: f64, duration: f64) -> u8 {
    let span = (ENCODING_END - RENDERING_END) as f64;
    let ratio = if duration > 0.0 {
        (out_time_secs / duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    RENDERING_END + (ratio * span).floor() as u8
}

/// Arguments for the base canvas asset: a solid-color frame at canvas
/// dimensions for the full master duration.
fn base_canvas_args(plan: &RenderPlan, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!(
            "color=c={}:s={}x{}:d={:.6}:r={}",
            plan.base_color, plan.canvas_width, plan.canvas_height, plan.duration, plan.fps
        ),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        PIXEL_FORMAT.to_string(),
        "-t".to_string(),
        format!("{:.6}", plan.duration),
        output.display().to_string(),
    ]
}

/// Arguments for one synthesized text glyph layer: centered drawtext on
/// a transparent canvas, RGBA-preserving codec.
fn text_layer_args(
    plan: &RenderPlan,
    content: &str,
    font_size: u32,
    color: &str,
    duration: f64,
    output: &Path,
) -> Vec<String> {
    let color = color.trim_start_matches('#');
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!(
            "color=c=black@0:s={}x{}:d={:.6}",
            plan.canvas_width, plan.canvas_height, duration
        ),
        "-vf".to_string(),
        format!(
            "drawtext=text='{}':fontsize={}:fontcolor={}:x=(w-text_w)/2:y=(h-text_h)/2",
            escape_drawtext(content),
            font_size,
            color
        ),
        "-c:v".to_string(),
        "png".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "-t".to_string(),
        format!("{:.6}", duration),
        output.display().to_string(),
    ]
}

/// Arguments for the single final encode pass: base canvas plus every
/// overlay input, the full filter chain, codec, quality curve, pixel
/// format normalization, frame rate, and duration cap.
fn encode_args(plan: &RenderPlan, base: &Path, inputs: &[PathBuf], output: &Path) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-i".to_string(),
        base.display().to_string(),
    ];

    for input in inputs {
        args.push("-i".to_string());
        args.push(input.display().to_string());
    }

    match build_filter_chain(plan) {
        Some(filter) => {
            args.push("-filter_complex".to_string());
            args.push(filter);
            args.push("-map".to_string());
            args.push("[vout]".to_string());
        }
        None => {
            args.push("-map".to_string());
            args.push("0:v".to_string());
        }
    }

    args.push("-c:v".to_string());
    args.push(plan.encoder.to_string());
    if plan.encoder == "libvpx-vp9" {
        // libvpx has no preset option; constrained-quality mode needs an
        // explicit zero bitrate for -crf to take effect.
        args.push("-b:v".to_string());
        args.push("0".to_string());
    } else {
        args.push("-preset".to_string());
        args.push("medium".to_string());
    }
    args.push("-crf".to_string());
    args.push(plan.quality_curve.to_string());
    args.push("-pix_fmt".to_string());
    args.push(PIXEL_FORMAT.to_string());
    args.push("-r".to_string());
    args.push(plan.fps.to_string());
    args.push("-t".to_string());
    args.push(format!("{:.6}", plan.duration));

    if !plan.audio_enabled {
        args.push("-an".to_string());
    }

    args.push(output.display().to_string());
    args
}

/// Build the filter graph wiring every composite operation, in order,
/// onto the accumulated frame. Input index 0 is the base canvas; overlay
/// inputs follow in plan order, so chain order equals stacking order.
fn build_filter_chain(plan: &RenderPlan) -> Option<String> {
    if plan.ops.is_empty() {
        return None;
    }

    let mut parts = Vec::with_capacity(plan.ops.len() * 2);
    let mut prev = "[0:v]".to_string();
    let last = plan.ops.len() - 1;

    for (i, op) in plan.ops.iter().enumerate() {
        let input_idx = i + 1;
        parts.push(format!(
            "[{input_idx}:v]scale={}:{},format=rgba,colorchannelmixer=aa={:.4}[l{i}]",
            op.width.max(1),
            op.height.max(1),
            op.opacity
        ));
        let out = if i == last {
            "[vout]".to_string()
        } else {
            format!("[s{i}]")
        };
        parts.push(format!(
            "{prev}[l{i}]overlay={}:{}:enable='between(t,{:.4},{:.4})'{out}",
            op.x, op.y, op.window.start, op.window.end
        ));
        prev = out;
    }

    Some(parts.join(";"))
}

/// Escape text for the drawtext filter's quoted argument syntax.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// Keep a bounded prefix of raw engine diagnostics.
fn truncate_diagnostics(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() <= ENGINE_DIAGNOSTIC_CAP {
        return trimmed.to_string();
    }
    let mut cut = ENGINE_DIAGNOSTIC_CAP;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!(
        "{} [truncated {} bytes]",
        &trimmed[..cut],
        trimmed.len() - cut
    )
}
