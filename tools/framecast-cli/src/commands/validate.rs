//! Validate a timeline file and print its derived render plan.

use std::path::PathBuf;

use framecast_render::{build_plan, OpSource, UploadedMedia};
use framecast_timeline::RenderRequest;

pub fn run(timeline: PathBuf) -> anyhow::Result<()> {
    println!("Validating timeline: {}", timeline.display());

    let content = std::fs::read_to_string(&timeline)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", timeline.display()))?;
    let request: RenderRequest = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    let resolver = UploadedMedia::from_request(&request);
    let plan = match build_plan(&request, &resolver) {
        Ok(plan) => plan,
        Err(e) => {
            println!("[FAIL] {e}");
            return Err(anyhow::anyhow!("Timeline is invalid"));
        }
    };

    println!("[OK] Timeline is valid");
    println!(
        "  Canvas: {}x{} @ {}fps",
        plan.canvas_width, plan.canvas_height, plan.fps
    );
    println!("  Duration: {}s ({} frames)", plan.duration, plan.total_frames());
    println!("  Encoder: {} (crf {})", plan.encoder, plan.quality_curve);
    println!("  Audio: {}", if plan.audio_enabled { "yes" } else { "no" });
    println!("  Composite operations: {}", plan.ops.len());
    for (idx, op) in plan.ops.iter().enumerate() {
        let source = match &op.source {
            OpSource::Media(path) => path.display().to_string(),
            OpSource::TextLayer { content, .. } => format!("text {content:?}"),
        };
        println!(
            "    #{idx}: {source} [{:.2}s..{:.2}s] {}x{} at ({}, {})",
            op.window.start, op.window.end, op.width, op.height, op.x, op.y
        );
    }

    Ok(())
}
