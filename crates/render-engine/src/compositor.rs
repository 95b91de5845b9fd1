//! Timeline compositor: walks the track/clip arrangement and produces an
//! ordered render plan.
//!
//! Pure and deterministic given the same input. The only I/O is media
//! reference resolution, injected through [`MediaResolver`].

use framecast_common::error::FramecastResult;
use framecast_timeline::{
    quality_curve, ClipBody, OverlayProps, RenderRequest, TrackKind,
};

use crate::media::MediaResolver;
use crate::plan::{CompositeOp, OpSource, RenderPlan, TimeWindow, DEFAULT_BASE_COLOR};

/// Build a render plan from a request.
///
/// Fails with `InvalidTimeline` when the request is structurally
/// inconsistent. Clips whose media reference does not resolve are
/// dropped from the plan with a warning; partial composition is
/// preferred over failing the whole job. An empty plan (zero overlays)
/// is valid and renders the blank base canvas.
pub fn build_plan(
    request: &RenderRequest,
    media: &dyn MediaResolver,
) -> FramecastResult<RenderPlan> {
    request.validate()?;

    let settings = &request.settings;
    let (canvas_width, canvas_height) = settings.resolution.dimensions();
    let master_duration = settings.duration;

    let mut ops = Vec::new();
    let mut audio_enabled = false;

    // Tracks composite in declaration order; a hidden track contributes
    // nothing, visual or audible.
    for track in &request.tracks {
        if track.hidden {
            tracing::debug!(track = %track.id, "Skipping hidden track");
            continue;
        }

        if track.kind == TrackKind::Audio && !track.muted {
            audio_enabled = true;
        }

        for clip in &track.clips {
            let Some((start, end)) = clip.window(master_duration) else {
                tracing::debug!(
                    clip = %clip.id,
                    start = clip.start,
                    master_duration,
                    "Clip window lies past the timeline end"
                );
                continue;
            };

            let (source, overlay) = match &clip.body {
                ClipBody::Video { media: m, overlay }
                | ClipBody::Image { media: m, overlay }
                | ClipBody::Sticker { media: m, overlay } => {
                    let Some(reference) = m else {
                        tracing::warn!(clip = %clip.id, "Clip has no media reference; dropped");
                        continue;
                    };
                    let Some(path) = media.resolve(reference) else {
                        tracing::warn!(
                            clip = %clip.id,
                            media = %reference,
                            "Media reference did not resolve; clip dropped from plan"
                        );
                        continue;
                    };
                    (OpSource::Media(path), overlay)
                }
                ClipBody::Text { text, overlay } => (
                    OpSource::TextLayer {
                        content: text.content.clone(),
                        font_size: text.font_size,
                        color: text.color.clone(),
                    },
                    overlay,
                ),
                // Audio clips carry no visual contribution.
                ClipBody::Audio { .. } => continue,
            };

            ops.push(overlay_op(
                source,
                overlay,
                TimeWindow { start, end },
                canvas_width,
                canvas_height,
            ));
        }
    }

    Ok(RenderPlan {
        canvas_width,
        canvas_height,
        fps: settings.fps,
        base_color: DEFAULT_BASE_COLOR.to_string(),
        duration: master_duration,
        encoder: settings.codec.encoder(),
        quality_curve: quality_curve(settings.quality),
        resolution: settings.resolution,
        format: settings.format,
        audio_enabled,
        ops,
    })
}

/// Apply overlay geometry: dimensions floor-scaled from the canvas,
/// opacity as a `[0, 1]` multiplier.
fn overlay_op(
    source: OpSource,
    overlay: &OverlayProps,
    window: TimeWindow,
    canvas_width: u32,
    canvas_height: u32,
) -> CompositeOp {
    let scale = overlay.scale.max(0.0) / 100.0;
    CompositeOp {
        source,
        window,
        width: (canvas_width as f64 * scale).floor() as u32,
        height: (canvas_height as f64 * scale).floor() as u32,
        opacity: (overlay.opacity / 100.0).clamp(0.0, 1.0),
        x: overlay.pos_x,
        y: overlay.pos_y,
    }
}
