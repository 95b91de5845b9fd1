//! The render plan: a complete, ordered, deterministic description of
//! how to turn a timeline into a file, decoupled from the engine that
//! executes it.
//!
//! A plan is built once per job, never mutated after construction, and
//! consumed once.

use std::path::PathBuf;

use framecast_timeline::{ContainerFormat, Resolution};

/// Base canvas color for the implicit operation zero.
pub const DEFAULT_BASE_COLOR: &str = "black";

/// Pixel format normalization applied on the final encode, required for
/// broad player compatibility.
pub const PIXEL_FORMAT: &str = "yuv420p";

/// Half-open time window `[start, end)` on the master timeline, seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Pixel source for a composite operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OpSource {
    /// An existing, resolved media file (read-only, possibly shared
    /// between concurrent jobs).
    Media(PathBuf),

    /// A text glyph layer to be synthesized before compositing. Once
    /// synthesized it receives the same overlay treatment as an image.
    TextLayer {
        content: String,
        font_size: u32,
        color: String,
    },
}

/// One planned overlay: a single clip's visual contribution, positioned
/// and timed. Later operations render strictly on top of earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOp {
    pub source: OpSource,

    /// When the overlay is visible on the master timeline.
    pub window: TimeWindow,

    /// Scaled overlay dimensions in output pixels.
    pub width: u32,
    pub height: u32,

    /// Alpha multiplier in `[0, 1]`.
    pub opacity: f64,

    /// Top-left position in output pixels.
    pub x: i64,
    pub y: i64,
}

/// Derived, read-only rendering instructions for one job.
///
/// The base canvas (solid `base_color` frame at canvas dimensions for
/// the full duration) is always the implicit operation zero; `ops` are
/// the overlays stacked on top of it in order.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub fps: u32,
    pub base_color: String,

    /// Master timeline length, seconds.
    pub duration: f64,

    /// Encoder identifier for the external engine.
    pub encoder: &'static str,

    /// Inverse quality-curve value (lower = higher quality).
    pub quality_curve: u8,

    pub resolution: Resolution,
    pub format: ContainerFormat,

    /// When false the output carries no audio stream at all.
    pub audio_enabled: bool,

    /// Ordered overlay operations.
    pub ops: Vec<CompositeOp>,
}

impl RenderPlan {
    /// Total frames the engine is expected to produce.
    pub fn total_frames(&self) -> u64 {
        (self.duration * self.fps as f64).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_window_duration() {
        let window = TimeWindow {
            start: 1.5,
            end: 4.0,
        };
        assert!((window.duration() - 2.5).abs() < 1e-9);
    }
}
