//! Encoding policy: pure derivation of concrete encoder parameters from
//! symbolic export settings.
//!
//! Every function here is a stateless lookup or arithmetic mapping and is
//! unit-tested independently of any rendering.

use crate::settings::{Codec, ContainerFormat, Resolution};

/// Lowest (best-quality) value on the perceptual quality curve.
pub const QUALITY_CURVE_MIN: u8 = 10;

/// Highest (worst-quality) value on the perceptual quality curve.
pub const QUALITY_CURVE_MAX: u8 = 51;

impl Resolution {
    /// Fixed pixel dimensions per named resolution.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::P480 => (854, 480),
            Resolution::P720 => (1280, 720),
            Resolution::P1080 => (1920, 1080),
            Resolution::P1440 => (2560, 1440),
            Resolution::K4 => (3840, 2160),
        }
    }
}

impl Codec {
    /// Encoder identifier passed to the external rendering engine.
    pub fn encoder(self) -> &'static str {
        match self {
            Codec::H264 => "libx264",
            Codec::H265 => "libx265",
            Codec::Vp9 => "libvpx-vp9",
        }
    }
}

impl ContainerFormat {
    /// Output file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Webm => "webm",
        }
    }

    /// HTTP content type for artifact retrieval.
    pub fn content_type(self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "video/mp4",
            ContainerFormat::Mov => "video/quicktime",
            ContainerFormat::Webm => "video/webm",
        }
    }
}

/// Map perceptual quality (1..=100) to the engine's inverse quality-curve
/// value: `round(51 - quality/100 * 41)`, clamped to `[10, 51]`.
///
/// Lower curve value means higher visual quality, consistent with
/// CRF-style encoder curves.
pub fn quality_curve(quality: u8) -> u8 {
    let curve = (QUALITY_CURVE_MAX as f64 - (quality as f64 / 100.0) * 41.0).round();
    curve.clamp(QUALITY_CURVE_MIN as f64, QUALITY_CURVE_MAX as f64) as u8
}
