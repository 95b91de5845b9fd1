//! Export settings: the symbolic knobs a client submits.
//!
//! Concrete numeric parameters (pixel dimensions, encoder identifier,
//! quality-curve value) are derived in [`crate::policy`].

use serde::{Deserialize, Serialize};

/// Named output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "4k")]
    K4,
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Mov,
    Webm,
}

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    H265,
    Vp9,
}

/// Export settings for a render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub resolution: Resolution,

    /// Output frame rate.
    pub fps: u32,

    pub format: ContainerFormat,

    pub codec: Codec,

    /// Perceptual quality, 1 (worst) to 100 (best).
    pub quality: u8,

    /// Master timeline length in seconds. Clips extending beyond it are
    /// truncated; clips starting at or after it are ignored.
    pub duration: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::P1080,
            fps: 30,
            format: ContainerFormat::Mp4,
            codec: Codec::H264,
            quality: 80,
            duration: 10.0,
        }
    }
}
