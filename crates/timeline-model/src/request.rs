//! The render request: the full client submission, plus structural
//! validation.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use framecast_common::error::{FramecastError, FramecastResult};

use crate::clip::MediaRef;
use crate::settings::ExportSettings;
use crate::track::Track;

/// A complete render submission: tracks, export settings, and the
/// upload-boundary hand-off mapping media references to readable files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub tracks: Vec<Track>,

    #[serde(default)]
    pub settings: ExportSettings,

    /// Uploaded source files, keyed by the reference clips carry.
    /// Read-only; may be shared by concurrent jobs.
    #[serde(default, rename = "mediaFiles")]
    pub media: HashMap<MediaRef, PathBuf>,
}

impl RenderRequest {
    /// Check structural consistency. A request that passes validation may
    /// still contain unresolvable media references; those are dropped by
    /// the compositor rather than rejected here.
    pub fn validate(&self) -> FramecastResult<()> {
        let mut errors = Vec::new();

        if !self.settings.duration.is_finite() || self.settings.duration <= 0.0 {
            errors.push(format!(
                "settings.duration must be a positive number, got {}",
                self.settings.duration
            ));
        }
        if self.settings.fps == 0 {
            errors.push("settings.fps must be greater than zero".to_string());
        }
        if !(1..=100).contains(&self.settings.quality) {
            errors.push(format!(
                "settings.quality must be in 1..=100, got {}",
                self.settings.quality
            ));
        }

        for (track_idx, track) in self.tracks.iter().enumerate() {
            if track.id.is_empty() {
                errors.push(format!("track #{track_idx} has an empty id"));
            }
            for clip in &track.clips {
                if clip.id.is_empty() {
                    errors.push(format!("track {:?} contains a clip with an empty id", track.id));
                    continue;
                }
                if !clip.start.is_finite() || clip.start < 0.0 {
                    errors.push(format!(
                        "clip {:?}: start must be >= 0, got {}",
                        clip.id, clip.start
                    ));
                }
                if !clip.duration.is_finite() || clip.duration <= 0.0 {
                    errors.push(format!(
                        "clip {:?}: duration must be > 0, got {}",
                        clip.id, clip.duration
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FramecastError::invalid_timeline(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_from(json: &str) -> RenderRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_request_is_valid() {
        // A fully empty timeline renders a blank base video; it is not an error.
        let request = RenderRequest::default();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn negative_clip_start_is_rejected() {
        let request = request_from(
            r#"{
                "tracks": [{
                    "id": "t1", "kind": "video",
                    "clips": [{"id": "c1", "kind": "video", "start": -1.0, "duration": 2.0}]
                }]
            }"#,
        );
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("start must be >= 0"));
    }

    #[test]
    fn zero_clip_duration_is_rejected() {
        let request = request_from(
            r#"{
                "tracks": [{
                    "id": "t1", "kind": "video",
                    "clips": [{"id": "c1", "kind": "video", "start": 0.0, "duration": 0.0}]
                }]
            }"#,
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_master_duration_is_rejected() {
        let request = request_from(r#"{"settings": {"duration": 0.0}}"#);
        let err = request.validate().unwrap_err();
        assert!(matches!(
            err,
            FramecastError::InvalidTimeline { .. }
        ));
    }

    #[test]
    fn multiple_errors_are_reported_together() {
        let request = request_from(
            r#"{
                "settings": {"duration": -1.0},
                "tracks": [{
                    "id": "", "kind": "video",
                    "clips": [{"id": "c1", "kind": "video", "start": -2.0, "duration": 1.0}]
                }]
            }"#,
        );
        let message = request.validate().unwrap_err().to_string();
        assert!(message.contains("duration"));
        assert!(message.contains("empty id"));
        assert!(message.contains("start"));
    }
}
