//! Clip types: a clip is a timed placement of media, text, or a sticker
//! on the master timeline.
//!
//! Per-kind properties are closed structs with explicit defaults rather
//! than an open string map, so malformed property names are rejected at
//! the deserialization boundary instead of silently defaulting at render
//! time. Missing properties still default (that behavior is intentional).

use serde::{Deserialize, Serialize};

/// Default overlay scale, in percent of the canvas.
pub const DEFAULT_SCALE_PCT: f64 = 100.0;

/// Default overlay opacity, in percent.
pub const DEFAULT_OPACITY_PCT: f64 = 100.0;

/// Default overlay position (top-left corner), in output pixels.
pub const DEFAULT_POS_X: i64 = 0;
pub const DEFAULT_POS_Y: i64 = 0;

/// Default font size for text clips, in points.
pub const DEFAULT_FONT_SIZE: u32 = 48;

/// Default font color for text clips.
pub const DEFAULT_TEXT_COLOR: &str = "white";

/// Opaque reference to an uploaded media source.
///
/// Resolution of a reference to a readable file is the upload
/// subsystem's job; the timeline model only carries the handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single clip placed on a track.
///
/// `start + duration` defines the clip's absolute active window on the
/// master timeline. Clips are timing-independent of each other; overlaps
/// are legal and expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Absolute start time on the master timeline, seconds.
    pub start: f64,

    /// Active duration, seconds.
    pub duration: f64,

    /// Kind-specific payload.
    #[serde(flatten)]
    pub body: ClipBody,
}

/// Kind-specific clip payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClipBody {
    Video {
        #[serde(default)]
        media: Option<MediaRef>,
        #[serde(default)]
        overlay: OverlayProps,
    },
    Image {
        #[serde(default)]
        media: Option<MediaRef>,
        #[serde(default)]
        overlay: OverlayProps,
    },
    Sticker {
        #[serde(default)]
        media: Option<MediaRef>,
        #[serde(default)]
        overlay: OverlayProps,
    },
    Text {
        #[serde(default)]
        text: TextProps,
        #[serde(default)]
        overlay: OverlayProps,
    },
    Audio {
        #[serde(default)]
        media: Option<MediaRef>,
    },
}

impl Clip {
    /// The clip's half-open window `[start, end)` clamped to the master
    /// duration, or `None` if the window lies entirely at or past the end.
    pub fn window(&self, master_duration: f64) -> Option<(f64, f64)> {
        if self.start >= master_duration {
            return None;
        }
        let end = (self.start + self.duration).min(master_duration);
        if end <= self.start {
            return None;
        }
        Some((self.start, end))
    }
}

/// Visual overlay properties shared by all composited clip kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OverlayProps {
    /// Scale as a percentage of the canvas dimensions.
    pub scale: f64,

    /// Opacity percentage; 100 is fully opaque.
    pub opacity: f64,

    /// Top-left position in output pixels.
    pub pos_x: i64,
    pub pos_y: i64,
}

impl Default for OverlayProps {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE_PCT,
            opacity: DEFAULT_OPACITY_PCT,
            pos_x: DEFAULT_POS_X,
            pos_y: DEFAULT_POS_Y,
        }
    }
}

/// Text rendering properties for text clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TextProps {
    /// The text to render.
    pub content: String,

    /// Font size in points.
    pub font_size: u32,

    /// Font color (named color or hex without `#`).
    pub color: String,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_deserializes_with_defaulted_overlay() {
        let json = r#"{
            "id": "c1",
            "kind": "video",
            "start": 0.0,
            "duration": 3.0,
            "media": "m1"
        }"#;
        let clip: Clip = serde_json::from_str(json).unwrap();
        match &clip.body {
            ClipBody::Video { media, overlay } => {
                assert_eq!(media.as_ref().unwrap().0, "m1");
                assert_eq!(overlay, &OverlayProps::default());
            }
            other => panic!("expected video clip, got {other:?}"),
        }
    }

    #[test]
    fn unknown_overlay_property_is_rejected() {
        let json = r#"{
            "id": "c1",
            "kind": "image",
            "start": 0.0,
            "duration": 1.0,
            "media": "m1",
            "overlay": {"scal": 50}
        }"#;
        assert!(serde_json::from_str::<Clip>(json).is_err());
    }

    #[test]
    fn text_clip_defaults() {
        let json = r#"{
            "id": "t1",
            "kind": "text",
            "start": 1.0,
            "duration": 2.0,
            "text": {"content": "Hello"}
        }"#;
        let clip: Clip = serde_json::from_str(json).unwrap();
        match &clip.body {
            ClipBody::Text { text, .. } => {
                assert_eq!(text.content, "Hello");
                assert_eq!(text.font_size, DEFAULT_FONT_SIZE);
                assert_eq!(text.color, DEFAULT_TEXT_COLOR);
            }
            other => panic!("expected text clip, got {other:?}"),
        }
    }

    #[test]
    fn window_clamps_to_master_duration() {
        let clip: Clip = serde_json::from_str(
            r#"{"id": "c", "kind": "image", "start": 4.0, "duration": 3.0, "media": "m"}"#,
        )
        .unwrap();
        assert_eq!(clip.window(5.0), Some((4.0, 5.0)));
        assert_eq!(clip.window(10.0), Some((4.0, 7.0)));
        assert_eq!(clip.window(4.0), None);
        assert_eq!(clip.window(2.0), None);
    }
}
