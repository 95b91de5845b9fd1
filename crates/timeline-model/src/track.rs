//! Tracks: ordered clip containers.
//!
//! Track declaration order is load-bearing: compositing proceeds from
//! the first track to the last, each subsequent visible track's clips
//! overlaid on top of the accumulated frame.

use serde::{Deserialize, Serialize};

use crate::clip::Clip;

/// Track kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Image,
    Text,
    Sticker,
}

/// A single timeline track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub kind: TrackKind,

    /// Clips in declaration order; later clips stack above earlier ones.
    #[serde(default)]
    pub clips: Vec<Clip>,

    /// A muted audio track contributes no audio; its visual clips (if
    /// any) still composite.
    #[serde(default)]
    pub muted: bool,

    /// A hidden track contributes nothing at all.
    #[serde(default)]
    pub hidden: bool,
}
