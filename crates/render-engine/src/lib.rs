//! Framecast Render Engine
//!
//! Turns a validated timeline into a rendered video file in two stages:
//!
//! ```text
//! RenderRequest ──► Compositor ──► RenderPlan ──► FfmpegEngine ──► output.mp4
//!                   (pure walk)    (ordered ops)  (subprocess
//!                                                  supervision)
//! ```
//!
//! The compositor is deterministic and side-effect free; all external
//! I/O lives behind the [`engine::RenderEngine`] trait, which treats the
//! encoding toolchain as an untrusted, failure-prone subprocess.

pub mod compositor;
pub mod engine;
pub mod ffmpeg;
pub mod media;
pub mod plan;

pub use compositor::build_plan;
pub use engine::{ProgressSink, RenderContext, RenderEngine, RenderPhase};
pub use ffmpeg::FfmpegEngine;
pub use media::{MediaLibrary, MediaResolver, UploadedMedia};
pub use plan::{CompositeOp, OpSource, RenderPlan, TimeWindow};
