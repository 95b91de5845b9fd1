//! Framecast Timeline Model
//!
//! Defines the data contracts for a render request:
//! - **Clips:** timed media, text, and sticker placements with overlay properties
//! - **Tracks:** ordered clip containers; declaration order is compositing order
//! - **Settings:** symbolic export parameters (resolution, codec, quality)
//! - **Policy:** pure derivation of concrete encoder parameters from settings
//!
//! All types are plain data. Structural validation lives on
//! [`RenderRequest::validate`]; everything downstream may assume a
//! validated request.

pub mod clip;
pub mod policy;
pub mod request;
pub mod settings;
pub mod track;

pub use clip::*;
pub use policy::*;
pub use request::*;
pub use settings::*;
pub use track::*;
