//! Local canvas state.
//!
//! Decodes server colors and holds the raster that deltas are patched into.

pub mod color;
pub mod surface;

pub use color::Rgb;
pub use surface::{ApplyReport, SurfaceBuffer};
