//! Error types for the viewer.

use pixelframe_api::ApiError;

/// Top-level error type for the canvas viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Canvas service request failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Malformed hex color.
    #[error("invalid color {0:?}")]
    Color(String),

    /// Pixel or region outside the surface.
    #[error("({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Surface width.
        width: u32,
        /// Surface height.
        height: u32,
    },

    /// The server reported a canvas with no pixels.
    #[error("server reported an empty canvas ({0})")]
    EmptyCanvas(String),

    /// The server reported a canvas larger than the configured pixel limit.
    #[error("canvas {size} has {pixels} pixels, limit is {limit}")]
    CanvasTooLarge {
        /// Reported size as `WxH`.
        size: String,
        /// Reported pixel count.
        pixels: u64,
        /// Configured `sync.max_pixels`.
        limit: u64,
    },

    /// Image decode or encode error.
    #[error("image error: {0}")]
    Image(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ViewerError>;
