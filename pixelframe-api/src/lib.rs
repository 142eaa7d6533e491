//! # pixelframe-api
//!
//! Typed HTTP client for a pixelframe canvas server.
//!
//! ## Endpoints
//!
//! - `GET /canvas/size` returns `{"x": w, "y": h}`
//! - `GET /canvas/` returns the full raster as an image blob
//! - `GET /canvas/since?timestamp=T` returns `[[x, y, "rrggbb"], ...]`, or
//!   redirects to `/canvas/` when `T` predates the server's history
//!
//! ## Design
//!
//! - Redirects are never followed; a redirect to `/canvas/` is surfaced as
//!   [`FetchOutcome::Rebaseline`]
//! - "No response at all" is an outcome, not an error, so callers can switch
//!   into reconnect mode without inspecting error internals
//! - [`CanvasEndpoint`] abstracts the server so sessions can run against an
//!   in-memory script

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod types;

pub use client::CanvasClient;
pub use config::ApiConfig;
pub use endpoint::CanvasEndpoint;
pub use error::{ApiError, Result};
pub use types::{CanvasSize, FetchOutcome, PixelUpdate};

/// Connect to a server with default settings and query its size.
///
/// Convenience wrapper for one-off checks (e.g. a CLI `--check` flag).
///
/// # Errors
///
/// Returns [`ApiError`] if the URL is invalid or the request fails.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> pixelframe_api::Result<()> {
/// let size = pixelframe_api::probe_size("http://localhost:8080").await?;
/// println!("canvas is {size}");
/// # Ok(())
/// # }
/// ```
pub async fn probe_size(base_url: &str) -> Result<CanvasSize> {
    let client = CanvasClient::new(&ApiConfig::new(base_url))?;
    client.size().await
}
