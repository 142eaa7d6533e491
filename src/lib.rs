//! Pixelframe viewer: a polling client for a shared pixel canvas.
//!
//! The viewer mirrors a server-side raster locally:
//! full image → deltas every second → (offline) probe every six seconds
//!
//! # Architecture
//!
//! - **API**: HTTP access to the server lives in the `pixelframe-api` crate
//! - **Canvas**: Hex color decoding and the local RGBA surface
//! - **Sync**: Watermark tracking and the connected/reconnecting state machine
//! - **Config**: TOML settings for server, timing and snapshots

pub mod canvas;
pub mod config;
pub mod error;
pub mod sync;

pub use canvas::{Rgb, SurfaceBuffer};
pub use config::{NotFoundPolicy, SyncConfig, ViewerConfig};
pub use error::{Result, ViewerError};
pub use sync::{ConnectionStatus, SessionEvent, SnapshotWriter, SyncSession};

use pixelframe_api::{CanvasClient, CanvasEndpoint, CanvasSize};

/// Query the canvas size once using the configured timeout and User-Agent.
///
/// # Errors
///
/// Returns [`ViewerError::Api`] if the config is invalid or the request fails.
pub async fn check_server(server: &config::ServerConfig) -> Result<CanvasSize> {
    let client = CanvasClient::new(&server.api_config())?;
    Ok(client.size().await?)
}
