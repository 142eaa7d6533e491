//! Trait definition for canvas service backends.
//!
//! The sync session talks to the server only through [`CanvasEndpoint`], so
//! the state machine can be driven by an in-memory script in tests and by
//! [`CanvasClient`](crate::client::CanvasClient) in production.

use crate::error::ApiError;
use crate::types::{CanvasSize, FetchOutcome};
use bytes::Bytes;
use std::future::Future;

/// A source of canvas state.
///
/// All implementations must be `Send + Sync` so a session can be spawned
/// onto a multi-threaded runtime.
pub trait CanvasEndpoint: Send + Sync {
    /// One-time size query (`GET /canvas/size`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the server is unreachable or the body is invalid.
    fn size(&self) -> impl Future<Output = Result<CanvasSize, ApiError>> + Send;

    /// Full raster as an encoded image blob (`GET /canvas/`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unreachable`] when no response arrives and
    /// [`ApiError::Status`] for a non-success status.
    fn full_image(&self) -> impl Future<Output = Result<Bytes, ApiError>> + Send;

    /// Pixels changed since `timestamp` (`GET /canvas/since?timestamp=`).
    ///
    /// Network failures are reported as [`FetchOutcome::NetworkFailure`],
    /// not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for an unexpected status or a malformed body.
    fn since(&self, timestamp: i64)
        -> impl Future<Output = Result<FetchOutcome, ApiError>> + Send;
}
