//! Error types for the pixelframe-api crate.
//!
//! Network-level failures on the delta endpoint are not errors: they are
//! reported as [`FetchOutcome::NetworkFailure`](crate::types::FetchOutcome)
//! so the caller can switch into reconnect mode. Everything here is a
//! failure of a request that did reach the server, or of local setup.

/// Errors that can occur while talking to the canvas service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached at all (DNS, connect, timeout).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// A transport error after the response began (e.g. body read failure).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a status this client does not handle.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns `true` if the server produced a response for this request.
    ///
    /// Reconnect probes treat any answer from the server as proof of life,
    /// even one the client cannot use.
    pub fn server_responded(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Parse(_))
    }
}

/// Convenience type alias for pixelframe-api results.
pub type Result<T> = std::result::Result<T, ApiError>;
