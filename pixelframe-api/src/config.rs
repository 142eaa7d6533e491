//! Client configuration with sensible defaults.

use crate::error::ApiError;
use url::Url;

/// Configuration for a [`CanvasClient`](crate::client::CanvasClient).
///
/// Use [`Default::default()`] for a local server, or override fields.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the pixelframe server, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, `pixelframe-api/<version>` is sent.
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// Create a config pointing at `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `base_url` must parse as an `http` or `https` URL
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.timeout_seconds == 0 {
            return Err(ApiError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        self.parsed_base_url().map(|_| ())
    }

    /// Parse `base_url`, normalised to end with a slash so relative joins
    /// keep any path prefix.
    pub fn parsed_base_url(&self) -> Result<Url, ApiError> {
        let mut raw = self.base_url.trim().to_owned();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| ApiError::Config(format!("invalid base_url {raw:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::Config(format!(
                "base_url scheme must be http or https, got {other}"
            ))),
        }
    }
}
