//! Shared HTTP client for canvas service requests.
//!
//! Redirects are disabled: the delta endpoint signals "rebaseline" by
//! redirecting to the full-image endpoint, and the client must see that
//! redirect rather than silently follow it.

use crate::config::ApiConfig;
use crate::error::ApiError;
use std::time::Duration;

/// Default User-Agent sent when the config does not override it.
pub fn default_user_agent() -> String {
    format!("pixelframe-api/{}", env!("CARGO_PKG_VERSION"))
}

/// Build a [`reqwest::Client`] configured for the canvas service.
///
/// # Errors
///
/// Returns [`ApiError::Config`] if the client cannot be constructed.
pub fn build_client(config: &ApiConfig) -> Result<reqwest::Client, ApiError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => default_user_agent(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))
}

/// Returns `true` if a request error means no response was received.
pub fn is_network_failure(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_request()
}

/// Map a failed `send()` to [`ApiError::Unreachable`] or [`ApiError::Http`].
pub fn send_error(err: &reqwest::Error) -> ApiError {
    if is_network_failure(err) {
        ApiError::Unreachable(err.to_string())
    } else {
        ApiError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_user_agent_has_version() {
        let ua = default_user_agent();
        assert!(ua.starts_with("pixelframe-api/"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn build_client_with_default_config() {
        let config = ApiConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = ApiConfig {
            user_agent: Some("Viewer/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }
}
