//! HTTP implementation of [`CanvasEndpoint`].

use crate::config::ApiConfig;
use crate::endpoint::CanvasEndpoint;
use crate::error::ApiError;
use crate::http::{build_client, is_network_failure, send_error};
use crate::types::{CanvasSize, FetchOutcome, PixelUpdate};
use bytes::Bytes;
use reqwest::header::LOCATION;
use reqwest::{Response, StatusCode};
use url::Url;

/// Path of the full-image endpoint, relative to the base URL.
const FULL_IMAGE_PATH: &str = "canvas/";
/// Path of the size endpoint.
const SIZE_PATH: &str = "canvas/size";
/// Path of the delta endpoint.
const SINCE_PATH: &str = "canvas/since";

/// Client for a pixelframe server.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    http: reqwest::Client,
    full_image_url: Url,
    size_url: Url,
    since_url: Url,
}

impl CanvasClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the config is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let base = config.parsed_base_url()?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ApiError::Config(format!("cannot join {path} onto {base}: {e}")))
        };

        Ok(Self {
            http: build_client(config)?,
            full_image_url: join(FULL_IMAGE_PATH)?,
            size_url: join(SIZE_PATH)?,
            since_url: join(SINCE_PATH)?,
        })
    }

    /// URL of the full-image endpoint.
    pub fn full_image_url(&self) -> &Url {
        &self.full_image_url
    }

    /// Returns `true` if `response` is a redirect to the full-image endpoint.
    ///
    /// The server emits a root-relative `Location: /canvas/` even when it is
    /// mounted under a path prefix, so any same-host target whose path ends
    /// in `/canvas/` is accepted.
    fn is_rebaseline_redirect(&self, response: &Response) -> bool {
        if !response.status().is_redirection() {
            return false;
        }
        let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };
        match response.url().join(location) {
            Ok(target) => {
                target.host_str() == self.full_image_url.host_str()
                    && (target.path() == self.full_image_url.path()
                        || target.path().ends_with(&format!("/{FULL_IMAGE_PATH}")))
            }
            Err(_) => false,
        }
    }
}

fn status_error(response: &Response) -> ApiError {
    ApiError::Status {
        status: response.status().as_u16(),
        url: response.url().to_string(),
    }
}

impl CanvasEndpoint for CanvasClient {
    async fn size(&self) -> Result<CanvasSize, ApiError> {
        let response = self
            .http
            .get(self.size_url.clone())
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let size: CanvasSize = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Parse(format!("canvas size: {e}")))?;
        tracing::debug!(%size, "canvas size received");
        Ok(size)
    }

    async fn full_image(&self) -> Result<Bytes, ApiError> {
        let response = self
            .http
            .get(self.full_image_url.clone())
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        tracing::debug!(len = bytes.len(), "full image received");
        Ok(bytes)
    }

    async fn since(&self, timestamp: i64) -> Result<FetchOutcome, ApiError> {
        let request = self
            .http
            .get(self.since_url.clone())
            .query(&[("timestamp", timestamp)]);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if is_network_failure(&e) => {
                tracing::debug!(timestamp, "delta request got no response: {e}");
                return Ok(FetchOutcome::NetworkFailure(e.to_string()));
            }
            Err(e) => return Err(send_error(&e)),
        };

        if self.is_rebaseline_redirect(&response) {
            return Ok(FetchOutcome::Rebaseline);
        }
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let pixels: Vec<PixelUpdate> = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Parse(format!("delta body: {e}")))?;
        tracing::trace!(timestamp, count = pixels.len(), "deltas received");
        Ok(FetchOutcome::Deltas(pixels))
    }
}
