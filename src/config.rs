//! Configuration types for the canvas viewer.

use pixelframe_api::ApiConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ViewerError};

/// Top-level configuration for a viewer session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Canvas server connection settings.
    pub server: ServerConfig,
    /// Sync and reconnect loop timing.
    pub sync: SyncConfig,
    /// Snapshot output settings.
    pub output: OutputConfig,
}

/// Canvas server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the pixelframe server.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent (None = `pixelframe-api/<version>`).
    pub user_agent: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl ServerConfig {
    /// Build the HTTP client config for this server.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// What to do when the delta endpoint answers 404.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundPolicy {
    /// Treat as an empty delta list.
    #[default]
    Ignore,
    /// Treat as an outage and switch to reconnect probing.
    Reconnect,
}

/// Sync and reconnect loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delta poll period while connected, in milliseconds.
    pub interval_ms: u64,
    /// Probe period while reconnecting, in milliseconds.
    pub probe_interval_ms: u64,
    /// Seconds subtracted from the watermark on every delta request.
    ///
    /// Covers changes stamped in the same second the watermark was taken.
    pub watermark_margin_secs: i64,
    /// Countdown start value shown in the offline banner.
    pub countdown_from: u32,
    /// Handling of a 404 from the delta endpoint.
    pub not_found: NotFoundPolicy,
    /// Largest canvas (in pixels) the viewer will allocate a surface for.
    pub max_pixels: u64,
}

/// Default pixel limit: a 512 MiB RGBA surface.
pub const DEFAULT_MAX_PIXELS: u64 = 512 * 1024 * 1024 / 4;

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            probe_interval_ms: 6000,
            watermark_margin_secs: 1,
            countdown_from: 5,
            not_found: NotFoundPolicy::Ignore,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl SyncConfig {
    /// Delta poll period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reconnect probe period.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write PNG snapshots (None = no snapshots).
    pub snapshot_path: Option<PathBuf>,
    /// Minimum time between snapshot writes, in milliseconds.
    pub snapshot_interval_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            snapshot_interval_ms: 1000,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ViewerError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ViewerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/pixelframe/viewer.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("pixelframe").join("viewer.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("pixelframe")
                .join("viewer.toml")
        } else {
            PathBuf::from("/tmp/pixelframe-config/viewer.toml")
        }
    }

    /// Check that the loop timings and server settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.sync.interval_ms == 0 {
            return Err(ViewerError::Config(
                "sync.interval_ms must be greater than 0".into(),
            ));
        }
        if self.sync.probe_interval_ms < self.sync.interval_ms {
            return Err(ViewerError::Config(
                "sync.probe_interval_ms must be >= sync.interval_ms".into(),
            ));
        }
        if self.sync.watermark_margin_secs < 0 {
            return Err(ViewerError::Config(
                "sync.watermark_margin_secs must not be negative".into(),
            ));
        }
        if self.sync.max_pixels == 0 {
            return Err(ViewerError::Config(
                "sync.max_pixels must be greater than 0".into(),
            ));
        }
        if self.output.snapshot_interval_ms == 0 {
            return Err(ViewerError::Config(
                "output.snapshot_interval_ms must be greater than 0".into(),
            ));
        }
        self.server
            .api_config()
            .validate()
            .map_err(|e| ViewerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_client() {
        let config = ViewerConfig::default();
        assert_eq!(config.sync.interval(), Duration::from_secs(1));
        assert_eq!(config.sync.probe_interval(), Duration::from_secs(6));
        assert_eq!(config.sync.countdown_from, 5);
        assert_eq!(config.sync.watermark_margin_secs, 1);
        assert_eq!(config.sync.not_found, NotFoundPolicy::Ignore);
        assert_eq!(config.sync.max_pixels, 134_217_728);
        assert!(config.output.snapshot_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: ViewerConfig = toml::from_str(
            r#"
            [server]
            base_url = "http://canvas.example:9000"

            [sync]
            not_found = "reconnect"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.server.base_url, "http://canvas.example:9000");
        assert_eq!(config.server.timeout_seconds, 10);
        assert_eq!(config.sync.not_found, NotFoundPolicy::Reconnect);
        assert_eq!(config.sync.interval_ms, 1000);
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");

        let mut config = ViewerConfig::default();
        config.server.base_url = "http://10.0.0.2:8080".into();
        config.sync.watermark_margin_secs = 0;
        config.output.snapshot_path = Some(PathBuf::from("/tmp/canvas.png"));
        config.save_to_file(&path).expect("save");

        let loaded = ViewerConfig::from_file(&path).expect("load");
        assert_eq!(loaded.server.base_url, "http://10.0.0.2:8080");
        assert_eq!(loaded.sync.watermark_margin_secs, 0);
        assert_eq!(
            loaded.output.snapshot_path,
            Some(PathBuf::from("/tmp/canvas.png"))
        );
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = ViewerConfig::from_file(std::path::Path::new("/nonexistent/viewer.toml"));
        assert!(matches!(result, Err(ViewerError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");

        let result = ViewerConfig::from_file(&path);
        assert!(matches!(result, Err(ViewerError::Config(_))));
    }

    #[test]
    fn probe_faster_than_sync_rejected() {
        let mut config = ViewerConfig::default();
        config.sync.probe_interval_ms = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = ViewerConfig::default();
        config.sync.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_pixels_rejected() {
        let mut config = ViewerConfig::default();
        config.sync.max_pixels = 0;
        assert!(matches!(config.validate(), Err(ViewerError::Config(_))));
    }

    #[test]
    fn bad_server_url_rejected() {
        let mut config = ViewerConfig::default();
        config.server.base_url = "gopher://old".into();
        assert!(matches!(config.validate(), Err(ViewerError::Config(_))));
    }

    #[test]
    fn default_config_path_ends_with_viewer_toml() {
        let path = ViewerConfig::default_config_path();
        assert!(path.to_string_lossy().ends_with("viewer.toml"));
    }
}
