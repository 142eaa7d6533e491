//! Wire types for the canvas service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canvas dimensions as reported by `GET /canvas/size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub x: u32,
    /// Height in pixels.
    pub y: u32,
}

impl CanvasSize {
    /// Total number of pixels. Cannot overflow for any pair of `u32`s.
    pub fn area(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y)
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// A single changed pixel, sent on the wire as `[x, y, "rrggbb"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32, String)", into = "(u32, u32, String)")]
pub struct PixelUpdate {
    /// Column, `0 <= x < width`.
    pub x: u32,
    /// Row, `0 <= y < height`.
    pub y: u32,
    /// Hex color, `rrggbb` or `#rrggbb`.
    pub color: String,
}

impl PixelUpdate {
    /// Convenience constructor.
    pub fn new(x: u32, y: u32, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color: color.into(),
        }
    }
}

impl From<(u32, u32, String)> for PixelUpdate {
    fn from((x, y, color): (u32, u32, String)) -> Self {
        Self { x, y, color }
    }
}

impl From<PixelUpdate> for (u32, u32, String) {
    fn from(p: PixelUpdate) -> Self {
        (p.x, p.y, p.color)
    }
}

/// Classified result of a `GET /canvas/since` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Zero or more pixels changed at or after the requested timestamp.
    Deltas(Vec<PixelUpdate>),
    /// The server redirected to the full-image endpoint; the requested
    /// timestamp predates its history and the caller must refetch everything.
    Rebaseline,
    /// The server answered 404 for the requested timestamp.
    NotFound,
    /// No response was received at all.
    NetworkFailure(String),
}

impl FetchOutcome {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deltas(_) => "deltas",
            Self::Rebaseline => "rebaseline",
            Self::NotFound => "not_found",
            Self::NetworkFailure(_) => "network_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_update_from_json_triple() {
        let updates: Vec<PixelUpdate> =
            serde_json::from_str(r##"[[0, 0, "ff0000"], [1, 1, "#00ff00"]]"##)
                .expect("valid json");
        assert_eq!(
            updates,
            vec![
                PixelUpdate::new(0, 0, "ff0000"),
                PixelUpdate::new(1, 1, "#00ff00"),
            ]
        );
    }

    #[test]
    fn pixel_update_serializes_as_triple() {
        let json = serde_json::to_string(&PixelUpdate::new(3, 4, "abcdef")).unwrap_or_default();
        assert_eq!(json, r#"[3,4,"abcdef"]"#);
    }

    #[test]
    fn pixel_update_rejects_negative_coordinates() {
        let result: Result<Vec<PixelUpdate>, _> = serde_json::from_str(r#"[[-1, 0, "ffffff"]]"#);
        assert!(result.is_err());
    }

    #[test]
    fn pixel_update_rejects_short_triple() {
        let result: Result<Vec<PixelUpdate>, _> = serde_json::from_str(r#"[[1, 2]]"#);
        assert!(result.is_err());
    }

    #[test]
    fn canvas_size_from_json() {
        let size: CanvasSize = serde_json::from_str(r#"{"x": 640, "y": 480}"#).expect("valid");
        assert_eq!(size, CanvasSize { x: 640, y: 480 });
        assert_eq!(size.area(), 640 * 480);
        assert_eq!(size.to_string(), "640x480");
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(FetchOutcome::Deltas(vec![]).label(), "deltas");
        assert_eq!(FetchOutcome::Rebaseline.label(), "rebaseline");
        assert_eq!(FetchOutcome::NotFound.label(), "not_found");
        assert_eq!(
            FetchOutcome::NetworkFailure("refused".into()).label(),
            "network_failure"
        );
    }
}
