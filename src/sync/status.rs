//! Connection status and session events.

use serde::Serialize;

use crate::canvas::ApplyReport;

/// Connectivity state of a sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Polling deltas at the sync period.
    Connected,
    /// Server unreachable; probing at the slower period.
    Reconnecting {
        /// Failed probes so far in this outage.
        attempt: u32,
    },
}

impl ConnectionStatus {
    /// Returns `true` while the fast sync loop is active.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Reconnecting { attempt } => write!(f, "Reconnecting (attempt {attempt})"),
        }
    }
}

/// Something an observer of the session may want to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The raster was replaced by a full image.
    Resynced {
        /// Watermark after the resync.
        watermark: i64,
    },
    /// Deltas were applied.
    Patched {
        /// Updates written.
        applied: usize,
        /// Updates skipped.
        skipped: usize,
    },
    /// Connectivity changed.
    StatusChanged {
        /// New status.
        status: ConnectionStatus,
    },
    /// Show the offline banner.
    Offline {
        /// Banner text.
        banner: String,
    },
    /// Hide the offline banner.
    Online,
    /// The cosmetic retry countdown moved.
    Countdown {
        /// Seconds shown.
        remaining: u32,
        /// Banner text for this value.
        banner: String,
    },
}

impl From<ApplyReport> for SessionEvent {
    fn from(report: ApplyReport) -> Self {
        Self::Patched {
            applied: report.applied,
            skipped: report.skipped,
        }
    }
}
