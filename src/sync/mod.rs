//! Keeping the local surface in step with the server.
//!
//! [`SyncSession`] polls for deltas while connected and falls back to slow
//! probing when the server stops answering.

pub mod clock;
pub mod countdown;
pub mod session;
pub mod snapshot;
pub mod status;
pub mod watermark;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{Countdown, OFFLINE_BANNER};
pub use session::{SyncSession, Transition};
pub use snapshot::SnapshotWriter;
pub use status::{ConnectionStatus, SessionEvent};
pub use watermark::Watermark;
