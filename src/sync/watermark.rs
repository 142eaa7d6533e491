//! Delta cursor bookkeeping.

/// "Seconds since epoch of the last applied state", plus the safety margin
/// subtracted on every request.
///
/// Advances never move it backwards; only [`reset`](Self::reset) (after a
/// full resync) may.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    secs: i64,
    margin: i64,
}

impl Watermark {
    /// Start at `now` with the given margin (negative margins clamp to 0).
    pub fn new(now: i64, margin: i64) -> Self {
        Self {
            secs: now,
            margin: margin.max(0),
        }
    }

    /// Last applied time.
    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Timestamp to send on the next delta request.
    pub fn cursor(&self) -> i64 {
        self.secs.saturating_sub(self.margin).max(0)
    }

    /// Move forward to `now`; earlier readings are ignored.
    pub fn advance_to(&mut self, now: i64) {
        self.secs = self.secs.max(now);
    }

    /// Jump to `now` unconditionally after a full resync.
    pub fn reset(&mut self, now: i64) {
        self.secs = now;
    }
}
