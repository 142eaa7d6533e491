//! Offline banner text and its cosmetic retry countdown.
//!
//! The countdown is display only. It is not tied to probe timing: it counts
//! down once per second, wraps back to the start after showing 0, and is
//! reset whenever a probe is issued.

/// Banner shown while the server is unreachable.
pub const OFFLINE_BANNER: &str = "You're not connected!";

/// Wrapping one-second countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    from: u32,
    remaining: u32,
}

impl Countdown {
    /// Start counting down from `from`.
    pub fn new(from: u32) -> Self {
        Self {
            from,
            remaining: from,
        }
    }

    /// Value currently shown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Restart from the initial value.
    pub fn reset(&mut self) {
        self.remaining = self.from;
    }

    /// Advance one second and return the new value.
    pub fn tick(&mut self) -> u32 {
        self.remaining = match self.remaining {
            0 => self.from,
            n => n - 1,
        };
        self.remaining
    }

    /// Banner text for the current value.
    pub fn banner(&self) -> String {
        if self.remaining == 0 {
            format!("{OFFLINE_BANNER} Retrying...")
        } else {
            format!("{OFFLINE_BANNER} Retrying in {}...", self.remaining)
        }
    }
}
