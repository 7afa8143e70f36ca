//! Countdown timers measured against the scene's tick counter

use serde::{Deserialize, Serialize};

/// A window of `duration` ticks opened at some tick; idle until started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickTimer {
    started: Option<u64>,
    duration: u64,
}

impl TickTimer {
    pub const fn new(duration: u64) -> Self {
        Self {
            started: None,
            duration,
        }
    }

    pub fn start(&mut self, now: u64) {
        self.started = Some(now);
    }

    /// True from the start tick until `duration` ticks have elapsed
    pub fn is_running(&self, now: u64) -> bool {
        match self.started {
            Some(start) => now.saturating_sub(start) < self.duration,
            None => false,
        }
    }
}
