//! Host stand-in for the activity LED
//!
//! There is no pin to drive on a host, so level changes go to the log at
//! `debug` and are counted.

use wiretemp_core::StatusIndicator;

/// Status indicator that logs its pin level
#[derive(Debug, Clone, Default)]
pub struct LogIndicator {
    level: Option<bool>,
    changes: u32,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last level driven, `None` before the first call
    pub fn level(&self) -> Option<bool> {
        self.level
    }

    /// Level changes since startup
    pub fn changes(&self) -> u32 {
        self.changes
    }
}

impl StatusIndicator for LogIndicator {
    fn set_level(&mut self, high: bool) {
        if self.level != Some(high) {
            log::debug!("tx led {}", if high { "high" } else { "low" });
            self.level = Some(high);
            self.changes += 1;
        }
    }
}
