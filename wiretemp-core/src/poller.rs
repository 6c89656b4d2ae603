//! Sensor poller
//!
//! Once per poll interval: ask the bus for one conversion, read every
//! configured channel, and route each reading through the outlier filter into
//! its window.
//!
//! ```text
//! request_conversion ──▶ read_channel(i) ──▶ OutlierFilter ──▶ SampleWindow
//!                              │                   │
//!                         WouldBlock          rejected → invalid_readings++
//!                         (skip channel)      window untouched
//! ```

use crate::channel::SensorChannel;
use crate::diagnostics::Diagnostics;
use crate::errors::TelemetryError;
use crate::time::{IntervalTimer, Millis, Timestamp};
use crate::traits::OneWireBus;
use crate::units::Reading;
use crate::validators::OutlierFilter;

/// Outcome of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Readings stored in a window
    pub accepted: usize,
    /// Readings rejected by the filter or failed by the bus
    pub rejected: usize,
    /// Channels whose conversion was not ready
    pub pending: usize,
}

/// Time-gated sampler for all channels
#[derive(Debug, Clone)]
pub struct SensorPoller {
    timer: IntervalTimer,
    filter: OutlierFilter,
}

impl SensorPoller {
    pub fn new(interval: Millis, filter: OutlierFilter) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            filter,
        }
    }

    pub fn filter(&self) -> &OutlierFilter {
        &self.filter
    }

    pub fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    /// Poll if the interval has elapsed; returns the summary when it ran
    pub fn poll_if_due<B: OneWireBus>(
        &mut self,
        now: Timestamp,
        bus: &mut B,
        channels: &mut [SensorChannel],
        diagnostics: &mut Diagnostics,
    ) -> Option<PollSummary> {
        if !self.timer.fire(now) {
            return None;
        }
        Some(self.poll(bus, channels, diagnostics))
    }

    /// Sample every channel once, regardless of the timer
    pub fn poll<B: OneWireBus>(
        &mut self,
        bus: &mut B,
        channels: &mut [SensorChannel],
        diagnostics: &mut Diagnostics,
    ) -> PollSummary {
        diagnostics.record_poll();
        let mut summary = PollSummary::default();

        if let Err(e) = bus.request_conversion() {
            log_warn!("one-wire conversion request failed: {:?}", e);
            for _ in channels.iter() {
                diagnostics.record_invalid_reading();
            }
            summary.rejected = channels.len();
            return summary;
        }

        for channel in channels.iter_mut() {
            let celsius = match bus.read_channel(channel.bus_index()) {
                Ok(value) => value,
                Err(nb::Error::WouldBlock) => {
                    log_trace!("{}: conversion pending", channel.id());
                    summary.pending += 1;
                    continue;
                }
                Err(nb::Error::Other(e)) => {
                    let fault = TelemetryError::SensorFault { channel: channel.bus_index() };
                    log_warn!("{}: {} ({:?})", channel.id(), fault, e);
                    diagnostics.record_invalid_reading();
                    summary.rejected += 1;
                    continue;
                }
            };

            if self.filter.admit(celsius, diagnostics) {
                channel.record(celsius);
                let reading = Reading::from_celsius(celsius);
                log_debug!(
                    "{}: {:.2} C / {:.2} F",
                    channel.id(),
                    reading.celsius,
                    reading.fahrenheit
                );
                summary.accepted += 1;
            } else {
                summary.rejected += 1;
            }
        }

        summary
    }
}
