//! Diagnostic Counters
//!
//! Process-wide counts that make failures observable from the broker side:
//! a counter that stops advancing points at the subsystem that is stuck.
//! Counters only ever increase (wrapping at 32 bits) and reset only on restart.

/// Counters owned by the agent and bumped by each component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Completed publish cycles
    pub publish_count: u32,
    /// Broker connection attempts
    pub connect_attempts: u32,
    /// Link driver events handled
    pub network_callbacks: u32,
    /// Inbound transport messages handled
    pub transport_callbacks: u32,
    /// Readings rejected by the outlier filter or failed by the bus
    pub invalid_readings: u32,
    /// Sensor poll cycles
    pub poll_count: u32,
    /// Local diagnostic prints
    pub print_count: u32,
    /// Events lost to a full event queue
    pub dropped_events: u32,
    /// Individual publishes the transport refused
    pub failed_sends: u32,
}

impl Diagnostics {
    pub fn record_publish(&mut self) {
        self.publish_count = self.publish_count.wrapping_add(1);
    }

    pub fn record_connect_attempt(&mut self) {
        self.connect_attempts = self.connect_attempts.wrapping_add(1);
    }

    pub fn record_network_callback(&mut self) {
        self.network_callbacks = self.network_callbacks.wrapping_add(1);
    }

    pub fn record_transport_callback(&mut self) {
        self.transport_callbacks = self.transport_callbacks.wrapping_add(1);
    }

    pub fn record_invalid_reading(&mut self) {
        self.invalid_readings = self.invalid_readings.wrapping_add(1);
    }

    pub fn record_poll(&mut self) {
        self.poll_count = self.poll_count.wrapping_add(1);
    }

    pub fn record_print(&mut self) {
        self.print_count = self.print_count.wrapping_add(1);
    }

    pub fn record_failed_send(&mut self) {
        self.failed_sends = self.failed_sends.wrapping_add(1);
    }
}
