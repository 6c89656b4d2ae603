//! Fixed Capacities
//!
//! Every collection in the core is sized at compile time so the agent never
//! allocates after startup.

/// Readings kept per channel.
///
/// Three samples smooth a single noisy conversion without delaying a step
/// change by more than two poll intervals.
pub const WINDOW_CAPACITY: usize = 3;

/// Maximum channels on one bus.
pub const MAX_CHANNELS: usize = 8;

/// Maximum pending link/transport events between two ticks.
///
/// A tick drains the queue completely, so this only needs to absorb a burst
/// of link flaps plus a few inbound messages.
pub const EVENT_QUEUE_CAPACITY: usize = 16;

/// Maximum length of a channel id such as `ds18b20-00`.
pub const MAX_SENSOR_ID_LENGTH: usize = 23;

/// Maximum length of a full topic.
pub const MAX_TOPIC_LENGTH: usize = 96;

/// Maximum length of a topic root.
pub const MAX_TOPIC_ROOT_LENGTH: usize = 64;

/// Maximum length of a broker host name.
pub const MAX_HOST_LENGTH: usize = 64;

/// Maximum length of a client id.
pub const MAX_CLIENT_ID_LENGTH: usize = 32;

/// Maximum inbound payload kept in an event.
pub const MAX_INBOUND_PAYLOAD: usize = 64;

/// Formatted value buffer (`-12345.67`, a MAC address, an IPv4 address).
pub const VALUE_BUFFER_SIZE: usize = 24;
