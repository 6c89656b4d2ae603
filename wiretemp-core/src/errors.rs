//! Error Types for the Telemetry Core
//!
//! ## Design Philosophy
//!
//! The agent runs forever on a microcontroller, so none of these errors is
//! fatal. Every variant is recovered locally by the component that produced it
//! and surfaces to the outside world only through diagnostic counters.
//!
//! 1. **Small Size**: variants carry a few scalars at most, so errors can be
//!    returned from the hot path without cost.
//!
//! 2. **No Heap Allocation**: no `String`, only `&'static str` and numbers.
//!
//! 3. **Copy Semantics**: errors are `Copy` and can be logged after being
//!    matched on.
//!
//! ## Error Categories
//!
//! ### Sensor Faults
//! - `OutOfRange`: reading outside the plausible range (includes the
//!   disconnected-probe sentinel)
//! - `InvalidValue`: NaN or infinity from the bus driver
//! - `SensorFault`: the bus driver itself failed for a channel
//!
//! ### Aggregation
//! - `InsufficientData`: a statistic was requested from an empty window
//!
//! ```rust
//! use wiretemp_core::{TelemetryError, validators::check_range};
//!
//! match check_range(-127.0, -55.0, 125.0) {
//!     Err(TelemetryError::OutOfRange { value, .. }) => assert_eq!(value, -127.0),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for core operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Core errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TelemetryError {
    /// Reading outside the configured plausible range
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// The rejected reading
        value: f32,
        /// Inclusive lower bound
        min: f32,
        /// Inclusive upper bound
        max: f32,
    },

    /// Value makes no physical sense (NaN, infinity)
    #[error("Invalid value: not a valid number")]
    InvalidValue,

    /// Not enough samples in a window to compute a statistic
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of samples needed
        required: usize,
        /// Samples currently held
        available: usize,
    },

    /// The bus driver reported a failure for a channel
    #[error("Sensor fault on channel {channel}")]
    SensorFault {
        /// Bus index of the failing channel
        channel: u8,
    },
}

/// Configuration errors, raised once at startup by `AgentConfig::validate`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No channels configured
    #[error("No sensor channels configured")]
    NoChannels,

    /// More channels than the fixed channel table can hold
    #[error("Too many channels: {count} (max {max})")]
    TooManyChannels {
        /// Channels requested
        count: usize,
        /// Compile-time channel limit
        max: usize,
    },

    /// Lower plausible bound above upper bound
    #[error("Plausible range is inverted")]
    InvertedBounds,

    /// An interval of zero would fire on every tick
    #[error("Interval `{name}` must be non-zero")]
    ZeroInterval {
        /// Which interval
        name: &'static str,
    },

    /// A string does not fit its fixed-capacity buffer
    #[error("Field `{field}` is too long")]
    TooLong {
        /// Which field
        field: &'static str,
    },

    /// Topic root is empty or ends with `/`
    #[error("Topic root must be non-empty without a trailing `/`")]
    InvalidTopicRoot,

    /// Two channels share an id or bus index
    #[error("Duplicate channel `{field}`")]
    DuplicateChannel {
        /// `id` or `bus_index`
        field: &'static str,
    },
}

/// Why a broker connection attempt failed
///
/// Mirrors the MQTT client state codes: negative values are client-side
/// failures, positive values are CONNACK return codes from the broker.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    #[error("connection timeout")]
    ConnectionTimeout,
    #[error("connection lost")]
    ConnectionLost,
    #[error("connect failed")]
    ConnectFailed,
    #[error("disconnected")]
    Disconnected,
    #[error("bad protocol")]
    BadProtocol,
    #[error("bad client id")]
    BadClientId,
    #[error("server unavailable")]
    Unavailable,
    #[error("bad credentials")]
    BadCredentials,
    #[error("unauthorized")]
    Unauthorized,
}

impl ConnectError {
    /// Numeric client state code
    pub const fn code(&self) -> i8 {
        match self {
            Self::ConnectionTimeout => -4,
            Self::ConnectionLost => -3,
            Self::ConnectFailed => -2,
            Self::Disconnected => -1,
            Self::BadProtocol => 1,
            Self::BadClientId => 2,
            Self::Unavailable => 3,
            Self::BadCredentials => 4,
            Self::Unauthorized => 5,
        }
    }

    /// Map a client state code back to an error; `0` (connected) maps to `None`
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -4 => Some(Self::ConnectionTimeout),
            -3 => Some(Self::ConnectionLost),
            -2 => Some(Self::ConnectFailed),
            -1 => Some(Self::Disconnected),
            1 => Some(Self::BadProtocol),
            2 => Some(Self::BadClientId),
            3 => Some(Self::Unavailable),
            4 => Some(Self::BadCredentials),
            5 => Some(Self::Unauthorized),
            _ => None,
        }
    }
}

/// Why a single publish or subscribe was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No broker session
    #[error("not connected")]
    NotConnected,
    /// Client-side queue full or request rejected
    #[error("request rejected by client")]
    Rejected,
    /// Topic or payload exceeds the client's limits
    #[error("message too large")]
    TooLarge,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TelemetryError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange { value, min, max } =>
                defmt::write!(fmt, "Value {} outside [{}, {}]", value, min, max),
            Self::InvalidValue =>
                defmt::write!(fmt, "Invalid value"),
            Self::InsufficientData { required, available } =>
                defmt::write!(fmt, "Need {} samples, have {}", required, available),
            Self::SensorFault { channel } =>
                defmt::write!(fmt, "Sensor fault on channel {}", channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_small() {
        assert!(core::mem::size_of::<TelemetryError>() <= 16);
    }

    #[test]
    fn connect_codes_round_trip() {
        for code in [-4i8, -3, -2, -1, 1, 2, 3, 4, 5] {
            let err = ConnectError::from_code(code).unwrap();
            assert_eq!(err.code(), code);
        }
        assert_eq!(ConnectError::from_code(0), None);
        assert_eq!(ConnectError::from_code(-5), None);
    }
}
