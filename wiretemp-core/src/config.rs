//! Agent configuration
//!
//! Everything the agent needs is fixed when it starts: broker, topic root,
//! plausible range, intervals, statistic and channel list. There is no runtime
//! reload. `Default` reproduces the reference board (six DS18B20 probes on one
//! bus, publishing to `furnaceRoom/wt32eth01`).
//!
//! With the `serde` feature the whole struct deserializes (e.g. from JSON) with
//! every field optional:
//!
//! ```rust
//! use wiretemp_core::AgentConfig;
//!
//! let config = AgentConfig::default()
//!     .with_broker("mqtt.local", 1883).unwrap()
//!     .with_plausible_range(-10.0, 90.0);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.channels.len(), 6);
//! ```

use core::fmt::Write;

use heapless::{String, Vec};

use crate::buffer::Aggregate;
use crate::constants::buffers::{
    MAX_CHANNELS, MAX_CLIENT_ID_LENGTH, MAX_HOST_LENGTH, MAX_SENSOR_ID_LENGTH,
    MAX_TOPIC_ROOT_LENGTH,
};
use crate::constants::network::{
    DEFAULT_BROKER_ADDRESS, DEFAULT_BROKER_PORT, DEFAULT_CLIENT_ID, DEFAULT_TOPIC_ROOT,
};
use crate::constants::sensors::{
    DEFAULT_CHANNEL_COUNT, DEFAULT_CHANNEL_PREFIX, DS18B20_MAX_C, DS18B20_MIN_C,
};
use crate::constants::time::{
    DEFAULT_COOLDOWN_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PRINT_INTERVAL_MS,
    DEFAULT_PUBLISH_INTERVAL_MS,
};
use crate::errors::ConfigError;
use crate::time::Millis;

/// Copy as much of `s` as fits
fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

fn bounded<const N: usize>(s: &str, field: &'static str) -> Result<String<N>, ConfigError> {
    String::try_from(s).map_err(|_| ConfigError::TooLong { field })
}

/// Broker endpoint and identity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrokerConfig {
    /// Host name or IP address
    pub address: String<MAX_HOST_LENGTH>,
    pub port: u16,
    /// MQTT client id, also the device host name
    pub client_id: String<MAX_CLIENT_ID_LENGTH>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: truncated(DEFAULT_BROKER_ADDRESS),
            port: DEFAULT_BROKER_PORT,
            client_id: truncated(DEFAULT_CLIENT_ID),
        }
    }
}

/// Periods of the time-gated actions, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Intervals {
    pub poll_ms: Millis,
    pub publish_ms: Millis,
    pub cooldown_ms: Millis,
    pub print_ms: Millis,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            poll_ms: DEFAULT_POLL_INTERVAL_MS,
            publish_ms: DEFAULT_PUBLISH_INTERVAL_MS,
            cooldown_ms: DEFAULT_COOLDOWN_INTERVAL_MS,
            print_ms: DEFAULT_PRINT_INTERVAL_MS,
        }
    }
}

/// One probe on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelConfig {
    /// Topic segment, e.g. `ds18b20-00`
    pub id: String<MAX_SENSOR_ID_LENGTH>,
    /// Device index on the one-wire bus
    pub bus_index: u8,
}

impl ChannelConfig {
    pub fn new(id: &str, bus_index: u8) -> Result<Self, ConfigError> {
        Ok(Self {
            id: bounded(id, "channel id")?,
            bus_index,
        })
    }

    fn numbered(bus_index: u8) -> Self {
        let mut id = String::new();
        let _ = write!(id, "{}{:02}", DEFAULT_CHANNEL_PREFIX, bus_index);
        Self { id, bus_index }
    }
}

/// Complete agent configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    pub broker: BrokerConfig,
    /// Prefix of every topic, without a trailing slash
    pub topic_root: String<MAX_TOPIC_ROOT_LENGTH>,
    /// Inclusive lower plausible bound (°C)
    pub plausible_min_c: f32,
    /// Inclusive upper plausible bound (°C)
    pub plausible_max_c: f32,
    pub intervals: Intervals,
    /// Statistic published on the tempC/tempF topics
    pub aggregate: Aggregate,
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
    /// Pin level that lights the status indicator; boards wired to sink the
    /// LED current want `false`
    pub indicator_active_high: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        for index in 0..DEFAULT_CHANNEL_COUNT as u8 {
            let _ = channels.push(ChannelConfig::numbered(index));
        }

        Self {
            broker: BrokerConfig::default(),
            topic_root: truncated(DEFAULT_TOPIC_ROOT),
            plausible_min_c: DS18B20_MIN_C,
            plausible_max_c: DS18B20_MAX_C,
            intervals: Intervals::default(),
            aggregate: Aggregate::Average,
            channels,
            indicator_active_high: true,
        }
    }
}

impl AgentConfig {
    pub fn with_broker(mut self, address: &str, port: u16) -> Result<Self, ConfigError> {
        self.broker.address = bounded(address, "broker address")?;
        self.broker.port = port;
        Ok(self)
    }

    pub fn with_client_id(mut self, client_id: &str) -> Result<Self, ConfigError> {
        self.broker.client_id = bounded(client_id, "client id")?;
        Ok(self)
    }

    pub fn with_topic_root(mut self, root: &str) -> Result<Self, ConfigError> {
        self.topic_root = bounded(root.trim_end_matches('/'), "topic root")?;
        Ok(self)
    }

    pub fn with_plausible_range(mut self, min_c: f32, max_c: f32) -> Self {
        self.plausible_min_c = min_c;
        self.plausible_max_c = max_c;
        self
    }

    pub fn with_intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_indicator_active_high(mut self, active_high: bool) -> Self {
        self.indicator_active_high = active_high;
        self
    }

    /// Replace the channel list
    pub fn with_channels(mut self, channels: &[ChannelConfig]) -> Result<Self, ConfigError> {
        self.channels = Vec::from_slice(channels).map_err(|_| ConfigError::TooManyChannels {
            count: channels.len(),
            max: MAX_CHANNELS,
        })?;
        Ok(self)
    }

    /// Check the invariants the agent relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        let root = self.topic_root.as_str();
        if root.is_empty() || root.ends_with('/') {
            return Err(ConfigError::InvalidTopicRoot);
        }

        if !(self.plausible_min_c <= self.plausible_max_c) {
            return Err(ConfigError::InvertedBounds);
        }

        let intervals = [
            ("poll_ms", self.intervals.poll_ms),
            ("publish_ms", self.intervals.publish_ms),
            ("cooldown_ms", self.intervals.cooldown_ms),
            ("print_ms", self.intervals.print_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }

        for (i, a) in self.channels.iter().enumerate() {
            for b in &self.channels[i + 1..] {
                if a.id == b.id {
                    return Err(ConfigError::DuplicateChannel { field: "id" });
                }
                if a.bus_index == b.bus_index {
                    return Err(ConfigError::DuplicateChannel { field: "bus_index" });
                }
            }
        }

        Ok(())
    }
}
