//! Constants for the wiretemp Core
//!
//! Centralised defaults for the agent. Every value here is only a default:
//! `AgentConfig` carries the values actually used, so deployments override
//! them at build/config time instead of editing code.
//!
//! ## Organization
//!
//! - **Sensors**: DS18B20 limits and the disconnected-probe sentinel
//! - **Time**: loop intervals
//! - **Buffers**: fixed capacities for windows, queues and strings
//! - **Network**: broker, topic and link-descriptor defaults

/// One-wire temperature sensor characteristics.
pub mod sensors;

/// Scheduler intervals.
pub mod time;

/// Fixed capacities for no-heap storage.
pub mod buffers;

/// Broker, topic and link defaults.
pub mod network;

pub use sensors::{
    DS18B20_DISCONNECTED_C, DS18B20_MAX_C, DS18B20_MIN_C,
};

pub use time::{
    DEFAULT_COOLDOWN_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PRINT_INTERVAL_MS,
    DEFAULT_PUBLISH_INTERVAL_MS, HOST_TICK_SLEEP_MS,
};

pub use buffers::{
    EVENT_QUEUE_CAPACITY, MAX_CHANNELS, MAX_SENSOR_ID_LENGTH, MAX_TOPIC_LENGTH,
    WINDOW_CAPACITY,
};

pub use network::{
    DEFAULT_BROKER_ADDRESS, DEFAULT_BROKER_PORT, DEFAULT_CLIENT_ID, DEFAULT_TOPIC_ROOT,
};
