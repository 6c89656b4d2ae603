//! Host Connectors for the wiretemp Agent
//!
//! ## Overview
//!
//! `wiretemp-core` reaches the outside world through traits. This crate implements them for an
//! ordinary Linux/macOS host so the whole agent can run against a real broker
//! without a microcontroller:
//!
//! | Trait             | Host implementation | Backed by                         |
//! |-------------------|---------------------|-----------------------------------|
//! | `TransportClient` | [`MqttTransport`]   | `rumqttc` synchronous client      |
//! | `LinkDriver`      | [`HostLink`]        | OS network stack (always up)      |
//! | `OneWireBus`      | [`SimulatedBus`]    | deterministic synthetic readings  |
//! | `StatusIndicator` | [`LogIndicator`]    | `debug` log lines                 |
//!
//! ## Configuration
//!
//! [`load_config`] reads an `AgentConfig` from JSON. Every field is optional
//! and falls back to the built-in defaults, so `{}` is a valid file:
//!
//! ```json
//! {
//!   "broker": { "address": "mqtt.local", "port": 1883 },
//!   "topic_root": "home/boiler",
//!   "intervals": { "publish_ms": 10000 },
//!   "aggregate": "maximum"
//! }
//! ```
//!
//! ```rust
//! use wiretemp_connectors::parse_config;
//!
//! let config = parse_config(r#"{ "broker": { "address": "mqtt.local" } }"#)?;
//! assert_eq!(config.broker.address.as_str(), "mqtt.local");
//! assert_eq!(config.broker.port, 1883);
//! # Ok::<(), wiretemp_connectors::ConnectorError>(())
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;
use wiretemp_core::{AgentConfig, ConfigError};

pub mod bus;
pub mod indicator;
pub mod link;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types
pub use bus::SimulatedBus;
pub use indicator::LogIndicator;
pub use link::HostLink;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttTransport, TransportStats};

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Parse and validate a JSON configuration
pub fn parse_config(json: &str) -> Result<AgentConfig, ConnectorError> {
    let config: AgentConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration from `path`, or the defaults when there is none
pub fn load_config(path: Option<&Path>) -> Result<AgentConfig, ConnectorError> {
    match path {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            parse_config(&fs::read_to_string(path)?)
        }
        None => {
            log::info!("no configuration file, using defaults");
            let config = AgentConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}
