//! Core telemetry loop for one-wire temperature agents
//!
//! Samples a string of DS18B20-class probes, keeps a short rolling window per
//! probe, and publishes the aggregate in °C and °F plus a few diagnostic
//! counters to a pub/sub broker. Link and broker outages are survived with a
//! fixed-cooldown reconnect.
//!
//! Key constraints:
//! - Runs on a microcontroller with a few tens of KB of RAM
//! - No heap allocation: fixed windows, `heapless` strings and queues
//! - One cooperative loop, never blocking on I/O
//!
//! Hardware and network access go through the traits in [`traits`]; the
//! `wiretemp-connectors` crate provides host implementations.
//!
//! ```rust
//! use wiretemp_core::{SampleWindow, units::celsius_to_fahrenheit};
//!
//! let mut window: SampleWindow<3> = SampleWindow::new();
//! for reading in [-21.12, 21.12, 88.88] {
//!     window.insert(reading);
//! }
//! let average = window.average().unwrap();
//! assert!((average - 29.626_667).abs() < 1e-4);
//! assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod agent;
pub mod buffer;
pub mod channel;
pub mod config;
pub mod connection;
pub mod constants;
pub mod diagnostics;
pub mod errors;
pub mod events;
pub mod poller;
pub mod publisher;
pub mod queue;
pub mod time;
pub mod traits;
pub mod units;
pub mod validators;

// Public API
pub use agent::{Agent, TickReport};
pub use buffer::{Aggregate, SampleWindow};
pub use channel::SensorChannel;
pub use config::{AgentConfig, BrokerConfig, ChannelConfig, Intervals};
pub use connection::{ConnectionManager, ConnectionState};
pub use diagnostics::Diagnostics;
pub use errors::{ConfigError, ConnectError, TelemetryError, TelemetryResult, TransportError};
pub use events::{AgentEvent, InboundMessage, LinkEvent, LinkInfo};
pub use traits::{LinkDriver, OneWireBus, StatusIndicator, TransportClient};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
