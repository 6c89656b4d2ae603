//! Host agent: simulated probes published to a real MQTT broker.
//!
//! ```text
//! wiretemp-agent [config.json]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`). The diagnostic print
//! shows up at `info` every few seconds.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use wiretemp_connectors::{load_config, HostLink, LogIndicator, MqttTransport, SimulatedBus};
use wiretemp_core::constants::time::HOST_TICK_SLEEP_MS;
use wiretemp_core::time::SystemClock;
use wiretemp_core::{Agent, VERSION};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(path.as_deref()).context("loading configuration")?;

    info!(
        "wiretemp-agent {} -> {}:{} as {}, root {}",
        VERSION,
        config.broker.address,
        config.broker.port,
        config.broker.client_id,
        config.topic_root
    );

    let devices = config
        .channels
        .iter()
        .map(|c| c.bus_index.saturating_add(1))
        .max()
        .unwrap_or(0);
    let bus = SimulatedBus::new(devices);
    let link = HostLink::detect(&config.broker.address, config.broker.port);

    let mut agent = Agent::new(&config, bus, MqttTransport::new(), link)
        .context("building agent")?
        .with_indicator(LogIndicator::new());

    let clock = SystemClock::new();
    let pause = Duration::from_millis(u64::from(HOST_TICK_SLEEP_MS));
    loop {
        agent.tick_with(&clock);
        thread::sleep(pause);
    }
}
