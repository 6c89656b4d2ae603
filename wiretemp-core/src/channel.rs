//! Sensor channels
//!
//! One `SensorChannel` per probe on the bus. Channels are created once from
//! the configured channel list and live for the whole process; only the
//! poller writes to them.

use core::fmt::Write;

use heapless::String;

use crate::buffer::{Aggregate, SampleWindow};
use crate::constants::buffers::{MAX_SENSOR_ID_LENGTH, WINDOW_CAPACITY};
use crate::errors::{ConfigError, TelemetryResult};
use crate::units::Reading;

/// Channel identifier, also the middle segment of its topics
pub type ChannelId = String<MAX_SENSOR_ID_LENGTH>;

/// One physical probe and its rolling window
#[derive(Debug, Clone)]
pub struct SensorChannel {
    id: ChannelId,
    bus_index: u8,
    window: SampleWindow<WINDOW_CAPACITY>,
}

impl SensorChannel {
    /// Create a channel with an empty window
    pub fn new(id: &str, bus_index: u8) -> Result<Self, ConfigError> {
        let id = ChannelId::try_from(id).map_err(|_| ConfigError::TooLong { field: "channel id" })?;
        Ok(Self {
            id,
            bus_index,
            window: SampleWindow::new(),
        })
    }

    /// Create a channel named after its bus index, e.g. `ds18b20-03`
    pub fn numbered(prefix: &str, bus_index: u8) -> Result<Self, ConfigError> {
        let mut id = ChannelId::new();
        write!(id, "{}{:02}", prefix, bus_index).map_err(|_| ConfigError::TooLong { field: "channel id" })?;
        Ok(Self {
            id,
            bus_index,
            window: SampleWindow::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bus_index(&self) -> u8 {
        self.bus_index
    }

    pub fn window(&self) -> &SampleWindow<WINDOW_CAPACITY> {
        &self.window
    }

    /// Store an already-validated Celsius reading
    pub fn record(&mut self, celsius: f32) {
        self.window.insert(celsius);
    }

    /// Selected statistic of the window, in both units
    pub fn aggregate(&self, which: Aggregate) -> TelemetryResult<Reading> {
        self.window.aggregate(which).map(Reading::from_celsius)
    }
}
