//! Simulated one-wire bus
//!
//! Deterministic stand-in for a DS18B20 string so the agent can run on a
//! host. Each probe reports a slow triangle wave around its own base
//! temperature; a probe can be marked as unplugged, in which case it reports
//! the `-127 °C` sentinel like real hardware does.

use thiserror::Error;
use wiretemp_core::constants::DS18B20_DISCONNECTED_C;
use wiretemp_core::OneWireBus;

/// Base temperature of probe 0 (°C)
const BASE_CELSIUS: f32 = 20.0;

/// Offset between neighbouring probes (°C)
const PROBE_SPACING_CELSIUS: f32 = 7.5;

/// Peak deviation of the triangle wave (°C)
const SWING_CELSIUS: f32 = 2.0;

/// Conversions per half period of the triangle wave
const HALF_PERIOD: u32 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("no device at bus index {0}")]
    NoDevice(u8),
}

/// Synthetic bus with a fixed number of probes
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    devices: u8,
    unplugged: Option<u8>,
    conversions: u32,
}

impl SimulatedBus {
    pub fn new(devices: u8) -> Self {
        Self {
            devices,
            unplugged: None,
            conversions: 0,
        }
    }

    /// Make probe `index` report the disconnected sentinel
    pub fn with_unplugged(mut self, index: u8) -> Self {
        self.unplugged = Some(index);
        self
    }

    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    fn sample(&self, index: u8) -> f32 {
        let phase = self.conversions % (2 * HALF_PERIOD);
        let ramp = if phase < HALF_PERIOD { phase } else { 2 * HALF_PERIOD - phase };
        let swing = SWING_CELSIUS * (2.0 * ramp as f32 / HALF_PERIOD as f32 - 1.0);
        BASE_CELSIUS + PROBE_SPACING_CELSIUS * index as f32 + swing
    }
}

impl OneWireBus for SimulatedBus {
    type Error = BusError;

    fn request_conversion(&mut self) -> Result<(), BusError> {
        self.conversions = self.conversions.wrapping_add(1);
        Ok(())
    }

    fn read_channel(&mut self, index: u8) -> nb::Result<f32, BusError> {
        if index >= self.devices {
            return Err(nb::Error::Other(BusError::NoDevice(index)));
        }
        if self.unplugged == Some(index) {
            return Ok(DS18B20_DISCONNECTED_C);
        }
        Ok(self.sample(index))
    }
}
