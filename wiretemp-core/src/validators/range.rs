//! Plausible-range filter for temperature readings
//!
//! Bounds come from `AgentConfig`; nothing here is hard-coded beyond the
//! DS18B20 default used by `Default`.

use crate::{
    constants::sensors::{DS18B20_MAX_C, DS18B20_MIN_C},
    diagnostics::Diagnostics,
    errors::TelemetryResult,
};

use super::utils;

/// Filter admitting Celsius readings inside an inclusive range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutlierFilter {
    low_celsius: f32,
    high_celsius: f32,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            low_celsius: DS18B20_MIN_C,
            high_celsius: DS18B20_MAX_C,
        }
    }
}

impl OutlierFilter {
    /// Create a filter with custom bounds
    ///
    /// Inverted bounds are swapped rather than producing a filter that rejects
    /// everything.
    pub fn new(low: f32, high: f32) -> Self {
        let (low, high) = if low > high { (high, low) } else { (low, high) };
        Self {
            low_celsius: low,
            high_celsius: high,
        }
    }

    pub fn low(&self) -> f32 {
        self.low_celsius
    }

    pub fn high(&self) -> f32 {
        self.high_celsius
    }

    /// Check a reading, returning why it was rejected
    pub fn validate(&self, celsius: f32) -> TelemetryResult<()> {
        utils::check_range(celsius, self.low_celsius, self.high_celsius)
    }

    /// Admit or reject a reading, counting rejections
    pub fn admit(&self, celsius: f32, diagnostics: &mut Diagnostics) -> bool {
        match self.validate(celsius) {
            Ok(()) => true,
            Err(e) => {
                diagnostics.record_invalid_reading();
                log_warn!("rejected reading: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::sensors::DS18B20_DISCONNECTED_C;
    use crate::errors::TelemetryError;

    #[test]
    fn default_accepts_room_temperature() {
        let filter = OutlierFilter::default();
        assert!(filter.validate(22.5).is_ok());
    }

    #[test]
    fn sentinel_rejected_and_counted() {
        let filter = OutlierFilter::default();
        let mut diagnostics = Diagnostics::default();

        assert!(!filter.admit(DS18B20_DISCONNECTED_C, &mut diagnostics));
        assert!(!filter.admit(f32::NAN, &mut diagnostics));
        assert!(filter.admit(20.0, &mut diagnostics));
        assert_eq!(diagnostics.invalid_readings, 2);
    }

    #[test]
    fn inverted_bounds_swapped() {
        let filter = OutlierFilter::new(50.0, -10.0);
        assert_eq!(filter.low(), -10.0);
        assert_eq!(filter.high(), 50.0);
        assert!(matches!(
            filter.validate(60.0),
            Err(TelemetryError::OutOfRange { min, max, .. }) if min == -10.0 && max == 50.0
        ));
    }
}
