//! Temperature unit projections
//!
//! Every channel stores Celsius only; Fahrenheit is a projection computed when
//! a value leaves the agent, so the two published topics can never disagree.

/// Convert Celsius to Fahrenheit
///
/// ```rust
/// use wiretemp_core::units::celsius_to_fahrenheit;
/// assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
/// assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
/// ```
#[inline]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// One reading in both unit projections
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub celsius: f32,
    pub fahrenheit: f32,
}

impl Reading {
    pub fn from_celsius(celsius: f32) -> Self {
        Self {
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_and_boiling() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
    }

    #[test]
    fn crossover_point() {
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn reading_pairs_units() {
        let r = Reading::from_celsius(37.0);
        assert!((r.fahrenheit - 98.6).abs() < 1e-4);
    }
}
