//! Range checks shared by the filter and config validation
//!
//! Pure functions with no side effects, safe to call from anywhere.

use crate::errors::{TelemetryError, TelemetryResult};

/// Check that `value` is finite and inside `[min, max]`
pub fn check_range(value: f32, min: f32, max: f32) -> TelemetryResult<()> {
    if !value.is_finite() {
        return Err(TelemetryError::InvalidValue);
    }

    if value < min || value > max {
        Err(TelemetryError::OutOfRange { value, min, max })
    } else {
        Ok(())
    }
}

/// True when `value` lies inside the inclusive plausible range
pub fn accept(value: f32, low: f32, high: f32) -> bool {
    check_range(value, low, high).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check() {
        assert!(check_range(5.0, 0.0, 10.0).is_ok());
        assert!(check_range(-1.0, 0.0, 10.0).is_err());
        assert!(check_range(11.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(accept(-55.0, -55.0, 125.0));
        assert!(accept(125.0, -55.0, 125.0));
        assert!(!accept(125.01, -55.0, 125.0));
        assert!(!accept(-55.01, -55.0, 125.0));
    }

    #[test]
    fn non_finite_rejected() {
        assert_eq!(check_range(f32::NAN, 0.0, 10.0), Err(TelemetryError::InvalidValue));
        assert!(!accept(f32::INFINITY, f32::MIN, f32::MAX));
    }
}
