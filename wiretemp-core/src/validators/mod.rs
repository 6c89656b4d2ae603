//! Reading Validation
//!
//! ## Overview
//!
//! A one-wire probe reports garbage in two recognisable ways: the driver's
//! disconnected-probe sentinel (`-127 °C` for the DS18B20) and physically
//! implausible extremes after a CRC-passing bit error. Both are caught with a
//! single inclusive range check before a reading reaches its window.
//!
//! ## Rejection Policy
//!
//! A rejected reading is counted and dropped. The channel's window keeps its
//! previous contents, so the next publish reports slightly stale data instead
//! of corrupt data.
//!
//! ```rust
//! use wiretemp_core::validators::{accept, OutlierFilter};
//! use wiretemp_core::Diagnostics;
//!
//! assert!(accept(21.5, -55.0, 125.0));
//! assert!(!accept(-127.0, -55.0, 125.0));
//!
//! let filter = OutlierFilter::new(-55.0, 125.0);
//! let mut diagnostics = Diagnostics::default();
//! assert!(!filter.admit(-127.0, &mut diagnostics));
//! assert_eq!(diagnostics.invalid_readings, 1);
//! ```

mod range;
mod utils;

pub use range::OutlierFilter;
pub use utils::{accept, check_range};
