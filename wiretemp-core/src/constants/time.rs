//! Scheduler Intervals
//!
//! All intervals are in milliseconds and compared against wrapping `u32`
//! timestamps (see `crate::time`).

/// Time between telemetry publishes.
pub const DEFAULT_PUBLISH_INTERVAL_MS: u32 = 20_000;

/// Minimum delay between broker connection attempts.
///
/// Long enough that an unreachable broker is not hammered, short enough that
/// a broker restart is picked up within a publish interval.
pub const DEFAULT_COOLDOWN_INTERVAL_MS: u32 = 5_000;

/// Time between local diagnostic prints.
pub const DEFAULT_PRINT_INTERVAL_MS: u32 = 5_000;

/// Time between sensor polls.
///
/// Four polls per publish interval fill a three-sample window with fresh
/// readings before every publish.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 5_000;

/// Host loop yield between ticks.
pub const HOST_TICK_SLEEP_MS: u32 = 10;
