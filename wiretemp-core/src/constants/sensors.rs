//! One-Wire Temperature Sensor Characteristics
//!
//! Values for the DS18B20 family, the probe the agent was built around.

/// Lowest temperature the DS18B20 can report (°C).
///
/// Source: Maxim DS18B20 datasheet, operating range
pub const DS18B20_MIN_C: f32 = -55.0;

/// Highest temperature the DS18B20 can report (°C).
///
/// Source: Maxim DS18B20 datasheet, operating range
pub const DS18B20_MAX_C: f32 = 125.0;

/// Value returned by the bus driver when a probe does not answer (°C).
///
/// Deliberately far below `DS18B20_MIN_C` so the default plausible range
/// rejects it.
pub const DS18B20_DISCONNECTED_C: f32 = -127.0;

/// Number of probes on the reference board.
pub const DEFAULT_CHANNEL_COUNT: usize = 6;

/// Prefix used to name channels by bus index (`ds18b20-00`, `ds18b20-01`, ...).
pub const DEFAULT_CHANNEL_PREFIX: &str = "ds18b20-";

const _: () = assert!(DS18B20_DISCONNECTED_C < DS18B20_MIN_C);
const _: () = assert!(DS18B20_MIN_C < DS18B20_MAX_C);
