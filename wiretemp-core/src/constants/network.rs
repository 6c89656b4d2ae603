//! Broker, Topic and Link Defaults

/// MQTT broker host name or address.
pub const DEFAULT_BROKER_ADDRESS: &str = "TheOcho";

/// MQTT broker port.
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Client id, also used as the device host name.
pub const DEFAULT_CLIENT_ID: &str = "wt32eth01-ds18b20";

/// Topic root shared by every published value.
pub const DEFAULT_TOPIC_ROOT: &str = "furnaceRoom/wt32eth01";

// ===== TOPIC SUFFIXES =====

pub const TOPIC_COMMANDS: &str = "commands";
pub const TOPIC_PUBLISH_COUNT: &str = "publishCount";
pub const TOPIC_NETWORK_CALLBACK_COUNT: &str = "networkCallbackCount";
pub const TOPIC_MQTT_CALLBACK_COUNT: &str = "mqttCallbackCount";
pub const TOPIC_MAC: &str = "mac";
pub const TOPIC_IP: &str = "ip";
pub const TOPIC_TEMP_C: &str = "tempC";
pub const TOPIC_TEMP_F: &str = "tempF";

// ===== LINK DESCRIPTOR PLACEHOLDERS =====

/// Reported until the link driver supplies the real hardware address.
pub const PLACEHOLDER_MAC: [u8; 6] = [0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22];

/// Reported until an address is assigned.
pub const PLACEHOLDER_IP: [u8; 4] = [127, 0, 0, 1];

/// Marks a link speed that has not been negotiated yet.
pub const PLACEHOLDER_LINK_SPEED_MBPS: u8 = 42;
