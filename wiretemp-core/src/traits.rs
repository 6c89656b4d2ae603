//! Collaborator traits
//!
//! The agent never talks to hardware or sockets directly. These are the narrow
//! seams through which it reaches the outside world; the connectors
//! crate and board support code provide the implementations, tests provide
//! mocks. Keep them small - embedded drivers should be able to implement them
//! in a few lines.

use core::fmt::Debug;

use crate::errors::{ConnectError, TransportError};
use crate::events::LinkEvent;
use crate::queue::EventQueue;

/// One-wire temperature bus (e.g. a DS18B20 string on a single GPIO)
pub trait OneWireBus {
    /// Driver-specific failure
    type Error: Debug;

    /// Start a temperature conversion on every device on the bus
    fn request_conversion(&mut self) -> Result<(), Self::Error>;

    /// Read the last conversion of the device at `index`, in Celsius
    ///
    /// A disconnected probe reports `DS18B20_DISCONNECTED_C` rather than an
    /// error. `nb::Error::WouldBlock` means the conversion is still running.
    fn read_channel(&mut self, index: u8) -> nb::Result<f32, Self::Error>;
}

/// Publish/subscribe client (MQTT in practice)
pub trait TransportClient {
    /// Start a broker session
    ///
    /// May complete synchronously or leave the session pending; the
    /// connection manager watches `is_connected` on later ticks either way.
    fn connect(&mut self, broker: &str, port: u16, client_id: &str) -> Result<(), ConnectError>;

    /// Send one value; never retried by the caller
    fn publish(&mut self, topic: &str, value: &str) -> Result<(), TransportError>;

    /// Subscribe; matching messages arrive through `process_inbound`
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Service keepalives and move pending inbound messages into `inbox`
    ///
    /// Must not block. Messages beyond `inbox.remaining()` should stay with
    /// the transport until the next call.
    fn process_inbound<const N: usize>(&mut self, inbox: &mut EventQueue<N>);

    /// True while a broker session is established
    fn is_connected(&self) -> bool;
}

/// Network link driver (Ethernet PHY + DHCP client)
///
/// Drivers that deliver events through a callback can skip this trait and
/// push into the agent with `Agent::post_event` instead.
pub trait LinkDriver {
    /// Next pending link event, if any
    fn poll_event(&mut self) -> Option<LinkEvent>;
}

/// A link driver that never reports anything, for setups where events are
/// posted directly
impl LinkDriver for () {
    fn poll_event(&mut self) -> Option<LinkEvent> {
        None
    }
}

/// Binary activity output, e.g. the transmit LED
///
/// The agent decides when the indicator is lit and translates that into a pin
/// level with `AgentConfig::indicator_active_high`, so implementations only
/// drive the pin.
pub trait StatusIndicator {
    /// Drive the output high (`true`) or low
    fn set_level(&mut self, high: bool);
}

/// No indicator fitted
impl StatusIndicator for () {
    fn set_level(&mut self, _high: bool) {}
}
