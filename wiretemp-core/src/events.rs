//! Inbound Events from the Link Driver and Transport
//!
//! ## Overview
//!
//! Network drivers and pub/sub clients report what happened through
//! callbacks. Running agent logic inside those callbacks would mean the
//! agent's state is touched from wherever the driver happens to call from.
//! Instead, callbacks only turn the notification into an `AgentEvent` and push
//! it onto the `EventQueue`; the loop drains the queue at the top of every
//! tick, so all state changes happen on the loop thread in a fixed order.
//!
//! ```text
//! link driver ──┐
//!               ├──▶ EventQueue ──▶ Agent::tick() ──▶ ConnectionManager / Diagnostics
//! transport  ───┘
//! ```
//!
//! ## Link Descriptors
//!
//! Link events carry a partial `LinkInfo`: a carrier-up event knows the MAC,
//! speed and duplex but not the address; an address event knows the address.
//! `LinkDescriptors::apply` merges whatever is present into the cached copy
//! that the publisher reports on the `mac` and `ip` topics.

use core::fmt;
use core::net::Ipv4Addr;

use heapless::{String, Vec};

use crate::constants::buffers::{MAX_INBOUND_PAYLOAD, MAX_TOPIC_LENGTH};
use crate::constants::network::{PLACEHOLDER_IP, PLACEHOLDER_LINK_SPEED_MBPS, PLACEHOLDER_MAC};

/// Hardware (MAC) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

/// Negotiated duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    Half,
    Full,
}

impl fmt::Display for Duplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duplex::Half => f.write_str("HALF_DUPLEX"),
            Duplex::Full => f.write_str("FULL_DUPLEX"),
        }
    }
}

/// Partial link description carried by a link event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkInfo {
    pub mac: Option<MacAddress>,
    pub ip: Option<Ipv4Addr>,
    pub speed_mbps: Option<u8>,
    pub duplex: Option<Duplex>,
}

impl LinkInfo {
    pub fn with_mac(mut self, mac: [u8; 6]) -> Self {
        self.mac = Some(MacAddress(mac));
        self
    }

    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self
    }

    pub fn with_speed(mut self, speed_mbps: u8) -> Self {
        self.speed_mbps = Some(speed_mbps);
        self
    }

    pub fn with_duplex(mut self, duplex: Duplex) -> Self {
        self.duplex = Some(duplex);
        self
    }
}

/// Cached link state reported by the publisher and the diagnostic print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDescriptors {
    pub mac: MacAddress,
    pub ip: Ipv4Addr,
    pub speed_mbps: u8,
    pub duplex: Duplex,
}

impl Default for LinkDescriptors {
    fn default() -> Self {
        let [a, b, c, d] = PLACEHOLDER_IP;
        Self {
            mac: MacAddress(PLACEHOLDER_MAC),
            ip: Ipv4Addr::new(a, b, c, d),
            speed_mbps: PLACEHOLDER_LINK_SPEED_MBPS,
            duplex: Duplex::Half,
        }
    }
}

impl LinkDescriptors {
    /// Merge the fields present in `info`
    pub fn apply(&mut self, info: &LinkInfo) {
        if let Some(mac) = info.mac {
            self.mac = mac;
        }
        if let Some(ip) = info.ip {
            self.ip = ip;
        }
        if let Some(speed) = info.speed_mbps {
            self.speed_mbps = speed;
        }
        if let Some(duplex) = info.duplex {
            self.duplex = duplex;
        }
    }
}

/// Notification from the network link driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Carrier established
    LinkUp(LinkInfo),
    /// Carrier lost
    LinkDown,
    /// Address assigned (DHCP or static)
    GotAddress(LinkInfo),
    /// Address lost
    LostAddress,
}

impl LinkEvent {
    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            LinkEvent::LinkUp(_) => "link-up",
            LinkEvent::LinkDown => "link-down",
            LinkEvent::GotAddress(_) => "got-address",
            LinkEvent::LostAddress => "lost-address",
        }
    }

    /// Descriptor payload, if the event carries one
    pub fn info(&self) -> Option<&LinkInfo> {
        match self {
            LinkEvent::LinkUp(info) | LinkEvent::GotAddress(info) => Some(info),
            LinkEvent::LinkDown | LinkEvent::LostAddress => None,
        }
    }
}

/// Message delivered by the transport on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LENGTH>,
    pub payload: Vec<u8, MAX_INBOUND_PAYLOAD>,
    /// Topic or payload did not fit and was cut short
    pub truncated: bool,
}

impl InboundMessage {
    /// Build from raw parts, truncating oversized fields
    pub fn new(topic: &str, payload: &[u8]) -> Self {
        let mut truncated = false;

        let mut t = String::new();
        for ch in topic.chars() {
            if t.push(ch).is_err() {
                truncated = true;
                break;
            }
        }

        let take = payload.len().min(MAX_INBOUND_PAYLOAD);
        truncated |= take < payload.len();
        let mut p = Vec::new();
        // cannot fail: `take` is bounded by the capacity
        let _ = p.extend_from_slice(&payload[..take]);

        Self {
            topic: t,
            payload: p,
            truncated,
        }
    }

    /// Payload as text, if it is UTF-8
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }
}

/// Everything the loop drains at the top of a tick
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Link(LinkEvent),
    Inbound(InboundMessage),
}

impl From<LinkEvent> for AgentEvent {
    fn from(event: LinkEvent) -> Self {
        AgentEvent::Link(event)
    }
}

impl From<InboundMessage> for AgentEvent {
    fn from(message: InboundMessage) -> Self {
        AgentEvent::Inbound(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::ToString;

    #[test]
    fn mac_formats_as_colon_hex() {
        let mac = MacAddress([0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22]);
        assert_eq!(mac.to_string(), "AA:BB:CC:00:11:22");
    }

    #[test]
    fn placeholder_descriptors() {
        let d = LinkDescriptors::default();
        assert_eq!(d.ip.to_string(), "127.0.0.1");
        assert_eq!(d.speed_mbps, 42);
        assert_eq!(d.duplex.to_string(), "HALF_DUPLEX");
    }

    #[test]
    fn apply_merges_present_fields_only() {
        let mut d = LinkDescriptors::default();
        d.apply(&LinkInfo::default().with_speed(100).with_duplex(Duplex::Full));
        assert_eq!(d.speed_mbps, 100);
        assert_eq!(d.duplex, Duplex::Full);
        assert_eq!(d.ip, Ipv4Addr::new(127, 0, 0, 1));

        d.apply(&LinkInfo::default().with_ip(Ipv4Addr::new(192, 168, 1, 50)));
        assert_eq!(d.ip, Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(d.speed_mbps, 100);
    }

    #[test]
    fn inbound_truncates_long_payload() {
        let payload = [b'x'; MAX_INBOUND_PAYLOAD + 10];
        let msg = InboundMessage::new("root/commands", &payload);
        assert!(msg.truncated);
        assert_eq!(msg.payload.len(), MAX_INBOUND_PAYLOAD);
        assert_eq!(msg.topic.as_str(), "root/commands");
    }

    #[test]
    fn inbound_payload_text() {
        let msg = InboundMessage::new("root/commands", b"reboot");
        assert!(!msg.truncated);
        assert_eq!(msg.payload_str(), Some("reboot"));
    }
}
