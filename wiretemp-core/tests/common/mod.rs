//! Shared fixtures for integration tests
//!
//! - `MockBus`: per-index scripted readings, settable between ticks
//! - `MockTransport`: records connects/publishes/subscriptions, scripted
//!   connect outcome and inbound messages
//! - `ScriptedLink`: link driver replaying queued events

#![allow(dead_code)]

use std::collections::VecDeque;

use wiretemp_core::errors::{ConnectError, TransportError};
use wiretemp_core::queue::EventQueue;
use wiretemp_core::{InboundMessage, LinkDriver, LinkEvent, OneWireBus, TransportClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// Bus returning the configured reading for each index
pub struct MockBus {
    pub readings: Vec<f32>,
    pub conversions: usize,
}

impl MockBus {
    pub fn uniform(count: usize, celsius: f32) -> Self {
        Self { readings: vec![celsius; count], conversions: 0 }
    }
}

impl OneWireBus for MockBus {
    type Error = BusFault;

    fn request_conversion(&mut self) -> Result<(), BusFault> {
        self.conversions += 1;
        Ok(())
    }

    fn read_channel(&mut self, index: u8) -> nb::Result<f32, BusFault> {
        self.readings
            .get(index as usize)
            .copied()
            .ok_or(nb::Error::Other(BusFault))
    }
}

/// Transport that connects when told to and records everything sent
#[derive(Default)]
pub struct MockTransport {
    pub accept_connect: bool,
    pub connected: bool,
    pub connects: Vec<(String, u16, String)>,
    pub published: Vec<(String, String)>,
    pub subscriptions: Vec<String>,
    pub inbound: VecDeque<InboundMessage>,
}

impl MockTransport {
    pub fn accepting() -> Self {
        Self { accept_connect: true, ..Default::default() }
    }

    pub fn refusing() -> Self {
        Self::default()
    }

    /// Simulate the broker dropping the session
    pub fn drop_session(&mut self) {
        self.connected = false;
    }

    /// Last value published on `topic`
    pub fn last_value(&self, topic: &str) -> Option<&str> {
        self.published
            .iter()
            .rev()
            .find(|(t, _)| t == topic)
            .map(|(_, v)| v.as_str())
    }

    pub fn count_on(&self, topic: &str) -> usize {
        self.published.iter().filter(|(t, _)| t == topic).count()
    }
}

impl TransportClient for MockTransport {
    fn connect(&mut self, broker: &str, port: u16, client_id: &str) -> Result<(), ConnectError> {
        self.connects.push((broker.to_string(), port, client_id.to_string()));
        if self.accept_connect {
            self.connected = true;
            Ok(())
        } else {
            Err(ConnectError::Unavailable)
        }
    }

    fn publish(&mut self, topic: &str, value: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.published.push((topic.to_string(), value.to_string()));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    fn process_inbound<const N: usize>(&mut self, inbox: &mut EventQueue<N>) {
        while inbox.remaining() > 0 {
            let Some(message) = self.inbound.pop_front() else {
                break;
            };
            inbox.push(message.into());
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Link driver replaying queued events, one per poll
#[derive(Default)]
pub struct ScriptedLink {
    pub events: VecDeque<LinkEvent>,
}

impl ScriptedLink {
    pub fn push(&mut self, event: LinkEvent) {
        self.events.push_back(event);
    }
}

impl LinkDriver for ScriptedLink {
    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.events.pop_front()
    }
}
