//! Connection manager
//!
//! Keeps the broker session alive across link flaps and broker outages.
//!
//! ## State Machine
//!
//! ```text
//!                 link-up / got-address
//!   ┌──────────┐ ─────────────────────▶ ┌──────────────┐
//!   │ LinkDown │                        │ Disconnected │◀──────────────┐
//!   └──────────┘ ◀──── link-down ────── └──────────────┘               │
//!        ▲          lost-address               │ cooldown elapsed      │ failure /
//!        │          (from any state)           ▼                       │ session lost
//!        │                              ┌──────────────┐               │
//!        ├───────────────────────────── │  Connecting  │ ──────────────┤
//!        │                              └──────────────┘               │
//!        │                                     │ session up            │
//!        │                                     ▼                       │
//!        │                              ┌──────────────┐               │
//!        └───────────────────────────── │  Connected   │ ──────────────┘
//!                                       └──────────────┘
//! ```
//!
//! ## Cooldown
//!
//! At most one attempt per cooldown interval, measured from the previous
//! attempt whatever its outcome. The interval is fixed. A failed
//! attempt is never fatal: the only visible effects are the attempt counter
//! and the state staying away from `Connected`.
//!
//! A transport may finish connecting asynchronously. The manager stays in
//! `Connecting` until the transport reports a session, and gives up on the
//! attempt once a full cooldown has passed without one.

use core::fmt;

use crate::config::BrokerConfig;
use crate::diagnostics::Diagnostics;
use crate::errors::ConnectError;
use crate::events::{LinkDescriptors, LinkEvent};
use crate::publisher::Topic;
use crate::time::{IntervalTimer, Millis, Timestamp};
use crate::traits::TransportClient;

/// Link/broker state, read by the publisher to gate sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// Network interface not up
    LinkDown,
    /// Link up, no broker session
    Disconnected,
    /// Attempt issued, session not confirmed yet
    Connecting,
    /// Broker session established; publishing allowed
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::LinkDown => "link-down",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Owner of the connection state, the reconnect cooldown and link descriptors
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    state: ConnectionState,
    cooldown: IntervalTimer,
    link: LinkDescriptors,
    broker: BrokerConfig,
    command_topic: Topic,
    last_error: Option<ConnectError>,
}

impl ConnectionManager {
    /// Start in `LinkDown` with placeholder link descriptors
    pub fn new(broker: BrokerConfig, cooldown: Millis, command_topic: Topic) -> Self {
        Self {
            state: ConnectionState::LinkDown,
            cooldown: IntervalTimer::new(cooldown),
            link: LinkDescriptors::default(),
            broker,
            command_topic,
            last_error: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn link(&self) -> &LinkDescriptors {
        &self.link
    }

    /// Reason of the most recent failed attempt
    pub fn last_error(&self) -> Option<ConnectError> {
        self.last_error
    }

    /// Timestamp of the most recent attempt
    pub fn last_attempt(&self) -> Option<Timestamp> {
        self.cooldown.last()
    }

    /// Apply a link driver notification
    pub fn on_link_event(&mut self, event: &LinkEvent, diagnostics: &mut Diagnostics) {
        diagnostics.record_network_callback();

        if let Some(info) = event.info() {
            self.link.apply(info);
        }

        match event {
            LinkEvent::LinkUp(_) | LinkEvent::GotAddress(_) => {
                if self.state == ConnectionState::LinkDown {
                    log_info!(
                        "link up: mac {} ip {} {} Mbps {}",
                        self.link.mac,
                        self.link.ip,
                        self.link.speed_mbps,
                        self.link.duplex
                    );
                    self.transition(ConnectionState::Disconnected);
                }
            }
            LinkEvent::LinkDown | LinkEvent::LostAddress => {
                if self.state != ConnectionState::LinkDown {
                    log_warn!("{}: publishing paused", event.name());
                    self.transition(ConnectionState::LinkDown);
                }
            }
        }
    }

    /// Advance the state machine; call once per tick
    ///
    /// Returns the outcome when a connection attempt was made on this call.
    pub fn maintain<T: TransportClient>(
        &mut self,
        now: Timestamp,
        transport: &mut T,
        diagnostics: &mut Diagnostics,
    ) -> Option<Result<(), ConnectError>> {
        match self.state {
            ConnectionState::LinkDown | ConnectionState::Disconnected => {}
            ConnectionState::Connected => {
                if !transport.is_connected() {
                    log_warn!("broker session lost");
                    self.transition(ConnectionState::Disconnected);
                }
            }
            ConnectionState::Connecting => {
                if transport.is_connected() {
                    self.session_up(transport);
                } else if self.cooldown.is_due(now) {
                    log_warn!("broker did not answer within the cooldown");
                    self.last_error = Some(ConnectError::ConnectionTimeout);
                    self.transition(ConnectionState::Disconnected);
                }
            }
        }

        if self.state == ConnectionState::Disconnected && self.cooldown.is_due(now) {
            Some(self.attempt(now, transport, diagnostics))
        } else {
            None
        }
    }

    fn attempt<T: TransportClient>(
        &mut self,
        now: Timestamp,
        transport: &mut T,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ConnectError> {
        self.cooldown.mark(now);
        diagnostics.record_connect_attempt();
        self.transition(ConnectionState::Connecting);

        log_info!(
            "connecting to {}:{} as {} (attempt {})",
            self.broker.address,
            self.broker.port,
            self.broker.client_id,
            diagnostics.connect_attempts
        );

        match transport.connect(&self.broker.address, self.broker.port, &self.broker.client_id) {
            Ok(()) => {
                self.last_error = None;
                if transport.is_connected() {
                    self.session_up(transport);
                }
                Ok(())
            }
            Err(e) => {
                log_warn!("broker connect failed: {} (code {})", e, e.code());
                self.last_error = Some(e);
                self.transition(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    fn session_up<T: TransportClient>(&mut self, transport: &mut T) {
        self.transition(ConnectionState::Connected);
        if let Err(e) = transport.subscribe(&self.command_topic) {
            log_warn!("subscribe to {} failed: {}", self.command_topic, e);
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            log_debug!("connection: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::events::{Duplex, LinkInfo};
    use crate::queue::EventQueue;
    use core::net::Ipv4Addr;

    extern crate std;
    use std::string::{String, ToString};
    use std::vec::Vec;

    #[derive(Default)]
    struct FakeTransport {
        accept: bool,
        /// Session comes up only on a later tick
        deferred: bool,
        connected: bool,
        connects: usize,
        subscriptions: Vec<String>,
    }

    impl TransportClient for FakeTransport {
        fn connect(&mut self, _broker: &str, _port: u16, _id: &str) -> Result<(), ConnectError> {
            self.connects += 1;
            if !self.accept {
                return Err(ConnectError::ConnectFailed);
            }
            self.connected = !self.deferred;
            Ok(())
        }

        fn publish(&mut self, _topic: &str, _value: &str) -> Result<(), TransportError> {
            Ok(())
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
            self.subscriptions.push(topic.to_string());
            Ok(())
        }

        fn process_inbound<const N: usize>(&mut self, _inbox: &mut EventQueue<N>) {}

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn manager() -> ConnectionManager {
        let topic = Topic::try_from("root/commands").unwrap();
        ConnectionManager::new(BrokerConfig::default(), 5000, topic)
    }

    fn link_up() -> LinkEvent {
        LinkEvent::LinkUp(LinkInfo::default().with_speed(100).with_duplex(Duplex::Full))
    }

    #[test]
    fn starts_link_down_and_waits_for_link() {
        let mut mgr = manager();
        let mut transport = FakeTransport { accept: true, ..Default::default() };
        let mut diagnostics = Diagnostics::default();

        assert_eq!(mgr.state(), ConnectionState::LinkDown);
        assert!(mgr.maintain(0, &mut transport, &mut diagnostics).is_none());
        assert_eq!(transport.connects, 0);
    }

    #[test]
    fn link_up_then_failed_attempt_honours_cooldown() {
        let mut mgr = manager();
        let mut transport = FakeTransport::default();
        let mut diagnostics = Diagnostics::default();

        mgr.on_link_event(&link_up(), &mut diagnostics);
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
        assert_eq!(diagnostics.network_callbacks, 1);

        let first = mgr.maintain(1000, &mut transport, &mut diagnostics);
        assert_eq!(first, Some(Err(ConnectError::ConnectFailed)));
        assert_eq!(mgr.state(), ConnectionState::Disconnected);

        // less than the cooldown later
        assert!(mgr.maintain(5999, &mut transport, &mut diagnostics).is_none());
        assert_eq!(transport.connects, 1);
        assert_eq!(diagnostics.connect_attempts, 1);

        // cooldown elapsed
        assert!(mgr.maintain(6000, &mut transport, &mut diagnostics).is_some());
        assert_eq!(diagnostics.connect_attempts, 2);
        assert_eq!(mgr.last_error(), Some(ConnectError::ConnectFailed));
    }

    #[test]
    fn successful_attempt_connects_and_subscribes() {
        let mut mgr = manager();
        let mut transport = FakeTransport { accept: true, ..Default::default() };
        let mut diagnostics = Diagnostics::default();

        mgr.on_link_event(&link_up(), &mut diagnostics);
        assert_eq!(mgr.maintain(0, &mut transport, &mut diagnostics), Some(Ok(())));
        assert!(mgr.is_connected());
        assert_eq!(transport.subscriptions, ["root/commands"]);
    }

    #[test]
    fn deferred_session_completes_on_later_tick() {
        let mut mgr = manager();
        let mut transport = FakeTransport { accept: true, deferred: true, ..Default::default() };
        let mut diagnostics = Diagnostics::default();

        mgr.on_link_event(&link_up(), &mut diagnostics);
        mgr.maintain(0, &mut transport, &mut diagnostics);
        assert_eq!(mgr.state(), ConnectionState::Connecting);

        transport.connected = true;
        assert!(mgr.maintain(100, &mut transport, &mut diagnostics).is_none());
        assert!(mgr.is_connected());
    }

    #[test]
    fn unanswered_attempt_times_out_after_cooldown() {
        let mut mgr = manager();
        let mut transport = FakeTransport { accept: true, deferred: true, ..Default::default() };
        let mut diagnostics = Diagnostics::default();

        mgr.on_link_event(&link_up(), &mut diagnostics);
        mgr.maintain(0, &mut transport, &mut diagnostics);
        assert!(mgr.maintain(4999, &mut transport, &mut diagnostics).is_none());
        assert_eq!(mgr.state(), ConnectionState::Connecting);

        // gives up and immediately retries
        assert!(mgr.maintain(5000, &mut transport, &mut diagnostics).is_some());
        assert_eq!(transport.connects, 2);
        assert_eq!(mgr.state(), ConnectionState::Connecting);
    }

    #[test]
    fn session_loss_returns_to_disconnected() {
        let mut mgr = manager();
        let mut transport = FakeTransport { accept: true, ..Default::default() };
        let mut diagnostics = Diagnostics::default();

        mgr.on_link_event(&link_up(), &mut diagnostics);
        mgr.maintain(0, &mut transport, &mut diagnostics);
        transport.connected = false;
        transport.accept = false;

        assert!(mgr.maintain(10, &mut transport, &mut diagnostics).is_none());
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn link_down_from_any_state() {
        let mut mgr = manager();
        let mut transport = FakeTransport { accept: true, ..Default::default() };
        let mut diagnostics = Diagnostics::default();

        mgr.on_link_event(&link_up(), &mut diagnostics);
        mgr.maintain(0, &mut transport, &mut diagnostics);
        assert!(mgr.is_connected());

        mgr.on_link_event(&LinkEvent::LinkDown, &mut diagnostics);
        assert_eq!(mgr.state(), ConnectionState::LinkDown);
        assert_eq!(diagnostics.network_callbacks, 2);
    }

    #[test]
    fn got_address_caches_descriptors() {
        let mut mgr = manager();
        let mut diagnostics = Diagnostics::default();
        let info = LinkInfo::default()
            .with_mac([0x24, 0x0A, 0xC4, 0x01, 0x02, 0x03])
            .with_ip(Ipv4Addr::new(10, 0, 0, 7));

        mgr.on_link_event(&LinkEvent::GotAddress(info), &mut diagnostics);

        assert_eq!(mgr.state(), ConnectionState::Disconnected);
        assert_eq!(mgr.link().ip, Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(mgr.link().mac.to_string(), "24:0A:C4:01:02:03");
    }
}
