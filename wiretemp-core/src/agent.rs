//! The agent: one value owning all state, driven by `tick(now)`
//!
//! ## Tick Order
//!
//! ```text
//! 1. link driver events          → ConnectionManager, never queued
//! 2. transport.process_inbound   (non-blocking, fills free queue slots)
//! 3. drain queue                 posted link events → ConnectionManager
//!                                inbound            → transport callback counter
//! 4. ConnectionManager::maintain (at most one attempt per cooldown)
//! 5. SensorPoller                (when its interval elapsed)
//! 6. Publisher                   (when connected and its interval elapsed)
//!                                toggles the status indicator after a cycle
//! 7. diagnostic print            (when its interval elapsed)
//! ```
//!
//! Polled link events bypass the queue so a burst of inbound messages can
//! never crowd out a link-up.
//!
//! Nothing in a tick blocks: the host or firmware loop calls `tick` as often
//! as it likes and each action decides from its own timer whether to run.
//!
//! ```rust
//! use wiretemp_core::{Agent, AgentConfig};
//! # use wiretemp_core::traits::{OneWireBus, TransportClient};
//! # use wiretemp_core::errors::{ConnectError, TransportError};
//! # use wiretemp_core::queue::EventQueue;
//! # struct Bus;
//! # impl OneWireBus for Bus {
//! #     type Error = ();
//! #     fn request_conversion(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn read_channel(&mut self, _: u8) -> nb::Result<f32, ()> { Ok(21.0) }
//! # }
//! # struct Offline;
//! # impl TransportClient for Offline {
//! #     fn connect(&mut self, _: &str, _: u16, _: &str) -> Result<(), ConnectError> { Err(ConnectError::ConnectFailed) }
//! #     fn publish(&mut self, _: &str, _: &str) -> Result<(), TransportError> { Err(TransportError::NotConnected) }
//! #     fn subscribe(&mut self, _: &str) -> Result<(), TransportError> { Err(TransportError::NotConnected) }
//! #     fn process_inbound<const N: usize>(&mut self, _: &mut EventQueue<N>) {}
//! #     fn is_connected(&self) -> bool { false }
//! # }
//!
//! let mut agent = Agent::new(&AgentConfig::default(), Bus, Offline, ()).unwrap();
//! agent.tick(0);
//! assert_eq!(agent.diagnostics().poll_count, 1);
//! assert_eq!(agent.channels()[0].window().latest(), Some(21.0));
//! ```

use core::fmt::Write;

use heapless::{String, Vec};

use crate::channel::SensorChannel;
use crate::config::AgentConfig;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::constants::buffers::{EVENT_QUEUE_CAPACITY, MAX_CHANNELS};
use crate::diagnostics::Diagnostics;
use crate::errors::{ConfigError, ConnectError};
use crate::events::{AgentEvent, InboundMessage};
use crate::poller::{PollSummary, SensorPoller};
use crate::publisher::{PublishReport, Publisher};
use crate::queue::EventQueue;
use crate::time::{Clock, IntervalTimer, Timestamp};
use crate::traits::{LinkDriver, OneWireBus, StatusIndicator, TransportClient};
use crate::validators::OutlierFilter;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Link driver events plus events drained from the queue
    pub events: usize,
    /// Connection attempt made this tick
    pub connect: Option<Result<(), ConnectError>>,
    pub poll: Option<PollSummary>,
    pub publish: Option<PublishReport>,
    /// Diagnostic print ran
    pub printed: bool,
}

/// Telemetry agent over a one-wire bus, a pub/sub transport, a link driver
/// and an optional status indicator
pub struct Agent<B, T, L = (), S = ()> {
    bus: B,
    transport: T,
    link: L,
    indicator: S,
    indicator_active_high: bool,
    indicator_lit: bool,
    channels: Vec<SensorChannel, MAX_CHANNELS>,
    events: EventQueue<EVENT_QUEUE_CAPACITY>,
    diagnostics: Diagnostics,
    poller: SensorPoller,
    connection: ConnectionManager,
    publisher: Publisher,
    print_timer: IntervalTimer,
}

impl<B, T, L> Agent<B, T, L>
where
    B: OneWireBus,
    T: TransportClient,
    L: LinkDriver,
{
    /// Validate `config` and build the agent in the `LinkDown` state
    pub fn new(config: &AgentConfig, bus: B, transport: T, link: L) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut channels = Vec::new();
        for channel in &config.channels {
            let channel = SensorChannel::new(&channel.id, channel.bus_index)?;
            channels.push(channel).map_err(|_| ConfigError::TooManyChannels {
                count: config.channels.len(),
                max: MAX_CHANNELS,
            })?;
        }

        let intervals = config.intervals;
        let publisher = Publisher::new(config.topic_root.clone(), intervals.publish_ms, config.aggregate);
        let command_topic = publisher
            .command_topic()
            .map_err(|_| ConfigError::TooLong { field: "topic root" })?;

        Ok(Self {
            bus,
            transport,
            link,
            indicator: (),
            indicator_active_high: config.indicator_active_high,
            indicator_lit: false,
            channels,
            events: EventQueue::new(),
            diagnostics: Diagnostics::default(),
            poller: SensorPoller::new(
                intervals.poll_ms,
                OutlierFilter::new(config.plausible_min_c, config.plausible_max_c),
            ),
            connection: ConnectionManager::new(config.broker.clone(), intervals.cooldown_ms, command_topic),
            publisher,
            print_timer: IntervalTimer::new(intervals.print_ms),
        })
    }

    /// Attach a status indicator, switched off until the first publish
    pub fn with_indicator<S: StatusIndicator>(self, mut indicator: S) -> Agent<B, T, L, S> {
        indicator.set_level(!self.indicator_active_high);
        Agent {
            bus: self.bus,
            transport: self.transport,
            link: self.link,
            indicator,
            indicator_active_high: self.indicator_active_high,
            indicator_lit: false,
            channels: self.channels,
            events: self.events,
            diagnostics: self.diagnostics,
            poller: self.poller,
            connection: self.connection,
            publisher: self.publisher,
            print_timer: self.print_timer,
        }
    }
}

impl<B, T, L, S> Agent<B, T, L, S>
where
    B: OneWireBus,
    T: TransportClient,
    L: LinkDriver,
    S: StatusIndicator,
{
    /// Queue an event from driver glue; returns false if the queue was full
    pub fn post_event(&mut self, event: impl Into<AgentEvent>) -> bool {
        let accepted = self.events.push(event.into());
        self.diagnostics.dropped_events = self.events.dropped();
        accepted
    }

    /// Run one loop iteration at `now`
    pub fn tick(&mut self, now: Timestamp) -> TickReport {
        let mut report = TickReport::default();

        while let Some(event) = self.link.poll_event() {
            self.handle(event.into());
            report.events += 1;
        }
        self.transport.process_inbound(&mut self.events);
        while let Some(event) = self.events.pop() {
            self.handle(event);
            report.events += 1;
        }
        self.diagnostics.dropped_events = self.events.dropped();

        report.connect = self.connection.maintain(now, &mut self.transport, &mut self.diagnostics);

        report.poll = self.poller.poll_if_due(now, &mut self.bus, &mut self.channels, &mut self.diagnostics);

        report.publish = self.publisher.tick(
            now,
            self.connection.state(),
            &self.channels,
            self.connection.link(),
            &mut self.diagnostics,
            &mut self.transport,
        );
        if report.publish.is_some() {
            self.toggle_indicator();
        }

        if self.print_timer.fire(now) {
            self.print_diagnostics();
            report.printed = true;
        }

        report
    }

    /// `tick` at the clock's current time
    pub fn tick_with<C: Clock>(&mut self, clock: &C) -> TickReport {
        self.tick(clock.now())
    }

    fn handle(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::Link(event) => {
                log_debug!("link event: {}", event.name());
                self.connection.on_link_event(&event, &mut self.diagnostics);
            }
            AgentEvent::Inbound(message) => self.on_inbound(&message),
        }
    }

    fn toggle_indicator(&mut self) {
        self.indicator_lit = !self.indicator_lit;
        self.indicator.set_level(self.indicator_lit == self.indicator_active_high);
    }

    /// Whether the status indicator is currently lit
    pub fn indicator_lit(&self) -> bool {
        self.indicator_lit
    }

    fn on_inbound(&mut self, message: &InboundMessage) {
        self.diagnostics.record_transport_callback();
        match message.payload_str() {
            Some(text) => log_info!(
                "message on {}: {}{}",
                message.topic,
                text,
                if message.truncated { " (truncated)" } else { "" }
            ),
            None => log_info!("message on {}: {} bytes", message.topic, message.payload.len()),
        }
    }

    fn print_diagnostics(&mut self) {
        self.diagnostics.record_print();

        let link = self.connection.link();
        log_info!(
            "state {} | mac {} ip {} {} Mbps {}",
            self.connection.state(),
            link.mac,
            link.ip,
            link.speed_mbps,
            link.duplex
        );

        let d = &self.diagnostics;
        log_info!(
            "publish {} connect {} netcb {} mqttcb {} invalid {} polls {} prints {} dropped {} failed {}",
            d.publish_count,
            d.connect_attempts,
            d.network_callbacks,
            d.transport_callbacks,
            d.invalid_readings,
            d.poll_count,
            d.print_count,
            d.dropped_events,
            d.failed_sends
        );

        let which = self.publisher.aggregate();
        for channel in &self.channels {
            let mut samples: String<48> = String::new();
            for value in channel.window().iter() {
                let _ = write!(samples, "{:.2} ", value);
            }
            match channel.aggregate(which) {
                Ok(reading) => log_info!(
                    "{} [{}] {:?} {:.2} C / {:.2} F",
                    channel.id(),
                    samples.trim_end(),
                    which,
                    reading.celsius,
                    reading.fahrenheit
                ),
                Err(_) => log_info!("{} [] no data", channel.id()),
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn channels(&self) -> &[SensorChannel] {
        &self.channels
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn poller(&self) -> &SensorPoller {
        &self.poller
    }

    /// Events waiting for the next tick
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn indicator(&self) -> &S {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::events::{LinkEvent, LinkInfo};

    extern crate std;
    use std::string::{String as StdString, ToString};
    use std::vec::Vec as StdVec;

    struct ConstBus(f32);

    impl OneWireBus for ConstBus {
        type Error = ();

        fn request_conversion(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn read_channel(&mut self, _index: u8) -> nb::Result<f32, ()> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct Loopback {
        connected: bool,
        published: StdVec<(StdString, StdString)>,
        inbound: StdVec<InboundMessage>,
    }

    impl TransportClient for Loopback {
        fn connect(&mut self, _: &str, _: u16, _: &str) -> Result<(), ConnectError> {
            self.connected = true;
            Ok(())
        }

        fn publish(&mut self, topic: &str, value: &str) -> Result<(), TransportError> {
            self.published.push((topic.to_string(), value.to_string()));
            Ok(())
        }

        fn subscribe(&mut self, _: &str) -> Result<(), TransportError> {
            Ok(())
        }

        fn process_inbound<const N: usize>(&mut self, inbox: &mut EventQueue<N>) {
            let take = inbox.remaining().min(self.inbound.len());
            for message in self.inbound.drain(..take) {
                inbox.push(message.into());
            }
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn agent() -> Agent<ConstBus, Loopback> {
        Agent::new(&AgentConfig::default(), ConstBus(20.0), Loopback::default(), ()).unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let config = AgentConfig::default().with_plausible_range(10.0, -10.0);
        assert!(Agent::new(&config, ConstBus(0.0), Loopback::default(), ()).is_err());
    }

    #[test]
    fn no_publish_before_link() {
        let mut agent = agent();
        let report = agent.tick(0);

        assert_eq!(agent.state(), ConnectionState::LinkDown);
        assert!(report.connect.is_none());
        assert!(report.publish.is_none());
        assert!(agent.transport().published.is_empty());
        assert_eq!(agent.diagnostics().poll_count, 1);
    }

    #[test]
    fn posted_link_event_leads_to_publish() {
        let mut agent = agent();
        assert!(agent.post_event(LinkEvent::LinkUp(LinkInfo::default())));

        let report = agent.tick(0);

        assert_eq!(report.events, 1);
        assert_eq!(report.connect, Some(Ok(())));
        assert_eq!(agent.state(), ConnectionState::Connected);
        // six channels x two units + five diagnostics
        assert_eq!(report.publish.map(|r| r.sent), Some(17));
        assert_eq!(agent.diagnostics().publish_count, 1);
    }

    #[test]
    fn inbound_messages_are_counted() {
        let mut agent = agent();
        agent
            .transport_mut()
            .inbound
            .push(InboundMessage::new("furnaceRoom/wt32eth01/commands", b"ping"));

        agent.tick(0);

        assert_eq!(agent.diagnostics().transport_callbacks, 1);
        assert_eq!(agent.pending_events(), 0);
    }

    #[test]
    fn queue_overflow_is_reported() {
        let mut agent = agent();
        for _ in 0..EVENT_QUEUE_CAPACITY + 3 {
            agent.post_event(LinkEvent::LostAddress);
        }
        assert_eq!(agent.diagnostics().dropped_events, 3);

        agent.tick(0);
        assert_eq!(agent.diagnostics().network_callbacks, EVENT_QUEUE_CAPACITY as u32);
    }

    #[test]
    fn print_runs_on_its_interval() {
        let mut agent = agent();
        assert!(agent.tick(0).printed);
        assert!(!agent.tick(4_999).printed);
        assert!(agent.tick(5_000).printed);
        assert_eq!(agent.diagnostics().print_count, 2);
    }

    struct ScriptedLink(StdVec<LinkEvent>);

    impl LinkDriver for ScriptedLink {
        fn poll_event(&mut self) -> Option<LinkEvent> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
    }

    #[derive(Default)]
    struct Led {
        levels: StdVec<bool>,
    }

    impl StatusIndicator for Led {
        fn set_level(&mut self, high: bool) {
            self.levels.push(high);
        }
    }

    #[test]
    fn link_up_survives_inbound_burst() {
        let mut transport = Loopback::default();
        for _ in 0..EVENT_QUEUE_CAPACITY + 4 {
            transport
                .inbound
                .push(InboundMessage::new("furnaceRoom/wt32eth01/commands", b"spam"));
        }
        let link = ScriptedLink(std::vec![LinkEvent::LinkUp(LinkInfo::default())]);
        let mut agent = Agent::new(&AgentConfig::default(), ConstBus(20.0), transport, link).unwrap();

        agent.tick(0);

        assert_eq!(agent.state(), ConnectionState::Connected);
        assert_eq!(agent.diagnostics().network_callbacks, 1);
        assert_eq!(agent.diagnostics().dropped_events, 0);
        assert_eq!(agent.diagnostics().transport_callbacks, EVENT_QUEUE_CAPACITY as u32);

        // the rest of the burst is delivered on the next tick
        agent.tick(10);
        assert_eq!(agent.diagnostics().transport_callbacks, EVENT_QUEUE_CAPACITY as u32 + 4);
        assert_eq!(agent.diagnostics().dropped_events, 0);
    }

    #[test]
    fn indicator_toggles_on_each_publish() {
        let mut agent = agent().with_indicator(Led::default());
        // off at start, active high
        assert_eq!(agent.indicator().levels, [false]);

        agent.tick(0);
        assert!(!agent.indicator_lit());

        agent.post_event(LinkEvent::LinkUp(LinkInfo::default()));
        agent.tick(1_000);
        assert!(agent.indicator_lit());
        agent.tick(10_000);
        agent.tick(21_000);

        assert_eq!(agent.diagnostics().publish_count, 2);
        assert!(!agent.indicator_lit());
        assert_eq!(agent.indicator().levels, [false, true, false]);
    }

    #[test]
    fn active_low_indicator_inverts_levels() {
        let config = AgentConfig::default().with_indicator_active_high(false);
        let mut agent = Agent::new(&config, ConstBus(20.0), Loopback::default(), ())
            .unwrap()
            .with_indicator(Led::default());
        agent.post_event(LinkEvent::LinkUp(LinkInfo::default()));

        agent.tick(0);
        agent.tick(20_000);

        assert_eq!(agent.indicator().levels, [true, false, true]);
    }
}
