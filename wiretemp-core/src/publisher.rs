//! Periodic publisher
//!
//! Serializes channel aggregates and diagnostic counters as plain decimal text
//! and hands them to the transport, one message per topic:
//!
//! ```text
//! <root>/<sensorId>/tempC         aggregate, 2 decimals
//! <root>/<sensorId>/tempF         same statistic projected to Fahrenheit
//! <root>/publishCount
//! <root>/networkCallbackCount
//! <root>/mqttCallbackCount
//! <root>/mac                      AA:BB:CC:00:11:22
//! <root>/ip                       192.168.1.50
//! ```
//!
//! Nothing is queued while disconnected: a tick outside `Connected` is a no-op
//! and does not move the publish mark, so the first tick after reconnecting
//! publishes straight away.

use core::fmt::{self, Write};

use heapless::String;

use crate::buffer::Aggregate;
use crate::channel::SensorChannel;
use crate::connection::ConnectionState;
use crate::constants::buffers::{MAX_TOPIC_LENGTH, MAX_TOPIC_ROOT_LENGTH, VALUE_BUFFER_SIZE};
use crate::constants::network::{
    TOPIC_COMMANDS, TOPIC_IP, TOPIC_MAC, TOPIC_MQTT_CALLBACK_COUNT, TOPIC_NETWORK_CALLBACK_COUNT,
    TOPIC_PUBLISH_COUNT, TOPIC_TEMP_C, TOPIC_TEMP_F,
};
use crate::diagnostics::Diagnostics;
use crate::errors::TransportError;
use crate::events::LinkDescriptors;
use crate::time::{IntervalTimer, Millis, Timestamp};
use crate::traits::TransportClient;

/// Full topic path
pub type Topic = String<MAX_TOPIC_LENGTH>;

/// Serialized value
pub type Payload = String<VALUE_BUFFER_SIZE>;

/// Join `root` and `segments` with `/`
pub fn topic(root: &str, segments: &[&str]) -> Result<Topic, TransportError> {
    let mut out = Topic::new();
    out.push_str(root).map_err(|_| TransportError::TooLarge)?;
    for segment in segments {
        out.push('/').map_err(|_| TransportError::TooLarge)?;
        out.push_str(segment).map_err(|_| TransportError::TooLarge)?;
    }
    Ok(out)
}

fn payload(value: impl fmt::Display) -> Result<Payload, TransportError> {
    let mut out = Payload::new();
    write!(out, "{}", value).map_err(|_| TransportError::TooLarge)?;
    Ok(out)
}

/// Two fractional digits, e.g. `21.50`
fn temperature(value: f32) -> Result<Payload, TransportError> {
    let mut out = Payload::new();
    write!(out, "{:.2}", value).map_err(|_| TransportError::TooLarge)?;
    Ok(out)
}

/// What one publish cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Messages accepted by the transport
    pub sent: usize,
    /// Messages refused or unserializable
    pub failed: usize,
    /// Channels skipped for an empty window
    pub skipped: usize,
}

/// Time-gated publisher for aggregates and counters
#[derive(Debug, Clone)]
pub struct Publisher {
    timer: IntervalTimer,
    root: String<MAX_TOPIC_ROOT_LENGTH>,
    aggregate: Aggregate,
}

impl Publisher {
    pub fn new(root: String<MAX_TOPIC_ROOT_LENGTH>, interval: Millis, aggregate: Aggregate) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            root,
            aggregate,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    pub fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    /// `<root>/commands`
    pub fn command_topic(&self) -> Result<Topic, TransportError> {
        topic(&self.root, &[TOPIC_COMMANDS])
    }

    /// Publish if connected and the interval has elapsed
    pub fn tick<T: TransportClient>(
        &mut self,
        now: Timestamp,
        state: ConnectionState,
        channels: &[SensorChannel],
        link: &LinkDescriptors,
        diagnostics: &mut Diagnostics,
        transport: &mut T,
    ) -> Option<PublishReport> {
        if state != ConnectionState::Connected {
            return None;
        }
        if !self.timer.fire(now) {
            return None;
        }
        Some(self.publish(channels, link, diagnostics, transport))
    }

    /// One full publish cycle, ignoring the timer
    pub fn publish<T: TransportClient>(
        &mut self,
        channels: &[SensorChannel],
        link: &LinkDescriptors,
        diagnostics: &mut Diagnostics,
        transport: &mut T,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        for channel in channels {
            let reading = match channel.aggregate(self.aggregate) {
                Ok(reading) => reading,
                Err(_) => {
                    log_debug!("{}: window empty, nothing to publish", channel.id());
                    report.skipped += 1;
                    continue;
                }
            };

            let celsius = topic(&self.root, &[channel.id(), TOPIC_TEMP_C])
                .and_then(|t| Ok((t, temperature(reading.celsius)?)));
            self.send(celsius, transport, diagnostics, &mut report);

            let fahrenheit = topic(&self.root, &[channel.id(), TOPIC_TEMP_F])
                .and_then(|t| Ok((t, temperature(reading.fahrenheit)?)));
            self.send(fahrenheit, transport, diagnostics, &mut report);
        }

        let counters = [
            (TOPIC_PUBLISH_COUNT, diagnostics.publish_count),
            (TOPIC_NETWORK_CALLBACK_COUNT, diagnostics.network_callbacks),
            (TOPIC_MQTT_CALLBACK_COUNT, diagnostics.transport_callbacks),
        ];
        for (name, value) in counters {
            let message = topic(&self.root, &[name]).and_then(|t| Ok((t, payload(value)?)));
            self.send(message, transport, diagnostics, &mut report);
        }

        let mac = topic(&self.root, &[TOPIC_MAC]).and_then(|t| Ok((t, payload(link.mac)?)));
        self.send(mac, transport, diagnostics, &mut report);

        let ip = topic(&self.root, &[TOPIC_IP]).and_then(|t| Ok((t, payload(link.ip)?)));
        self.send(ip, transport, diagnostics, &mut report);

        diagnostics.record_publish();
        log_info!(
            "publish #{}: {} sent, {} failed, {} channels empty",
            diagnostics.publish_count,
            report.sent,
            report.failed,
            report.skipped
        );

        report
    }

    fn send<T: TransportClient>(
        &self,
        message: Result<(Topic, Payload), TransportError>,
        transport: &mut T,
        diagnostics: &mut Diagnostics,
        report: &mut PublishReport,
    ) {
        let result = message.and_then(|(topic, value)| {
            log_trace!("{} <- {}", topic, value);
            transport.publish(&topic, &value).map_err(|e| {
                log_warn!("publish to {} failed: {}", topic, e);
                e
            })
        });

        match result {
            Ok(()) => report.sent += 1,
            Err(_) => {
                diagnostics.record_failed_send();
                report.failed += 1;
            }
        }
    }
}
