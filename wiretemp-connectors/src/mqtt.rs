//! MQTT transport for the wiretemp agent
//!
//! Wraps the synchronous `rumqttc` client. The agent's loop must never block,
//! so `connect` only creates the client and hands its `Connection` to a
//! worker thread that iterates it. The worker forwards every notification
//! over a channel; `process_inbound` only drains that channel. The session
//! counts as up once the broker's CONNACK has been seen.
//!
//! ```text
//! connect()          ──▶ Client created, worker thread owns the Connection
//! worker             ──▶ connection.iter() ──mpsc──▶ session.events
//! process_inbound()  ──▶ ConnAck(Success)  → connected
//!                        Publish           → AgentEvent::Inbound
//!                        error/Disconnect  → session dropped, reason kept
//! ```
//!
//! The worker stops on the first error, which keeps `rumqttc` from
//! reconnecting on its own: the connection manager in the core owns the
//! retry cadence.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use rumqttc::{
    Client, ClientError, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions,
    Packet, QoS,
};
use wiretemp_core::queue::EventQueue;
use wiretemp_core::{ConnectError, InboundMessage, TransportClient, TransportError};

/// Keep-alive negotiated with the broker
const KEEP_ALIVE_SECS: u64 = 15;

/// Outgoing request queue between client and event loop
const REQUEST_CAPACITY: usize = 64;

/// Upper bound on notifications handled per `process_inbound` call
const MAX_EVENTS_PER_POLL: usize = 32;

type Notification = Result<Event, ConnectionError>;

/// Transport statistics
#[derive(Debug, Default, Clone)]
pub struct TransportStats {
    /// Messages handed to the client
    pub messages_sent: u64,
    /// Messages refused by the client
    pub messages_failed: u64,
    /// Payload bytes handed to the client
    pub bytes_sent: u64,
    /// Sessions established
    pub sessions: u32,
    /// Last error message
    pub last_error: Option<String>,
}

struct Session {
    client: Client,
    events: Receiver<Notification>,
}

/// Iterate the connection until it fails or the session is dropped
fn drive(mut connection: Connection, events: Sender<Notification>) {
    for notification in connection.iter() {
        let failed = notification.is_err();
        if events.send(notification).is_err() || failed {
            break;
        }
    }
    log::debug!("mqtt event loop stopped");
}

/// `TransportClient` over a `rumqttc` synchronous client
pub struct MqttTransport {
    session: Option<Session>,
    connected: bool,
    last_error: Option<ConnectError>,
    stats: TransportStats,
}

impl MqttTransport {
    pub fn new() -> Self {
        Self {
            session: None,
            connected: false,
            last_error: None,
            stats: TransportStats::default(),
        }
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    /// Reason the last session ended or failed to start
    pub fn last_error(&self) -> Option<ConnectError> {
        self.last_error
    }

    fn drop_session(&mut self, reason: ConnectError, detail: String) {
        if self.session.take().is_some() {
            log::warn!("mqtt session closed: {} ({})", reason, detail);
        }
        self.connected = false;
        self.last_error = Some(reason);
        self.stats.last_error = Some(detail);
    }

    fn client(&mut self) -> Result<&mut Client, TransportError> {
        match self.session.as_mut() {
            Some(session) if self.connected => Ok(&mut session.client),
            _ => Err(TransportError::NotConnected),
        }
    }
}
impl Default for MqttTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportClient for MqttTransport {
    fn connect(&mut self, broker: &str, port: u16, client_id: &str) -> Result<(), ConnectError> {
        if let Some(old) = self.session.take() {
            let _ = old.client.try_disconnect();
        }
        self.connected = false;

        let mut options = MqttOptions::new(client_id, broker, port);
        options.set_keep_alive(Duration::from_secs(KEEP_ALIVE_SECS));
        options.set_clean_session(true);

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        let (tx, events) = mpsc::channel();
        thread::Builder::new()
            .name("mqtt-eventloop".into())
            .spawn(move || drive(connection, tx))
            .map_err(|e| {
                log::error!("cannot start mqtt event loop: {}", e);
                ConnectError::ConnectFailed
            })?;

        self.session = Some(Session { client, events });
        log::debug!("mqtt client created for {}:{}", broker, port);
        Ok(())
    }

    fn publish(&mut self, topic: &str, value: &str) -> Result<(), TransportError> {
        let client = self.client()?;
        let result = client
            .try_publish(topic, QoS::AtMostOnce, false, value.as_bytes().to_vec())
            .map_err(publish_error);

        match result {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += value.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.stats.messages_failed += 1;
                Err(e)
            }
        }
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client()?
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(publish_error)
    }

    /// Drain forwarded notifications without waiting
    ///
    /// Stops while the inbox is full; anything left stays in the channel for
    /// the next call.
    fn process_inbound<const N: usize>(&mut self, inbox: &mut EventQueue<N>) {
        for _ in 0..MAX_EVENTS_PER_POLL {
            if inbox.is_full() {
                return;
            }
            let Some(session) = self.session.as_mut() else {
                return;
            };

            let event = match session.events.try_recv() {
                Ok(Ok(event)) => event,
                Ok(Err(e)) => {
                    let reason = connection_error(&e);
                    self.drop_session(reason, e.to_string());
                    return;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.drop_session(ConnectError::Disconnected, "event loop stopped".into());
                    return;
                }
            };

            match event {
                Event::Incoming(Packet::ConnAck(ack)) => match refused(&ack.code) {
                    None => {
                        log::info!("mqtt session established");
                        self.connected = true;
                        self.last_error = None;
                        self.stats.sessions += 1;
                    }
                    Some(reason) => {
                        self.drop_session(reason, format!("{:?}", ack.code));
                        return;
                    }
                },
                Event::Incoming(Packet::Publish(publish)) => {
                    let message = InboundMessage::new(&publish.topic, &publish.payload);
                    if !inbox.push(message.into()) {
                        log::warn!("event queue full, dropped message on {}", publish.topic);
                    }
                }
                Event::Incoming(Packet::Disconnect) => {
                    self.drop_session(ConnectError::Disconnected, "broker sent DISCONNECT".into());
                    return;
                }
                other => log::trace!("mqtt event: {:?}", other),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// CONNACK code to failure reason; `None` means accepted
fn refused(code: &ConnectReturnCode) -> Option<ConnectError> {
    match code {
        ConnectReturnCode::Success => None,
        ConnectReturnCode::RefusedProtocolVersion => Some(ConnectError::BadProtocol),
        ConnectReturnCode::BadClientId => Some(ConnectError::BadClientId),
        ConnectReturnCode::ServiceUnavailable => Some(ConnectError::Unavailable),
        ConnectReturnCode::BadUserNamePassword => Some(ConnectError::BadCredentials),
        ConnectReturnCode::NotAuthorized => Some(ConnectError::Unauthorized),
    }
}

fn connection_error(error: &ConnectionError) -> ConnectError {
    match error {
        ConnectionError::ConnectionRefused(code) => {
            refused(code).unwrap_or(ConnectError::ConnectFailed)
        }
        ConnectionError::NetworkTimeout => ConnectError::ConnectionTimeout,
        ConnectionError::Io(_) => ConnectError::ConnectFailed,
        _ => ConnectError::ConnectionLost,
    }
}

/// The request channel is full or the event loop is gone
fn publish_error(error: ClientError) -> TransportError {
    log::debug!("mqtt request refused: {}", error);
    TransportError::Rejected
}
