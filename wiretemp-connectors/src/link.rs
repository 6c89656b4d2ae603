//! Host network link
//!
//! On a host the operating system owns the interface, so there are no
//! carrier callbacks to forward. `HostLink` reports the link as up and
//! addressed once at startup, which is all the connection manager needs to
//! leave `LinkDown`. Further events can be injected with `push` to exercise
//! link flaps.

use std::collections::VecDeque;
use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use wiretemp_core::{LinkDriver, LinkEvent, LinkInfo};

/// Link driver for a host whose interface is managed by the OS
#[derive(Debug, Clone, Default)]
pub struct HostLink {
    pending: VecDeque<LinkEvent>,
}

impl HostLink {
    /// Report link-up then got-address with `info`
    pub fn new(info: LinkInfo) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(LinkEvent::LinkUp(info));
        pending.push_back(LinkEvent::GotAddress(info));
        Self { pending }
    }

    /// Like `new`, with the source address the OS would use to reach `broker`
    ///
    /// Falls back to the placeholder address when the route cannot be found.
    pub fn detect(broker: &str, port: u16) -> Self {
        let mut info = LinkInfo::default();
        match route_address(broker, port) {
            Ok(ip) => {
                log::info!("local address towards {} is {}", broker, ip);
                info = info.with_ip(ip);
            }
            Err(e) => log::warn!("cannot determine local address towards {}: {}", broker, e),
        }
        Self::new(info)
    }

    /// Queue an extra event
    pub fn push(&mut self, event: LinkEvent) {
        self.pending.push_back(event);
    }
}

impl LinkDriver for HostLink {
    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.pending.pop_front()
    }
}

/// Connecting a UDP socket selects a route without sending anything
fn route_address(host: &str, port: u16) -> io::Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect((host, port))?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(ip) => Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("route uses IPv6 address {}", ip),
        )),
    }
}
