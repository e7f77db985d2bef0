//! Host radio.
//!
//! On host systems the OS owns the network. This radio accepts any
//! credentials, reports the link as up, and detects the local IP address.

use super::{LinkStatus, Radio, RadioError};
use crate::config::Credentials;
use log::{debug, info};
use std::net::IpAddr;

/// Always-up radio for host builds.
#[derive(Debug, Default)]
pub struct HostRadio {
    ip_addr: Option<IpAddr>,
    associated: bool,
}

impl HostRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary local IP address.
    ///
    /// "Connecting" a UDP socket to a public address sends nothing but makes
    /// the OS pick the outbound interface, whose address we then read back.
    fn detect_local_ip() -> Option<IpAddr> {
        use std::net::UdpSocket;

        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        let local_addr = socket.local_addr().ok()?;
        Some(local_addr.ip())
    }
}

impl Radio for HostRadio {
    fn associate(&mut self, credentials: &Credentials) -> Result<(), RadioError> {
        debug!(
            "Host radio ignoring SSID '{}', using OS network",
            credentials.ssid()
        );
        self.ip_addr = Self::detect_local_ip();
        self.associated = true;

        match self.ip_addr {
            Some(ip) => info!("Host network ready, local IP: {}", ip),
            None => info!("Host network ready, no route detected"),
        }
        Ok(())
    }

    fn status(&mut self) -> LinkStatus {
        // Real failures surface at the socket level
        if self.associated {
            LinkStatus::Up
        } else {
            LinkStatus::Down
        }
    }

    fn disconnect(&mut self) -> Result<(), RadioError> {
        self.associated = false;
        self.ip_addr = None;
        Ok(())
    }

    fn ip_addr(&self) -> Option<IpAddr> {
        self.ip_addr
    }
}
