//! SNTP client over `std::net::UdpSocket`.
//!
//! Sends a 48-byte mode-3 request and reads the server's transmit
//! timestamp. Servers are tried in order, once each, and the whole attempt
//! (name resolution included) shares a single deadline.

use super::{TimeError, TimeSource};
use log::{debug, info, warn};
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// SNTP port (UDP 123).
pub const SNTP_PORT: u16 = 123;

/// NTP packet size without extensions.
const NTP_PACKET_LEN: usize = 48;

/// LI=0, VN=3, Mode=3 (client).
const NTP_CLIENT_HEADER: u8 = 0x1B;

/// Seconds between the NTP era (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// Highest stratum accepted. 0 is a kiss-o'-death, 16 is unsynchronized.
const MAX_STRATUM: u8 = 15;

/// SNTP time source for host builds.
#[derive(Debug, Clone)]
pub struct SntpClient {
    servers: Vec<String>,
}

impl SntpClient {
    /// Client for `servers`, tried in order. Each entry is an IP address,
    /// a socket address (`1.2.3.4:123`, `[::1]:123`), a host name or
    /// `host:port`.
    pub fn new(servers: Vec<String>) -> Self {
        Self { servers }
    }

    /// Resolve `server`, giving up after `timeout`.
    ///
    /// Literal addresses never touch DNS. Names are looked up on a helper
    /// thread; on timeout the thread is abandoned and finishes on its own.
    fn resolve(server: &str, timeout: Duration) -> Result<SocketAddr, TimeError> {
        if let Ok(addr) = server.parse::<SocketAddr>() {
            return Ok(addr);
        }
        if let Ok(ip) = server.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, SNTP_PORT));
        }

        let host = server.to_string();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let resolved = if host.contains(':') {
                host.to_socket_addrs()
            } else {
                (host.as_str(), SNTP_PORT).to_socket_addrs()
            };
            let _ = tx.send(resolved.map(|mut addrs| addrs.next()));
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(Some(addr))) => Ok(addr),
            Ok(Ok(None)) => Err(TimeError::Network(format!("no address for {}", server))),
            Ok(Err(e)) => Err(TimeError::Network(format!("resolve {}: {}", server, e))),
            Err(RecvTimeoutError::Timeout) => Err(TimeError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(TimeError::Network(format!(
                "resolver for {} exited",
                server
            ))),
        }
    }

    /// One request/response exchange with `server`, finished by `deadline`.
    fn query(server: &str, deadline: Instant) -> Result<i64, TimeError> {
        let addr = Self::resolve(server, remaining(deadline)?)?;
        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).map_err(network_error)?;
        socket.connect(addr).map_err(network_error)?;

        let mut request = [0u8; NTP_PACKET_LEN];
        request[0] = NTP_CLIENT_HEADER;

        let sent_at = Instant::now();
        socket.send(&request).map_err(network_error)?;
        debug!("Sent SNTP request to {}", addr);

        let mut response = [0u8; NTP_PACKET_LEN];
        socket
            .set_read_timeout(Some(remaining(deadline)?))
            .map_err(network_error)?;
        let len = socket.recv(&mut response).map_err(|e| match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TimeError::Timeout,
            _ => network_error(e),
        })?;
        let rtt = sent_at.elapsed();

        let secs = parse_response(&response[..len])?;
        // Round to the nearest second after half-RTT correction
        let correction = ((rtt / 2).as_millis() as i64 + 500) / 1000;
        Ok(secs + correction)
    }
}

impl TimeSource for SntpClient {
    /// Query the servers in order within one `timeout` budget.
    ///
    /// Each server gets an equal share of whatever budget is left, so a
    /// silent server cannot starve the ones after it.
    fn sync(&mut self, timeout: Duration) -> Result<i64, TimeError> {
        info!("Starting SNTP synchronization");
        let deadline = Instant::now() + timeout;

        for (i, server) in self.servers.iter().enumerate() {
            let left = match remaining(deadline) {
                Ok(left) => left,
                Err(e) => {
                    warn!("SNTP budget of {:?} exhausted before {}", timeout, server);
                    return Err(e);
                }
            };
            let share = left / (self.servers.len() - i) as u32;
            match Self::query(server, Instant::now() + share) {
                Ok(secs) => {
                    info!("SNTP sync with {} successful", server);
                    return Ok(secs);
                }
                Err(e) => warn!("SNTP sync with {} failed: {}", server, e),
            }
        }
        Err(TimeError::AllServersFailed)
    }
}

/// Time left until `deadline`, or `Timeout` if none.
fn remaining(deadline: Instant) -> Result<Duration, TimeError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(TimeError::Timeout)
    } else {
        Ok(left)
    }
}

/// Validate an SNTP reply and return its transmit time as Unix seconds.
fn parse_response(packet: &[u8]) -> Result<i64, TimeError> {
    if packet.len() < NTP_PACKET_LEN {
        return Err(TimeError::InvalidResponse);
    }

    // Mode 4 = server
    if packet[0] & 0x07 != 4 {
        return Err(TimeError::InvalidResponse);
    }

    let stratum = packet[1];
    if stratum == 0 || stratum > MAX_STRATUM {
        return Err(TimeError::InvalidStratum(stratum));
    }

    // Transmit timestamp, seconds part (bytes 40-43)
    let ntp_secs = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]);
    if ntp_secs == 0 {
        return Err(TimeError::InvalidResponse);
    }
    Ok(i64::from(ntp_secs) - NTP_UNIX_OFFSET)
}

fn network_error(e: io::Error) -> TimeError {
    TimeError::Network(e.to_string())
}
