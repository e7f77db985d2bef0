//! HTTP client primitive.
//!
//! Only a single GET with a bounded body read is needed. The response owns
//! the underlying connection, so dropping it closes the socket on every
//! path, including early returns through `?`.

use std::fmt;
use std::time::Duration;

/// Issues GET requests.
pub trait HttpTransport {
    type Response: HttpResponse;

    /// Send a GET and wait for the response headers.
    ///
    /// `timeout` bounds connect, TLS handshake and the wait for headers.
    fn get(&mut self, url: &str, timeout: Duration) -> Result<Self::Response, TransportError>;
}

/// An open response. Dropping it releases the connection.
pub trait HttpResponse {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Read body bytes into `buf`. `Ok(0)` means end of body.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request or body read exceeded its timeout.
    Timeout,
    /// TCP connect or TLS handshake failed.
    Connect(String),
    /// The request could not be built or sent.
    Request(String),
    /// Reading the body failed.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Connect(msg) => write!(f, "connect failed: {}", msg),
            Self::Request(msg) => write!(f, "request failed: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Io(e.to_string()),
        }
    }
}
