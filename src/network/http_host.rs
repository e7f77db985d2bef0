//! Host HTTPS transport backed by `reqwest`'s blocking client (rustls).

use super::{HttpResponse, HttpTransport, TransportError};
use log::debug;
use std::io::Read;
use std::time::Duration;

/// Blocking HTTPS client for host builds.
pub struct HostHttpTransport {
    client: reqwest::blocking::Client,
}

impl HostHttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("inkquote-net/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for HostHttpTransport {
    type Response = HostHttpResponse;

    fn get(&mut self, url: &str, timeout: Duration) -> Result<HostHttpResponse, TransportError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(map_reqwest_error)?;
        Ok(HostHttpResponse { inner: response })
    }
}

/// Open `reqwest` response; the connection returns to the pool on drop.
pub struct HostHttpResponse {
    inner: reqwest::blocking::Response,
}

impl HttpResponse for HostHttpResponse {
    fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.inner.read(buf)?)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}
