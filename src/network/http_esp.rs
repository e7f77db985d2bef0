//! ESP32 HTTPS transport.
//!
//! Uses the ESP-IDF HTTP client with the bundled CA certificates, so any
//! public HTTPS endpoint verifies without shipping a pinned certificate.

use super::{HttpResponse, HttpTransport, TransportError};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::http::Method;
use esp_idf_sys::EspError;
use log::debug;
use std::time::Duration;

/// ESP-IDF HTTPS client. A fresh connection is opened per request.
#[derive(Debug, Default)]
pub struct EspHttpTransport;

impl EspHttpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl HttpTransport for EspHttpTransport {
    type Response = EspHttpResponse;

    fn get(&mut self, url: &str, timeout: Duration) -> Result<EspHttpResponse, TransportError> {
        debug!("GET {}", url);
        let mut conn = EspHttpConnection::new(&Configuration {
            timeout: Some(timeout),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|e| TransportError::Connect(format!("{:?}", e)))?;

        conn.initiate_request(Method::Get, url, &[("Accept", "application/json")])
            .map_err(map_esp_error)?;
        conn.initiate_response().map_err(map_esp_error)?;

        Ok(EspHttpResponse { conn })
    }
}

/// Open ESP-IDF response; dropping it closes the TLS session.
pub struct EspHttpResponse {
    conn: EspHttpConnection,
}

impl HttpResponse for EspHttpResponse {
    fn status(&self) -> u16 {
        self.conn.status()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.conn.read(buf).map_err(map_esp_error)
    }
}

fn map_esp_error(e: EspError) -> TransportError {
    if e.code() == esp_idf_sys::ESP_ERR_TIMEOUT as esp_idf_sys::esp_err_t {
        TransportError::Timeout
    } else {
        TransportError::Io(format!("{:?}", e))
    }
}
