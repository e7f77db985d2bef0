//! Network abstraction layer.
//!
//! The radio and the HTTP client are opaque primitives behind two traits so
//! the same connectivity and fetch logic runs on:
//! - **ESP32** (`esp32` feature): ESP-IDF WiFi and HTTPS client
//! - **Host**: OS networking and `reqwest`
//! - **Tests**: scripted mocks
//!
//! # Example
//!
//! ```ignore
//! use inkquote_net::config::{Credentials, LinkConfig};
//! use inkquote_net::network::{ConnectivityManager, HostRadio};
//! use inkquote_net::NetworkContext;
//!
//! let mut ctx = NetworkContext::new();
//! let mut link = ConnectivityManager::new(HostRadio::new(), LinkConfig::default());
//! let creds = Credentials::new("HomeNet", "password123")?;
//! link.begin(&mut ctx, &creds);
//! assert!(ctx.is_connected());
//! ```

use crate::config::Credentials;
use std::fmt;
use std::net::IpAddr;

mod http;
mod manager;

#[cfg(not(target_os = "espidf"))]
mod host;
#[cfg(not(target_os = "espidf"))]
mod http_host;

#[cfg(feature = "esp32")]
mod http_esp;

pub use http::{HttpResponse, HttpTransport, TransportError};
pub use manager::ConnectivityManager;

#[cfg(not(target_os = "espidf"))]
pub use host::HostRadio;
#[cfg(not(target_os = "espidf"))]
pub use http_host::{HostHttpResponse, HostHttpTransport};

#[cfg(feature = "esp32")]
pub use http_esp::{EspHttpResponse, EspHttpTransport};

/// Link status as reported by the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Not associated.
    Down,
    /// Association or DHCP still in progress.
    Associating,
    /// Associated with an IP address.
    Up,
    /// The access point refused us (bad passphrase, incompatible security).
    Rejected,
}

/// WiFi radio primitive.
///
/// `associate` starts the attempt and may return before the link is up;
/// completion is observed through `status`.
pub trait Radio {
    /// Begin associating with the given network.
    fn associate(&mut self, credentials: &Credentials) -> Result<(), RadioError>;

    /// Current link status.
    fn status(&mut self) -> LinkStatus;

    /// Leave the network.
    fn disconnect(&mut self) -> Result<(), RadioError>;

    /// Local IP address, if the driver knows it.
    fn ip_addr(&self) -> Option<IpAddr> {
        None
    }
}

/// Radio driver errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    /// The driver refused the SSID or passphrase.
    InvalidCredentials,
    /// Driver-level failure.
    Driver(String),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "credentials rejected by driver"),
            Self::Driver(msg) => write!(f, "radio driver error: {}", msg),
        }
    }
}

impl std::error::Error for RadioError {}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for RadioError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Driver(format!("{:?}", e))
    }
}
