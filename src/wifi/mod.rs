//! ESP-IDF WiFi driver.
//!
//! # Components
//!
//! - [`connection`] - station-mode [`Radio`](crate::network::Radio) over the
//!   ESP-IDF driver (ESP32 only)
//! - [`reason`] - which driver disconnect reasons mean the credentials were
//!   refused
//!
//! Credential types live in [`crate::config`] so they can be validated and
//! tested on the host.

#[cfg(feature = "esp32")]
mod connection;
pub mod reason;

#[cfg(feature = "esp32")]
pub use connection::EspRadio;
