//! Configuration types.
//!
//! # Components
//!
//! - [`wifi`] - WiFi credentials and validation
//! - [`network`] - Endpoints, timeouts and wire formats
//!
//! Nothing here is persisted; the caller supplies credentials on every boot.

mod network;
mod wifi;

pub use network::{
    LinkConfig, NetworkConfig, QuoteEndpoint, ResponseFormat, TimeConfig, TimeFormat,
    CONNECTION_TIMEOUT, DEFAULT_QUOTE_URL, LINK_POLL_INTERVAL, MAX_BODY_LEN, NTP_SERVERS,
    REQUEST_TIMEOUT, SYNC_TIMEOUT,
};
pub use wifi::{
    CredentialError, Credentials, MAX_PASSPHRASE_LEN, MAX_SSID_LEN, MIN_PASSPHRASE_LEN,
};
