//! Inkplate network layer.
//!
//! WiFi association, a bounded HTTPS quote fetch and one-shot network time
//! synchronization for an e-paper device. Everything except the ESP-IDF
//! drivers (behind the `esp32` feature) builds and tests on the host.

pub mod config;
pub mod context;
pub mod device;
pub mod network;
pub mod quote;
pub mod time;
pub mod wifi;

#[cfg(test)]
mod mock;

// Re-export commonly used items
pub use config::{CredentialError, Credentials, NetworkConfig, TimeFormat};
pub use context::{ClockState, ConnectionState, NetworkContext};
pub use device::Network;
pub use quote::{FetchError, LogDisplay, QuoteRecord, StatusDisplay};
pub use time::{TimeError, TimeSpec};
