//! WiFi connection lifecycle.

use super::{LinkStatus, Radio};
use crate::config::{Credentials, LinkConfig};
use crate::context::{ConnectionState, NetworkContext};
use log::{info, warn};
use std::thread;
use std::time::Instant;

/// Drives a [`Radio`] and mirrors its status into a [`NetworkContext`].
pub struct ConnectivityManager<R: Radio> {
    radio: R,
    config: LinkConfig,
}

impl<R: Radio> ConnectivityManager<R> {
    pub fn new(radio: R, config: LinkConfig) -> Self {
        Self { radio, config }
    }

    /// Associate and wait for the link.
    ///
    /// Blocks for at most `connect_timeout` plus one poll interval. Ends in
    /// `Connected` or `Failed`; a failure is left for later operations to
    /// detect through the context.
    pub fn begin(
        &mut self,
        ctx: &mut NetworkContext,
        credentials: &Credentials,
    ) -> ConnectionState {
        info!("Connecting to WiFi: {}", credentials.ssid());
        ctx.set_state(ConnectionState::Connecting);

        if let Err(e) = self.radio.associate(credentials) {
            warn!("WiFi association failed to start: {}", e);
            ctx.set_state(ConnectionState::Failed);
            return ctx.state();
        }

        let deadline = Instant::now() + self.config.connect_timeout;
        loop {
            match self.radio.status() {
                LinkStatus::Up => {
                    ctx.set_state(ConnectionState::Connected);
                    match self.radio.ip_addr() {
                        Some(ip) => info!("Connected to WiFi, IP: {}", ip),
                        None => info!("Connected to WiFi"),
                    }
                    return ctx.state();
                }
                LinkStatus::Rejected => {
                    warn!("WiFi association rejected by {}", credentials.ssid());
                    ctx.set_state(ConnectionState::Failed);
                    return ctx.state();
                }
                LinkStatus::Down | LinkStatus::Associating => {}
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "WiFi connection timed out after {:?}",
                    self.config.connect_timeout
                );
                ctx.set_state(ConnectionState::Failed);
                return ctx.state();
            }
            thread::sleep(self.config.poll_interval.min(deadline - now));
        }
    }

    /// Re-read the radio status and drop to `Disconnected` if a connected
    /// link has gone away.
    pub fn refresh(&mut self, ctx: &mut NetworkContext) -> ConnectionState {
        if ctx.is_connected() {
            match self.radio.status() {
                LinkStatus::Up | LinkStatus::Associating => {}
                LinkStatus::Down | LinkStatus::Rejected => {
                    warn!("WiFi link lost");
                    ctx.set_state(ConnectionState::Disconnected);
                }
            }
        }
        ctx.state()
    }

    /// Leave the network. The context ends `Disconnected` even if the driver
    /// reports an error.
    pub fn disconnect(&mut self, ctx: &mut NetworkContext) {
        info!("Disconnecting from WiFi");
        if let Err(e) = self.radio.disconnect() {
            warn!("WiFi disconnect failed: {}", e);
        }
        ctx.set_state(ConnectionState::Disconnected);
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }
}
