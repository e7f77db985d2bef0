//! Shared link and clock state.
//!
//! One [`NetworkContext`] is threaded by reference through every network
//! operation. Only the connectivity manager changes the connection state and
//! only the time synchronizer changes the clock state.

use std::fmt;

/// WiFi link state as seen by the rest of the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No association attempted, or the link was torn down or lost.
    #[default]
    Disconnected,
    /// Association in progress.
    Connecting,
    /// Link is up; network operations may proceed.
    Connected,
    /// Association was rejected or timed out.
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the system clock has been set from the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Unsynchronized,
    /// Terminal for the lifetime of the context.
    Synchronized,
}

/// Link and clock state for one device.
#[derive(Debug, Clone, Default)]
pub struct NetworkContext {
    state: ConnectionState,
    clock: ClockState,
}

impl NetworkContext {
    /// Fresh context: disconnected, clock unsynchronized.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True only in [`ConnectionState::Connected`].
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock
    }

    pub fn is_synchronized(&self) -> bool {
        self.clock == ClockState::Synchronized
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            log::debug!("Link state: {} -> {}", self.state, state);
            self.state = state;
        }
    }

    pub(crate) fn mark_synchronized(&mut self) {
        self.clock = ClockState::Synchronized;
    }
}
