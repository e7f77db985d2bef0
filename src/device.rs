//! Device-level network facade.
//!
//! [`Network`] owns one shared [`NetworkContext`] and the three components
//! that read and write it. Operations are blocking and must be sequenced by
//! the caller: `begin` first, then any number of `get_data` / `get_time`.
//! Neither of those reconnects on its own; without a link they return
//! immediately with an empty quote or the local clock.
//!
//! # Example
//!
//! ```ignore
//! use inkquote_net::config::NetworkConfig;
//! use inkquote_net::network::{HostHttpTransport, HostRadio};
//! use inkquote_net::quote::{LogDisplay, QuoteRecord};
//! use inkquote_net::time::{SntpClient, SoftwareClock};
//! use inkquote_net::Network;
//!
//! let config = NetworkConfig::default();
//! let mut net = Network::new(
//!     HostRadio::new(),
//!     HostHttpTransport::new()?,
//!     SntpClient::new(config.time.servers.clone()),
//!     SoftwareClock::new(),
//!     &config,
//! );
//! net.begin("HomeNet", "password123");
//!
//! let mut record: QuoteRecord<256, 64> = QuoteRecord::new();
//! net.get_data(&mut record, &mut LogDisplay);
//!
//! let mut clock: heapless::String<16> = heapless::String::new();
//! net.get_time(&mut clock, 0, 1);
//! ```

use crate::config::{Credentials, NetworkConfig};
use crate::context::{ConnectionState, NetworkContext};
use crate::network::{ConnectivityManager, HttpTransport, Radio};
use crate::quote::{FetchError, QuoteFetcher, QuoteRecord, StatusDisplay};
use crate::time::{SystemClock, TimeSource, TimeSpec, TimeSynchronizer};
use log::warn;

/// WiFi link, quote fetcher and clock for one device.
pub struct Network<R: Radio, T: HttpTransport, S: TimeSource, C: SystemClock> {
    ctx: NetworkContext,
    link: ConnectivityManager<R>,
    quotes: QuoteFetcher<T>,
    time: TimeSynchronizer<S, C>,
}

impl<R, T, S, C> Network<R, T, S, C>
where
    R: Radio,
    T: HttpTransport,
    S: TimeSource,
    C: SystemClock,
{
    pub fn new(radio: R, transport: T, source: S, clock: C, config: &NetworkConfig) -> Self {
        Self {
            ctx: NetworkContext::new(),
            link: ConnectivityManager::new(radio, config.link.clone()),
            quotes: QuoteFetcher::new(transport, config.quote.clone()),
            time: TimeSynchronizer::new(source, clock, config.time.clone()),
        }
    }

    /// Join the network and wait, bounded, for the link.
    ///
    /// Credentials the driver could never accept leave the context `Failed`
    /// without touching the radio.
    pub fn begin(&mut self, ssid: &str, passphrase: &str) -> ConnectionState {
        match Credentials::new(ssid, passphrase) {
            Ok(credentials) => self.begin_with(&credentials),
            Err(e) => {
                warn!("Refusing to connect: {}", e);
                self.ctx.set_state(ConnectionState::Failed);
                self.ctx.state()
            }
        }
    }

    /// [`begin`](Self::begin) with pre-validated credentials.
    pub fn begin_with(&mut self, credentials: &Credentials) -> ConnectionState {
        self.link.begin(&mut self.ctx, credentials)
    }

    /// Fetch a quote into `record`. `false` leaves `record` empty.
    pub fn get_data<const Q: usize, const A: usize>(
        &mut self,
        record: &mut QuoteRecord<Q, A>,
        display: &mut impl StatusDisplay,
    ) -> bool {
        self.link.refresh(&mut self.ctx);
        self.quotes.get_data(&self.ctx, record, display)
    }

    /// Like [`get_data`](Self::get_data), with the failure reason.
    pub fn fetch_quote<const Q: usize, const A: usize>(
        &mut self,
        record: &mut QuoteRecord<Q, A>,
        display: &mut impl StatusDisplay,
    ) -> Result<usize, FetchError> {
        self.link.refresh(&mut self.ctx);
        self.quotes.fetch(&self.ctx, record, display)
    }

    /// Write the current time, shifted by `offset_secs` plus `time_zone`
    /// whole hours, into `out`.
    pub fn get_time<const N: usize>(
        &mut self,
        out: &mut heapless::String<N>,
        offset_secs: i64,
        time_zone: i32,
    ) {
        self.link.refresh(&mut self.ctx);
        self.time
            .get_time(&mut self.ctx, out, TimeSpec::new(offset_secs, time_zone));
    }

    pub fn disconnect(&mut self) {
        self.link.disconnect(&mut self.ctx);
    }

    pub fn context(&self) -> &NetworkContext {
        &self.ctx
    }

    pub fn link(&self) -> &ConnectivityManager<R> {
        &self.link
    }

    pub fn quotes(&self) -> &QuoteFetcher<T> {
        &self.quotes
    }

    pub fn time(&self) -> &TimeSynchronizer<S, C> {
        &self.time
    }
}
