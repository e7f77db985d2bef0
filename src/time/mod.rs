//! Wall-clock synchronization and formatting.
//!
//! The first `get_time` on a connected context pulls time from the network
//! and sets the [`SystemClock`]; every later call only reads the clock.
//! Without a link, or if synchronization fails, the current clock value is
//! formatted as-is (possibly the Unix epoch), so the caller always gets a
//! printable string.

#[cfg(feature = "esp32")]
mod esp_sntp;
#[cfg(not(target_os = "espidf"))]
mod sntp;

#[cfg(feature = "esp32")]
pub use esp_sntp::EspSntpSource;
#[cfg(not(target_os = "espidf"))]
pub use sntp::SntpClient;

use crate::config::{TimeConfig, TimeFormat};
use crate::context::NetworkContext;
use crate::quote::copy_bounded;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds per hour, for whole-hour time zone codes.
const SECS_PER_HOUR: i64 = 3600;

/// Network time source.
pub trait TimeSource {
    /// Query the network once and return the current Unix time in seconds.
    fn sync(&mut self, timeout: Duration) -> Result<i64, TimeError>;
}

/// Settable wall clock.
pub trait SystemClock {
    /// Current Unix time in seconds.
    fn now(&self) -> i64;

    /// Set the current Unix time in seconds.
    fn set(&mut self, unix_secs: i64);
}

/// OS time plus a correction applied by [`set`](SystemClock::set).
///
/// On ESP32 the SNTP service already sets the OS clock, so the correction
/// stays near zero. On hosts the OS clock is left untouched.
#[derive(Debug, Default, Clone)]
pub struct SoftwareClock {
    correction_secs: i64,
}

impl SoftwareClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn os_now() -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        }
    }
}

impl SystemClock for SoftwareClock {
    fn now(&self) -> i64 {
        Self::os_now().saturating_add(self.correction_secs)
    }

    fn set(&mut self, unix_secs: i64) {
        self.correction_secs = unix_secs.saturating_sub(Self::os_now());
    }
}

/// Per-call display adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpec {
    /// Seconds added to UTC.
    pub offset_secs: i64,
    /// Whole hours added on top of `offset_secs`.
    pub time_zone: i32,
}

impl TimeSpec {
    pub fn new(offset_secs: i64, time_zone: i32) -> Self {
        Self {
            offset_secs,
            time_zone,
        }
    }

    /// Total adjustment in seconds.
    pub fn total_offset(&self) -> i64 {
        self.offset_secs
            .saturating_add(i64::from(self.time_zone).saturating_mul(SECS_PER_HOUR))
    }
}

/// Time synchronization failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// No link; no query was sent.
    NotConnected,
    /// The server did not answer in time.
    Timeout,
    /// Socket or DNS failure.
    Network(String),
    /// Reply was too short or had an unusable timestamp.
    InvalidResponse,
    /// Server stratum outside 1..=MAX_STRATUM.
    InvalidStratum(u8),
    /// Every configured server failed.
    AllServersFailed,
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "network not connected"),
            Self::Timeout => write!(f, "time server timed out"),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::InvalidResponse => write!(f, "invalid time server response"),
            Self::InvalidStratum(s) => write!(f, "invalid stratum {}", s),
            Self::AllServersFailed => write!(f, "all time servers failed"),
        }
    }
}

impl std::error::Error for TimeError {}

/// Format `unix_secs` with `format`. Out-of-range instants fall back to
/// the Unix epoch.
pub fn format_time(unix_secs: i64, format: TimeFormat) -> String {
    let instant = DateTime::<Utc>::from_timestamp(unix_secs, 0).unwrap_or_default();
    instant.format(format.pattern()).to_string()
}

/// Copy `servers` into a fixed set of service slots in order, leaving
/// unused slots untouched. Returns how many servers did not fit.
#[cfg_attr(not(feature = "esp32"), allow(dead_code))]
pub(crate) fn fill_server_slots<'a>(slots: &mut [&'a str], servers: &'a [String]) -> usize {
    for (slot, server) in slots.iter_mut().zip(servers) {
        *slot = server.as_str();
    }
    servers.len().saturating_sub(slots.len())
}

/// Synchronizes the clock once and formats adjusted time.
pub struct TimeSynchronizer<S: TimeSource, C: SystemClock> {
    source: S,
    clock: C,
    config: TimeConfig,
}

impl<S: TimeSource, C: SystemClock> TimeSynchronizer<S, C> {
    pub fn new(source: S, clock: C, config: TimeConfig) -> Self {
        Self {
            source,
            clock,
            config,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Query the network time source and set the clock.
    ///
    /// Fails fast without a link. On success the context becomes
    /// `Synchronized` for good.
    pub fn synchronize(&mut self, ctx: &mut NetworkContext) -> Result<i64, TimeError> {
        if !ctx.is_connected() {
            return Err(TimeError::NotConnected);
        }
        let now = self.source.sync(self.config.sync_timeout)?;
        self.clock.set(now);
        ctx.mark_synchronized();
        info!("Clock synchronized: {}", format_time(now, TimeFormat::Full));
        Ok(now)
    }

    /// Adjusted Unix time, synchronizing first if this context never has.
    pub fn now(&mut self, ctx: &mut NetworkContext, spec: TimeSpec) -> i64 {
        if !ctx.is_synchronized() {
            match self.synchronize(ctx) {
                Ok(_) => {}
                Err(TimeError::NotConnected) => {
                    warn!("Time sync skipped: network not connected, using local clock")
                }
                Err(e) => warn!("Time sync failed: {}, using local clock", e),
            }
        }
        self.clock.now().saturating_add(spec.total_offset())
    }

    /// Write the adjusted time into `out` using the configured format.
    ///
    /// `out` is always overwritten, truncated to its capacity if needed.
    pub fn get_time<const N: usize>(
        &mut self,
        ctx: &mut NetworkContext,
        out: &mut heapless::String<N>,
        spec: TimeSpec,
    ) {
        let now = self.now(ctx, spec);
        copy_bounded(out, &format_time(now, self.config.format));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConnectionState;
    use crate::mock::{FixedClock, MockTimeSource};
    use std::time::Instant;

    // 2024-03-15 13:45:30 UTC
    const T: i64 = 1_710_510_330;

    fn connected() -> NetworkContext {
        let mut ctx = NetworkContext::new();
        ctx.set_state(ConnectionState::Connected);
        ctx
    }

    fn synchronizer(
        source: MockTimeSource,
        clock_at: i64,
        format: TimeFormat,
    ) -> TimeSynchronizer<MockTimeSource, FixedClock> {
        let config = TimeConfig {
            format,
            ..TimeConfig::default()
        };
        TimeSynchronizer::new(source, FixedClock::at(clock_at), config)
    }

    // ==================== Formatting Tests ====================

    #[test]
    fn test_format_layouts() {
        assert_eq!(format_time(T, TimeFormat::HourMinute), "13:45");
        assert_eq!(format_time(T, TimeFormat::HourMinuteSecond), "13:45:30");
        assert_eq!(format_time(T, TimeFormat::Full), "Fri Mar 15 13:45:30 2024");
    }

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_time(0, TimeFormat::Full), "Thu Jan  1 00:00:00 1970");
    }

    #[test]
    fn test_format_out_of_range_falls_back_to_epoch() {
        assert_eq!(format_time(i64::MAX, TimeFormat::HourMinute), "00:00");
    }

    #[test]
    fn test_time_spec_offset() {
        assert_eq!(TimeSpec::new(0, 0).total_offset(), 0);
        assert_eq!(TimeSpec::new(1800, 2).total_offset(), 1800 + 7200);
        assert_eq!(TimeSpec::new(-28800, 0).total_offset(), -28800);
        assert_eq!(TimeSpec::new(0, -5).total_offset(), -18000);
    }

    // ==================== Server Slot Tests ====================

    #[test]
    fn test_server_slots_take_configured_servers() {
        let servers = vec!["time.example.org".to_string()];
        let mut slots = ["pool.ntp.org", "time.nist.gov"];

        assert_eq!(fill_server_slots(&mut slots, &servers), 0);
        assert_eq!(slots, ["time.example.org", "time.nist.gov"]);
    }

    #[test]
    fn test_server_slots_report_overflow() {
        let servers: Vec<String> = ["a.example", "b.example", "c.example"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut slots = ["pool.ntp.org"];

        assert_eq!(fill_server_slots(&mut slots, &servers), 2);
        assert_eq!(slots, ["a.example"]);
    }

    // ==================== Sync Tests ====================

    #[test]
    fn test_first_call_synchronizes_clock() {
        let mut sync = synchronizer(MockTimeSource::ok(T), 0, TimeFormat::HourMinuteSecond);
        let mut ctx = connected();
        let mut out: heapless::String<16> = heapless::String::new();

        sync.get_time(&mut ctx, &mut out, TimeSpec::default());

        assert_eq!(out.as_str(), "13:45:30");
        assert!(ctx.is_synchronized());
        assert_eq!(sync.clock().now(), T);
    }

    #[test]
    fn test_synchronized_never_resyncs() {
        let mut sync = synchronizer(MockTimeSource::ok(T), 0, TimeFormat::HourMinute);
        let mut ctx = connected();
        let mut out: heapless::String<16> = heapless::String::new();

        for _ in 0..3 {
            sync.get_time(&mut ctx, &mut out, TimeSpec::default());
        }
        assert_eq!(sync.source().calls(), 1);
    }

    #[test]
    fn test_sync_failure_falls_back_to_clock() {
        let source = MockTimeSource::failing(TimeError::Timeout);
        let mut sync = synchronizer(source, 0, TimeFormat::Full);
        let mut ctx = connected();
        let mut out: heapless::String<32> = heapless::String::new();

        sync.get_time(&mut ctx, &mut out, TimeSpec::default());

        assert_eq!(out.as_str(), "Thu Jan  1 00:00:00 1970");
        assert!(!ctx.is_synchronized());
    }

    #[test]
    fn test_failed_sync_is_attempted_again_next_call() {
        let source = MockTimeSource::failing(TimeError::Timeout);
        let mut sync = synchronizer(source, 0, TimeFormat::Full);
        let mut ctx = connected();
        let mut out: heapless::String<32> = heapless::String::new();

        sync.get_time(&mut ctx, &mut out, TimeSpec::default());
        sync.get_time(&mut ctx, &mut out, TimeSpec::default());
        assert_eq!(sync.source().calls(), 2);
    }

    #[test]
    fn test_not_connected_skips_network_fast() {
        let mut sync = synchronizer(MockTimeSource::ok(T), 86_400 + 3600, TimeFormat::HourMinute);
        let mut ctx = NetworkContext::new();
        let mut out: heapless::String<8> = heapless::String::new();

        let start = Instant::now();
        sync.get_time(&mut ctx, &mut out, TimeSpec::default());

        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(out.as_str(), "01:00");
        assert_eq!(sync.source().calls(), 0);
        assert!(!ctx.is_synchronized());
    }

    #[test]
    fn test_synchronize_requires_link() {
        let mut sync = synchronizer(MockTimeSource::ok(T), 0, TimeFormat::HourMinute);
        let mut ctx = NetworkContext::new();
        assert_eq!(sync.synchronize(&mut ctx), Err(TimeError::NotConnected));
    }

    // ==================== Offset Tests ====================

    #[test]
    fn test_offsets_shift_by_exact_amount() {
        for offset in [-28_800i64, -3600, 0, 1800, 3600, 45_000] {
            let mut sync = synchronizer(MockTimeSource::ok(T), 0, TimeFormat::HourMinuteSecond);
            let mut ctx = connected();
            let mut out: heapless::String<16> = heapless::String::new();

            sync.get_time(&mut ctx, &mut out, TimeSpec::new(offset, 0));

            assert_eq!(out.as_str(), format_time(T + offset, TimeFormat::HourMinuteSecond));
            let shifted = sync.now(&mut ctx, TimeSpec::new(offset, 0));
            assert_eq!(shifted - sync.now(&mut ctx, TimeSpec::default()), offset);
        }
    }

    #[test]
    fn test_offset_examples() {
        let mut sync = synchronizer(MockTimeSource::ok(T), 0, TimeFormat::HourMinute);
        let mut ctx = connected();
        let mut out: heapless::String<8> = heapless::String::new();

        sync.get_time(&mut ctx, &mut out, TimeSpec::new(-28_800, 0));
        assert_eq!(out.as_str(), "05:45");
        sync.get_time(&mut ctx, &mut out, TimeSpec::new(3600, 0));
        assert_eq!(out.as_str(), "14:45");
        sync.get_time(&mut ctx, &mut out, TimeSpec::new(0, 2));
        assert_eq!(out.as_str(), "15:45");
    }

    #[test]
    fn test_output_truncated_to_capacity() {
        let mut sync = synchronizer(MockTimeSource::ok(T), 0, TimeFormat::Full);
        let mut ctx = connected();
        let mut out: heapless::String<10> = heapless::String::new();

        sync.get_time(&mut ctx, &mut out, TimeSpec::default());
        assert_eq!(out.as_str(), "Fri Mar 15");
    }

    // ==================== SoftwareClock Tests ====================

    #[test]
    fn test_software_clock_set() {
        let mut clock = SoftwareClock::new();
        clock.set(1_000_000);
        let now = clock.now();
        assert!((1_000_000..1_000_005).contains(&now));
    }

    #[test]
    fn test_software_clock_defaults_to_os_time() {
        let clock = SoftwareClock::new();
        // Any sane build host is past 2020-01-01
        assert!(clock.now() > 1_577_836_800);
    }
}
