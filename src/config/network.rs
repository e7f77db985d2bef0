//! Network policy: endpoints, timeouts and wire formats.
//!
//! Defaults reproduce the stock Inkplate quote display: quotes come from the
//! public quotable API as JSON, time comes from the NTP pool, and the clock
//! is shown as `HH:MM`.

use std::time::Duration;

/// Quote endpoint used when none is configured.
pub const DEFAULT_QUOTE_URL: &str = "https://api.quotable.io/random";

/// NTP servers queried in order.
pub const NTP_SERVERS: &[&str] = &["pool.ntp.org", "time.nist.gov"];

/// Upper bound on WiFi association (the stock firmware waited 20 x 1 s).
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(20);

/// Link status polling interval during association.
pub const LINK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// HTTPS request timeout (connect + TLS handshake + response).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// SNTP synchronization timeout.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest response body accepted from the quote endpoint.
///
/// Quotable responses are ~300-600 bytes; anything larger is treated as a
/// parse failure rather than buffered.
pub const MAX_BODY_LEN: usize = 2048;

/// Complete network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkConfig {
    /// WiFi association policy.
    pub link: LinkConfig,
    /// Quote endpoint policy.
    pub quote: QuoteEndpoint,
    /// Time synchronization policy.
    pub time: TimeConfig,
}

/// WiFi association policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Give up (state `Failed`) after this long.
    pub connect_timeout: Duration,
    /// How often the radio status is polled while associating.
    pub poll_interval: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECTION_TIMEOUT,
            poll_interval: LINK_POLL_INTERVAL,
        }
    }
}

/// Where and how quotes are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteEndpoint {
    /// Full request URL.
    pub url: String,
    /// Shape of the response body.
    pub format: ResponseFormat,
    /// Per-request timeout handed to the transport.
    pub request_timeout: Duration,
    /// Bodies longer than this are rejected.
    pub max_body_len: usize,
}

impl QuoteEndpoint {
    /// Endpoint at `url` with default format and limits.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Replace the response format.
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for QuoteEndpoint {
    fn default() -> Self {
        Self {
            url: DEFAULT_QUOTE_URL.to_string(),
            format: ResponseFormat::default(),
            request_timeout: REQUEST_TIMEOUT,
            max_body_len: MAX_BODY_LEN,
        }
    }
}

/// Body layout of the quote response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON object with two string members. A top-level array is accepted
    /// and its first element used.
    Json {
        quote_key: String,
        author_key: String,
    },
    /// Flat `key=value` pairs, e.g. `quote=...;author=...`.
    Delimited {
        field_sep: char,
        kv_sep: char,
        quote_key: String,
        author_key: String,
    },
}

impl ResponseFormat {
    /// Quotable-style JSON: `{"content": "...", "author": "..."}`.
    pub fn json() -> Self {
        Self::Json {
            quote_key: "content".to_string(),
            author_key: "author".to_string(),
        }
    }

    /// `quote=...;author=...`.
    pub fn delimited() -> Self {
        Self::Delimited {
            field_sep: ';',
            kv_sep: '=',
            quote_key: "quote".to_string(),
            author_key: "author".to_string(),
        }
    }
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self::json()
    }
}

/// Time synchronization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeConfig {
    /// NTP servers, `host` or `host:port`.
    pub servers: Vec<String>,
    /// Upper bound on one synchronization attempt.
    pub sync_timeout: Duration,
    /// Output layout for `get_time`.
    pub format: TimeFormat,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            servers: NTP_SERVERS.iter().map(|s| s.to_string()).collect(),
            sync_timeout: SYNC_TIMEOUT,
            format: TimeFormat::default(),
        }
    }
}

/// Layout of formatted time strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// `14:05`
    #[default]
    HourMinute,
    /// `14:05:09`
    HourMinuteSecond,
    /// `Thu Jan  1 14:05:09 1970` (asctime layout, no newline)
    Full,
}

impl TimeFormat {
    /// chrono format string for this layout.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::HourMinute => "%H:%M",
            Self::HourMinuteSecond => "%H:%M:%S",
            Self::Full => "%a %b %e %H:%M:%S %Y",
        }
    }
}
