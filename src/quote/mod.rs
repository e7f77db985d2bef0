//! Quote fetching.
//!
//! A [`QuoteFetcher`] performs one HTTPS GET per call, reads at most
//! `max_body_len` bytes of body, and writes the parsed quote and author into
//! a caller-owned [`QuoteRecord`] whose capacities are fixed at compile time.
//!
//! # Example
//!
//! ```ignore
//! let mut record: QuoteRecord<128, 64> = QuoteRecord::new();
//! if fetcher.get_data(&ctx, &mut record, &mut LogDisplay) {
//!     println!("{} ({} bytes) - {}", record.text(), record.len(), record.author());
//! }
//! ```

mod parse;

pub use parse::{copy_bounded, parse_quote, ParseError, ParsedQuote};

use crate::config::QuoteEndpoint;
use crate::context::NetworkContext;
use crate::network::{HttpResponse, HttpTransport, TransportError};
use log::{debug, info, warn};
use std::fmt;

/// Caller-owned quote buffers.
///
/// `Q` and `A` are the byte capacities of the quote text and author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRecord<const Q: usize, const A: usize> {
    text: heapless::String<Q>,
    author: heapless::String<A>,
    length: usize,
}

impl<const Q: usize, const A: usize> QuoteRecord<Q, A> {
    pub fn new() -> Self {
        Self {
            text: heapless::String::new(),
            author: heapless::String::new(),
            length: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Byte length of the stored quote text.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Reset to the empty state (both buffers zero-length, length 0).
    pub fn clear(&mut self) {
        self.text.clear();
        self.author.clear();
        self.length = 0;
    }

    /// Store a parsed quote. Returns `true` if either field was truncated.
    fn store(&mut self, quote: &ParsedQuote<'_>) -> bool {
        let text_cut = copy_bounded(&mut self.text, &quote.text);
        let author_cut = copy_bounded(&mut self.author, &quote.author);
        self.length = self.text.len();
        text_cut || author_cut
    }
}

/// Receives human-readable progress while a fetch runs.
///
/// This is the only contact the fetcher has with the display; it never
/// draws.
pub trait StatusDisplay {
    fn show_status(&mut self, message: &str);
}

/// Discards status messages.
impl StatusDisplay for () {
    fn show_status(&mut self, _message: &str) {}
}

/// Routes status messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl StatusDisplay for LogDisplay {
    fn show_status(&mut self, message: &str) {
        info!("[display] {}", message);
    }
}

/// Why a fetch produced no new quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The link is not up; nothing was sent.
    ConnectivityUnavailable,
    /// Connect, handshake or body read timed out.
    RequestTimeout,
    /// The server answered with an error, or the transport failed.
    RequestFailed(RequestFailure),
    /// The body could not be turned into a quote.
    ParseFailure(ParseError),
}

/// Detail for [`FetchError::RequestFailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// Non-2xx HTTP status.
    Status(u16),
    /// Transport failure other than a timeout.
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectivityUnavailable => write!(f, "network not connected"),
            Self::RequestTimeout => write!(f, "request timed out"),
            Self::RequestFailed(RequestFailure::Status(code)) => write!(f, "HTTP {}", code),
            Self::RequestFailed(RequestFailure::Transport(msg)) => {
                write!(f, "request failed: {}", msg)
            }
            Self::ParseFailure(e) => write!(f, "parse failure: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => Self::RequestTimeout,
            other => Self::RequestFailed(RequestFailure::Transport(other.to_string())),
        }
    }
}

impl From<ParseError> for FetchError {
    fn from(e: ParseError) -> Self {
        Self::ParseFailure(e)
    }
}

/// Fetches quotes from one endpoint.
pub struct QuoteFetcher<T: HttpTransport> {
    transport: T,
    endpoint: QuoteEndpoint,
    /// Response body scratch space, `max_body_len` bytes, reused by every
    /// fetch.
    body: Box<[u8]>,
}

impl<T: HttpTransport> QuoteFetcher<T> {
    pub fn new(transport: T, endpoint: QuoteEndpoint) -> Self {
        let body = vec![0u8; endpoint.max_body_len].into_boxed_slice();
        Self {
            transport,
            endpoint,
            body,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a quote into `record`.
    ///
    /// Returns the quote length on success. On any error `record` is left
    /// empty. Over-long fields are truncated to the record's capacity and
    /// still count as success.
    pub fn fetch<const Q: usize, const A: usize>(
        &mut self,
        ctx: &NetworkContext,
        record: &mut QuoteRecord<Q, A>,
        display: &mut impl StatusDisplay,
    ) -> Result<usize, FetchError> {
        if !ctx.is_connected() {
            record.clear();
            return Err(FetchError::ConnectivityUnavailable);
        }

        display.show_status("Fetching quote...");
        let result = self.fetch_body().and_then(|len| {
            let parsed = parse_quote(&self.body[..len], &self.endpoint.format)?;
            if record.store(&parsed) {
                warn!(
                    "Quote truncated to buffer capacity ({} text / {} author bytes)",
                    Q, A
                );
            }
            Ok(record.len())
        });

        if let Err(e) = &result {
            record.clear();
            display.show_status(&format!("Failed to get quote: {}", e));
        }
        result
    }

    /// Boolean form of [`fetch`](Self::fetch): `true` means `record` holds a
    /// new quote, `false` means it is empty.
    pub fn get_data<const Q: usize, const A: usize>(
        &mut self,
        ctx: &NetworkContext,
        record: &mut QuoteRecord<Q, A>,
        display: &mut impl StatusDisplay,
    ) -> bool {
        match self.fetch(ctx, record, display) {
            Ok(len) => {
                info!("Fetched quote ({} bytes) by {}", len, record.author());
                true
            }
            Err(e) => {
                warn!("Quote fetch failed: {}", e);
                false
            }
        }
    }

    /// GET the endpoint and read the whole body into the scratch buffer,
    /// returning its length.
    ///
    /// The response is dropped (connection closed) before returning.
    fn fetch_body(&mut self) -> Result<usize, FetchError> {
        let limit = self.body.len();
        let mut response = self
            .transport
            .get(&self.endpoint.url, self.endpoint.request_timeout)?;

        let status = response.status();
        debug!("Quote endpoint answered HTTP {}", status);
        if !(200..300).contains(&status) {
            return Err(FetchError::RequestFailed(RequestFailure::Status(status)));
        }

        let mut filled = 0;
        while filled < limit {
            let n = response.read(&mut self.body[filled..])?;
            if n == 0 {
                return Ok(filled);
            }
            filled += n;
        }

        // Buffer full: the body fits only if the stream ends here
        let mut extra = [0u8; 1];
        if response.read(&mut extra)? != 0 {
            return Err(ParseError::BodyTooLarge { limit }.into());
        }
        Ok(filled)
    }
}
