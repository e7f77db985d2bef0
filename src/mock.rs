//! Scripted collaborators for host tests.

use crate::config::Credentials;
use crate::network::{HttpResponse, HttpTransport, LinkStatus, Radio, RadioError, TransportError};
use crate::quote::StatusDisplay;
use crate::time::{SystemClock, TimeError, TimeSource};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

// ==================== Radio ====================

/// Radio that replays a status script. The last status repeats forever.
#[derive(Debug)]
pub struct MockRadio {
    statuses: VecDeque<LinkStatus>,
    associate_error: Option<RadioError>,
    associate_calls: usize,
    status_calls: usize,
    disconnect_calls: usize,
    last_ssid: Option<String>,
}

impl MockRadio {
    pub fn with_statuses(statuses: &[LinkStatus]) -> Self {
        Self {
            statuses: statuses.iter().copied().collect(),
            associate_error: None,
            associate_calls: 0,
            status_calls: 0,
            disconnect_calls: 0,
            last_ssid: None,
        }
    }

    /// Radio whose `associate` always fails with `error`.
    pub fn failing(error: RadioError) -> Self {
        Self {
            associate_error: Some(error),
            ..Self::with_statuses(&[LinkStatus::Down])
        }
    }

    pub fn associate_calls(&self) -> usize {
        self.associate_calls
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls
    }

    pub fn last_ssid(&self) -> Option<String> {
        self.last_ssid.clone()
    }
}

impl Radio for MockRadio {
    fn associate(&mut self, credentials: &Credentials) -> Result<(), RadioError> {
        self.associate_calls += 1;
        self.last_ssid = Some(credentials.ssid().to_string());
        match &self.associate_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn status(&mut self) -> LinkStatus {
        self.status_calls += 1;
        if self.statuses.len() > 1 {
            self.statuses.pop_front().unwrap_or(LinkStatus::Down)
        } else {
            self.statuses.front().copied().unwrap_or(LinkStatus::Down)
        }
    }

    fn disconnect(&mut self) -> Result<(), RadioError> {
        self.disconnect_calls += 1;
        self.statuses = VecDeque::from([LinkStatus::Down]);
        Ok(())
    }
}

// ==================== HTTP ====================

#[derive(Debug)]
enum Scripted {
    Respond {
        status: u16,
        body: Vec<u8>,
        then_fail: Option<TransportError>,
    },
    Fail(TransportError),
}

/// Transport that replays scripted responses in order and tracks how many
/// responses are still open.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: VecDeque<Scripted>,
    open: Rc<Cell<usize>>,
    requests: usize,
    last_url: Option<String>,
    last_timeout: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, status: u16, body: &str) -> Self {
        self.script.push_back(Scripted::Respond {
            status,
            body: body.as_bytes().to_vec(),
            then_fail: None,
        });
        self
    }

    /// Respond with `body`, then fail the next read with `error`.
    pub fn respond_then_fail(mut self, status: u16, body: &str, error: TransportError) -> Self {
        self.script.push_back(Scripted::Respond {
            status,
            body: body.as_bytes().to_vec(),
            then_fail: Some(error),
        });
        self
    }

    pub fn fail(mut self, error: TransportError) -> Self {
        self.script.push_back(Scripted::Fail(error));
        self
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn open_connections(&self) -> usize {
        self.open.get()
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.clone()
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.last_timeout
    }
}

impl HttpTransport for MockTransport {
    type Response = MockResponse;

    fn get(&mut self, url: &str, timeout: Duration) -> Result<MockResponse, TransportError> {
        self.requests += 1;
        self.last_url = Some(url.to_string());
        self.last_timeout = Some(timeout);

        match self.script.pop_front() {
            Some(Scripted::Respond {
                status,
                body,
                then_fail,
            }) => {
                self.open.set(self.open.get() + 1);
                Ok(MockResponse {
                    status,
                    body,
                    pos: 0,
                    then_fail,
                    open: Rc::clone(&self.open),
                })
            }
            Some(Scripted::Fail(e)) => Err(e),
            None => Err(TransportError::Connect("no scripted response".into())),
        }
    }
}

/// Largest chunk a mock read returns, to exercise partial reads.
const MOCK_READ_CHUNK: usize = 7;

#[derive(Debug)]
pub struct MockResponse {
    status: u16,
    body: Vec<u8>,
    pos: usize,
    then_fail: Option<TransportError>,
    open: Rc<Cell<usize>>,
}

impl HttpResponse for MockResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let remaining = self.body.len() - self.pos;
        if remaining == 0 {
            if let Some(e) = self.then_fail.take() {
                return Err(e);
            }
            return Ok(0);
        }
        let n = remaining.min(buf.len()).min(MOCK_READ_CHUNK);
        buf[..n].copy_from_slice(&self.body[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Drop for MockResponse {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}

// ==================== Time ====================

/// Time source returning a fixed result.
#[derive(Debug)]
pub struct MockTimeSource {
    result: Result<i64, TimeError>,
    calls: usize,
}

impl MockTimeSource {
    pub fn ok(unix_secs: i64) -> Self {
        Self {
            result: Ok(unix_secs),
            calls: 0,
        }
    }

    pub fn failing(error: TimeError) -> Self {
        Self {
            result: Err(error),
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl TimeSource for MockTimeSource {
    fn sync(&mut self, _timeout: Duration) -> Result<i64, TimeError> {
        self.calls += 1;
        self.result.clone()
    }
}

/// Clock that only moves when set.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: i64,
}

impl FixedClock {
    pub fn at(unix_secs: i64) -> Self {
        Self { now: unix_secs }
    }
}

impl SystemClock for FixedClock {
    fn now(&self) -> i64 {
        self.now
    }

    fn set(&mut self, unix_secs: i64) {
        self.now = unix_secs;
    }
}

// ==================== Display ====================

/// Display that records every status line.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub messages: Vec<String>,
}

impl StatusDisplay for RecordingDisplay {
    fn show_status(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
