//! ESP-IDF SNTP time source.
//!
//! The ESP-IDF SNTP service sets the OS clock itself once a reply arrives.
//! This source starts the service with the configured servers, waits for
//! completion and reads the freshly set clock back.

use super::{fill_server_slots, TimeError, TimeSource};
use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Completion polling interval.
const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// SNTP through the ESP-IDF service.
pub struct EspSntpSource {
    servers: Vec<String>,
    /// Kept alive after the first sync; dropping it stops the service.
    sntp: Option<EspSntp<'static>>,
}

impl EspSntpSource {
    /// Source querying `servers` (host names). The service holds a fixed
    /// number of slots; extra servers are ignored and unused slots keep the
    /// IDF defaults.
    pub fn new(servers: Vec<String>) -> Self {
        Self {
            servers,
            sntp: None,
        }
    }

    fn start(&self) -> Result<EspSntp<'static>, TimeError> {
        let mut conf = SntpConf::default();
        let ignored = fill_server_slots(&mut conf.servers, &self.servers);
        if ignored > 0 {
            warn!("SNTP service slots full, ignoring {} server(s)", ignored);
        }
        EspSntp::new(&conf).map_err(|e| TimeError::Network(format!("{:?}", e)))
    }
}

impl TimeSource for EspSntpSource {
    fn sync(&mut self, timeout: Duration) -> Result<i64, TimeError> {
        if self.sntp.is_none() {
            self.sntp = Some(self.start()?);
        }
        let sntp = self.sntp.as_ref().ok_or(TimeError::AllServersFailed)?;

        info!("Waiting for SNTP time synchronization...");
        let deadline = Instant::now() + timeout;
        while sntp.get_sync_status() != SyncStatus::Completed {
            if Instant::now() >= deadline {
                return Err(TimeError::Timeout);
            }
            thread::sleep(SYNC_POLL_INTERVAL);
        }

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::InvalidResponse)?
            .as_secs();
        Ok(secs as i64)
    }
}
