//! ESP-IDF WiFi radio.
//!
//! Wraps the ESP-IDF station driver. Association is started without
//! blocking so the connectivity manager can enforce its own timeout while
//! polling `is_up`. A raw `STA_DISCONNECTED` handler records the driver's
//! disconnect reason so refused credentials end the wait early.

use super::reason;
use crate::config::Credentials;
use crate::network::{LinkStatus, Radio, RadioError};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::{esp, EspError};
use log::{debug, info, warn};
use std::ffi::c_void;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// Reason of the most recent station disconnect, 0 if none since the last
/// `associate`.
static LAST_DISCONNECT_REASON: AtomicU16 = AtomicU16::new(0);

static DISCONNECT_HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

unsafe extern "C" fn on_sta_disconnected(
    _arg: *mut c_void,
    _base: esp_idf_sys::esp_event_base_t,
    _id: i32,
    data: *mut c_void,
) {
    if let Some(event) = (data as *const esp_idf_sys::wifi_event_sta_disconnected_t).as_ref() {
        LAST_DISCONNECT_REASON.store(u16::from(event.reason), Ordering::Relaxed);
    }
}

/// Register the disconnect handler on the default event loop, once.
fn install_disconnect_handler() -> Result<(), EspError> {
    if DISCONNECT_HANDLER_INSTALLED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }
    let result = esp!(unsafe {
        esp_idf_sys::esp_event_handler_register(
            esp_idf_sys::WIFI_EVENT,
            esp_idf_sys::wifi_event_t_WIFI_EVENT_STA_DISCONNECTED as i32,
            Some(on_sta_disconnected),
            std::ptr::null_mut(),
        )
    });
    if result.is_err() {
        DISCONNECT_HANDLER_INSTALLED.store(false, Ordering::Release);
    }
    result
}

/// Station-mode WiFi radio.
pub struct EspRadio<'a> {
    /// ESP-IDF WiFi driver.
    wifi: BlockingWifi<EspWifi<'a>>,
    started: bool,
    /// Set by `associate`, cleared once the link is first seen up.
    associating: bool,
}

impl<'a> EspRadio<'a> {
    /// Take ownership of the modem and create the driver.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        install_disconnect_handler()?;

        Ok(Self {
            wifi,
            started: false,
            associating: false,
        })
    }
}

impl<'a> Radio for EspRadio<'a> {
    fn associate(&mut self, credentials: &Credentials) -> Result<(), RadioError> {
        let auth_method = if credentials.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let wifi_config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid()
                .try_into()
                .map_err(|_| RadioError::InvalidCredentials)?,
            password: credentials
                .passphrase()
                .try_into()
                .map_err(|_| RadioError::InvalidCredentials)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&wifi_config)?;

        if !self.started {
            self.wifi.start()?;
            self.started = true;
        }

        LAST_DISCONNECT_REASON.store(0, Ordering::Relaxed);

        // Non-blocking connect; completion is observed through status()
        self.wifi.wifi_mut().connect()?;
        self.associating = true;
        debug!("Association started for {}", credentials.ssid());
        Ok(())
    }

    fn status(&mut self) -> LinkStatus {
        match (self.wifi.is_connected(), self.wifi.is_up()) {
            (Ok(true), Ok(true)) => {
                self.associating = false;
                LinkStatus::Up
            }
            // Associated, waiting for DHCP
            (Ok(true), _) => LinkStatus::Associating,
            (Ok(false), _) if self.associating => {
                let code = LAST_DISCONNECT_REASON.load(Ordering::Relaxed);
                if reason::is_rejection(code) {
                    warn!("Access point refused association (reason {})", code);
                    self.associating = false;
                    LinkStatus::Rejected
                } else {
                    LinkStatus::Associating
                }
            }
            (Ok(false), _) => LinkStatus::Down,
            (Err(e), _) => {
                warn!("WiFi status query failed: {:?}", e);
                LinkStatus::Down
            }
        }
    }

    fn disconnect(&mut self) -> Result<(), RadioError> {
        info!("Stopping WiFi");
        self.wifi.disconnect()?;
        self.wifi.stop()?;
        self.started = false;
        self.associating = false;
        Ok(())
    }

    fn ip_addr(&self) -> Option<IpAddr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .and_then(|info| format!("{}", info.ip).parse().ok())
    }
}
