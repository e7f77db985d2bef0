//! Inkplate quote display firmware binary.
//!
//! WiFi credentials are baked in at build time from `WIFI_SSID` and
//! `WIFI_PASS`. Without the `esp32` feature the same flow runs once on the
//! host against the OS network.

use inkquote_net::QuoteRecord;

/// Quote text capacity in bytes.
const QUOTE_CAPACITY: usize = 256;

/// Author capacity in bytes.
const AUTHOR_CAPACITY: usize = 64;

/// Clock string capacity in bytes.
const TIME_CAPACITY: usize = 32;

/// Whole-hour time zone shown on the display.
const TIME_ZONE: i32 = 0;

type Quote = QuoteRecord<QUOTE_CAPACITY, AUTHOR_CAPACITY>;

fn credentials() -> (&'static str, &'static str) {
    (
        option_env!("WIFI_SSID").unwrap_or(""),
        option_env!("WIFI_PASS").unwrap_or(""),
    )
}

#[cfg(feature = "esp32")]
fn main() {
    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();

    esp_idf_svc::log::EspLogger::initialize_default();

    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use inkquote_net::network::EspHttpTransport;
    use inkquote_net::time::{EspSntpSource, SoftwareClock};
    use inkquote_net::wifi::EspRadio;
    use inkquote_net::{LogDisplay, Network, NetworkConfig};
    use log::{error, info, warn};
    use std::time::Duration;

    /// Delay between display refreshes.
    const REFRESH_INTERVAL: Duration = Duration::from_secs(300);

    info!("=== Inkquote starting ===");

    let peripherals = match Peripherals::take() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to take peripherals: {:?}", e);
            return;
        }
    };
    let sysloop = match EspSystemEventLoop::take() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to take system event loop: {:?}", e);
            return;
        }
    };
    let nvs = EspDefaultNvsPartition::take().ok();

    let radio = match EspRadio::new(peripherals.modem, sysloop, nvs) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to initialize WiFi driver: {:?}", e);
            return;
        }
    };

    let config = NetworkConfig::default();
    let mut net = Network::new(
        radio,
        EspHttpTransport::new(),
        EspSntpSource::new(config.time.servers.clone()),
        SoftwareClock::new(),
        &config,
    );

    let (ssid, pass) = credentials();
    net.begin(ssid, pass);

    let mut quote = Quote::new();
    let mut clock: heapless::String<TIME_CAPACITY> = heapless::String::new();
    loop {
        if !net.context().is_connected() {
            warn!("Not connected, retrying WiFi");
            net.begin(ssid, pass);
        }

        if net.get_data(&mut quote, &mut LogDisplay) {
            info!("\"{}\" - {}", quote.text(), quote.author());
        }
        net.get_time(&mut clock, 0, TIME_ZONE);
        info!("Time: {}", clock);

        std::thread::sleep(REFRESH_INTERVAL);
    }
}

#[cfg(not(feature = "esp32"))]
fn main() {
    use inkquote_net::network::{HostHttpTransport, HostRadio};
    use inkquote_net::time::{SntpClient, SoftwareClock};
    use inkquote_net::{ConnectionState, LogDisplay, Network, NetworkConfig};
    use log::{error, info};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Inkquote host run ===");

    let config = NetworkConfig::default();
    let transport = match HostHttpTransport::new() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let mut net = Network::new(
        HostRadio::new(),
        transport,
        SntpClient::new(config.time.servers.clone()),
        SoftwareClock::new(),
        &config,
    );

    // The host radio ignores the SSID; any well-formed one will do
    let (ssid, pass) = match credentials() {
        ("", _) => ("host", ""),
        pair => pair,
    };
    if net.begin(ssid, pass) != ConnectionState::Connected {
        error!("Network unavailable");
        std::process::exit(1);
    }

    let mut quote = Quote::new();
    if net.get_data(&mut quote, &mut LogDisplay) {
        println!("\"{}\"", quote.text());
        println!("    - {}", quote.author());
    }

    let mut clock: heapless::String<TIME_CAPACITY> = heapless::String::new();
    net.get_time(&mut clock, 0, TIME_ZONE);
    println!("{}", clock);
}
