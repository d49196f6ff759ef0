use anyhow::{anyhow, bail, Result};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};
use std::thread;
use std::time::Duration;

use crate::config;

const CONNECT_ATTEMPTS: u32 = 5;
const RETRY_DELAY_MS: u64 = 3_000;

/// Bring the station interface up.  This is the one phase allowed to
/// fail the process: without connectivity nothing downstream works.
/// The returned handle must stay alive for the process lifetime.
pub fn connect(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> Result<BlockingWifi<EspWifi<'static>>> {
    let ssid = config::wifi_ssid();
    let pass = config::wifi_pass();

    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    let auth_method = if pass.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPAWPA2Personal
    };

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid.try_into().map_err(|_| anyhow!("wifi ssid too long"))?,
        password: pass.try_into().map_err(|_| anyhow!("wifi password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("wifi started, connecting to `{}`", ssid);

    for attempt in 1..=CONNECT_ATTEMPTS {
        match wifi.connect().and_then(|_| wifi.wait_netif_up()) {
            Ok(()) => {
                let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
                info!("wifi connected, ip {}", ip_info.ip);
                return Ok(wifi);
            }
            Err(err) => {
                warn!(
                    "wifi connect attempt {}/{} failed: {}",
                    attempt, CONNECT_ATTEMPTS, err
                );
                let _ = wifi.disconnect();
                thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
            }
        }
    }

    bail!("all {} wifi connect attempts failed", CONNECT_ATTEMPTS)
}
