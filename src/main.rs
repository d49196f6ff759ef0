use anyhow::Result;
use esp_idf_hal::gpio::IOPin;
use esp_idf_hal::prelude::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};
use std::thread;
use std::time::Duration;

mod app;
mod chart;
mod comfort;
mod commands;
mod config;
mod history;
mod http_client;
mod render;
mod sensors;
mod settings;
mod telegram;
mod wifi;

use crate::sensors::SensorSuite;
use crate::telegram::Bot;

fn main() -> Result<()> {
    esp_idf_sys::link_patches();
    // Use ESP-IDF logger so output goes to UART reliably.
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("BOOT OK (tempbot {})", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let sensors = SensorSuite::new(
        peripherals.pins.gpio4.downgrade(),
        peripherals.pins.gpio16.downgrade(),
    )?;

    let _wifi = wifi::connect(peripherals.modem, sysloop, nvs)?;

    let mut bot = Bot::new(config::bot_token());
    match bot.check_connectivity() {
        Ok(name) => info!("bot connectivity OK (@{})", name),
        Err(e) => warn!("bot connectivity check failed: {:#}", e),
    }

    // One-time bootstrap: whoever texts the bot first becomes the
    // only operator for this power cycle.
    info!("waiting for the first operator message");
    let operator = wait_for_operator(&mut bot);
    info!("operator registered: {}", operator);

    app::App::new(bot, sensors, operator).run()
}

fn wait_for_operator(bot: &mut Bot) -> i64 {
    loop {
        match bot.next_message() {
            Ok(Some(msg)) => return msg.sender,
            Ok(None) => {}
            Err(e) => warn!("message poll failed: {:#}", e),
        }
        thread::sleep(Duration::from_millis(config::POLL_SLICE_MS));
    }
}
