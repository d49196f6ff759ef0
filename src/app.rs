// The sampling/waiting poll loop.
//
// One logical thread owns every piece of mutable state.  The only
// other thread in the firmware is the short-lived chart-render
// worker, and the only thing it hands back is a URL over the `links`
// channel drained here.
//
// Cycle shape: Sampling (read primary, record, optionally push a
// reading to the operator) then WaitingInterval (drain chat,
// secondary sensor and render links in small slices until the
// configured interval has elapsed).

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::chart;
use crate::commands::{self, Command};
use crate::config;
use crate::history::{TempHistory, NO_TEMP};
use crate::render;
use crate::sensors::{Reading, SensorSuite};
use crate::settings::OperatorSettings;
use crate::telegram::{Bot, ChatMessage};

pub struct App {
    bot: Bot,
    sensors: SensorSuite,
    history: TempHistory,
    settings: OperatorSettings,
    last_secondary: Option<Reading>,
    last_secondary_read: Option<Instant>,
    links: Receiver<String>,
    links_tx: Sender<String>,
}

impl App {
    pub fn new(bot: Bot, sensors: SensorSuite, operator: i64) -> Self {
        let (links_tx, links) = channel();
        Self {
            bot,
            sensors,
            history: TempHistory::new(),
            settings: OperatorSettings::new(operator),
            last_secondary: None,
            last_secondary_read: None,
            links,
            links_tx,
        }
    }

    /// Run forever.  Nothing past setup is allowed to kill the loop;
    /// failed sends and reads degrade to a skipped action.
    pub fn run(mut self) -> ! {
        loop {
            self.sample();
            self.wait_interval();
        }
    }

    fn sample(&mut self) {
        let reading = self.sensors.read_primary();
        self.history.push(reading.unwrap_or(NO_TEMP));
        match reading {
            Some(t) => {
                info!("primary: {:.2} C", t);
                if !self.settings.muted() {
                    self.send(&format!("{:.2}", t));
                }
            }
            None => warn!("primary read failed, recorded a gap"),
        }
    }

    // The elapsed check reads the *current* interval every slice, so
    // an `/interval` change takes effect on the wait in progress, not
    // just the next one.
    fn wait_interval(&mut self) {
        let started = Instant::now();
        while started.elapsed() < self.settings.interval() {
            self.refresh_secondary();
            match self.bot.next_message() {
                Ok(Some(msg)) => self.dispatch(msg),
                Ok(None) => {}
                Err(e) => warn!("message poll failed: {:#}", e),
            }
            self.forward_render_links();
            thread::sleep(Duration::from_millis(config::POLL_SLICE_MS));
        }
    }

    // The DHT22 value is never persisted; it only feeds `/status`.
    fn refresh_secondary(&mut self) {
        let due = self
            .last_secondary_read
            .map_or(true, |t| {
                t.elapsed() >= Duration::from_millis(config::SECONDARY_MIN_PERIOD_MS)
            });
        if !due {
            return;
        }
        self.last_secondary_read = Some(Instant::now());
        if let Some(r) = self.sensors.read_secondary() {
            self.last_secondary = Some(r);
        }
    }

    fn dispatch(&mut self, msg: ChatMessage) {
        if msg.sender != self.settings.chat_id() {
            warn!("ignoring message from unknown sender {}", msg.sender);
            return;
        }
        let Some(cmd) = Command::parse(&msg.text) else {
            return;
        };
        info!("command: {:?}", cmd);

        match cmd {
            Command::Chart100 => {
                self.send(&chart::direct_url(&self.history));
                render::spawn_render_request(
                    chart::render_request_body(&self.history),
                    self.links_tx.clone(),
                );
            }
            Command::Mute => {
                let reply = commands::set_mute(&mut self.settings, true);
                self.send(reply);
            }
            Command::Verbose => {
                let reply = commands::set_mute(&mut self.settings, false);
                self.send(reply);
            }
            Command::Status => {
                let primary = self.sensors.read_primary();
                let report =
                    commands::status_report(&self.settings, primary, self.last_secondary.as_ref());
                self.send(&report);
            }
            Command::Interval => {
                self.send(commands::INTERVAL_PROMPT);
                let reply = self.wait_for_reply();
                if let Some(confirmation) =
                    commands::apply_interval_reply(&reply, &mut self.settings)
                {
                    self.send(&confirmation);
                }
            }
        }
    }

    // The one deliberate indefinite block after startup: `/interval`
    // waits for the operator's follow-up.  Single operator, single
    // session; sampling resumes once a reply (valid or not) lands.
    fn wait_for_reply(&mut self) -> String {
        loop {
            match self.bot.next_message() {
                Ok(Some(msg)) if msg.sender == self.settings.chat_id() => return msg.text,
                Ok(_) => {}
                Err(e) => warn!("message poll failed: {:#}", e),
            }
            thread::sleep(Duration::from_millis(config::POLL_SLICE_MS));
        }
    }

    fn forward_render_links(&mut self) {
        while let Ok(url) = self.links.try_recv() {
            self.send(&url);
        }
    }

    // Transport failures are logged and dropped; no retry.
    fn send(&self, text: &str) {
        if let Err(e) = self.bot.send_message(self.settings.chat_id(), text) {
            warn!("send failed: {:#}", e);
        }
    }
}
