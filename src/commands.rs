// Operator command dispatch.
//
// Stateless: every helper takes the settings/readings it needs and
// answers with the outbound text, if any.  The only two-step command
// is `/interval`; its prompt/reply halves are separate functions and
// the waiting in between belongs to the poll loop.

use std::fmt::Write as _;

use crate::comfort;
use crate::sensors::Reading;
use crate::settings::OperatorSettings;

pub const INTERVAL_PROMPT: &str =
    "Ok, send me a number in seconds, from 20 to 3600 (1 hour) - \
     anything else cancels and keeps the current interval";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Chart100,
    Mute,
    Verbose,
    Status,
    Interval,
}

impl Command {
    /// Case-insensitive exact match on the trimmed message text.
    /// Unrecognized input is ignored, not answered.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "/chart100" => Some(Self::Chart100),
            "/mute" => Some(Self::Mute),
            "/verbose" => Some(Self::Verbose),
            "/status" => Some(Self::Status),
            "/interval" => Some(Self::Interval),
            _ => None,
        }
    }
}

pub fn set_mute(settings: &mut OperatorSettings, muted: bool) -> &'static str {
    settings.set_muted(muted);
    if muted {
        "Muted!"
    } else {
        "Ok, sending a reading every cycle again"
    }
}

/// The `/interval` follow-up: parse the operator's reply as whole
/// seconds.  Out-of-range or non-numeric input aborts silently with
/// no mutation; the prompt already spells the rule out.
pub fn apply_interval_reply(reply: &str, settings: &mut OperatorSettings) -> Option<String> {
    let secs: u32 = reply.trim().parse().ok()?;
    if !settings.set_interval_secs(secs) {
        return None;
    }
    Some(format!("New interval: {} seg.", secs))
}

/// Multi-field `/status` report.  Derived comfort metrics need the
/// humidity sensor; when it has never answered, they are dropped
/// rather than computed from garbage.
pub fn status_report(
    settings: &OperatorSettings,
    primary_c: Option<f32>,
    secondary: Option<&Reading>,
) -> String {
    let mut out = String::with_capacity(256);
    let _ = write!(
        out,
        "Muted: {} - Interval: {}",
        if settings.muted() { "yes" } else { "no" },
        settings.interval_secs()
    );

    match primary_c {
        Some(t) => {
            let _ = write!(out, " - Temp DS: {:.2}", t);
        }
        None => out.push_str(" - Temp DS: unavailable"),
    }

    match secondary {
        Some(r) => {
            let (code, ratio) = comfort::classify(r.temperature, r.humidity);
            let _ = write!(
                out,
                " - Temp DHT: {:.2} - Humidity DHT: {:.1} - Heat Index: {:.2} \
                 - Dew Point: {:.2} - Abs Humidity: {:.2} g/m3 \
                 - Comfort: {} ({:.2}) - Perception: {}",
                r.temperature,
                r.humidity,
                comfort::heat_index(r.temperature, r.humidity),
                comfort::dew_point(r.temperature, r.humidity),
                comfort::absolute_humidity(r.temperature, r.humidity),
                comfort::describe(code),
                ratio,
                comfort::perception(r.temperature, r.humidity),
            );
        }
        None => out.push_str(" - DHT: unavailable"),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Command::parse("/MUTE"), Some(Command::Mute));
        assert_eq!(Command::parse("/Chart100"), Some(Command::Chart100));
        assert_eq!(Command::parse("  /status "), Some(Command::Status));
        assert_eq!(Command::parse("/interval"), Some(Command::Interval));
        assert_eq!(Command::parse("/VERBOSE"), Some(Command::Verbose));
    }

    #[test]
    fn unrecognized_text_is_ignored() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/chart"), None);
        assert_eq!(Command::parse("/chart100 now"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn mute_and_verbose_confirm() {
        let mut s = OperatorSettings::new(42);
        let reply = set_mute(&mut s, true);
        assert!(s.muted());
        assert!(!reply.is_empty());
        let reply = set_mute(&mut s, false);
        assert!(!s.muted());
        assert!(!reply.is_empty());
    }

    #[test]
    fn interval_reply_in_range_mutates_and_confirms() {
        let mut s = OperatorSettings::new(42);
        let confirmation = apply_interval_reply("45", &mut s);
        assert_eq!(s.interval(), Duration::from_millis(45_000));
        assert!(confirmation.unwrap().contains("45"));
    }

    #[test]
    fn interval_reply_out_of_range_aborts_silently() {
        let mut s = OperatorSettings::new(42);
        assert_eq!(apply_interval_reply("5", &mut s), None);
        assert_eq!(apply_interval_reply("9999", &mut s), None);
        assert_eq!(apply_interval_reply("soon", &mut s), None);
        assert_eq!(apply_interval_reply("", &mut s), None);
        assert_eq!(s.interval(), Duration::from_secs(60));
    }

    #[test]
    fn status_report_lists_all_fields() {
        let s = OperatorSettings::new(42);
        let reading = Reading {
            temperature: 22.5,
            humidity: 45.0,
        };
        let report = status_report(&s, Some(21.37), Some(&reading));
        assert!(report.contains("Muted: no"));
        assert!(report.contains("Interval: 60"));
        assert!(report.contains("Temp DS: 21.37"));
        assert!(report.contains("Temp DHT: 22.50"));
        assert!(report.contains("Heat Index:"));
        assert!(report.contains("Dew Point:"));
        assert!(report.contains("Comfort: OK"));
    }

    #[test]
    fn status_report_degrades_without_sensors() {
        let s = OperatorSettings::new(42);
        let report = status_report(&s, None, None);
        assert!(report.contains("Temp DS: unavailable"));
        assert!(report.contains("DHT: unavailable"));
    }
}
