// Compile-time deployment configuration.  Credentials come in
// through the environment at build time
// (`TEMPBOT_WIFI_SSID=... TEMPBOT_TOKEN=... cargo build`); nothing
// is read from flash or disk at runtime.

pub fn wifi_ssid() -> &'static str {
    option_env!("TEMPBOT_WIFI_SSID").unwrap_or("CHANGE_ME")
}

pub fn wifi_pass() -> &'static str {
    option_env!("TEMPBOT_WIFI_PASS").unwrap_or("CHANGE_ME")
}

pub fn bot_token() -> &'static str {
    option_env!("TEMPBOT_TOKEN").unwrap_or("CHANGE_ME")
}

/// Cooperative slice: how long the wait state sleeps between polls.
pub const POLL_SLICE_MS: u64 = 400;

/// DHT22 needs about two seconds between conversions; faster reads
/// return stale or corrupt frames.
pub const SECONDARY_MIN_PERIOD_MS: u64 = 2_000;
