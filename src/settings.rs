// Runtime knobs owned by the single authorized operator.

use std::time::Duration;

pub const INTERVAL_MIN_SECS: u32 = 20;
pub const INTERVAL_MAX_SECS: u32 = 3600;
const DEFAULT_INTERVAL_MS: u32 = 60_000;

pub struct OperatorSettings {
    chat_id: i64,
    interval_ms: u32,
    muted: bool,
}

impl OperatorSettings {
    /// `chat_id` is captured once by the startup handshake and never
    /// changes for the rest of the power cycle.
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            interval_ms: DEFAULT_INTERVAL_MS,
            muted: false,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms as u64)
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_ms / 1000
    }

    /// Accepts whole seconds within [INTERVAL_MIN_SECS,
    /// INTERVAL_MAX_SECS]; anything else is rejected with no change.
    pub fn set_interval_secs(&mut self, secs: u32) -> bool {
        if !(INTERVAL_MIN_SECS..=INTERVAL_MAX_SECS).contains(&secs) {
            return false;
        }
        self.interval_ms = secs * 1000;
        true
    }

    /// Mute suppresses the periodic push only; command replies always
    /// go out.
    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds_are_inclusive() {
        let mut s = OperatorSettings::new(1);
        assert!(s.set_interval_secs(20));
        assert_eq!(s.interval(), Duration::from_secs(20));
        assert!(s.set_interval_secs(3600));
        assert_eq!(s.interval(), Duration::from_secs(3600));
    }

    #[test]
    fn out_of_range_interval_leaves_value_unchanged() {
        let mut s = OperatorSettings::new(1);
        assert!(!s.set_interval_secs(19));
        assert!(!s.set_interval_secs(3601));
        assert!(!s.set_interval_secs(0));
        assert_eq!(s.interval(), Duration::from_secs(60));
    }
}
