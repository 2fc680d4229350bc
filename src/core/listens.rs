//! Listen counting policy
//!
//! A track counts as listened once playback passes the shorter of a fixed
//! number of seconds and a fraction of its duration. Each track is counted
//! at most once per time it is loaded.

use crate::config::UserConfig;

/// Decides when the current track has been listened to
#[derive(Debug, Clone)]
pub struct ListenPolicy {
    threshold_secs: f64,
    threshold_ratio: f64,
    track_id: Option<String>,
    recorded: bool,
}

impl ListenPolicy {
    pub fn new(threshold_secs: f64, threshold_ratio: f64) -> Self {
        Self {
            threshold_secs,
            threshold_ratio,
            track_id: None,
            recorded: false,
        }
    }

    pub fn from_config(config: &UserConfig) -> Self {
        Self::new(config.listen_threshold_secs, config.listen_threshold_ratio)
    }

    /// Playback position at which a track of `duration` seconds counts
    pub fn threshold(&self, duration: f64) -> f64 {
        self.threshold_secs.min(duration * self.threshold_ratio)
    }

    /// A new source was loaded; forget what was recorded for the old one
    pub fn reset(&mut self, track_id: Option<String>) {
        self.track_id = track_id;
        self.recorded = false;
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    pub fn should_record(&self, current_time: f64, duration: f64) -> bool {
        if self.recorded || self.track_id.is_none() || !(duration > 0.0) {
            return false;
        }
        current_time >= self.threshold(duration)
    }

    /// Check progress and claim the listen if the threshold was crossed.
    ///
    /// Marks the track as recorded before the caller persists anything, so
    /// a slow or failing write never produces duplicates.
    pub fn observe(&mut self, current_time: f64, duration: f64) -> Option<String> {
        if !self.should_record(current_time, duration) {
            return None;
        }
        self.recorded = true;
        self.track_id.clone()
    }
}

impl Default for ListenPolicy {
    fn default() -> Self {
        Self::from_config(&UserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(track: &str) -> ListenPolicy {
        let mut policy = ListenPolicy::default();
        policy.reset(Some(track.to_string()));
        policy
    }

    #[test]
    fn test_threshold_is_the_shorter_bound() {
        let policy = ListenPolicy::default();
        // long track: 30 seconds wins
        assert_eq!(policy.threshold(600.0), 30.0);
        // short track: a quarter wins
        assert_eq!(policy.threshold(60.0), 15.0);
    }

    #[test]
    fn test_records_once() {
        let mut policy = policy("t1");
        assert_eq!(policy.observe(10.0, 300.0), None);
        assert_eq!(policy.observe(30.0, 300.0), Some("t1".to_string()));
        assert_eq!(policy.observe(45.0, 300.0), None);
        assert!(policy.is_recorded());
    }

    #[test]
    fn test_reset_allows_next_track() {
        let mut policy = policy("t1");
        policy.observe(100.0, 300.0);

        policy.reset(Some("t2".to_string()));
        assert!(!policy.is_recorded());
        assert_eq!(policy.observe(31.0, 300.0), Some("t2".to_string()));
    }

    #[test]
    fn test_no_listen_without_track_or_duration() {
        let mut policy = ListenPolicy::default();
        assert_eq!(policy.observe(100.0, 300.0), None);

        let mut policy = self::policy("t1");
        assert_eq!(policy.observe(100.0, 0.0), None);
        assert_eq!(policy.observe(100.0, f64::NAN), None);
    }
}
