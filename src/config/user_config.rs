//! User configuration for dithertone
//!
//! This module handles user-configurable settings stored in settings.json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Paths;

/// Thirty days
const MAX_SESSION_TTL_MINUTES: u64 = 30 * 24 * 60;

/// User configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Seconds of playback after which a listen is recorded
    #[serde(default = "default_listen_threshold_secs")]
    pub listen_threshold_secs: f64,

    /// Fraction of the track duration after which a listen is recorded
    #[serde(default = "default_listen_threshold_ratio")]
    pub listen_threshold_ratio: f64,

    /// Past this position "previous" restarts the current track instead
    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    /// Idle playback sessions are dropped after this many minutes
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,

    /// Maximum number of tracks pulled into a shuffle-all queue
    #[serde(default = "default_shuffle_all_limit")]
    pub shuffle_all_limit: u32,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            listen_threshold_secs: default_listen_threshold_secs(),
            listen_threshold_ratio: default_listen_threshold_ratio(),
            restart_threshold_secs: default_restart_threshold_secs(),
            session_ttl_minutes: default_session_ttl_minutes(),
            shuffle_all_limit: default_shuffle_all_limit(),
        }
    }
}

impl UserConfig {
    /// Load configuration from the settings file in the config directory
    pub fn load() -> Result<Self> {
        let paths = Paths::get()?;
        Self::load_from(&paths.settings_path())
    }

    /// Load configuration from a specific file, writing defaults if it is missing
    pub fn load_from(settings_path: &Path) -> Result<Self> {
        if settings_path.exists() {
            let content =
                std::fs::read_to_string(settings_path).context("Failed to read settings file")?;
            let config: UserConfig =
                serde_json::from_str(&content).context("Failed to parse settings file")?;
            Ok(config.sanitized())
        } else {
            let config = Self::default();
            config.save_to(settings_path)?;
            Ok(config)
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, settings_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(settings_path, content).context("Failed to write settings file")?;

        Ok(())
    }

    // hand-edited files can carry nonsense; fall back per field
    fn sanitized(mut self) -> Self {
        if !(self.listen_threshold_secs > 0.0) {
            self.listen_threshold_secs = default_listen_threshold_secs();
        }
        if !(self.listen_threshold_ratio > 0.0 && self.listen_threshold_ratio <= 1.0) {
            self.listen_threshold_ratio = default_listen_threshold_ratio();
        }
        if !(self.restart_threshold_secs >= 0.0) {
            self.restart_threshold_secs = default_restart_threshold_secs();
        }
        if self.session_ttl_minutes == 0 || self.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            self.session_ttl_minutes = default_session_ttl_minutes();
        }
        if self.shuffle_all_limit == 0 {
            self.shuffle_all_limit = default_shuffle_all_limit();
        }
        self
    }
}

// Default value functions for serde

fn default_listen_threshold_secs() -> f64 {
    30.0
}

fn default_listen_threshold_ratio() -> f64 {
    0.25
}

fn default_restart_threshold_secs() -> f64 {
    3.0
}

fn default_session_ttl_minutes() -> u64 {
    120
}

fn default_shuffle_all_limit() -> u32 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert_eq!(config.listen_threshold_secs, 30.0);
        assert_eq!(config.listen_threshold_ratio, 0.25);
        assert_eq!(config.session_ttl_minutes, 120);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"listenThresholdSecs": 10}"#).unwrap();

        let config = UserConfig::load_from(&path).unwrap();
        assert_eq!(config.listen_threshold_secs, 10.0);
        assert_eq!(config.listen_threshold_ratio, 0.25);
        assert_eq!(config.shuffle_all_limit, 500);
    }

    #[test]
    fn test_missing_file_is_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        UserConfig::load_from(&path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("listenThresholdRatio"));
    }

    #[test]
    fn test_invalid_values_are_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"listenThresholdSecs": -4, "listenThresholdRatio": 3.5, "sessionTtlMinutes": 0}"#,
        )
        .unwrap();

        let config = UserConfig::load_from(&path).unwrap();
        assert_eq!(config.listen_threshold_secs, 30.0);
        assert_eq!(config.listen_threshold_ratio, 0.25);
        assert_eq!(config.session_ttl_minutes, 120);
    }

    #[test]
    fn test_zero_shuffle_limit_and_huge_ttl_are_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"shuffleAllLimit": 0, "sessionTtlMinutes": 18446744073709551615}"#,
        )
        .unwrap();

        let config = UserConfig::load_from(&path).unwrap();
        assert_eq!(config.shuffle_all_limit, 500);
        assert_eq!(config.session_ttl_minutes, 120);
    }
}
