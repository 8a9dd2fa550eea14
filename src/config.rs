//! Timeline settings.
//!
//! Stored as JSON (`vseq.json`) in the config directory resolved by
//! `paths`. Missing keys take their defaults, a missing file means all
//! defaults.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SequenceError};

pub const CONFIG_FILE: &str = "vseq.json";

/// Minimal gap kept between trim start and trim end (seconds)
pub const DEFAULT_TRIM_EPSILON: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Playback polling interval
    pub tick_interval_ms: u64,
    /// Upper bound for a single duration probe
    pub probe_timeout_ms: u64,
    pub trim_epsilon: f64,
    /// Parallel probes per batch (1 = sequential)
    pub probe_threads: usize,
    /// Wrap to 0 at the end instead of stopping
    pub loop_playback: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            probe_timeout_ms: 10_000,
            trim_epsilon: DEFAULT_TRIM_EPSILON,
            probe_threads: num_cpus::get().clamp(1, 4),
            loop_playback: true,
        }
    }
}

impl TimelineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(1))
    }

    pub fn trim_epsilon(&self) -> f64 {
        if self.trim_epsilon.is_finite() && self.trim_epsilon > 0.0 {
            self.trim_epsilon
        } else {
            DEFAULT_TRIM_EPSILON
        }
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.probe_threads == 0 {
            return Err(SequenceError::Config("probe_threads must be at least 1".into()));
        }
        if !(self.trim_epsilon.is_finite() && self.trim_epsilon > 0.0) {
            return Err(SequenceError::Config(format!(
                "trim_epsilon must be positive, got {}",
                self.trim_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TimelineConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, TimelineConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "probe_timeout_ms": 2500, "loop_playback": false }"#).unwrap();

        let config = TimelineConfig::load(&path).unwrap();
        assert_eq!(config.probe_timeout(), Duration::from_millis(2500));
        assert!(!config.loop_playback);
        assert_eq!(config.tick_interval_ms, 100);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = TimelineConfig {
            tick_interval_ms: 40,
            probe_threads: 2,
            ..TimelineConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(TimelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        std::fs::write(&path, r#"{ "probe_threads": 0 }"#).unwrap();
        assert!(matches!(TimelineConfig::load(&path), Err(SequenceError::Config(_))));

        std::fs::write(&path, r#"{ "trim_epsilon": -1.0 }"#).unwrap();
        assert!(matches!(TimelineConfig::load(&path), Err(SequenceError::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(TimelineConfig::load(&path), Err(SequenceError::Json(_))));
    }
}
