//! Sequencer configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_RESOLUTION: Duration = Duration::from_micros(100);
const MAX_RESOLUTION: Duration = Duration::from_millis(100);

/// Configuration for the dispatch thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Sleep quantum between dispatch passes (default: 1ms)
    /// Worst-case dispatch latency is about one quantum. Smaller values
    /// cost more wake-ups.
    pub resolution: Duration,
    /// Run the dispatch thread at maximum OS priority (default: true)
    /// Failure to elevate is logged and ignored.
    pub elevate_priority: bool,
    /// Name of the dispatch thread (default: "tempora-dispatch")
    pub thread_name: String,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            resolution: Duration::from_millis(1),
            elevate_priority: true,
            thread_name: "tempora-dispatch".to_string(),
        }
    }
}

impl SequencerConfig {
    pub fn with_resolution(mut self, resolution: Duration) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_elevate_priority(mut self, elevate: bool) -> Self {
        self.elevate_priority = elevate;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution < MIN_RESOLUTION || self.resolution > MAX_RESOLUTION {
            return Err(Error::InvalidConfig(format!(
                "resolution must be between {:?} and {:?}, got {:?}",
                MIN_RESOLUTION, MAX_RESOLUTION, self.resolution
            )));
        }
        if self.thread_name.is_empty() {
            return Err(Error::InvalidConfig("thread name must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequencerConfig::default();
        assert_eq!(config.resolution, Duration::from_millis(1));
        assert!(config.elevate_priority);
        assert_eq!(config.thread_name, "tempora-dispatch");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolution_bounds() {
        let too_fine = SequencerConfig::default().with_resolution(Duration::from_micros(10));
        assert!(matches!(too_fine.validate(), Err(Error::InvalidConfig(_))));

        let too_coarse = SequencerConfig::default().with_resolution(Duration::from_secs(1));
        assert!(matches!(too_coarse.validate(), Err(Error::InvalidConfig(_))));

        let edge = SequencerConfig::default().with_resolution(Duration::from_millis(100));
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_empty_thread_name_rejected() {
        let config = SequencerConfig::default().with_thread_name("");
        assert!(config.validate().is_err());
    }
}
