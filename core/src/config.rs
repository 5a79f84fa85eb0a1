//! Tunable policy table for a game instance.
//!
//! Every timing, probability, and bucket lives here, loadable from JSON.
//! Missing fields fall back to the production defaults, so a file only has
//! to name what it overrides.

use crate::{
    activity_log::ActivityLogConfig,
    error::{non_negative, ConfigError, GameResult},
    history::HistoryConfig,
    outcome::OutcomePolicy,
    sampler::{default_buckets, BucketTable, SamplingBucket},
    trajectory::TrajectoryConfig,
    types::Millis,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub activity_log: ActivityLogConfig,
    pub trajectory:   TrajectoryConfig,
    pub impact_ms:    Millis,
    pub reveal_ms:    Millis,
    pub outcome:      OutcomePolicy,
    pub buckets:      Vec<SamplingBucket>,
    pub history:      HistoryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            activity_log: ActivityLogConfig::default(),
            trajectory:   TrajectoryConfig::default(),
            impact_ms:    500.0,
            reveal_ms:    1200.0,
            outcome:      OutcomePolicy::default(),
            buckets:      default_buckets(),
            history:      HistoryConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config = Self::from_json_str(&content)?;
        log::debug!("Loaded game config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Every check that must pass before a sequencer may be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.activity_log.validate()?;
        self.trajectory.validate()?;
        non_negative("impact_ms", self.impact_ms)?;
        non_negative("reveal_ms", self.reveal_ms)?;
        self.outcome.validate()?;
        self.bucket_table()?;
        if self.history.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn bucket_table(&self) -> Result<BucketTable, ConfigError> {
        BucketTable::new(self.buckets.clone())
    }
}
