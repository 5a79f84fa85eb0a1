use thiserror::Error;

/// Invalid tunables. Detected before a sequencer exists; never recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Bucket table is empty")]
    EmptyBucketTable,

    #[error("Bucket {index}: weight must be positive, got {weight}")]
    NonPositiveWeight { index: usize, weight: f64 },

    #[error("Bucket {index}: range min {min} must be below max {max}")]
    InvalidRange { index: usize, min: f64, max: f64 },

    #[error("Bucket {index}: range min {min} is below the 0.01 multiplier floor")]
    RangeBelowFloor { index: usize, min: f64 },

    #[error("Bucket {index}: range max {max} exceeds the largest representable multiplier")]
    RangeAboveCeiling { index: usize, max: f64 },

    #[error("Bucket {index}: skew power must be positive, got {power}")]
    NonPositivePower { index: usize, power: f64 },

    #[error("Probability '{name}' must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("Timing '{name}' is invalid: {value}")]
    InvalidTiming { name: &'static str, value: f64 },

    #[error("History capacity must be at least 1")]
    ZeroCapacity,
}

/// Timings and durations must be finite and not negative.
pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidTiming { name, value })
    }
}

/// Failures that abort an in-progress round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("Rendering unavailable: {what}")]
    RenderingUnavailable { what: String },
}

impl RoundError {
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::RenderingUnavailable { what: what.into() }
    }
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T>  = Result<T, GameError>;
pub type RoundResult<T> = Result<T, RoundError>;
