//! Outcome policy: chooses Bust vs Multiplier for a round.
//!
//! Rounds 1 and 2 are scripted for onboarding (Bust, then a modest win);
//! every later round is a Bernoulli trial on `p_crush` followed, on a win,
//! by a bucketed magnitude draw. No retries and no failure path.

use crate::{
    error::ConfigError,
    rng::UniformSource,
    sampler::{bucketed_sample, skewed_sample, to_hundredths, BucketTable, MAGNITUDE_CEILING, MAGNITUDE_FLOOR},
    types::RoundNumber,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive payout factor with 2-decimal precision, stored as hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMultiplier")]
pub struct Multiplier {
    hundredths: u32,
}

/// Wire shape of a `Multiplier` before the positivity check.
#[derive(Deserialize)]
struct RawMultiplier {
    hundredths: u32,
}

impl TryFrom<RawMultiplier> for Multiplier {
    type Error = String;

    fn try_from(raw: RawMultiplier) -> Result<Self, Self::Error> {
        Multiplier::from_hundredths(raw.hundredths)
            .ok_or_else(|| format!("multiplier must be positive, got {} hundredths", raw.hundredths))
    }
}

impl Multiplier {
    /// Round `value` half-up to hundredths. `None` if the result is not positive.
    pub fn new(value: f64) -> Option<Self> {
        Self::from_hundredths(to_hundredths(value))
    }

    pub fn from_hundredths(hundredths: u32) -> Option<Self> {
        (hundredths > 0).then_some(Self { hundredths })
    }

    pub fn hundredths(&self) -> u32 {
        self.hundredths
    }

    pub fn value(&self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.hundredths / 100, self.hundredths % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Bust,
    Multiplier(Multiplier),
}

impl Outcome {
    pub fn is_bust(&self) -> bool {
        matches!(self, Self::Bust)
    }

    pub fn multiplier(&self) -> Option<Multiplier> {
        match self {
            Self::Bust => None,
            Self::Multiplier(m) => Some(*m),
        }
    }
}

/// A single skewed range, used for the scripted second round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkewRange {
    pub min:   f64,
    pub max:   f64,
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomePolicy {
    /// Probability that an unscripted round busts.
    pub p_crush:          f64,
    /// Round 1 always busts.
    pub first_round_bust: bool,
    /// Round 2 always wins, drawn from this range.
    pub second_round:     Option<SkewRange>,
}

impl Default for OutcomePolicy {
    fn default() -> Self {
        Self {
            p_crush:          0.68,
            first_round_bust: true,
            second_round:     Some(SkewRange { min: 2.0, max: 6.0, power: 1.8 }),
        }
    }
}

impl OutcomePolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.p_crush) {
            return Err(ConfigError::ProbabilityOutOfRange { name: "p_crush", value: self.p_crush });
        }
        if let Some(r) = &self.second_round {
            if !(r.min < r.max) {
                return Err(ConfigError::InvalidRange { index: 0, min: r.min, max: r.max });
            }
            if r.min < MAGNITUDE_FLOOR {
                return Err(ConfigError::RangeBelowFloor { index: 0, min: r.min });
            }
            if !(r.max <= MAGNITUDE_CEILING) {
                return Err(ConfigError::RangeAboveCeiling { index: 0, max: r.max });
            }
            if !(r.power > 0.0) {
                return Err(ConfigError::NonPositivePower { index: 0, power: r.power });
            }
        }
        Ok(())
    }
}

pub struct OutcomeGenerator {
    policy: OutcomePolicy,
    table:  BucketTable,
    rng:    Box<dyn UniformSource>,
}

impl OutcomeGenerator {
    pub fn new(
        policy: OutcomePolicy,
        table: BucketTable,
        rng: Box<dyn UniformSource>,
    ) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { policy, table, rng })
    }

    pub fn policy(&self) -> &OutcomePolicy {
        &self.policy
    }

    /// Draw the outcome for the given 1-based round.
    pub fn generate(&mut self, round: RoundNumber) -> Outcome {
        if round == 1 && self.policy.first_round_bust {
            log::debug!("round={round} outcome: scripted bust");
            return Outcome::Bust;
        }
        if round == 2 {
            if let Some(r) = self.policy.second_round {
                let raw = skewed_sample(self.rng.as_mut(), r.min, r.max, r.power);
                log::debug!("round={round} outcome: scripted multiplier raw={raw:.4}");
                return multiplier_outcome(raw);
            }
        }
        if self.rng.uniform01() < self.policy.p_crush {
            log::debug!("round={round} outcome: bust");
            return Outcome::Bust;
        }
        let draw = bucketed_sample(self.rng.as_mut(), &self.table);
        log::debug!("round={round} outcome: bucket={} value={:.2}", draw.bucket, draw.value);
        multiplier_outcome(draw.value)
    }
}

// Validated ranges never produce less than one hundredth; floor it anyway
// so the Multiplier invariant holds without a panic path.
fn multiplier_outcome(value: f64) -> Outcome {
    let hundredths = to_hundredths(value).max(1);
    Outcome::Multiplier(Multiplier { hundredths })
}
