//! Weighted piecewise power-law sampling of outcome magnitudes.
//!
//! RULE: The bucket table is immutable configuration. Selection is a pure
//! function of (table, draw) so the table can be swapped or property-tested
//! without any animation code in the loop.
//!
//! Rounding: values are scaled by 100 and rounded half away from zero
//! (`f64::round`), which for positive magnitudes is round-half-up.
//! A tie only exists when the binary value is an exact half-hundredth
//! (2.125 -> 2.13); decimal literals that are not exact in binary round by
//! their binary value (1.005 is stored as 1.00499.. and rounds to 1.00).

use crate::{error::ConfigError, rng::UniformSource, timing::lerp};
use serde::{Deserialize, Serialize};

/// Smallest magnitude a bucket may produce; keeps multipliers positive after rounding.
pub const MAGNITUDE_FLOOR: f64 = 0.01;

/// Largest magnitude a bucket may produce; multipliers are stored as `u32` hundredths.
pub const MAGNITUDE_CEILING: f64 = u32::MAX as f64 / 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingBucket {
    pub range_min: f64,
    pub range_max: f64,
    pub weight:    f64,
    pub power:     f64,
}

impl SamplingBucket {
    pub const fn new(range_min: f64, range_max: f64, weight: f64, power: f64) -> Self {
        Self { range_min, range_max, weight, power }
    }
}

/// A validated, ordered bucket table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BucketTable {
    buckets: Vec<SamplingBucket>,
}

impl BucketTable {
    pub fn new(buckets: Vec<SamplingBucket>) -> Result<Self, ConfigError> {
        if buckets.is_empty() {
            return Err(ConfigError::EmptyBucketTable);
        }
        for (index, b) in buckets.iter().enumerate() {
            // Negated comparisons so NaN is rejected too.
            if !(b.weight > 0.0) {
                return Err(ConfigError::NonPositiveWeight { index, weight: b.weight });
            }
            if !(b.range_min < b.range_max) {
                return Err(ConfigError::InvalidRange { index, min: b.range_min, max: b.range_max });
            }
            if b.range_min < MAGNITUDE_FLOOR {
                return Err(ConfigError::RangeBelowFloor { index, min: b.range_min });
            }
            if !(b.range_max <= MAGNITUDE_CEILING) {
                return Err(ConfigError::RangeAboveCeiling { index, max: b.range_max });
            }
            if !(b.power > 0.0) {
                return Err(ConfigError::NonPositivePower { index, power: b.power });
            }
        }
        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[SamplingBucket] {
        &self.buckets
    }

    pub fn total_weight(&self) -> f64 {
        self.buckets.iter().map(|b| b.weight).sum()
    }
}

impl<'de> Deserialize<'de> for BucketTable {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let buckets = Vec::<SamplingBucket>::deserialize(d)?;
        BucketTable::new(buckets).map_err(serde::de::Error::custom)
    }
}

/// The production magnitude distribution. Weights sum to 32.
pub fn default_buckets() -> Vec<SamplingBucket> {
    vec![
        SamplingBucket::new(0.6,   0.99,  8.0,  3.0),
        SamplingBucket::new(1.0,   7.0,   14.0, 2.2),
        SamplingBucket::new(7.0,   11.0,  4.0,  1.9),
        SamplingBucket::new(11.0,  50.0,  3.0,  1.6),
        SamplingBucket::new(50.0,  200.0, 3.0,  1.4),
    ]
}

/// Draw `u` in [0,1), raise to `power`, map into [min, max].
/// Higher `power` clusters results toward `min`.
pub fn skewed_sample(rng: &mut dyn UniformSource, min: f64, max: f64, power: f64) -> f64 {
    let u = rng.uniform01();
    lerp(min, max, u.powf(power)).clamp(min, max)
}

/// Walk the table in order, subtracting each weight from `r` until one
/// bucket's weight exceeds the remainder. `r` is expected in [0, total).
/// The last bucket absorbs any floating-point remainder.
pub fn select_bucket(buckets: &[SamplingBucket], r: f64) -> usize {
    let mut remainder = r;
    for (index, b) in buckets.iter().enumerate() {
        if remainder < b.weight {
            return index;
        }
        remainder -= b.weight;
    }
    buckets.len().saturating_sub(1)
}

/// One bucketed draw: which bucket was chosen and the rounded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketDraw {
    pub bucket: usize,
    pub value:  f64,
}

/// Two draws: one selects the bucket, one feeds `skewed_sample`.
pub fn bucketed_sample(rng: &mut dyn UniformSource, table: &BucketTable) -> BucketDraw {
    let r = rng.uniform01() * table.total_weight();
    let bucket = select_bucket(table.buckets(), r);
    let chosen = &table.buckets()[bucket];
    let raw = skewed_sample(rng, chosen.range_min, chosen.range_max, chosen.power);
    BucketDraw { bucket, value: round_hundredths(raw) }
}

/// Round to 2 decimal places, half-up.
pub fn round_hundredths(v: f64) -> f64 {
    to_hundredths(v) as f64 / 100.0
}

/// The value as an integer count of hundredths, half-up. Negative input saturates to 0.
pub fn to_hundredths(v: f64) -> u32 {
    (v * 100.0).round() as u32
}
