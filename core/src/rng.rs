//! Injected randomness.
//!
//! RULE: Nothing in the round core may call a platform RNG.
//! Every draw flows through a `UniformSource` handed to the component
//! that needs it, so any scenario can be replayed from a seed or a script.
//!
//! Each consumer gets its own stream, seeded deterministically
//! from (master_seed XOR slot * golden-ratio constant). This means:
//!   - Timing jitter never shifts the outcome stream.
//!   - Adding a new stream never changes existing streams.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The randomness capability: one uniform draw in `[0, 1)`.
pub trait UniformSource {
    fn uniform01(&mut self) -> f64;
}

/// A named, seeded PCG stream.
pub struct SeededRng {
    pub name: &'static str,
    inner:    Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            name:  "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

impl UniformSource for SeededRng {
    /// Top 53 bits scaled into [0.0, 1.0).
    fn uniform01(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    pos:   usize,
}

impl ScriptedSource {
    /// Every draw must lie in [0, 1). An empty script always yields 0.0.
    pub fn new(draws: Vec<f64>) -> Self {
        debug_assert!(
            draws.iter().all(|d| (0.0..1.0).contains(d)),
            "scripted draws must lie in [0, 1)"
        );
        Self { draws, pos: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl UniformSource for ScriptedSource {
    fn uniform01(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let v = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        v
    }
}

/// Derives every stream of one game instance from a single master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn stream(&self, slot: StreamSlot) -> SeededRng {
        let derived = self.master_seed ^ (slot as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        SeededRng::new(derived).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Jitter  = 0,
    Outcome = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jitter  => "jitter",
            Self::Outcome => "outcome",
        }
    }
}
