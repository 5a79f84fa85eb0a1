//! The simulated-activity status log shown before takeoff.
//!
//! The whole reveal is precomputed at launch into a `RevealScript`: one
//! timestamp per character, jittered, with a pause after every line and a
//! final hold. The Logging phase then replays the script through a
//! `PhaseAnimator`, appending every character whose time has come.

use crate::{
    error::{non_negative, ConfigError},
    rng::UniformSource,
    timing::{clamp, lerp},
    types::Millis,
};
use serde::{Deserialize, Serialize};

pub fn default_status_lines() -> Vec<String> {
    [
        "[SYS] boot sequence initiated...",
        "[NET] linking telemetry adapters...",
        "[I/O] streaming anonymized telemetry...",
        "[ANALYTICS] extracting session features...",
        "[MODEL] running quick pattern pass...",
        "> READY. EXECUTE GET SIGNAL.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogConfig {
    pub enabled:           bool,
    pub lines:             Vec<String>,
    /// Target for the character reveal, excluding pauses and the final hold.
    pub total_ms:          Millis,
    pub min_char_ms:       Millis,
    pub max_char_ms:       Millis,
    /// Per-character jitter as a fraction of the base delay (0.3 = ±30%).
    pub jitter:            f64,
    pub line_pause_min_ms: Millis,
    pub line_pause_max_ms: Millis,
    pub final_hold_ms:     Millis,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self {
            enabled:           true,
            lines:             default_status_lines(),
            total_ms:          1400.0,
            min_char_ms:       3.0,
            max_char_ms:       24.0,
            jitter:            0.30,
            line_pause_min_ms: 40.0,
            line_pause_max_ms: 120.0,
            final_hold_ms:     250.0,
        }
    }
}

impl ActivityLogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("activity_log.total_ms", self.total_ms)?;
        non_negative("activity_log.min_char_ms", self.min_char_ms)?;
        non_negative("activity_log.final_hold_ms", self.final_hold_ms)?;
        non_negative("activity_log.line_pause_min_ms", self.line_pause_min_ms)?;
        if !(self.max_char_ms >= self.min_char_ms) {
            return Err(ConfigError::InvalidTiming { name: "activity_log.max_char_ms", value: self.max_char_ms });
        }
        if !(self.line_pause_max_ms >= self.line_pause_min_ms) {
            return Err(ConfigError::InvalidTiming {
                name:  "activity_log.line_pause_max_ms",
                value: self.line_pause_max_ms,
            });
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::ProbabilityOutOfRange { name: "activity_log.jitter", value: self.jitter });
        }
        Ok(())
    }

    /// Characters counted for pacing: every line plus one separator.
    pub fn paced_char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count() + 1).sum()
    }

    /// `round(total / chars)` clamped to the per-character bounds.
    pub fn base_char_delay_ms(&self) -> Millis {
        let chars = self.paced_char_count();
        if chars == 0 {
            return self.max_char_ms;
        }
        clamp((self.total_ms / chars as f64).round(), self.min_char_ms, self.max_char_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealStep {
    pub ch:    char,
    pub at_ms: Millis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealScript {
    steps:    Vec<RevealStep>,
    total_ms: Millis,
}

impl RevealScript {
    /// An empty script for a disabled log: nothing to reveal, no hold.
    pub fn empty() -> Self {
        Self { steps: Vec::new(), total_ms: 0.0 }
    }

    /// Lay out every character on the timeline, drawing jitter from `rng`.
    pub fn build(config: &ActivityLogConfig, rng: &mut dyn UniformSource) -> Self {
        if !config.enabled {
            return Self::empty();
        }
        let base = config.base_char_delay_ms();
        let mut steps = Vec::with_capacity(config.paced_char_count());
        let mut t = 0.0;
        let last = config.lines.len().saturating_sub(1);

        for (i, line) in config.lines.iter().enumerate() {
            let separator = (i != last).then_some('\n');
            for ch in line.chars().chain(separator) {
                steps.push(RevealStep { ch, at_ms: t });
                let scale = lerp(1.0 - config.jitter, 1.0 + config.jitter, rng.uniform01());
                t += base * scale;
            }
            t += lerp(config.line_pause_min_ms, config.line_pause_max_ms, rng.uniform01());
        }
        t += config.final_hold_ms;

        Self { steps, total_ms: t }
    }

    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    pub fn total_ms(&self) -> Millis {
        self.total_ms
    }

    /// How many characters are due by `elapsed_ms`.
    pub fn due(&self, elapsed_ms: Millis) -> usize {
        self.steps.partition_point(|s| s.at_ms <= elapsed_ms)
    }

    pub fn text(&self) -> String {
        self.steps.iter().map(|s| s.ch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedSource, SeededRng};

    fn two_lines() -> ActivityLogConfig {
        ActivityLogConfig {
            lines: vec!["ab".into(), "c".into()],
            total_ms: 50.0,
            ..ActivityLogConfig::default()
        }
    }

    #[test]
    fn base_delay_is_rounded_and_clamped() {
        let cfg = ActivityLogConfig::default();
        // 219 paced characters over 1400 ms rounds to 6 ms.
        assert_eq!(cfg.paced_char_count(), 219);
        assert_eq!(cfg.base_char_delay_ms(), 6.0);

        let slow = ActivityLogConfig { lines: vec!["x".into()], ..cfg.clone() };
        assert_eq!(slow.base_char_delay_ms(), 24.0);

        let fast = ActivityLogConfig { total_ms: 10.0, ..cfg };
        assert_eq!(fast.base_char_delay_ms(), 3.0);
    }

    #[test]
    fn script_reveals_text_with_newlines_between_lines() {
        let mut rng = SeededRng::new(1);
        let script = RevealScript::build(&two_lines(), &mut rng);
        assert_eq!(script.text(), "ab\nc");
        let full = RevealScript::build(&ActivityLogConfig::default(), &mut rng);
        assert_eq!(full.text(), default_status_lines().join("\n"));
    }

    #[test]
    fn script_timeline_without_jitter() {
        // 50 ms over 5 paced chars -> base 10 ms. u = 0.5 gives scale 1.0 and an 80 ms pause.
        let mut rng = ScriptedSource::new(vec![0.5]);
        let script = RevealScript::build(&two_lines(), &mut rng);
        let expected = [0.0, 10.0, 20.0, 110.0];
        assert_eq!(script.steps().len(), expected.len());
        for (step, want) in script.steps().iter().zip(expected) {
            assert!((step.at_ms - want).abs() < 1e-9, "{} at {} != {want}", step.ch, step.at_ms);
        }
        // 120 + 80 pause + 250 hold
        assert!((script.total_ms() - 450.0).abs() < 1e-9);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let cfg = ActivityLogConfig::default();
        let base = cfg.base_char_delay_ms();
        let mut rng = SeededRng::new(77);
        let script = RevealScript::build(&cfg, &mut rng);
        let min_total = base * 0.7 * cfg.paced_char_count() as f64;
        assert!(script.total_ms() >= min_total);
        for w in script.steps().windows(2) {
            let gap = w[1].at_ms - w[0].at_ms;
            assert!(gap >= base * 0.7 - 1e-9, "gap {gap} below jitter floor");
            assert!(gap <= base * 1.3 + cfg.line_pause_max_ms + 1e-9, "gap {gap} too long");
        }
    }

    #[test]
    fn due_counts_revealed_characters() {
        let mut rng = ScriptedSource::new(vec![0.5]);
        let script = RevealScript::build(&two_lines(), &mut rng);
        assert_eq!(script.due(0.0), 1);
        assert_eq!(script.due(15.0), 2);
        assert_eq!(script.due(109.0), 3);
        assert_eq!(script.due(1000.0), 4);
    }

    #[test]
    fn disabled_log_is_empty() {
        let cfg = ActivityLogConfig { enabled: false, ..ActivityLogConfig::default() };
        let mut rng = SeededRng::new(1);
        let script = RevealScript::build(&cfg, &mut rng);
        assert!(script.steps().is_empty());
        assert_eq!(script.total_ms(), 0.0);
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let cfg = ActivityLogConfig { min_char_ms: 30.0, ..ActivityLogConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidTiming { .. })));
        let cfg = ActivityLogConfig { jitter: 2.0, ..ActivityLogConfig::default() };
        assert!(cfg.validate().is_err());
        assert!(ActivityLogConfig::default().validate().is_ok());
    }
}
