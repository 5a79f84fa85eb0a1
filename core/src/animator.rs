//! The single progress driver behind every timed phase.
//!
//! A phase is "run a callback across progress 0..1 over a duration".
//! The status-log reveal, the trajectory, and the fixed impact/reveal holds
//! are all expressed as a `PhaseAnimator` sampled once per frame.
//! No built-in cancellation: a caller that must stop early tracks its own flag.

use crate::{clock::FrameSource, error::RoundResult, types::Millis};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseAnimator {
    start_ms:    Millis,
    duration_ms: Millis,
}

impl PhaseAnimator {
    pub fn start(start_ms: Millis, duration_ms: Millis) -> Self {
        Self { start_ms, duration_ms: duration_ms.max(0.0) }
    }

    /// `min(1, elapsed / duration)`, never negative. Zero duration is already complete.
    pub fn progress(&self, now_ms: Millis) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Elapsed time, capped at the duration.
    pub fn elapsed(&self, now_ms: Millis) -> Millis {
        self.progress(now_ms) * self.duration_ms
    }

    pub fn is_complete(&self, now_ms: Millis) -> bool {
        self.progress(now_ms) >= 1.0
    }

    pub fn duration_ms(&self) -> Millis {
        self.duration_ms
    }

    pub fn end_ms(&self) -> Millis {
        self.start_ms + self.duration_ms
    }
}

/// Drive `on_tick` once per frame until progress reaches exactly 1.
/// Always ticks at least once, even for a zero duration.
pub fn animate<F, T>(frames: &mut F, duration_ms: Millis, mut on_tick: T) -> RoundResult<()>
where
    F: FrameSource + ?Sized,
    T: FnMut(f64) -> RoundResult<()>,
{
    let animator = PhaseAnimator::start(frames.now_ms(), duration_ms);
    loop {
        let now = frames.next_frame()?;
        let progress = animator.progress(now);
        on_tick(progress)?;
        if progress >= 1.0 {
            return Ok(());
        }
    }
}
