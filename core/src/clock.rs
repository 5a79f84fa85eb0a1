//! Frame clocks — the time source every phase suspends on.
//!
//! RULE: The round core never reads a system clock directly.
//! It asks a `FrameSource` for the current time and for the next frame.

use crate::{
    error::{RoundError, RoundResult},
    types::Millis,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::{Duration, Instant};

/// Nominal 60 Hz frame interval.
pub const FRAME_MS: Millis = 1000.0 / 60.0;

pub trait FrameSource {
    /// Current time on the frame clock.
    fn now_ms(&self) -> Millis;

    /// Suspend until the next rendering frame and return its timestamp.
    /// An error means frames are no longer being produced.
    fn next_frame(&mut self) -> RoundResult<Millis>;

    /// Wall-clock instant used to stamp history entries.
    fn wall_time(&self) -> DateTime<Utc>;
}

/// Virtual time advancing a fixed step per frame. Fully deterministic.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now:         Millis,
    frame_ms:    Millis,
    frames_left: Option<u64>,
    epoch:       DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::with_frame_ms(FRAME_MS)
    }

    pub fn with_frame_ms(frame_ms: Millis) -> Self {
        Self {
            now: 0.0,
            frame_ms,
            frames_left: None,
            epoch: DateTime::<Utc>::default(),
        }
    }

    /// Produce at most `frames` more frames, then report rendering unavailable.
    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.frames_left = Some(frames);
        self
    }

    pub fn advance(&mut self, ms: Millis) {
        self.now += ms;
    }
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl FrameSource for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now
    }

    fn next_frame(&mut self) -> RoundResult<Millis> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return Err(RoundError::unavailable("frame budget exhausted"));
            }
            *left -= 1;
        }
        self.now += self.frame_ms;
        Ok(self.now)
    }

    fn wall_time(&self) -> DateTime<Utc> {
        self.epoch + ChronoDuration::milliseconds(self.now as i64)
    }
}

/// Real time, paced by sleeping to the next frame boundary.
#[derive(Debug)]
pub struct RealtimeClock {
    origin:     Instant,
    frame:      Duration,
    last_frame: Instant,
}

impl RealtimeClock {
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            frame: Duration::from_secs_f64(FRAME_MS / 1000.0),
            last_frame: origin,
        }
    }
}

impl Default for RealtimeClock {
    fn default() -> Self { Self::new() }
}

impl FrameSource for RealtimeClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn next_frame(&mut self) -> RoundResult<Millis> {
        let due = self.last_frame + self.frame;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        self.last_frame = Instant::now();
        Ok(self.now_ms())
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
