//! Shared primitive types used across the entire round core.

use serde::{Deserialize, Serialize};

/// Milliseconds on the frame clock. Fractional because frame timestamps are.
pub type Millis = f64;

/// 1-based index of a round since the sequencer was built.
pub type RoundNumber = u64;

/// Monotonic sequence number assigned by the history store.
pub type SequenceNumber = u64;

/// A point in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snap to whole pixels, the way the renderer places the object.
    pub fn rounded(self) -> Self {
        Self { x: self.x.round(), y: self.y.round() }
    }
}

/// Container bounds in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width:  f64,
    pub height: f64,
}
