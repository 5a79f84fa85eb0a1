//! Object flight from the start point to the impact point.
//!
//! Position follows an eased lerp along a straight path. Heading follows the
//! instantaneous velocity, clamped to the allowed pitch band, then blended
//! toward that target each frame so the object never snaps.

use crate::{
    error::{non_negative, ConfigError},
    timing::{clamp, ease_in_out_cubic, heading_degrees, lerp},
    types::{Millis, Point, Size},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    pub duration_ms:      Millis,
    /// Impact point as a fraction of the container's width and height.
    pub target_fraction:  (f64, f64),
    /// Steepest climb, degrees (negative is up on screen).
    pub angle_limit_up:   f64,
    /// Steepest dive, degrees.
    pub angle_limit_down: f64,
    /// Per-frame blend toward the clamped heading.
    pub angle_blend:      f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            duration_ms:      2400.0,
            target_fraction:  (0.72, 0.42),
            angle_limit_up:   -28.0,
            angle_limit_down: 12.0,
            angle_blend:      0.2,
        }
    }
}

impl TrajectoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("trajectory.duration_ms", self.duration_ms)?;
        if !(self.angle_limit_up <= self.angle_limit_down) {
            return Err(ConfigError::InvalidTiming {
                name:  "trajectory.angle_limit_up",
                value: self.angle_limit_up,
            });
        }
        if !(0.0..=1.0).contains(&self.angle_blend) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name:  "trajectory.angle_blend",
                value: self.angle_blend,
            });
        }
        Ok(())
    }

    /// Impact point inside a container of the given size.
    pub fn target_in(&self, container: Size) -> Point {
        Point::new(
            container.width * self.target_fraction.0,
            container.height * self.target_fraction.1,
        )
    }
}

/// Per-frame flight data for the renderer. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    pub position: Point,
    pub heading:  f64,
    pub progress: f64,
}

/// One flight in progress. Carries the previous position and smoothed heading.
#[derive(Debug, Clone)]
pub struct Flight {
    start:        Point,
    target:       Point,
    prev:         Point,
    angle:        f64,
    limit_up:     f64,
    limit_down:   f64,
    blend:        f64,
    last:         Option<TrajectoryFrame>,
}

impl Flight {
    pub fn new(start: Point, target: Point, config: &TrajectoryConfig) -> Self {
        Self {
            start,
            target,
            prev:       start,
            angle:      0.0,
            limit_up:   config.angle_limit_up,
            limit_down: config.angle_limit_down,
            blend:      config.angle_blend,
            last:       None,
        }
    }

    /// Advance to linear `progress` in [0, 1].
    pub fn frame(&mut self, progress: f64) -> TrajectoryFrame {
        let p = ease_in_out_cubic(progress);
        let cur = Point::new(
            lerp(self.start.x, self.target.x, p),
            lerp(self.start.y, self.target.y, p),
        );
        let heading = heading_degrees(cur.x - self.prev.x, cur.y - self.prev.y);
        let target_angle = clamp(heading, self.limit_up, self.limit_down);
        self.angle = lerp(self.angle, target_angle, self.blend);
        self.prev = cur;

        let frame = TrajectoryFrame { position: cur, heading: self.angle, progress };
        self.last = Some(frame);
        frame
    }

    /// Where the object ended up; the start point if no frame was drawn.
    pub fn final_position(&self) -> Point {
        self.last.map(|f| f.position).unwrap_or(self.start)
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn target(&self) -> Point {
        self.target
    }
}
