//! The two narrow seams to the presentation layer.
//!
//! `GeometryProvider` answers layout questions; `PresentationSink` receives
//! events. Either may report that rendering is unavailable, which aborts the
//! round in progress.

use crate::{
    error::{RoundError, RoundResult},
    event::RoundEvent,
    trajectory::TrajectoryConfig,
    types::{Point, Size},
};

pub trait GeometryProvider {
    /// The object's configured resting point.
    fn start_point(&self) -> RoundResult<Point>;

    /// Current container bounds.
    fn container_size(&self) -> RoundResult<Size>;

    /// Start and impact points for a flight.
    fn flight_endpoints(&self, config: &TrajectoryConfig) -> RoundResult<(Point, Point)> {
        Ok((self.start_point()?, config.target_in(self.container_size()?)))
    }
}

pub trait PresentationSink {
    fn emit(&mut self, event: RoundEvent) -> RoundResult<()>;
}

impl<S: PresentationSink + ?Sized> PresentationSink for &mut S {
    fn emit(&mut self, event: RoundEvent) -> RoundResult<()> {
        (**self).emit(event)
    }
}

/// Fixed layout, for headless hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGeometry {
    pub start:     Point,
    pub container: Size,
}

impl FixedGeometry {
    pub fn new(start: Point, container: Size) -> Self {
        Self { start, container }
    }
}

impl Default for FixedGeometry {
    /// A phone-sized container with the object resting bottom-left.
    fn default() -> Self {
        Self {
            start:     Point::new(40.0, 640.0),
            container: Size { width: 390.0, height: 760.0 },
        }
    }
}

impl GeometryProvider for FixedGeometry {
    fn start_point(&self) -> RoundResult<Point> {
        Ok(self.start)
    }

    fn container_size(&self) -> RoundResult<Size> {
        if self.container.width > 0.0 && self.container.height > 0.0 {
            Ok(self.container)
        } else {
            Err(RoundError::unavailable("container has no layout"))
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<RoundEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// The status log text as it would appear on screen.
    pub fn log_text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::LogCharacterAppended { ch } => Some(*ch),
                _ => None,
            })
            .collect()
    }
}

impl PresentationSink for RecordingSink {
    fn emit(&mut self, event: RoundEvent) -> RoundResult<()> {
        self.events.push(event);
        Ok(())
    }
}
