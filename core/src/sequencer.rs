//! The round sequencer — one round from launch signal back to Idle.
//!
//! PHASE ORDER (fixed, strictly linear, never skipped):
//!   Idle -> Logging -> Trajectory -> Impact -> Reveal -> Idle
//!
//! RULES:
//!   - At most one round is active. A launch while not Idle is dropped.
//!   - Every phase is a `PhaseAnimator` sampled once per frame; the host
//!     pumps `tick()` (or calls `run_round()`, which does it for you).
//!   - No cancellation. A round runs to completion unless rendering becomes
//!     unavailable, in which case it is aborted, nothing is recorded, and
//!     the sequencer is back in Idle.
//!   - The outcome is drawn at Reveal entry and recorded at Reveal exit.
//!     Once recorded the round is complete, whatever the sink does next.

use crate::{
    activity_log::RevealScript,
    animator::PhaseAnimator,
    clock::FrameSource,
    config::GameConfig,
    error::{ConfigError, RoundError, RoundResult},
    event::{RoundEvent, RoundState},
    history::{HistoryEntry, HistoryStore},
    outcome::{Outcome, OutcomeGenerator},
    presentation::{GeometryProvider, PresentationSink},
    rng::{RngBank, StreamSlot, UniformSource},
    trajectory::Flight,
    types::{Millis, Point, RoundNumber},
};
use chrono::{DateTime, Utc};

/// The random streams a sequencer consumes.
pub struct RngStreams {
    /// Status-log timing jitter.
    pub jitter:  Box<dyn UniformSource>,
    /// Outcome policy and magnitude draws.
    pub outcome: Box<dyn UniformSource>,
}

impl RngStreams {
    pub fn new(jitter: Box<dyn UniformSource>, outcome: Box<dyn UniformSource>) -> Self {
        Self { jitter, outcome }
    }

    /// Both streams derived from one master seed.
    pub fn seeded(seed: u64) -> Self {
        let bank = RngBank::new(seed);
        Self {
            jitter:  Box::new(bank.stream(StreamSlot::Jitter)),
            outcome: Box::new(bank.stream(StreamSlot::Outcome)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started { round: RoundNumber },
    /// A round is already running; the signal was dropped.
    Rejected { state: RoundState },
}

enum Stage {
    Idle,
    Logging {
        script:   RevealScript,
        animator: PhaseAnimator,
        revealed: usize,
    },
    Trajectory {
        flight:   Flight,
        animator: PhaseAnimator,
    },
    Impact {
        anchor:   Point,
        animator: PhaseAnimator,
    },
    Reveal {
        outcome:  Outcome,
        animator: PhaseAnimator,
    },
}

impl Stage {
    fn state(&self) -> RoundState {
        match self {
            Self::Idle              => RoundState::Idle,
            Self::Logging { .. }    => RoundState::Logging,
            Self::Trajectory { .. } => RoundState::Trajectory,
            Self::Impact { .. }     => RoundState::Impact,
            Self::Reveal { .. }     => RoundState::Reveal,
        }
    }
}

enum Step {
    Wait,
    Advance,
    Finished(HistoryEntry),
}

pub struct RoundSequencer<G, S> {
    config:           GameConfig,
    geometry:         G,
    sink:             S,
    jitter:           Box<dyn UniformSource>,
    outcomes:         OutcomeGenerator,
    history:          HistoryStore,
    completed_rounds: RoundNumber,
    round:            RoundNumber,
    stage:            Stage,
}

impl<G: GeometryProvider, S: PresentationSink> RoundSequencer<G, S> {
    /// Validate the config and wire up a sequencer in Idle.
    /// An invalid config never produces a sequencer.
    pub fn new(config: GameConfig, rng: RngStreams, geometry: G, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let outcomes = OutcomeGenerator::new(config.outcome.clone(), config.bucket_table()?, rng.outcome)?;
        let history = HistoryStore::new(config.history.capacity)?;
        Ok(Self {
            config,
            geometry,
            sink,
            jitter: rng.jitter,
            outcomes,
            history,
            completed_rounds: 0,
            round: 0,
            stage: Stage::Idle,
        })
    }

    pub fn state(&self) -> RoundState {
        self.stage.state()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.stage, Stage::Idle)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn completed_rounds(&self) -> RoundNumber {
        self.completed_rounds
    }

    /// The round in progress, if any.
    pub fn current_round(&self) -> Option<RoundNumber> {
        (!self.is_idle()).then_some(self.round)
    }

    /// The external launch signal. Dropped unless Idle.
    pub fn launch<F: FrameSource + ?Sized>(&mut self, frames: &F) -> RoundResult<LaunchOutcome> {
        if !self.is_idle() {
            log::debug!("round={} launch ignored in {:?}", self.round, self.state());
            return Ok(LaunchOutcome::Rejected { state: self.state() });
        }

        let round = self.completed_rounds + 1;
        let now = frames.now_ms();
        let script = RevealScript::build(&self.config.activity_log, self.jitter.as_mut());
        log::debug!(
            "round={round} launch: {} status chars over {:.0}ms",
            script.steps().len(),
            script.total_ms()
        );

        self.round = round;
        self.stage = Stage::Logging {
            animator: PhaseAnimator::start(now, script.total_ms()),
            script,
            revealed: 0,
        };

        let entered = self
            .emit(RoundEvent::PhaseChanged { round, state: RoundState::Logging })
            .and_then(|_| self.emit(RoundEvent::LogCleared));
        if let Err(e) = entered {
            self.abort(&e);
            return Err(e);
        }
        Ok(LaunchOutcome::Started { round })
    }

    /// Advance the active round to the frame clock's current time.
    /// Returns the recorded entry on the tick that completes the round.
    pub fn tick<F: FrameSource + ?Sized>(&mut self, frames: &F) -> RoundResult<Option<HistoryEntry>> {
        if self.is_idle() {
            return Ok(None);
        }
        let now = frames.now_ms();
        let wall = frames.wall_time();
        let result = self.advance(now, wall);
        if let Err(e) = &result {
            self.abort(e);
        }
        result
    }

    /// Launch and pump frames until the round completes.
    /// `Ok(None)` if a round was already running.
    pub fn run_round<F: FrameSource + ?Sized>(&mut self, frames: &mut F) -> RoundResult<Option<HistoryEntry>> {
        if let LaunchOutcome::Rejected { .. } = self.launch(frames)? {
            return Ok(None);
        }
        loop {
            if let Err(e) = frames.next_frame() {
                self.abort(&e);
                return Err(e);
            }
            if let Some(entry) = self.tick(frames)? {
                return Ok(Some(entry));
            }
        }
    }

    // ── Phase stepping ─────────────────────────────

    /// Step the current phase; phases that complete hand over at the same
    /// instant, so zero-length phases pass straight through.
    fn advance(&mut self, now: Millis, wall: DateTime<Utc>) -> RoundResult<Option<HistoryEntry>> {
        loop {
            match self.step(now, wall)? {
                Step::Wait => return Ok(None),
                Step::Advance => self.enter_next(now)?,
                Step::Finished(entry) => return Ok(Some(entry)),
            }
        }
    }

    fn step(&mut self, now: Millis, wall: DateTime<Utc>) -> RoundResult<Step> {
        let sink = &mut self.sink;
        let done = match &mut self.stage {
            Stage::Idle => return Ok(Step::Wait),

            Stage::Logging { script, animator, revealed } => {
                let due = script.due(animator.elapsed(now));
                while *revealed < due {
                    sink.emit(RoundEvent::LogCharacterAppended { ch: script.steps()[*revealed].ch })?;
                    *revealed += 1;
                }
                animator.is_complete(now)
            }

            Stage::Trajectory { flight, animator } => {
                let progress = animator.progress(now);
                let frame = flight.frame(progress);
                sink.emit(RoundEvent::PositionUpdate {
                    x:     frame.position.x,
                    y:     frame.position.y,
                    angle: frame.heading,
                })?;
                progress >= 1.0
            }

            Stage::Impact { animator, .. } | Stage::Reveal { animator, .. } => animator.is_complete(now),
        };

        if !done {
            return Ok(Step::Wait);
        }
        if let Stage::Reveal { .. } = self.stage {
            return self.finish_round(wall).map(Step::Finished);
        }
        Ok(Step::Advance)
    }

    fn enter_next(&mut self, now: Millis) -> RoundResult<()> {
        let round = self.round;
        let prev = std::mem::replace(&mut self.stage, Stage::Idle);
        let next_state = prev.state().next();
        log::debug!("round={round} phase: {:?} -> {next_state:?}", prev.state());
        self.emit(RoundEvent::PhaseChanged { round, state: next_state })?;

        self.stage = match prev {
            Stage::Logging { .. } => {
                self.emit(RoundEvent::LogHidden)?;
                let (start, target) = self.geometry.flight_endpoints(&self.config.trajectory)?;
                Stage::Trajectory {
                    flight:   Flight::new(start, target, &self.config.trajectory),
                    animator: PhaseAnimator::start(now, self.config.trajectory.duration_ms),
                }
            }
            Stage::Trajectory { flight, .. } => {
                let anchor = flight.final_position().rounded();
                self.emit(RoundEvent::ImpactTriggered { x: anchor.x, y: anchor.y })?;
                self.emit(RoundEvent::ObjectVisibility { visible: false })?;
                Stage::Impact {
                    anchor,
                    animator: PhaseAnimator::start(now, self.config.impact_ms),
                }
            }
            Stage::Impact { anchor, .. } => {
                let outcome = self.outcomes.generate(round);
                self.emit(RoundEvent::OutcomeRevealed { outcome, x: anchor.x, y: anchor.y })?;
                Stage::Reveal {
                    outcome,
                    animator: PhaseAnimator::start(now, self.config.reveal_ms),
                }
            }
            // Reveal exits through finish_round; Idle never steps.
            Stage::Reveal { .. } | Stage::Idle => {
                return Err(RoundError::unavailable("phase handover from a terminal stage"));
            }
        };
        Ok(())
    }

    /// Commit the outcome to history, then restore the idle scene.
    /// Only a failure before the commit aborts the round.
    fn finish_round(&mut self, wall: DateTime<Utc>) -> RoundResult<HistoryEntry> {
        let outcome = match &self.stage {
            Stage::Reveal { outcome, .. } => *outcome,
            _ => return Err(RoundError::unavailable("finish outside reveal")),
        };
        self.sink.emit(RoundEvent::OutcomeCleared)?;

        let entry = self.history.record(outcome, wall);
        self.completed_rounds = self.round;
        self.stage = Stage::Idle;
        log::info!(
            "round={} complete: {:?} (history seq={}, len={})",
            self.round,
            outcome,
            entry.sequence,
            self.history.len()
        );

        // Committed. Later sink failures are logged and never undo the round.
        let entries = self.history.recent(self.config.history.display_window);
        let published = self.emit(RoundEvent::HistoryChanged { entries });
        let restored = self.restore_scene();
        if let Err(e) = published.and(restored) {
            log::warn!("round={} recorded, presentation update failed: {e}", self.round);
        }
        Ok(entry)
    }

    /// Object back at its start with a level heading, visible, launch re-enabled.
    fn restore_scene(&mut self) -> RoundResult<()> {
        let start = self.geometry.start_point()?;
        self.emit(RoundEvent::PositionUpdate { x: start.x, y: start.y, angle: 0.0 })?;
        self.emit(RoundEvent::ObjectVisibility { visible: true })?;
        self.emit(RoundEvent::PhaseChanged { round: self.round, state: RoundState::Idle })
    }

    /// Fail-safe: back to Idle without touching history, best-effort scene reset.
    fn abort(&mut self, err: &RoundError) {
        log::warn!("round={} aborted: {err}", self.round);
        self.stage = Stage::Idle;
        if let Err(e) = self.restore_scene() {
            log::warn!("round={} scene reset failed: {e}", self.round);
        }
    }

    fn emit(&mut self, event: RoundEvent) -> RoundResult<()> {
        self.sink.emit(event)
    }
}
