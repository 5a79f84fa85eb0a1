//! Round sequencer tests — full rounds on a virtual frame clock.

use crash_core::{
    activity_log::default_status_lines,
    clock::{FrameSource, ManualClock},
    config::GameConfig,
    error::ConfigError,
    event::{RoundEvent, RoundState},
    outcome::{Multiplier, Outcome},
    presentation::{FixedGeometry, RecordingSink},
    rng::{ScriptedSource, SeededRng},
    sequencer::{LaunchOutcome, RngStreams, RoundSequencer},
    types::{Point, Size},
};

type Sequencer = RoundSequencer<FixedGeometry, RecordingSink>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn geometry() -> FixedGeometry {
    FixedGeometry::new(Point::new(40.0, 640.0), Size { width: 400.0, height: 800.0 })
}

fn build_with(config: GameConfig, outcome_draws: Vec<f64>) -> Sequencer {
    init_logging();
    let rng = RngStreams::new(
        Box::new(SeededRng::new(7)),
        Box::new(ScriptedSource::new(outcome_draws)),
    );
    RoundSequencer::new(config, rng, geometry(), RecordingSink::new()).expect("valid config")
}

fn build(outcome_draws: Vec<f64>) -> Sequencer {
    build_with(GameConfig::default(), outcome_draws)
}

fn phases(events: &[RoundEvent]) -> Vec<RoundState> {
    events
        .iter()
        .filter_map(|e| match e {
            RoundEvent::PhaseChanged { state, .. } => Some(*state),
            _ => None,
        })
        .collect()
}

#[test]
fn first_round_busts_and_returns_to_idle() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();

    let entry = seq.run_round(&mut clock).unwrap().expect("round ran");

    assert_eq!(entry.outcome, Outcome::Bust);
    assert_eq!(entry.sequence, 1);
    assert_eq!(seq.state(), RoundState::Idle);
    assert_eq!(seq.history().len(), 1);
    assert_eq!(seq.completed_rounds(), 1);
    assert_eq!(seq.current_round(), None);
}

#[test]
fn phases_run_in_strict_order() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();

    assert_eq!(
        phases(seq.sink().events()),
        vec![
            RoundState::Logging,
            RoundState::Trajectory,
            RoundState::Impact,
            RoundState::Reveal,
            RoundState::Idle,
        ]
    );
}

#[test]
fn status_log_is_revealed_in_full_before_takeoff() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();

    let sink = seq.sink();
    assert_eq!(sink.log_text(), default_status_lines().join("\n"));

    let events = sink.events();
    let last_char = events
        .iter()
        .rposition(|e| matches!(e, RoundEvent::LogCharacterAppended { .. }))
        .unwrap();
    let first_position = events
        .iter()
        .position(|e| matches!(e, RoundEvent::PositionUpdate { .. }))
        .unwrap();
    assert!(last_char < first_position);
}

#[test]
fn second_round_is_a_win_between_2_and_6() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();
    let entry = seq.run_round(&mut clock).unwrap().unwrap();

    let m = entry.outcome.multiplier().expect("round 2 wins");
    assert!((2.0..=6.0).contains(&m.value()));
    // 2 + 4 * 0.5^1.8 = 3.1487.. -> 3.15
    assert_eq!(m, Multiplier::new(3.15).unwrap());
}

#[test]
fn launch_while_running_is_dropped() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();

    assert_eq!(seq.launch(&clock).unwrap(), LaunchOutcome::Started { round: 1 });
    for _ in 0..10 {
        clock.next_frame().unwrap();
        seq.tick(&clock).unwrap();
    }
    assert_eq!(seq.state(), RoundState::Logging);

    let before = seq.sink().events().len();
    assert_eq!(
        seq.launch(&clock).unwrap(),
        LaunchOutcome::Rejected { state: RoundState::Logging }
    );
    assert_eq!(seq.state(), RoundState::Logging);
    assert_eq!(seq.sink().events().len(), before);
    assert!(seq.history().is_empty());
    assert_eq!(seq.current_round(), Some(1));
}

#[test]
fn launch_is_rejected_in_every_active_phase() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.launch(&clock).unwrap();

    let mut rejected_in = Vec::new();
    while !seq.is_idle() {
        clock.next_frame().unwrap();
        seq.tick(&clock).unwrap();
        let state = seq.state();
        if state != RoundState::Idle && !rejected_in.contains(&state) {
            assert_eq!(seq.launch(&clock).unwrap(), LaunchOutcome::Rejected { state });
            rejected_in.push(state);
        }
    }
    assert_eq!(
        rejected_in,
        vec![RoundState::Logging, RoundState::Trajectory, RoundState::Impact, RoundState::Reveal]
    );
    assert_eq!(seq.history().len(), 1);
}

#[test]
fn run_round_while_active_returns_none() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.launch(&clock).unwrap();
    assert_eq!(seq.run_round(&mut clock).unwrap(), None);
    assert_eq!(seq.state(), RoundState::Logging);
}

#[test]
fn tick_while_idle_does_nothing() {
    let mut seq = build(vec![0.5]);
    let clock = ManualClock::new();
    assert_eq!(seq.tick(&clock).unwrap(), None);
    assert!(seq.sink().events().is_empty());
}

#[test]
fn forced_bust_branch_records_one_bust() {
    // Round 2 consumes 0.5; round 3 draws 0.1 < p_crush.
    let mut seq = build(vec![0.5, 0.1]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();
    seq.run_round(&mut clock).unwrap();
    assert_eq!(seq.history().len(), 2);

    let entry = seq.run_round(&mut clock).unwrap().unwrap();

    assert_eq!(entry.outcome, Outcome::Bust);
    assert_eq!(entry.sequence, 3);
    assert_eq!(seq.history().len(), 3);
    assert_eq!(seq.state(), RoundState::Idle);
}

#[test]
fn forced_win_branch_is_reproducible_bit_for_bit() {
    // Round 3: 0.9 >= p_crush wins, 0.3125 * 32 = 10 selects [1.0, 7.0],
    // 0.5 with power 2.2 gives 1 + 6 * 0.5^2.2 = 2.3058.. -> 2.31.
    let draws = vec![0.5, 0.9, 0.3125, 0.5];
    let mut seq = build(draws.clone());
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();
    seq.run_round(&mut clock).unwrap();
    let entry = seq.run_round(&mut clock).unwrap().unwrap();

    let expected = Multiplier::new(1.0 + 6.0 * 0.5f64.powf(2.2)).unwrap();
    assert_eq!(entry.outcome, Outcome::Multiplier(expected));
    assert_eq!(expected.hundredths(), 231);

    let mut again = build(draws);
    let mut clock = ManualClock::new();
    again.run_round(&mut clock).unwrap();
    again.run_round(&mut clock).unwrap();
    let replay = again.run_round(&mut clock).unwrap().unwrap();
    assert_eq!(replay.outcome, entry.outcome);
}

#[test]
fn trajectory_ends_at_target_and_impact_anchors_there() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();
    let events = seq.sink().events();

    let impact_idx = events
        .iter()
        .position(|e| matches!(e, RoundEvent::ImpactTriggered { .. }))
        .unwrap();
    let last_flight = events[..impact_idx]
        .iter()
        .rev()
        .find_map(|e| match e {
            RoundEvent::PositionUpdate { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
        .unwrap();
    // 72% of 400 and 42% of 800.
    assert!((last_flight.0 - 288.0).abs() < 1e-9);
    assert!((last_flight.1 - 336.0).abs() < 1e-9);

    match &events[impact_idx] {
        RoundEvent::ImpactTriggered { x, y } => {
            assert_eq!((*x, *y), (288.0, 336.0));
        }
        _ => unreachable!(),
    }
    assert!(events.iter().any(|e| matches!(
        e,
        RoundEvent::OutcomeRevealed { outcome: Outcome::Bust, x, y } if *x == 288.0 && *y == 336.0
    )));
    assert_eq!(events[impact_idx + 1], RoundEvent::ObjectVisibility { visible: false });
}

#[test]
fn flight_heading_respects_angle_limits() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();

    for e in seq.sink().events() {
        if let RoundEvent::PositionUpdate { angle, .. } = e {
            assert!((-28.0..=12.0).contains(angle), "angle {angle} outside limits");
        }
    }
}

#[test]
fn round_ends_by_restoring_the_scene() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();

    let events = seq.sink().events();
    let tail = &events[events.len() - 4..];
    assert!(matches!(tail[0], RoundEvent::HistoryChanged { .. }));
    assert_eq!(tail[1], RoundEvent::PositionUpdate { x: 40.0, y: 640.0, angle: 0.0 });
    assert_eq!(tail[2], RoundEvent::ObjectVisibility { visible: true });
    assert_eq!(tail[3], RoundEvent::PhaseChanged { round: 1, state: RoundState::Idle });
}

#[test]
fn round_takes_at_least_the_configured_phase_time() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();

    // 2400 flight + 500 impact + 1200 reveal, plus a non-empty status log.
    assert!(clock.now_ms() >= 4100.0 + 250.0, "round too short: {}", clock.now_ms());
}

#[test]
fn disabled_status_log_skips_straight_to_flight() {
    let mut config = GameConfig::default();
    config.activity_log.enabled = false;
    let mut seq = build_with(config, vec![0.5]);
    let mut clock = ManualClock::new();
    seq.run_round(&mut clock).unwrap();

    assert_eq!(seq.sink().count("log_character_appended"), 0);
    assert_eq!(phases(seq.sink().events()).len(), 5);
    assert_eq!(seq.history().len(), 1);
}

#[test]
fn history_window_and_capacity_are_honoured() {
    let mut config = GameConfig::default();
    config.history.capacity = 5;
    config.history.display_window = 3;
    config.activity_log.enabled = false;
    let mut seq = build_with(config, vec![0.5]);
    let mut clock = ManualClock::new();

    for _ in 0..7 {
        seq.run_round(&mut clock).unwrap();
    }

    assert_eq!(seq.history().len(), 5);
    let seqs: Vec<u64> = seq.history().iter().map(|e| e.sequence).collect();
    assert_eq!(seqs, vec![7, 6, 5, 4, 3]);

    let last_window = seq
        .sink()
        .events()
        .iter()
        .rev()
        .find_map(|e| match e {
            RoundEvent::HistoryChanged { entries } => Some(entries.clone()),
            _ => None,
        })
        .unwrap();
    let window: Vec<u64> = last_window.iter().map(|e| e.sequence).collect();
    assert_eq!(window, vec![7, 6, 5]);
}

#[test]
fn history_timestamps_follow_the_frame_clock() {
    let mut seq = build(vec![0.5]);
    let mut clock = ManualClock::new();
    let a = seq.run_round(&mut clock).unwrap().unwrap();
    let b = seq.run_round(&mut clock).unwrap().unwrap();
    assert!(b.timestamp > a.timestamp);
    assert_eq!(b.timestamp, clock.wall_time());
}

#[test]
fn invalid_config_prevents_construction() {
    let mut config = GameConfig::default();
    config.buckets.clear();
    let rng = RngStreams::seeded(1);
    let result = RoundSequencer::new(config, rng, geometry(), RecordingSink::new());
    assert!(matches!(result, Err(ConfigError::EmptyBucketTable)));

    let mut config = GameConfig::default();
    config.buckets[2].weight = -4.0;
    let result = RoundSequencer::new(config, RngStreams::seeded(1), geometry(), RecordingSink::new());
    assert!(matches!(result, Err(ConfigError::NonPositiveWeight { index: 2, .. })));
}
