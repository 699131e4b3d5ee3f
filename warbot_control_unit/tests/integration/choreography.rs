//! Integration test: every move table played by the runner at 1 kHz.

use std::time::{Duration, Instant};

use warbot_common::actuator::{ActuatorId, ActuatorPose};
use warbot_control_unit::actuator::Actuators;
use warbot_control_unit::choreography::{ChoreographyRunner, Move, RunnerStatus};
use warbot_control_unit::sim::SimulatedActuators;

/// Play `mv` to completion, polling every millisecond. Returns the
/// completion time [ms] and the final actuator state.
fn play(mv: Move) -> (u64, SimulatedActuators) {
    let t0 = Instant::now();
    let mut runner = ChoreographyRunner::new();
    let mut act = Actuators::new(SimulatedActuators::new());

    let mut status = runner.start(mv, t0, &mut act);
    let mut t = 0;
    while !matches!(status, RunnerStatus::Completed(_)) {
        t += 1;
        assert!(t <= 10_000, "{mv} never completed");
        status = runner.poll(t0 + Duration::from_millis(t), &mut act);
    }
    assert_eq!(status, RunnerStatus::Completed(mv));
    (t, act.into_backend())
}

#[test]
fn completion_time_equals_table_duration() {
    for mv in Move::ALL {
        let (t, _) = play(mv);
        assert_eq!(Duration::from_millis(t), mv.duration(), "{mv}");
    }
}

#[test]
fn every_move_ends_with_wheels_stopped() {
    for mv in Move::ALL {
        let (_, sim) = play(mv);
        assert_eq!(sim.drive_speeds(), (0, 0), "{mv}");
    }
}

#[test]
fn moves_with_reset_step_end_neutral() {
    for mv in [
        Move::AnkleBreaker,
        Move::HipTwistPunch,
        Move::DoubleJab,
        Move::ShoulderBash,
        Move::FeintPunch,
    ] {
        let (_, sim) = play(mv);
        assert_eq!(sim.pose(), ActuatorPose::NEUTRAL, "{mv}");
    }
}

#[test]
fn ankle_breaker_rams_at_full_speed() {
    let t0 = Instant::now();
    let mut runner = ChoreographyRunner::new();
    let mut act = Actuators::new(SimulatedActuators::new());

    runner.start(Move::AnkleBreaker, t0, &mut act);
    assert_eq!(act.backend().angle(ActuatorId::RightShoulder), 45);
    assert_eq!(act.backend().angle(ActuatorId::RightElbow), 30);

    runner.poll(t0 + Duration::from_millis(150), &mut act);
    assert_eq!(act.backend().drive_speeds(), (200, 100));

    runner.poll(t0 + Duration::from_millis(450), &mut act);
    assert_eq!(act.backend().drive_speeds(), (255, 255));
    assert_eq!(act.backend().angle(ActuatorId::RightShoulder), 160);
}

#[test]
fn restarting_replaces_running_move() {
    let t0 = Instant::now();
    let mut runner = ChoreographyRunner::new();
    let mut act = Actuators::new(SimulatedActuators::new());

    runner.start(Move::DoubleJab, t0, &mut act);
    runner.start(Move::FeintPunch, t0 + Duration::from_millis(10), &mut act);
    assert_eq!(runner.current(), Some(Move::FeintPunch));
    assert_eq!(runner.current_step(), Some(0));
}
