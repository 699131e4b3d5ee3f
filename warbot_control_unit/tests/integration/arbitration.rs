//! Integration test: per-cycle arbitration scenarios.
//!
//! Arbiter + input normalizer + move runner + actuators, driven one cycle
//! per millisecond.

use std::time::{Duration, Instant};

use warbot_common::actuator::{ActuatorId, DriveCommand, MotorId};
use warbot_common::gamepad::{Buttons, ControllerSnapshot, DPad};

use warbot_control_unit::actuator::Actuators;
use warbot_control_unit::choreography::Move;
use warbot_control_unit::command::arbitration::{Arbiter, ArbiterConfig, CycleOutcome};
use warbot_control_unit::sim::{ActuatorEvent, SimulatedActuators};

// ── Helpers ─────────────────────────────────────────────────────────

fn setup() -> (Arbiter, Actuators<SimulatedActuators>, Instant) {
    (
        Arbiter::new(ArbiterConfig::default()),
        Actuators::new(SimulatedActuators::with_history()),
        Instant::now(),
    )
}

fn ms(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

fn shoulder_writes(act: &Actuators<SimulatedActuators>) -> Vec<u8> {
    act.backend()
        .history()
        .iter()
        .filter_map(|e| match e {
            ActuatorEvent::Angle(ActuatorId::LeftShoulder, a) => Some(*a),
            _ => None,
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn attack_with_heavy_brake_plays_feint_punch() {
    let (mut arbiter, mut act, t0) = setup();
    let snap = ControllerSnapshot {
        buttons: Buttons::X,
        brake: 210,
        ..Default::default()
    };

    assert_eq!(arbiter.cycle(&snap, t0, &mut act), CycleOutcome::MoveStarted(Move::FeintPunch));
    for t in 1..260 {
        assert_eq!(
            arbiter.cycle(&snap, ms(t0, t), &mut act),
            CycleOutcome::MoveRunning(Move::FeintPunch),
            "t={t}"
        );
    }
    assert_eq!(
        arbiter.cycle(&snap, ms(t0, 260), &mut act),
        CycleOutcome::MoveCompleted(Move::FeintPunch)
    );

    assert_eq!(shoulder_writes(&act), vec![140, 90, 180, 90]);
    assert!(
        act.backend()
            .history()
            .iter()
            .all(|e| !matches!(e, ActuatorEvent::Motor(..)))
    );
}

#[test]
fn attack_without_brake_plays_ankle_breaker() {
    let (mut arbiter, mut act, t0) = setup();
    let snap = ControllerSnapshot {
        buttons: Buttons::X,
        brake: 120,
        ..Default::default()
    };
    assert_eq!(arbiter.cycle(&snap, t0, &mut act), CycleOutcome::MoveStarted(Move::AnkleBreaker));
}

#[test]
fn attack_beats_stick_click() {
    let (mut arbiter, mut act, t0) = setup();
    let snap = ControllerSnapshot {
        buttons: Buttons::X | Buttons::THUMB_R | Buttons::THUMB_L,
        ..Default::default()
    };
    assert_eq!(arbiter.cycle(&snap, t0, &mut act), CycleOutcome::MoveStarted(Move::AnkleBreaker));
}

#[test]
fn dpad_up_drives_both_wheels_and_sticks_pose_arms() {
    let (mut arbiter, mut act, t0) = setup();
    let snap = ControllerSnapshot {
        dpad: DPad::UP,
        axis_y: 511,
        ..Default::default()
    };

    match arbiter.cycle(&snap, t0, &mut act) {
        CycleOutcome::Drive { drive, .. } => assert_eq!(drive, DriveCommand::new(200, 200)),
        other => panic!("expected drive, got {other:?}"),
    }
    let backend = act.backend();
    assert_eq!(backend.drive_speeds(), (200, 200));
    assert!(backend.motor(MotorId::Left).forward);
    assert_eq!(backend.angle(ActuatorId::LeftShoulder), 0);
    assert_eq!(backend.angle(ActuatorId::LeftElbow), 89);
    assert_eq!(backend.angle(ActuatorId::Waist), 90);
}

#[test]
fn waist_follows_triggers_each_cycle() {
    let (mut arbiter, mut act, t0) = setup();
    let cases = [
        ((0, 0), 90),
        ((100, 0), 180),
        ((0, 100), 0),
        ((40, 0), 90),
        ((150, 150), 0),
    ];
    for (i, ((brake, throttle), waist)) in cases.into_iter().enumerate() {
        let snap = ControllerSnapshot {
            brake,
            throttle,
            ..Default::default()
        };
        arbiter.cycle(&snap, ms(t0, i as u64), &mut act);
        assert_eq!(act.backend().angle(ActuatorId::Waist), waist, "{brake}/{throttle}");
    }
}

#[test]
fn side_step_right_then_double_jab() {
    let (mut arbiter, mut act, t0) = setup();
    let snap = ControllerSnapshot {
        buttons: Buttons::R1,
        dpad: DPad::RIGHT,
        ..Default::default()
    };
    assert_eq!(
        arbiter.cycle(&snap, t0, &mut act),
        CycleOutcome::MoveStarted(Move::SideStep(warbot_control_unit::choreography::Direction::Right))
    );
    assert_eq!(act.backend().drive_speeds(), (180, -180));

    let idle = ControllerSnapshot::default();
    let mut t = 1;
    while !matches!(arbiter.cycle(&idle, ms(t0, t), &mut act), CycleOutcome::MoveCompleted(_)) {
        t += 1;
    }
    assert_eq!(t, 580);
    assert_eq!(act.backend().drive_speeds(), (0, 0));
    assert_eq!(shoulder_writes(&act), vec![170, 90, 170, 90]);
}

#[test]
fn input_resumes_after_move() {
    let (mut arbiter, mut act, t0) = setup();
    arbiter.cycle(&ControllerSnapshot { buttons: Buttons::THUMB_R, ..Default::default() }, t0, &mut act);

    let down = ControllerSnapshot {
        dpad: DPad::DOWN,
        ..Default::default()
    };
    for t in 1..=250 {
        arbiter.cycle(&down, ms(t0, t), &mut act);
    }
    assert_eq!(act.backend().drive_speeds(), (0, 0));

    arbiter.cycle(&down, ms(t0, 251), &mut act);
    assert_eq!(act.backend().drive_speeds(), (-200, -200));
}
