//! Integration test: disconnect gesture through the cycle runner.
//!
//! Validates the hold-to-confirm lifecycle on a replayed controller:
//! 1. Continuous hold fires exactly at the hold time
//! 2. A release restarts the hold
//! 3. Moves shadow the gesture unless choreography is interruptible
//! 4. Firing drops the controller and stops the wheels

use std::time::{Duration, Instant};

use warbot_control_unit::choreography::Move;
use warbot_control_unit::command::arbitration::CycleOutcome;
use warbot_control_unit::config::ControlUnitConfig;
use warbot_control_unit::cycle::CycleRunner;
use warbot_control_unit::sim::{ReplayScript, ReplaySource, SimulatedActuators};

// ── Helpers ─────────────────────────────────────────────────────────

type Runner = CycleRunner<ReplaySource, SimulatedActuators>;

fn runner(script: &str, config: ControlUnitConfig) -> Runner {
    let script = ReplayScript::parse(script).unwrap();
    CycleRunner::new(config, ReplaySource::new(script), SimulatedActuators::new())
}

/// Tick every millisecond up to `until` and return the first time the
/// gesture fired.
fn first_disconnect(r: &mut Runner, t0: Instant, until: u64) -> Option<u64> {
    (0..=until).find(|&t| r.tick(t0 + Duration::from_millis(t)) == Some(CycleOutcome::Disconnect))
}

const GESTURE: &str = r#"{"at_ms": 0, "buttons": "MISC_SYSTEM | MISC_HOME"}"#;

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn continuous_hold_fires_at_three_seconds() {
    let mut r = runner(GESTURE, ControlUnitConfig::default());
    let t0 = Instant::now();

    for t in 0..3000 {
        let out = r.tick(t0 + Duration::from_millis(t));
        assert!(
            matches!(out, Some(CycleOutcome::GestureHolding { .. })),
            "t={t}: {out:?}"
        );
    }
    assert_eq!(r.tick(t0 + Duration::from_millis(3000)), Some(CycleOutcome::Disconnect));
    assert!(!r.slot().is_occupied());
    assert_eq!(r.activity().disconnects, 1);
}

#[test]
fn release_restarts_hold() {
    let script = r#"
{"at_ms": 0, "buttons": "MISC_SYSTEM | MISC_HOME"}
{"at_ms": 1500}
{"at_ms": 1501, "buttons": "MISC_SYSTEM | MISC_HOME"}
"#;
    let mut r = runner(script, ControlUnitConfig::default());
    assert_eq!(first_disconnect(&mut r, Instant::now(), 6000), Some(4501));
}

#[test]
fn configured_hold_time_is_used() {
    let mut config = ControlUnitConfig::default();
    config.safety.disconnect_hold_ms = 1000;
    let mut r = runner(GESTURE, config);
    assert_eq!(first_disconnect(&mut r, Instant::now(), 2000), Some(1000));
}

#[test]
fn gesture_waits_for_running_move() {
    let script = r#"
{"at_ms": 0, "buttons": "X"}
{"at_ms": 1, "buttons": "MISC_SYSTEM | MISC_HOME"}
"#;
    let mut r = runner(script, ControlUnitConfig::default());
    // Ankle breaker holds the arbiter until 700; the hold starts at 701.
    assert_eq!(first_disconnect(&mut r, Instant::now(), 5000), Some(3701));
    assert_eq!(r.activity().moves_completed, 1);
    assert_eq!(r.activity().moves_aborted, 0);
}

#[test]
fn interruptible_gesture_aborts_move_and_fires() {
    let script = r#"
{"at_ms": 0, "buttons": "X"}
{"at_ms": 1, "buttons": "MISC_SYSTEM | MISC_HOME"}
"#;
    let mut config = ControlUnitConfig::default();
    config.choreography.interruptible = true;
    let mut r = runner(script, config);
    let t0 = Instant::now();

    assert_eq!(r.tick(t0), Some(CycleOutcome::MoveStarted(Move::AnkleBreaker)));
    assert_eq!(
        r.tick(t0 + Duration::from_millis(1)),
        Some(CycleOutcome::MoveAborted(Move::AnkleBreaker))
    );
    assert_eq!(r.current_move(), None);

    let fired = (2..=4000).find(|&t| r.tick(t0 + Duration::from_millis(t)) == Some(CycleOutcome::Disconnect));
    assert_eq!(fired, Some(3001));
    assert_eq!(r.activity().moves_aborted, 1);
}

#[test]
fn fired_disconnect_stops_wheels_and_stays_detached() {
    let script = r#"
{"at_ms": 0, "dpad": "UP"}
{"at_ms": 100, "dpad": "UP", "buttons": "MISC_SYSTEM | MISC_HOME"}
{"at_ms": 3200, "dpad": "UP"}
"#;
    let mut r = runner(script, ControlUnitConfig::default());
    let t0 = Instant::now();

    r.tick(t0);
    assert_eq!(r.actuators().backend().drive_speeds(), (200, 200));

    assert_eq!(first_disconnect(&mut r, t0, 3500), Some(3100));
    assert_eq!(r.actuators().backend().drive_speeds(), (0, 0));

    // Still connected in the script, but the pad was dropped on purpose.
    for t in 3101..=3300 {
        assert_eq!(r.tick(t0 + Duration::from_millis(t)), None);
    }
    assert!(!r.slot().is_occupied());
    assert_eq!(r.actuators().backend().drive_speeds(), (0, 0));
}
