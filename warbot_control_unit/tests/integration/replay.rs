//! Integration test: full replay sessions through the cycle runner.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use warbot_common::actuator::ActuatorId;
use warbot_control_unit::config::{ControlUnitConfig, load_config};
use warbot_control_unit::cycle::{ActivityStats, CycleRunner};
use warbot_control_unit::sim::{ReplayError, ReplayScript, ReplaySource, SimulatedActuators};

const ARENA_REPLAY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/arena_replay.jsonl");
const SAMPLE_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/warbot.toml");

/// Tick at 1 kHz from `from` until the source finishes. Returns the last
/// tick [ms].
fn run_to_end(r: &mut CycleRunner<ReplaySource, SimulatedActuators>, t0: Instant, from: u64) -> u64 {
    let mut t = from;
    while !r.is_finished() {
        r.tick(t0 + Duration::from_millis(t));
        t += 1;
        assert!(t < 20_000, "replay never finished");
    }
    t - 1
}

#[test]
fn sample_config_matches_defaults() {
    let config = load_config(Path::new(SAMPLE_CONFIG)).unwrap();
    assert_eq!(config.arbiter_config(), ControlUnitConfig::default().arbiter_config());
    assert!(config.safety.stop_on_controller_loss);
}

#[test]
fn arena_session_plays_through() {
    let script = ReplayScript::load(Path::new(ARENA_REPLAY)).unwrap();
    assert_eq!(script.duration(), Duration::from_millis(5600));

    let mut r = CycleRunner::new(
        ControlUnitConfig::default(),
        ReplaySource::new(script),
        SimulatedActuators::new(),
    );
    let t0 = Instant::now();

    // Controller attaches at 100 and drives forward from 200.
    for t in 0..=699 {
        r.tick(t0 + Duration::from_millis(t));
    }
    assert_eq!(r.actuators().backend().drive_speeds(), (200, 200));
    assert_eq!(r.actuators().backend().angle(ActuatorId::LeftShoulder), 0);

    // Throttle frame applies once the side step has finished (1200 + 580).
    for t in 700..=1781 {
        r.tick(t0 + Duration::from_millis(t));
    }
    assert_eq!(r.actuators().backend().drive_speeds(), (-200, -200));
    assert_eq!(r.actuators().backend().angle(ActuatorId::Waist), 0);

    // Hip twist finishes at 2250; the stick frame takes over at 2251.
    for t in 1782..=2251 {
        r.tick(t0 + Duration::from_millis(t));
    }
    assert_eq!(r.actuators().backend().angle(ActuatorId::RightShoulder), 180);
    assert_eq!(r.actuators().backend().angle(ActuatorId::RightElbow), 180);

    let last = run_to_end(&mut r, t0, 2252);
    assert_eq!(last, 5600);
    assert!(!r.slot().is_occupied());
    assert_eq!(r.actuators().backend().drive_speeds(), (0, 0));
    assert_eq!(
        *r.activity(),
        ActivityStats {
            moves_started: 3,
            moves_completed: 3,
            moves_aborted: 0,
            disconnects: 1,
            controller_losses: 1,
        }
    );
}

#[test]
fn replay_from_temp_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"at_ms": 0, "buttons": "THUMB_L"}}"#).unwrap();
    writeln!(file, r#"{{"at_ms": 50, "connected": false}}"#).unwrap();
    file.flush().unwrap();

    let script = ReplayScript::load(file.path()).unwrap();
    let mut r = CycleRunner::new(
        ControlUnitConfig::default(),
        ReplaySource::new(script),
        SimulatedActuators::new(),
    );
    run_to_end(&mut r, Instant::now(), 0);

    // Link lost mid-jab: the failsafe aborts it.
    assert_eq!(r.activity().moves_started, 1);
    assert_eq!(r.activity().moves_aborted, 1);
    assert_eq!(r.activity().controller_losses, 1);
    assert_eq!(r.current_move(), None);
}

#[test]
fn missing_replay_file_is_io_error() {
    assert!(matches!(
        ReplayScript::load(Path::new("/nonexistent/replay.jsonl")),
        Err(ReplayError::Io(_))
    ));
}
