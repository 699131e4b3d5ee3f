//! Action arbitration.
//!
//! Once per cycle the arbiter picks exactly one action from the normalized
//! input, in strict priority order:
//!
//! | Prio | Condition                        | Action                      |
//! |------|----------------------------------|-----------------------------|
//! | 1    | MISC_SYSTEM + MISC_HOME          | disconnect gesture          |
//! | 2    | X                                | feint (heavy brake) / ankle |
//! | 3    | THUMB_R                          | hip twist punch             |
//! | 4    | THUMB_L                          | double jab                  |
//! | 5    | MISC_SYSTEM                      | shoulder bash               |
//! | 6    | R1 + D-pad LEFT / RIGHT          | side step                   |
//! | 7    | otherwise                        | D-pad drive + stick pose    |
//!
//! Any branch below the gesture resets the gesture timer. While a move
//! runs, input is not evaluated; the move is polled until it completes.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use warbot_common::actuator::{ActuatorBackend, ActuatorPose, DriveCommand};
use warbot_common::consts::{
    DISCONNECT_HOLD_MS_DEFAULT, DPAD_SPEED_DEFAULT, HEAVY_BRAKE_THRESHOLD_DEFAULT,
    TRIGGER_DEADZONE_DEFAULT,
};
use warbot_common::gamepad::{Buttons, ControllerSnapshot, DPad};

use crate::actuator::Actuators;
use crate::choreography::{ChoreographyRunner, Direction, Move, RunnerStatus};
use crate::input::{NormalizedInput, normalize};
use crate::safety::disconnect::{DisconnectGesture, HoldProgress};

/// Arbitration tuning, resolved from the loaded config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterConfig {
    pub trigger_deadzone: i32,
    pub heavy_brake_threshold: i32,
    pub dpad_speed: i32,
    pub disconnect_hold: Duration,
    /// Holding the disconnect gesture aborts a running move.
    pub interruptible: bool,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            trigger_deadzone: TRIGGER_DEADZONE_DEFAULT,
            heavy_brake_threshold: HEAVY_BRAKE_THRESHOLD_DEFAULT,
            dpad_speed: DPAD_SPEED_DEFAULT,
            disconnect_hold: Duration::from_millis(DISCONNECT_HOLD_MS_DEFAULT),
            interruptible: false,
        }
    }
}

/// The single action chosen for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DisconnectGesture,
    Perform(Move),
    Drive {
        drive: DriveCommand,
        pose: ActuatorPose,
    },
}

/// Wheel speeds for a D-pad mask. UP beats DOWN beats LEFT beats RIGHT.
pub const fn dpad_drive(dpad: DPad, speed: i32) -> DriveCommand {
    if dpad.contains(DPad::UP) {
        DriveCommand::new(speed, speed)
    } else if dpad.contains(DPad::DOWN) {
        DriveCommand::new(-speed, -speed)
    } else if dpad.contains(DPad::LEFT) {
        DriveCommand::new(-speed, speed)
    } else if dpad.contains(DPad::RIGHT) {
        DriveCommand::new(speed, -speed)
    } else {
        DriveCommand::STOP
    }
}

/// Pick the action for one normalized snapshot. Pure.
pub fn select_action(input: &NormalizedInput, config: &ArbiterConfig) -> Action {
    if input.raw.disconnect_gesture() {
        return Action::DisconnectGesture;
    }

    if input.pressed(Buttons::X) {
        let mv = if input.triggers.brake > config.heavy_brake_threshold {
            Move::FeintPunch
        } else {
            Move::AnkleBreaker
        };
        return Action::Perform(mv);
    }
    if input.pressed(Buttons::THUMB_R) {
        return Action::Perform(Move::HipTwistPunch);
    }
    if input.pressed(Buttons::THUMB_L) {
        return Action::Perform(Move::DoubleJab);
    }
    if input.pressed(Buttons::MISC_SYSTEM) {
        return Action::Perform(Move::ShoulderBash);
    }
    if input.pressed(Buttons::R1) {
        if input.dpad().contains(DPad::LEFT) {
            return Action::Perform(Move::SideStep(Direction::Left));
        }
        if input.dpad().contains(DPad::RIGHT) {
            return Action::Perform(Move::SideStep(Direction::Right));
        }
    }

    Action::Drive {
        drive: dpad_drive(input.dpad(), config.dpad_speed),
        pose: input.pose(),
    }
}

/// What the arbiter did in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Gesture held, threshold not yet reached.
    GestureHolding { elapsed: Duration },
    /// Gesture held long enough: the caller must drop the controller.
    Disconnect,
    MoveStarted(Move),
    MoveRunning(Move),
    MoveCompleted(Move),
    MoveAborted(Move),
    Drive {
        drive: DriveCommand,
        pose: ActuatorPose,
    },
}

/// Per-cycle decision engine: owns the gesture timer and the move runner.
#[derive(Debug, Clone)]
pub struct Arbiter {
    config: ArbiterConfig,
    gesture: DisconnectGesture,
    runner: ChoreographyRunner,
}

impl Arbiter {
    pub const fn new(config: ArbiterConfig) -> Self {
        Self {
            gesture: DisconnectGesture::new(config.disconnect_hold),
            runner: ChoreographyRunner::new(),
            config,
        }
    }

    #[inline]
    pub const fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    #[inline]
    pub const fn gesture(&self) -> &DisconnectGesture {
        &self.gesture
    }

    #[inline]
    pub const fn runner(&self) -> &ChoreographyRunner {
        &self.runner
    }

    /// Move currently executing, if any.
    pub fn current_move(&self) -> Option<Move> {
        self.runner.current()
    }

    /// Run one arbitration cycle for a live controller.
    pub fn cycle<B: ActuatorBackend>(
        &mut self,
        snapshot: &ControllerSnapshot,
        now: Instant,
        actuators: &mut Actuators<B>,
    ) -> CycleOutcome {
        if let Some(mv) = self.runner.current() {
            if self.config.interruptible && snapshot.disconnect_gesture() {
                self.runner.abort(actuators);
                info!(mv = %mv, "move aborted by disconnect gesture");
                self.feed_gesture(now);
                return CycleOutcome::MoveAborted(mv);
            }
            if let Some(outcome) = self.service_running_move(now, actuators) {
                return outcome;
            }
        }

        let input = normalize(snapshot, self.config.trigger_deadzone);
        match select_action(&input, &self.config) {
            Action::DisconnectGesture => self.feed_gesture(now),
            Action::Perform(mv) => {
                self.gesture.reset();
                info!(mv = %mv, duration_ms = mv.duration().as_millis() as u64, "move started");
                match self.runner.start(mv, now, actuators) {
                    RunnerStatus::Completed(mv) => {
                        info!(mv = %mv, "move completed");
                        CycleOutcome::MoveCompleted(mv)
                    }
                    _ => CycleOutcome::MoveStarted(mv),
                }
            }
            Action::Drive { drive, pose } => {
                self.gesture.reset();
                actuators.drive(drive);
                actuators.apply_pose(&pose);
                CycleOutcome::Drive { drive, pose }
            }
        }
    }

    /// Advance a running move without reading input. `None` when idle.
    pub fn service_running_move<B: ActuatorBackend>(
        &mut self,
        now: Instant,
        actuators: &mut Actuators<B>,
    ) -> Option<CycleOutcome> {
        match self.runner.poll(now, actuators) {
            RunnerStatus::Idle => None,
            RunnerStatus::Running { mv, .. } => Some(CycleOutcome::MoveRunning(mv)),
            RunnerStatus::Completed(mv) => {
                info!(mv = %mv, "move completed");
                Some(CycleOutcome::MoveCompleted(mv))
            }
        }
    }

    /// Controller gone. Clears the gesture; with `failsafe` a running move
    /// is aborted and the wheels are stopped. Returns the aborted move.
    pub fn on_controller_lost<B: ActuatorBackend>(
        &mut self,
        actuators: &mut Actuators<B>,
        failsafe: bool,
    ) -> Option<Move> {
        self.gesture.reset();
        if !failsafe {
            return None;
        }
        let aborted = self.runner.abort(actuators);
        if let Some(mv) = aborted {
            info!(mv = %mv, "move aborted on controller loss");
        }
        actuators.stop();
        aborted
    }

    fn feed_gesture(&mut self, now: Instant) -> CycleOutcome {
        match self.gesture.held(now) {
            HoldProgress::Fire => {
                warn!(hold_ms = self.gesture.hold_time().as_millis() as u64, "disconnect gesture fired");
                CycleOutcome::Disconnect
            }
            HoldProgress::Holding { elapsed } => {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "disconnect gesture holding");
                CycleOutcome::GestureHolding { elapsed }
            }
            HoldProgress::Started => {
                debug!("disconnect gesture started");
                CycleOutcome::GestureHolding {
                    elapsed: Duration::ZERO,
                }
            }
        }
    }
}
