//! Polled choreography runner.
//!
//! Executes one [`Move`] as a step-index + elapsed-time state machine.
//! `start()` issues the first step; every later `poll()` checks whether the
//! current step's hold has fully elapsed and, if so, issues the next one.
//! Zero-hold steps are issued and passed in the same poll.
//!
//! Each step's hold is measured from the poll that issued it, so a step
//! is never shortened by a late poll.

use std::time::{Duration, Instant};

use tracing::debug;
use warbot_common::actuator::{ActuatorBackend, ActuatorPose, DriveCommand};

use super::moves::{Move, MovePlan, MoveStep, StepCommand};
use crate::actuator::Actuators;

/// Runner state after a start or poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    /// Nothing running.
    Idle,
    /// Move in progress; `step` is the index of the step being held.
    Running { mv: Move, step: usize },
    /// The last step was issued and its hold has elapsed.
    Completed(Move),
}

#[derive(Debug, Clone)]
struct ActiveMove {
    mv: Move,
    plan: MovePlan,
    index: usize,
    step_started: Instant,
}

/// Single-move executor. At most one move runs at a time.
#[derive(Debug, Clone, Default)]
pub struct ChoreographyRunner {
    active: Option<ActiveMove>,
}

impl ChoreographyRunner {
    pub const fn new() -> Self {
        Self { active: None }
    }

    #[inline]
    pub const fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Move currently executing.
    pub fn current(&self) -> Option<Move> {
        self.active.as_ref().map(|a| a.mv)
    }

    /// Index of the step currently being held.
    pub fn current_step(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.index)
    }

    /// Time left in the current step's hold.
    pub fn step_remaining(&self, now: Instant) -> Option<Duration> {
        self.active.as_ref().map(|a| {
            a.plan[a.index]
                .hold
                .saturating_sub(now.saturating_duration_since(a.step_started))
        })
    }

    /// Start `mv`, replacing anything in progress, and issue its first step.
    pub fn start<B: ActuatorBackend>(
        &mut self,
        mv: Move,
        now: Instant,
        actuators: &mut Actuators<B>,
    ) -> RunnerStatus {
        let plan = mv.plan();
        let Some(first) = plan.first().copied() else {
            self.active = None;
            return RunnerStatus::Completed(mv);
        };

        issue(&first, actuators);
        self.active = Some(ActiveMove {
            mv,
            plan,
            index: 0,
            step_started: now,
        });
        self.poll(now, actuators)
    }

    /// Advance the running move as far as `now` allows.
    pub fn poll<B: ActuatorBackend>(
        &mut self,
        now: Instant,
        actuators: &mut Actuators<B>,
    ) -> RunnerStatus {
        let Some(active) = self.active.as_mut() else {
            return RunnerStatus::Idle;
        };

        loop {
            let held = now.saturating_duration_since(active.step_started);
            if held < active.plan[active.index].hold {
                return RunnerStatus::Running {
                    mv: active.mv,
                    step: active.index,
                };
            }

            let next = active.index + 1;
            if next >= active.plan.len() {
                let mv = active.mv;
                self.active = None;
                return RunnerStatus::Completed(mv);
            }

            active.index = next;
            active.step_started = now;
            debug!(mv = %active.mv, step = next, "move step");
            issue(&active.plan[next], actuators);
        }
    }

    /// Cancel the running move: stop the wheels and return every actuator
    /// to neutral. Returns the cancelled move.
    pub fn abort<B: ActuatorBackend>(&mut self, actuators: &mut Actuators<B>) -> Option<Move> {
        let active = self.active.take()?;
        actuators.stop();
        actuators.apply_pose(&ActuatorPose::NEUTRAL);
        Some(active.mv)
    }
}

fn issue<B: ActuatorBackend>(step: &MoveStep, actuators: &mut Actuators<B>) {
    for command in step.commands {
        match *command {
            StepCommand::Angle(id, deg) => actuators.set_actuator_angle(id, deg),
            StepCommand::Drive(left, right) => actuators.drive(DriveCommand::new(left, right)),
        }
    }
}
