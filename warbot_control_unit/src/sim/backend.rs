//! In-memory actuator backend.
//!
//! Keeps the last output per channel so tests and the replay binary can
//! inspect what the control core commanded. An optional event history
//! records every write in order.

use tracing::trace;
use warbot_common::actuator::{ActuatorBackend, ActuatorId, ActuatorPose, MotorId, MotorOutput};
use warbot_common::consts::{ACTUATOR_COUNT, MOTOR_COUNT, NEUTRAL_ANGLE};

/// One recorded backend write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorEvent {
    Motor(MotorId, MotorOutput),
    Angle(ActuatorId, u8),
}

/// Simulated H-bridges and angular actuators.
#[derive(Debug, Clone)]
pub struct SimulatedActuators {
    motors: [MotorOutput; MOTOR_COUNT],
    angles: [u8; ACTUATOR_COUNT],
    history: Option<Vec<ActuatorEvent>>,
}

impl Default for SimulatedActuators {
    fn default() -> Self {
        Self::new()
    }
}

const fn motor_index(motor: MotorId) -> usize {
    match motor {
        MotorId::Left => 0,
        MotorId::Right => 1,
    }
}

impl SimulatedActuators {
    /// Motors released, actuators at neutral, no history.
    pub const fn new() -> Self {
        Self {
            motors: [MotorOutput {
                forward: false,
                backward: false,
                duty: 0,
            }; MOTOR_COUNT],
            angles: [NEUTRAL_ANGLE; ACTUATOR_COUNT],
            history: None,
        }
    }

    /// Like [`new`](Self::new), recording every write.
    pub fn with_history() -> Self {
        Self {
            history: Some(Vec::new()),
            ..Self::new()
        }
    }

    #[inline]
    pub const fn motor(&self, motor: MotorId) -> MotorOutput {
        self.motors[motor_index(motor)]
    }

    /// Signed (left, right) wheel speeds.
    pub const fn drive_speeds(&self) -> (i16, i16) {
        (
            self.motor(MotorId::Left).signed_speed(),
            self.motor(MotorId::Right).signed_speed(),
        )
    }

    #[inline]
    pub const fn angle(&self, actuator: ActuatorId) -> u8 {
        self.angles[actuator.index()]
    }

    pub const fn pose(&self) -> ActuatorPose {
        ActuatorPose {
            angles: self.angles,
        }
    }

    /// Recorded writes; empty when history is off.
    pub fn history(&self) -> &[ActuatorEvent] {
        self.history.as_deref().unwrap_or(&[])
    }

    /// Drain the recorded writes.
    pub fn take_history(&mut self) -> Vec<ActuatorEvent> {
        self.history.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn push(&mut self, event: ActuatorEvent) {
        if let Some(history) = self.history.as_mut() {
            history.push(event);
        }
    }
}

impl ActuatorBackend for SimulatedActuators {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn write_motor(&mut self, motor: MotorId, output: MotorOutput) {
        trace!(?motor, forward = output.forward, backward = output.backward, duty = output.duty, "sim motor");
        self.motors[motor_index(motor)] = output;
        self.push(ActuatorEvent::Motor(motor, output));
    }

    fn write_angle(&mut self, actuator: ActuatorId, angle: u8) {
        trace!(?actuator, angle, "sim actuator");
        self.angles[actuator.index()] = angle;
        self.push(ActuatorEvent::Angle(actuator, angle));
    }
}
