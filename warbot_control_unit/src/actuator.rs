//! Actuator interface: clamped writes for two drive motors and five
//! angular actuators.
//!
//! Stateless over the backend. Every write saturates its input
//! (speed → [-255, 255], angle → [0, 180]) and forwards the result.
//! Nothing here can fail: an out-of-range command is clamped, never
//! rejected.

use tracing::trace;
use warbot_common::actuator::{
    ActuatorBackend, ActuatorId, ActuatorPose, DriveCommand, MotorId, MotorOutput, clamp_angle,
};

/// Clamping front-end over an [`ActuatorBackend`].
#[derive(Debug)]
pub struct Actuators<B> {
    backend: B,
}

impl<B: ActuatorBackend> Actuators<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Drive one motor. Direction pins follow the sign, PWM duty the
    /// magnitude.
    #[inline]
    pub fn drive_motor(&mut self, motor: MotorId, speed: i32) {
        let output = MotorOutput::from_speed(speed);
        trace!(?motor, speed, duty = output.duty, "motor write");
        self.backend.write_motor(motor, output);
    }

    /// Drive both motors.
    #[inline]
    pub fn drive(&mut self, command: DriveCommand) {
        self.drive_motor(MotorId::Left, command.left);
        self.drive_motor(MotorId::Right, command.right);
    }

    /// Zero both motors.
    #[inline]
    pub fn stop(&mut self) {
        self.drive(DriveCommand::STOP);
    }

    /// Command one actuator.
    #[inline]
    pub fn set_actuator_angle(&mut self, actuator: ActuatorId, angle: i32) {
        let clamped = clamp_angle(angle);
        trace!(?actuator, angle, clamped, "actuator write");
        self.backend.write_angle(actuator, clamped);
    }

    /// Command all five actuators.
    pub fn apply_pose(&mut self, pose: &ActuatorPose) {
        for id in ActuatorId::ALL {
            self.set_actuator_angle(id, pose.angle(id) as i32);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
