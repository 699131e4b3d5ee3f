//! Actuator types and the backend trait.
//!
//! This module defines:
//! - `MotorId` / `ActuatorId` - output channel identifiers
//! - `DriveCommand` / `ActuatorPose` - per-cycle output values
//! - `MotorOutput` - direction pins + PWM duty for one H-bridge
//! - `ActuatorBackend` trait - interface for pluggable output hardware
//!
//! Out-of-range values are never rejected. [`clamp_speed`] and
//! [`clamp_angle`] saturate them into the legal output range.

use crate::consts::{ACTUATOR_COUNT, ANGLE_MAX, ANGLE_MIN, NEUTRAL_ANGLE, SPEED_MAX, SPEED_MIN};

/// Drive motor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorId {
    Left,
    Right,
}

/// Angular actuator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActuatorId {
    LeftShoulder = 0,
    LeftElbow = 1,
    RightShoulder = 2,
    RightElbow = 3,
    Waist = 4,
}

impl ActuatorId {
    /// All actuators in channel order.
    pub const ALL: [ActuatorId; ACTUATOR_COUNT] = [
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::RightShoulder,
        Self::RightElbow,
        Self::Waist,
    ];

    /// Channel index into an [`ActuatorPose`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Saturate a signed speed into [-255, 255].
#[inline]
pub const fn clamp_speed(speed: i32) -> i16 {
    if speed < SPEED_MIN {
        SPEED_MIN as i16
    } else if speed > SPEED_MAX {
        SPEED_MAX as i16
    } else {
        speed as i16
    }
}

/// Saturate an angle into [0, 180] degrees.
#[inline]
pub const fn clamp_angle(angle: i32) -> u8 {
    if angle < ANGLE_MIN {
        ANGLE_MIN as u8
    } else if angle > ANGLE_MAX {
        ANGLE_MAX as u8
    } else {
        angle as u8
    }
}

/// Signed wheel speeds for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveCommand {
    pub left: i32,
    pub right: i32,
}

impl DriveCommand {
    pub const STOP: Self = Self::new(0, 0);

    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }
}

/// Angular targets for all five actuators, in [`ActuatorId`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorPose {
    pub angles: [u8; ACTUATOR_COUNT],
}

impl ActuatorPose {
    /// Every actuator at 90°.
    pub const NEUTRAL: Self = Self {
        angles: [NEUTRAL_ANGLE; ACTUATOR_COUNT],
    };

    #[inline]
    pub const fn angle(&self, id: ActuatorId) -> u8 {
        self.angles[id.index()]
    }

    /// Set one target, clamped into range.
    #[inline]
    pub fn set(&mut self, id: ActuatorId, angle: i32) {
        self.angles[id.index()] = clamp_angle(angle);
    }
}

impl Default for ActuatorPose {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Pin-level output for one H-bridge channel.
///
/// At most one direction pin is high. `duty` is the 8-bit PWM magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorOutput {
    pub forward: bool,
    pub backward: bool,
    pub duty: u8,
}

impl MotorOutput {
    /// Derive pin states from a signed speed (clamped first).
    pub const fn from_speed(speed: i32) -> Self {
        let s = clamp_speed(speed);
        Self {
            forward: s > 0,
            backward: s < 0,
            duty: s.unsigned_abs() as u8,
        }
    }

    /// Signed speed this output represents.
    #[inline]
    pub const fn signed_speed(&self) -> i16 {
        if self.backward {
            -(self.duty as i16)
        } else {
            self.duty as i16
        }
    }
}

/// Output hardware seam.
///
/// Implementations write the already-clamped values to pins, PWM channels
/// or a simulator. They must not fail: the control path has no error
/// channel for actuator writes.
pub trait ActuatorBackend {
    /// Backend identifier (e.g., "simulation", "esp32-ledc").
    fn name(&self) -> &'static str;

    /// Apply direction pins and PWM duty to one motor.
    fn write_motor(&mut self, motor: MotorId, output: MotorOutput);

    /// Command one actuator to an angle in [0, 180].
    fn write_angle(&mut self, actuator: ActuatorId, angle: u8);
}
