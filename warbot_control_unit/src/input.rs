//! Input normalizer.
//!
//! Turns a raw [`ControllerSnapshot`] into the values the arbiter consumes:
//!
//! - axes pass through unchanged;
//! - triggers below the deadzone read as 0;
//! - brake and throttle are mutually exclusive: `brake > throttle` zeroes
//!   the throttle, anything else zeroes the brake (equal values keep the
//!   throttle);
//! - sticks map linearly onto actuator angles, with per-axis polarity,
//!   then clamp to [0, 180].

use warbot_common::actuator::{ActuatorId, ActuatorPose, clamp_angle};
use warbot_common::consts::{ANGLE_MAX, ANGLE_MIN, NEUTRAL_ANGLE};
use warbot_common::gamepad::{Buttons, ControllerSnapshot, DPad};

/// Integer linear remap with truncating division.
///
/// `x == in_start` maps to `out_start`, `x == in_end` to `out_end`. Values
/// outside the input span extrapolate; callers clamp. A degenerate input
/// span maps everything to `out_start`.
#[inline]
pub const fn map_range(x: i32, in_start: i32, in_end: i32, out_start: i32, out_end: i32) -> i32 {
    let span = in_end as i64 - in_start as i64;
    if span == 0 {
        return out_start;
    }
    let scaled = (x as i64 - in_start as i64) * (out_end as i64 - out_start as i64) / span;
    (scaled + out_start as i64) as i32
}

/// Stick axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    X,
    Y,
    RX,
    RY,
}

impl StickAxis {
    #[inline]
    pub const fn read(self, snapshot: &ControllerSnapshot) -> i32 {
        match self {
            Self::X => snapshot.axis_x,
            Self::Y => snapshot.axis_y,
            Self::RX => snapshot.axis_rx,
            Self::RY => snapshot.axis_ry,
        }
    }
}

/// Axis-to-angle remap. `start` lands on 0°, `end` on 180°.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMapping {
    pub axis: StickAxis,
    pub start: i32,
    pub end: i32,
}

impl AxisMapping {
    pub const fn new(axis: StickAxis, start: i32, end: i32) -> Self {
        Self { axis, start, end }
    }

    #[inline]
    pub const fn angle(&self, snapshot: &ControllerSnapshot) -> u8 {
        clamp_angle(map_range(
            self.axis.read(snapshot),
            self.start,
            self.end,
            ANGLE_MIN,
            ANGLE_MAX,
        ))
    }
}

/// Stick mapping for the four arm actuators, matched to how each joint is
/// mounted. Inverted spans put full stick deflection up/right at 0°.
pub const ARM_MAPPINGS: [(ActuatorId, AxisMapping); 4] = [
    (ActuatorId::LeftShoulder, AxisMapping::new(StickAxis::Y, 511, -512)),
    (ActuatorId::LeftElbow, AxisMapping::new(StickAxis::X, 511, -512)),
    (ActuatorId::RightShoulder, AxisMapping::new(StickAxis::RY, -511, 512)),
    (ActuatorId::RightElbow, AxisMapping::new(StickAxis::RX, 511, -512)),
];

/// Brake/throttle after deadzone and mutual exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triggers {
    pub brake: i32,
    pub throttle: i32,
}

impl Triggers {
    /// Apply the deadzone to both triggers, then keep only the larger one.
    pub const fn resolve(brake: i32, throttle: i32, deadzone: i32) -> Self {
        let mut brake = if brake < deadzone { 0 } else { brake };
        let mut throttle = if throttle < deadzone { 0 } else { throttle };
        if brake > throttle {
            throttle = 0;
        } else {
            brake = 0;
        }
        Self { brake, throttle }
    }

    /// Waist angle: brake swings to 180°, throttle to 0°, otherwise neutral.
    #[inline]
    pub const fn waist_angle(&self) -> u8 {
        if self.brake > 0 {
            ANGLE_MAX as u8
        } else if self.throttle > 0 {
            ANGLE_MIN as u8
        } else {
            NEUTRAL_ANGLE
        }
    }
}

/// Snapshot after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedInput {
    pub raw: ControllerSnapshot,
    pub triggers: Triggers,
}

impl NormalizedInput {
    #[inline]
    pub const fn pressed(&self, button: Buttons) -> bool {
        self.raw.buttons.contains(button)
    }

    #[inline]
    pub const fn dpad(&self) -> DPad {
        self.raw.dpad
    }

    /// Direct-mapping pose: four stick-driven arm joints plus the
    /// trigger-driven waist.
    pub fn pose(&self) -> ActuatorPose {
        let mut pose = ActuatorPose::NEUTRAL;
        for (id, mapping) in ARM_MAPPINGS {
            pose.angles[id.index()] = mapping.angle(&self.raw);
        }
        pose.angles[ActuatorId::Waist.index()] = self.triggers.waist_angle();
        pose
    }
}

/// Normalize one snapshot.
pub const fn normalize(snapshot: &ControllerSnapshot, trigger_deadzone: i32) -> NormalizedInput {
    NormalizedInput {
        raw: *snapshot,
        triggers: Triggers::resolve(snapshot.brake, snapshot.throttle, trigger_deadzone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DZ: i32 = 50;

    #[test]
    fn map_range_endpoints() {
        assert_eq!(map_range(511, 511, -512, 0, 180), 0);
        assert_eq!(map_range(-512, 511, -512, 0, 180), 180);
        assert_eq!(map_range(-511, -511, 512, 0, 180), 0);
        assert_eq!(map_range(512, -511, 512, 0, 180), 180);
    }

    #[test]
    fn map_range_truncates_toward_zero() {
        // (0 - 511) * 180 / -1023 = 89.9… → 89
        assert_eq!(map_range(0, 511, -512, 0, 180), 89);
    }

    #[test]
    fn map_range_degenerate_span() {
        assert_eq!(map_range(42, 7, 7, 0, 180), 0);
    }

    #[test]
    fn deadzone_zeroes_small_triggers() {
        assert_eq!(Triggers::resolve(49, 0, DZ), Triggers { brake: 0, throttle: 0 });
        assert_eq!(Triggers::resolve(0, 49, DZ), Triggers { brake: 0, throttle: 0 });
        assert_eq!(Triggers::resolve(50, 0, DZ), Triggers { brake: 50, throttle: 0 });
    }

    #[test]
    fn larger_trigger_wins() {
        assert_eq!(Triggers::resolve(210, 120, DZ), Triggers { brake: 210, throttle: 0 });
        assert_eq!(Triggers::resolve(120, 210, DZ), Triggers { brake: 0, throttle: 210 });
    }

    #[test]
    fn equal_triggers_keep_throttle() {
        assert_eq!(Triggers::resolve(150, 150, DZ), Triggers { brake: 0, throttle: 150 });
    }

    #[test]
    fn trigger_exclusivity_holds_everywhere() {
        for brake in (0..=255).step_by(5) {
            for throttle in (0..=255).step_by(5) {
                let t = Triggers::resolve(brake, throttle, DZ);
                assert!(t.brake == 0 || t.throttle == 0, "{brake}/{throttle} → {t:?}");
                let b = if brake < DZ { 0 } else { brake };
                let th = if throttle < DZ { 0 } else { throttle };
                assert_eq!(t.brake.max(t.throttle), b.max(th));
            }
        }
    }

    #[test]
    fn waist_follows_resolved_trigger() {
        assert_eq!(Triggers::resolve(0, 0, DZ).waist_angle(), 90);
        assert_eq!(Triggers::resolve(200, 0, DZ).waist_angle(), 180);
        assert_eq!(Triggers::resolve(0, 200, DZ).waist_angle(), 0);
        assert_eq!(Triggers::resolve(30, 30, DZ).waist_angle(), 90);
    }

    #[test]
    fn full_up_left_stick_puts_shoulder_at_zero() {
        let snap = ControllerSnapshot {
            axis_y: 511,
            ..Default::default()
        };
        let pose = normalize(&snap, DZ).pose();
        assert_eq!(pose.angle(ActuatorId::LeftShoulder), 0);
    }

    #[test]
    fn centered_sticks_sit_near_neutral() {
        let pose = normalize(&ControllerSnapshot::default(), DZ).pose();
        assert_eq!(pose.angle(ActuatorId::LeftShoulder), 89);
        assert_eq!(pose.angle(ActuatorId::LeftElbow), 89);
        assert_eq!(pose.angle(ActuatorId::RightShoulder), 89);
        assert_eq!(pose.angle(ActuatorId::RightElbow), 89);
        assert_eq!(pose.angle(ActuatorId::Waist), 90);
    }

    #[test]
    fn overdriven_axes_are_clamped() {
        let snap = ControllerSnapshot {
            axis_x: -4000,
            axis_ry: 4000,
            ..Default::default()
        };
        let pose = normalize(&snap, DZ).pose();
        assert_eq!(pose.angle(ActuatorId::LeftElbow), 180);
        assert_eq!(pose.angle(ActuatorId::RightShoulder), 180);
    }
}
