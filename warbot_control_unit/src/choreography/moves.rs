//! Static move tables.
//!
//! Each move is an ordered list of [`MoveStep`]s. A step issues its
//! commands, then holds for its duration before the next step starts.
//! Moves that must end in a neutral pose carry an explicit reset step;
//! the runner never resets anything by itself.
//!
//! | Move            | Steps | Total  |
//! |-----------------|-------|--------|
//! | AnkleBreaker    | 4     | 700 ms |
//! | HipTwistPunch   | 3     | 250 ms |
//! | DoubleJab       | 4     | 400 ms |
//! | ShoulderBash    | 2     | 250 ms |
//! | FeintPunch      | 4     | 260 ms |
//! | SideStep(dir)   | 2 + 4 | 580 ms |

use std::fmt;
use std::time::Duration;

use static_assertions::const_assert;
use warbot_common::actuator::ActuatorId;
use warbot_common::consts::MAX_MOVE_STEPS;

use ActuatorId::{LeftElbow, LeftShoulder, RightElbow, RightShoulder};
use StepCommand::{Angle, Drive};

/// One command inside a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    /// Actuator target [deg].
    Angle(ActuatorId, i32),
    /// Wheel speeds (left, right).
    Drive(i32, i32),
}

/// Commands issued together, then held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveStep {
    pub commands: &'static [StepCommand],
    pub hold: Duration,
}

const fn step(commands: &'static [StepCommand], hold_ms: u64) -> MoveStep {
    MoveStep {
        commands,
        hold: Duration::from_millis(hold_ms),
    }
}

// ─── Tables ─────────────────────────────────────────────────────────

/// Drop the right arm into a low hook, curve in, rip upward while ramming.
pub const ANKLE_BREAKER: &[MoveStep] = &[
    step(&[Angle(RightShoulder, 45), Angle(RightElbow, 30)], 150),
    step(&[Drive(200, 100)], 300),
    step(&[Angle(RightShoulder, 160), Angle(RightElbow, 90), Drive(255, 255)], 250),
    step(&[Drive(0, 0), Angle(RightShoulder, 90), Angle(RightElbow, 90)], 0),
];

pub const HIP_TWIST_PUNCH: &[MoveStep] = &[
    step(&[Angle(LeftElbow, 55)], 100),
    step(&[Angle(LeftElbow, 125), Angle(LeftShoulder, 180)], 150),
    step(&[Angle(LeftShoulder, 90), Angle(LeftElbow, 90)], 0),
];

pub const DOUBLE_JAB: &[MoveStep] = &[
    step(&[Angle(LeftShoulder, 170)], 100),
    step(&[Angle(LeftShoulder, 90)], 100),
    step(&[Angle(LeftShoulder, 170)], 100),
    step(&[Angle(LeftShoulder, 90)], 100),
];

pub const SHOULDER_BASH: &[MoveStep] = &[
    step(&[Angle(LeftElbow, 40), Drive(200, 200)], 250),
    step(&[Drive(0, 0), Angle(LeftElbow, 90)], 0),
];

/// Short partial jab, then the real one.
pub const FEINT_PUNCH: &[MoveStep] = &[
    step(&[Angle(LeftShoulder, 140)], 80),
    step(&[Angle(LeftShoulder, 90)], 60),
    step(&[Angle(LeftShoulder, 180)], 120),
    step(&[Angle(LeftShoulder, 90)], 0),
];

pub const SIDE_STEP_LEFT: &[MoveStep] = &[
    step(&[Drive(-180, 180)], 180),
    step(&[Drive(0, 0)], 0),
];

pub const SIDE_STEP_RIGHT: &[MoveStep] = &[
    step(&[Drive(180, -180)], 180),
    step(&[Drive(0, 0)], 0),
];

const ANKLE_BREAKER_CHAIN: &[&[MoveStep]] = &[ANKLE_BREAKER];
const HIP_TWIST_PUNCH_CHAIN: &[&[MoveStep]] = &[HIP_TWIST_PUNCH];
const DOUBLE_JAB_CHAIN: &[&[MoveStep]] = &[DOUBLE_JAB];
const SHOULDER_BASH_CHAIN: &[&[MoveStep]] = &[SHOULDER_BASH];
const FEINT_PUNCH_CHAIN: &[&[MoveStep]] = &[FEINT_PUNCH];
const SIDE_STEP_LEFT_CHAIN: &[&[MoveStep]] = &[SIDE_STEP_LEFT, DOUBLE_JAB];
const SIDE_STEP_RIGHT_CHAIN: &[&[MoveStep]] = &[SIDE_STEP_RIGHT, DOUBLE_JAB];

const_assert!(ANKLE_BREAKER.len() <= MAX_MOVE_STEPS);
const_assert!(HIP_TWIST_PUNCH.len() <= MAX_MOVE_STEPS);
const_assert!(SHOULDER_BASH.len() <= MAX_MOVE_STEPS);
const_assert!(FEINT_PUNCH.len() <= MAX_MOVE_STEPS);
const_assert!(SIDE_STEP_LEFT.len() + DOUBLE_JAB.len() <= MAX_MOVE_STEPS);
const_assert!(SIDE_STEP_RIGHT.len() + DOUBLE_JAB.len() <= MAX_MOVE_STEPS);

// ─── Move ───────────────────────────────────────────────────────────

/// Side-step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// A named choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    AnkleBreaker,
    HipTwistPunch,
    DoubleJab,
    ShoulderBash,
    FeintPunch,
    SideStep(Direction),
}

/// Flattened, fixed-capacity step list.
pub type MovePlan = heapless::Vec<MoveStep, MAX_MOVE_STEPS>;

impl Move {
    pub const ALL: [Move; 7] = [
        Move::AnkleBreaker,
        Move::HipTwistPunch,
        Move::DoubleJab,
        Move::ShoulderBash,
        Move::FeintPunch,
        Move::SideStep(Direction::Left),
        Move::SideStep(Direction::Right),
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::AnkleBreaker => "ankle_breaker",
            Self::HipTwistPunch => "hip_twist_punch",
            Self::DoubleJab => "double_jab",
            Self::ShoulderBash => "shoulder_bash",
            Self::FeintPunch => "feint_punch",
            Self::SideStep(Direction::Left) => "side_step_left",
            Self::SideStep(Direction::Right) => "side_step_right",
        }
    }

    /// Table segments executed back to back. Side steps chain into the
    /// double jab.
    pub const fn segments(&self) -> &'static [&'static [MoveStep]] {
        match self {
            Self::AnkleBreaker => ANKLE_BREAKER_CHAIN,
            Self::HipTwistPunch => HIP_TWIST_PUNCH_CHAIN,
            Self::DoubleJab => DOUBLE_JAB_CHAIN,
            Self::ShoulderBash => SHOULDER_BASH_CHAIN,
            Self::FeintPunch => FEINT_PUNCH_CHAIN,
            Self::SideStep(Direction::Left) => SIDE_STEP_LEFT_CHAIN,
            Self::SideStep(Direction::Right) => SIDE_STEP_RIGHT_CHAIN,
        }
    }

    /// All steps in execution order.
    pub fn plan(&self) -> MovePlan {
        let mut plan = MovePlan::new();
        for segment in self.segments() {
            for step in segment.iter() {
                // Capacity is checked at compile time above.
                if plan.push(*step).is_err() {
                    break;
                }
            }
        }
        plan
    }

    /// Sum of all step holds.
    pub fn duration(&self) -> Duration {
        self.segments()
            .iter()
            .flat_map(|s| s.iter())
            .map(|s| s.hold)
            .sum()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
