//! System-wide constants for the WARBOT workspace.
//!
//! Single source of truth for output ranges, input ranges and the default
//! tuning values. Config defaults and bounds are taken from here.

// ─── Output Ranges ──────────────────────────────────────────────────

/// Maximum motor speed magnitude (8-bit PWM duty).
pub const SPEED_MAX: i32 = 255;

/// Minimum signed motor speed.
pub const SPEED_MIN: i32 = -SPEED_MAX;

/// Maximum actuator angle [deg].
pub const ANGLE_MAX: i32 = 180;

/// Minimum actuator angle [deg].
pub const ANGLE_MIN: i32 = 0;

/// Neutral actuator angle [deg].
pub const NEUTRAL_ANGLE: u8 = 90;

/// Number of angular actuators.
pub const ACTUATOR_COUNT: usize = 5;

/// Number of drive motors.
pub const MOTOR_COUNT: usize = 2;

// ─── Input Ranges ───────────────────────────────────────────────────

/// Lowest analog stick reading.
pub const AXIS_MIN: i32 = -512;

/// Highest analog stick reading.
pub const AXIS_MAX: i32 = 511;

/// Highest trigger reading accepted for thresholds. Pads nominally report
/// [0, 255]; some report up to 10 bits.
pub const TRIGGER_MAX: i32 = 1023;

// ─── Cycle ──────────────────────────────────────────────────────────

/// Default control cycle time in microseconds (1 kHz).
pub const CYCLE_TIME_US: u32 = 1000;
pub const CYCLE_TIME_US_MIN: u32 = 100;
pub const CYCLE_TIME_US_MAX: u32 = 100_000;

// ─── Input Tuning ───────────────────────────────────────────────────

/// Trigger readings below this are treated as released.
pub const TRIGGER_DEADZONE_DEFAULT: i32 = 50;
pub const TRIGGER_DEADZONE_MAX: i32 = 255;

/// Brake reading above which the attack button selects the feint.
pub const HEAVY_BRAKE_THRESHOLD_DEFAULT: i32 = 200;

// ─── Drive ──────────────────────────────────────────────────────────

/// Wheel speed commanded by a D-pad press.
pub const DPAD_SPEED_DEFAULT: i32 = 200;

// ─── Safety ─────────────────────────────────────────────────────────

/// Hold time of the disconnect gesture before it fires [ms].
pub const DISCONNECT_HOLD_MS_DEFAULT: u64 = 3000;
pub const DISCONNECT_HOLD_MS_MIN: u64 = 500;
pub const DISCONNECT_HOLD_MS_MAX: u64 = 30_000;

// ─── Choreography ───────────────────────────────────────────────────

/// Capacity of a flattened move plan.
pub const MAX_MOVE_STEPS: usize = 8;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/warbot.toml";
