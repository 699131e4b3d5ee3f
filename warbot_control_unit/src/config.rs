//! TOML configuration loader with validation.
//!
//! Loads [`ControlUnitConfig`] through the shared [`ConfigLoader`] and checks
//! every tuning value against the bounds in `warbot_common::consts`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use warbot_common::config::{ConfigError, ConfigLoader, SharedConfig};
use warbot_common::consts::{
    CYCLE_TIME_US, CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN, DISCONNECT_HOLD_MS_DEFAULT,
    DISCONNECT_HOLD_MS_MAX, DISCONNECT_HOLD_MS_MIN, DPAD_SPEED_DEFAULT,
    HEAVY_BRAKE_THRESHOLD_DEFAULT, SPEED_MAX, TRIGGER_DEADZONE_DEFAULT, TRIGGER_DEADZONE_MAX,
    TRIGGER_MAX,
};

use crate::command::arbitration::ArbiterConfig;

// ─── Sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSection {
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSection {
    /// Trigger readings below this are released.
    #[serde(default = "default_trigger_deadzone")]
    pub trigger_deadzone: i32,
    /// Brake above this turns the attack button into the feint.
    #[serde(default = "default_heavy_brake_threshold")]
    pub heavy_brake_threshold: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveSection {
    #[serde(default = "default_dpad_speed")]
    pub dpad_speed: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySection {
    #[serde(default = "default_disconnect_hold_ms")]
    pub disconnect_hold_ms: u64,
    /// Zero the wheels whenever the controller slot empties.
    #[serde(default = "default_true")]
    pub stop_on_controller_loss: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreographySection {
    /// Let the disconnect gesture abort a running move.
    #[serde(default)]
    pub interruptible: bool,
}

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}
fn default_trigger_deadzone() -> i32 {
    TRIGGER_DEADZONE_DEFAULT
}
fn default_heavy_brake_threshold() -> i32 {
    HEAVY_BRAKE_THRESHOLD_DEFAULT
}
fn default_dpad_speed() -> i32 {
    DPAD_SPEED_DEFAULT
}
fn default_disconnect_hold_ms() -> u64 {
    DISCONNECT_HOLD_MS_DEFAULT
}
fn default_true() -> bool {
    true
}

impl Default for CycleSection {
    fn default() -> Self {
        Self {
            cycle_time_us: default_cycle_time_us(),
        }
    }
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            trigger_deadzone: default_trigger_deadzone(),
            heavy_brake_threshold: default_heavy_brake_threshold(),
        }
    }
}

impl Default for DriveSection {
    fn default() -> Self {
        Self {
            dpad_speed: default_dpad_speed(),
        }
    }
}

impl Default for SafetySection {
    fn default() -> Self {
        Self {
            disconnect_hold_ms: default_disconnect_hold_ms(),
            stop_on_controller_loss: true,
        }
    }
}

// ─── Root ───────────────────────────────────────────────────────────

/// Control unit configuration. Every section and field is optional.
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "warbot"
///
/// [cycle]
/// cycle_time_us = 1000
///
/// [input]
/// trigger_deadzone = 50
/// heavy_brake_threshold = 200
///
/// [drive]
/// dpad_speed = 200
///
/// [safety]
/// disconnect_hold_ms = 3000
/// stop_on_controller_loss = true
///
/// [choreography]
/// interruptible = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlUnitConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub cycle: CycleSection,
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub drive: DriveSection,
    #[serde(default)]
    pub safety: SafetySection,
    #[serde(default)]
    pub choreography: ChoreographySection,
}

impl ControlUnitConfig {
    /// Check every field against its bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let c = self.cycle.cycle_time_us;
        if !(CYCLE_TIME_US_MIN..=CYCLE_TIME_US_MAX).contains(&c) {
            return Err(invalid(format!(
                "cycle.cycle_time_us {c} outside [{CYCLE_TIME_US_MIN}, {CYCLE_TIME_US_MAX}]"
            )));
        }

        let dz = self.input.trigger_deadzone;
        if !(0..=TRIGGER_DEADZONE_MAX).contains(&dz) {
            return Err(invalid(format!(
                "input.trigger_deadzone {dz} outside [0, {TRIGGER_DEADZONE_MAX}]"
            )));
        }

        let hb = self.input.heavy_brake_threshold;
        if !(0..=TRIGGER_MAX).contains(&hb) {
            return Err(invalid(format!(
                "input.heavy_brake_threshold {hb} outside [0, {TRIGGER_MAX}]"
            )));
        }

        let s = self.drive.dpad_speed;
        if !(1..=SPEED_MAX).contains(&s) {
            return Err(invalid(format!("drive.dpad_speed {s} outside [1, {SPEED_MAX}]")));
        }

        let h = self.safety.disconnect_hold_ms;
        if !(DISCONNECT_HOLD_MS_MIN..=DISCONNECT_HOLD_MS_MAX).contains(&h) {
            return Err(invalid(format!(
                "safety.disconnect_hold_ms {h} outside [{DISCONNECT_HOLD_MS_MIN}, {DISCONNECT_HOLD_MS_MAX}]"
            )));
        }

        Ok(())
    }

    #[inline]
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(self.cycle.cycle_time_us as u64)
    }

    /// Tuning handed to the arbiter.
    pub fn arbiter_config(&self) -> ArbiterConfig {
        ArbiterConfig {
            trigger_deadzone: self.input.trigger_deadzone,
            heavy_brake_threshold: self.input.heavy_brake_threshold,
            dpad_speed: self.drive.dpad_speed,
            disconnect_hold: Duration::from_millis(self.safety.disconnect_hold_ms),
            interruptible: self.choreography.interruptible,
        }
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

/// Load and validate the control unit configuration.
pub fn load_config(path: &Path) -> Result<ControlUnitConfig, ConfigError> {
    let config = ControlUnitConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate an in-memory TOML document.
pub fn load_config_from_str(content: &str) -> Result<ControlUnitConfig, ConfigError> {
    let config = ControlUnitConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}
