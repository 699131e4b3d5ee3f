//! WARBOT Common Library
//!
//! Shared constants, configuration loading and the collaborator traits
//! used by every WARBOT workspace crate.
//!
//! # Module Structure
//!
//! - [`consts`] - Output/input ranges and tuning defaults
//! - [`config`] - Configuration loading traits and types
//! - [`actuator`] - Motor/actuator types, clamping, `ActuatorBackend`
//! - [`gamepad`] - Controller snapshot, `Gamepad`, `InputSource`, `ControllerSlot`

pub mod actuator;
pub mod config;
pub mod consts;
pub mod gamepad;
