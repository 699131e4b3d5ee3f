//! # WARBOT Control Unit Library
//!
//! Input-to-actuation core of the WARBOT combat robot. Once per control
//! cycle it turns a gamepad snapshot into exactly one of:
//!
//! 1. **Disconnect gesture** - hold-to-confirm safety shutdown
//! 2. **Choreography** - one of six scripted, timed attack moves
//! 3. **Direct mapping** - D-pad wheel drive plus stick-to-actuator pose
//!
//! ## Layers
//!
//! - [`actuator`] - clamped motor/actuator writes over an `ActuatorBackend`
//! - [`input`] - deadzones, trigger exclusivity, axis-to-angle remapping
//! - [`safety`] - disconnect gesture state machine
//! - [`choreography`] - static move tables and the polled step runner
//! - [`command`] - per-cycle priority arbitration
//! - [`cycle`] - control loop, pacing and statistics
//! - [`sim`] - simulated actuators and scripted gamepad replay
//!
//! ## No Blocking in the Cycle
//!
//! Moves are step-index + elapsed-time state machines polled every cycle
//! against an injected `Instant`. Nothing in the cycle sleeps.

pub mod actuator;
pub mod choreography;
pub mod command;
pub mod config;
pub mod cycle;
pub mod input;
pub mod safety;
pub mod sim;
