//! Simulation module root.
//!
//! Stand-ins for the hardware collaborators: an in-memory actuator
//! backend and a scripted gamepad source.

pub mod backend;
pub mod replay;

pub use backend::{ActuatorEvent, SimulatedActuators};
pub use replay::{ReplayError, ReplayFrame, ReplayPad, ReplayScript, ReplaySource};
