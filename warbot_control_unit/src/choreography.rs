//! Choreography root.
//!
//! Static move tables and the polled runner that plays them.

pub mod moves;
pub mod runner;

pub use moves::{Direction, Move, MovePlan, MoveStep, StepCommand};
pub use runner::{ChoreographyRunner, RunnerStatus};
