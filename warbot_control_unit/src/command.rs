//! Command processing root.
//!
//! Per-cycle action arbitration: disconnect gesture, scripted moves and
//! direct drive/pose mapping.

pub mod arbitration;
