//! Safety module root.
//!
//! Hold-to-confirm disconnect gesture.

pub mod disconnect;
