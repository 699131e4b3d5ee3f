//! Gamepad input types and the input-source seam.
//!
//! - `ControllerSnapshot` - one immutable per-cycle read of the pad
//! - `Buttons` / `DPad` - bitflag masks
//! - `Gamepad` trait - one attached controller
//! - `InputSource` trait - the gamepad library, pumped once per cycle
//! - `ControllerSlot` - single-slot ownership of the active controller

use bitflags::bitflags;
use std::time::Instant;

bitflags! {
    /// Buttons the control core reacts to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        /// Primary attack button (square / X).
        const X           = 0x0001;
        /// Left stick click.
        const THUMB_L     = 0x0002;
        /// Right stick click.
        const THUMB_R     = 0x0004;
        /// Right shoulder button.
        const R1          = 0x0008;
        /// Select / share / system button.
        const MISC_SYSTEM = 0x0010;
        /// Home / PS button.
        const MISC_HOME   = 0x0020;
    }
}

bitflags! {
    /// D-pad direction mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DPad: u8 {
        const UP    = 0x01;
        const DOWN  = 0x02;
        const RIGHT = 0x04;
        const LEFT  = 0x08;
    }
}

impl Buttons {
    /// The two-button hold-to-confirm disconnect gesture.
    pub const DISCONNECT_GESTURE: Self =
        Self::from_bits_truncate(Self::MISC_SYSTEM.bits() | Self::MISC_HOME.bits());
}

/// Immutable per-cycle read of the gamepad state.
///
/// Axes nominally span [-512, 511]; triggers [0, 255]. Values outside the
/// nominal ranges are accepted and saturated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerSnapshot {
    pub axis_x: i32,
    pub axis_y: i32,
    pub axis_rx: i32,
    pub axis_ry: i32,
    pub brake: i32,
    pub throttle: i32,
    pub buttons: Buttons,
    pub dpad: DPad,
}

impl ControllerSnapshot {
    #[inline]
    pub const fn pressed(&self, button: Buttons) -> bool {
        self.buttons.contains(button)
    }

    /// Both disconnect-gesture buttons are held.
    #[inline]
    pub const fn disconnect_gesture(&self) -> bool {
        self.buttons.contains(Buttons::DISCONNECT_GESTURE)
    }
}

/// One attached controller.
pub trait Gamepad {
    /// Stable identifier assigned by the input source.
    fn id(&self) -> u32;

    /// Link is up.
    fn is_connected(&self) -> bool;

    /// A fresh report arrived since the last source update.
    fn has_data(&self) -> bool;

    /// Device reports the gamepad profile (not a mouse/keyboard/balance board).
    fn is_gamepad(&self) -> bool;

    /// Current input state.
    fn snapshot(&self) -> ControllerSnapshot;

    /// Drop the link. The source reports the detach on a later update.
    fn disconnect(&mut self);

    /// All liveness checks pass and the arbiter may consume this pad.
    #[inline]
    fn is_live(&self) -> bool {
        self.is_connected() && self.has_data() && self.is_gamepad()
    }
}

/// Gamepad library seam, pumped once per control cycle.
pub trait InputSource {
    type Pad: Gamepad;

    /// Process pending events: apply attach/detach to `slot` and refresh
    /// the attached pad's data.
    fn update(&mut self, now: Instant, slot: &mut ControllerSlot<Self::Pad>);

    /// Finite sources (replays) report exhaustion here.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Single-slot owner of the active controller.
///
/// Replaces a global "active controller" pointer: the source fills it on
/// attach and clears it on detach, and the control loop borrows it
/// explicitly every cycle.
#[derive(Debug)]
pub struct ControllerSlot<G> {
    pad: Option<G>,
}

impl<G> Default for ControllerSlot<G> {
    fn default() -> Self {
        Self { pad: None }
    }
}

impl<G: Gamepad> ControllerSlot<G> {
    pub const fn new() -> Self {
        Self { pad: None }
    }

    /// Attach a controller. The last attached controller wins; a previous
    /// occupant is returned to the caller.
    pub fn connect(&mut self, pad: G) -> Option<G> {
        self.pad.replace(pad)
    }

    /// Detach notification. Clears the slot only when `id` is the occupant.
    pub fn on_disconnected(&mut self, id: u32) -> Option<G> {
        if self.pad.as_ref().is_some_and(|p| p.id() == id) {
            self.pad.take()
        } else {
            None
        }
    }

    /// Unconditionally empty the slot.
    pub fn release(&mut self) -> Option<G> {
        self.pad.take()
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.pad.is_some()
    }

    pub fn get(&self) -> Option<&G> {
        self.pad.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut G> {
        self.pad.as_mut()
    }

    /// The occupant, only when it is connected, fresh and a gamepad.
    pub fn live_mut(&mut self) -> Option<&mut G> {
        self.pad.as_mut().filter(|p| p.is_live())
    }
}
