//! Disconnect gesture: hold-to-confirm emergency disconnect.
//!
//! Two buttons held together for the configured hold time (3 s default)
//! drop the controller link. The state machine is:
//!
//! | State   | Gesture | Elapsed    | Next    | Outcome              |
//! |---------|---------|------------|---------|----------------------|
//! | Idle    | held    | –          | Holding | `Started`            |
//! | Holding | held    | < hold     | Holding | `Holding { elapsed }`|
//! | Holding | held    | ≥ hold     | Idle    | `Fire`               |
//! | any     | free    | –          | Idle    | `Released`           |
//!
//! While the gesture is held, no other action may run in that cycle.

use std::time::{Duration, Instant};

/// Gesture state. Persists across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Holding { since: Instant },
}

/// Progress of a gesture that is held this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldProgress {
    Started,
    Holding { elapsed: Duration },
    Fire,
}

/// Result of one gesture update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Gesture not held; timer is idle.
    Released,
    /// First cycle the gesture was seen.
    Started,
    /// Still held, threshold not reached.
    Holding { elapsed: Duration },
    /// Threshold reached: disconnect now. Timer is back to Idle.
    Fire,
}

/// Hold-to-confirm timer for the disconnect gesture.
#[derive(Debug, Clone)]
pub struct DisconnectGesture {
    hold: Duration,
    phase: GesturePhase,
}

impl DisconnectGesture {
    pub const fn new(hold: Duration) -> Self {
        Self {
            hold,
            phase: GesturePhase::Idle,
        }
    }

    #[inline]
    pub const fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[inline]
    pub const fn hold_time(&self) -> Duration {
        self.hold
    }

    #[inline]
    pub const fn is_holding(&self) -> bool {
        matches!(self.phase, GesturePhase::Holding { .. })
    }

    /// Time the gesture has been held as of `now`, zero when idle.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.phase {
            GesturePhase::Idle => Duration::ZERO,
            GesturePhase::Holding { since } => now.saturating_duration_since(since),
        }
    }

    /// Feed one cycle's gesture state.
    pub fn update(&mut self, held: bool, now: Instant) -> GestureOutcome {
        if held {
            self.held(now).into()
        } else {
            self.reset();
            GestureOutcome::Released
        }
    }

    /// Gesture observed this cycle.
    pub fn held(&mut self, now: Instant) -> HoldProgress {
        match self.phase {
            GesturePhase::Idle => {
                self.phase = GesturePhase::Holding { since: now };
                HoldProgress::Started
            }
            GesturePhase::Holding { since } => {
                let elapsed = now.saturating_duration_since(since);
                if elapsed >= self.hold {
                    self.phase = GesturePhase::Idle;
                    HoldProgress::Fire
                } else {
                    HoldProgress::Holding { elapsed }
                }
            }
        }
    }

    /// Gesture released (or arbitration moved on): back to Idle.
    #[inline]
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
    }
}

impl From<HoldProgress> for GestureOutcome {
    fn from(progress: HoldProgress) -> Self {
        match progress {
            HoldProgress::Started => Self::Started,
            HoldProgress::Holding { elapsed } => Self::Holding { elapsed },
            HoldProgress::Fire => Self::Fire,
        }
    }
}
