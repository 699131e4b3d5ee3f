//! Scripted gamepad replay.
//!
//! A replay script is JSON lines, one frame per line, in time order:
//!
//! ```text
//! {"at_ms": 0, "dpad": "UP", "axis_y": 511}
//! {"at_ms": 400, "buttons": "X", "brake": 210}
//! {"at_ms": 1200, "connected": false}
//! ```
//!
//! Every field except `at_ms` is optional. `connected` defaults to true;
//! axes and triggers to 0. `buttons` and `dpad` use the bitflags text
//! form (`"X | R1"`, `"UP"`); an empty string means nothing pressed.
//!
//! A frame stays current until the next one is due. The source attaches
//! a [`ReplayPad`] when frames go connected and detaches it when they go
//! disconnected. If the host drops the pad itself (disconnect gesture),
//! the source waits for a disconnected frame before attaching again.

use std::io::BufRead;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use warbot_common::gamepad::{
    Buttons, ControllerSlot, ControllerSnapshot, DPad, Gamepad, InputSource,
};

/// Replay script errors. `line` is 1-based.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: invalid {field} flags: {message}")]
    Flags {
        line: usize,
        field: &'static str,
        message: String,
    },

    #[error("line {line}: frame time goes backwards")]
    OutOfOrder { line: usize },

    #[error("replay script has no frames")]
    Empty,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameRecord {
    at_ms: u64,
    #[serde(default = "default_true")]
    connected: bool,
    #[serde(default)]
    axis_x: i32,
    #[serde(default)]
    axis_y: i32,
    #[serde(default)]
    axis_rx: i32,
    #[serde(default)]
    axis_ry: i32,
    #[serde(default)]
    brake: i32,
    #[serde(default)]
    throttle: i32,
    #[serde(default)]
    buttons: String,
    #[serde(default)]
    dpad: String,
}

/// One timed controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayFrame {
    /// Offset from the first update.
    pub at: Duration,
    pub connected: bool,
    pub snapshot: ControllerSnapshot,
}

impl ReplayFrame {
    fn from_record(record: FrameRecord, line: usize) -> Result<Self, ReplayError> {
        let buttons = bitflags::parser::from_str::<Buttons>(&record.buttons).map_err(|e| {
            ReplayError::Flags {
                line,
                field: "buttons",
                message: e.to_string(),
            }
        })?;
        let dpad = bitflags::parser::from_str::<DPad>(&record.dpad).map_err(|e| {
            ReplayError::Flags {
                line,
                field: "dpad",
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            at: Duration::from_millis(record.at_ms),
            connected: record.connected,
            snapshot: ControllerSnapshot {
                axis_x: record.axis_x,
                axis_y: record.axis_y,
                axis_rx: record.axis_rx,
                axis_ry: record.axis_ry,
                brake: record.brake,
                throttle: record.throttle,
                buttons,
                dpad,
            },
        })
    }
}

/// Parsed, time-ordered frames. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayScript {
    frames: Vec<ReplayFrame>,
}

impl ReplayScript {
    /// Parse JSON lines. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        Self::from_reader(text.as_bytes())
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ReplayError> {
        let mut frames: Vec<ReplayFrame> = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: FrameRecord = serde_json::from_str(trimmed).map_err(|source| {
                ReplayError::Json {
                    line: line_no,
                    source,
                }
            })?;
            let frame = ReplayFrame::from_record(record, line_no)?;
            if frames.last().is_some_and(|prev| frame.at < prev.at) {
                return Err(ReplayError::OutOfOrder { line: line_no });
            }
            frames.push(frame);
        }

        if frames.is_empty() {
            return Err(ReplayError::Empty);
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// Time of the last frame.
    pub fn duration(&self) -> Duration {
        self.frames.last().map_or(Duration::ZERO, |f| f.at)
    }
}

/// Gamepad fed from a replay script.
#[derive(Debug, Clone)]
pub struct ReplayPad {
    id: u32,
    connected: bool,
    snapshot: ControllerSnapshot,
}

impl ReplayPad {
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            connected: true,
            snapshot: ControllerSnapshot {
                axis_x: 0,
                axis_y: 0,
                axis_rx: 0,
                axis_ry: 0,
                brake: 0,
                throttle: 0,
                buttons: Buttons::empty(),
                dpad: DPad::empty(),
            },
        }
    }
}

impl Gamepad for ReplayPad {
    fn id(&self) -> u32 {
        self.id
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    /// Every update delivers the current frame.
    fn has_data(&self) -> bool {
        self.connected
    }

    fn is_gamepad(&self) -> bool {
        true
    }

    fn snapshot(&self) -> ControllerSnapshot {
        self.snapshot
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}

/// [`InputSource`] that plays a [`ReplayScript`] against the cycle clock.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    script: ReplayScript,
    /// Next frame not yet due.
    cursor: usize,
    origin: Option<Instant>,
    tail: Duration,
    next_id: u32,
    attached: Option<u32>,
    awaiting_release: bool,
    finished: bool,
}

impl ReplaySource {
    pub const fn new(script: ReplayScript) -> Self {
        Self {
            script,
            cursor: 0,
            origin: None,
            tail: Duration::ZERO,
            next_id: 1,
            attached: None,
            awaiting_release: false,
            finished: false,
        }
    }

    /// Keep the last frame current for `tail` before finishing.
    pub const fn with_tail(mut self, tail: Duration) -> Self {
        self.tail = tail;
        self
    }

    pub fn script(&self) -> &ReplayScript {
        &self.script
    }

    /// Frame current at the last update.
    pub fn current_frame(&self) -> Option<&ReplayFrame> {
        self.cursor.checked_sub(1).map(|i| &self.script.frames[i])
    }

    fn advance(&mut self, elapsed: Duration) {
        while self
            .script
            .frames
            .get(self.cursor)
            .is_some_and(|f| f.at <= elapsed)
        {
            self.cursor += 1;
        }
    }
}

impl InputSource for ReplaySource {
    type Pad = ReplayPad;

    fn update(&mut self, now: Instant, slot: &mut ControllerSlot<ReplayPad>) {
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now.saturating_duration_since(origin);
        self.advance(elapsed);

        let Some(frame) = self.current_frame().copied() else {
            return;
        };

        if let Some(id) = self.attached {
            if slot.get().map(Gamepad::id) != Some(id) {
                debug!(id, "replay pad dropped by host");
                self.attached = None;
                self.awaiting_release = true;
            }
        }

        if !frame.connected {
            self.awaiting_release = false;
            if let Some(id) = self.attached.take() {
                info!(id, "replay pad detached");
                slot.on_disconnected(id);
            }
        } else if self.attached.is_none() && !self.awaiting_release {
            let id = self.next_id;
            self.next_id += 1;
            info!(id, "replay pad attached");
            slot.connect(ReplayPad::new(id));
            self.attached = Some(id);
        }

        if let Some(pad) = slot.get_mut().filter(|p| Some(p.id) == self.attached) {
            pad.snapshot = frame.snapshot;
        }

        self.finished = self.cursor == self.script.frames.len()
            && elapsed >= self.script.duration() + self.tail;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
