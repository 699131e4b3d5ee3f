//! Control cycle: pump input → arbitrate → actuate.
//!
//! ## RT Setup
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! Without the `rt` feature only step 2 runs.
//!
//! ## Cycle Loop
//! With `rt`, absolute-time `clock_nanosleep` on `CLOCK_MONOTONIC` for
//! drift-free pacing. Otherwise `std::thread::sleep` for the remainder of
//! the cycle. Overruns are counted and logged; they never stop the loop.
//!
//! ## Cycle Body
//! 1. Pump the input source (attach/detach + fresh data).
//! 2. Detect controller loss and apply the failsafe.
//! 3. Live controller → arbiter cycle. Otherwise only a running move is
//!    serviced.
//! 4. A fired disconnect gesture drops the controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};
use warbot_common::actuator::ActuatorBackend;
use warbot_common::config::ConfigError;
use warbot_common::gamepad::{ControllerSlot, Gamepad, InputSource};

use crate::actuator::Actuators;
use crate::choreography::Move;
use crate::command::arbitration::{Arbiter, CycleOutcome};
use crate::config::ControlUnitConfig;
use crate::sim::replay::ReplayError;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Timing of the cycle body, updated in O(1) per cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    /// Shortest body; `None` before the first cycle.
    pub fastest: Option<Duration>,
    pub slowest: Duration,
    pub total: Duration,
    /// Bodies that ran longer than the cycle budget.
    pub overruns: u64,
    /// Worst gap between the planned and the actual wake-up.
    pub worst_wake_latency: Duration,
}

impl CycleStats {
    /// Record one body. Returns true when it overran `budget`.
    pub fn record(&mut self, body: Duration, wake_latency: Duration, budget: Duration) -> bool {
        self.cycles += 1;
        self.fastest = Some(self.fastest.map_or(body, |f| f.min(body)));
        self.slowest = self.slowest.max(body);
        self.total += body;
        self.worst_wake_latency = self.worst_wake_latency.max(wake_latency);
        let overran = body > budget;
        if overran {
            self.overruns += 1;
        }
        overran
    }

    pub fn mean(&self) -> Duration {
        match u32::try_from(self.cycles) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total / n,
            Err(_) => Duration::from_nanos((self.total.as_nanos() / self.cycles as u128) as u64),
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors outside the control path: setup and input loading.
#[derive(Debug)]
pub enum CycleError {
    /// RT system call failed.
    RtSetup(String),
    /// Configuration rejected.
    Config(ConfigError),
    /// Replay script unusable.
    Replay(ReplayError),
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RtSetup(msg) => write!(f, "RT setup error: {msg}"),
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::Replay(e) => write!(f, "replay error: {e}"),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<ConfigError> for CycleError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ReplayError> for CycleError {
    fn from(e: ReplayError) -> Self {
        Self::Replay(e)
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Stack touched up front so the loop never page-faults on it.
const STACK_PREFAULT_BYTES: usize = 256 * 1024;

fn prefault_stack() {
    let mut buf = [0u8; STACK_PREFAULT_BYTES];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is an exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
mod rt {
    use super::CycleError;
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::sys::mman::{MlockallFlags, mlockall};
    use nix::unistd::Pid;

    fn failed(what: &str, e: impl std::fmt::Display) -> CycleError {
        CycleError::RtSetup(format!("{what}: {e}"))
    }

    pub(super) fn lock_memory() -> Result<(), CycleError> {
        mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
            .map_err(|e| failed("mlockall", e))
    }

    pub(super) fn pin_to_core(core: usize) -> Result<(), CycleError> {
        let mut set = CpuSet::new();
        set.set(core).map_err(|e| failed("cpu set", e))?;
        sched_setaffinity(Pid::from_raw(0), &set).map_err(|e| failed("sched_setaffinity", e))
    }

    pub(super) fn enable_fifo(priority: i32) -> Result<(), CycleError> {
        let param = libc::sched_param {
            sched_priority: priority,
        };
        // SAFETY: `param` outlives the call.
        if unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } != 0 {
            return Err(failed(
                "SCHED_FIFO",
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }
}

/// Prepare the calling thread for the control loop. Without the `rt`
/// feature only the stack is prefaulted.
#[cfg(feature = "rt")]
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt::lock_memory()?;
    prefault_stack();
    rt::pin_to_core(cpu_core)?;
    rt::enable_fifo(rt_priority)
}

#[cfg(not(feature = "rt"))]
pub fn rt_setup(_cpu_core: usize, _rt_priority: i32) -> Result<(), CycleError> {
    prefault_stack();
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the arbiter, the controller slot, the input source and the
/// actuators. Single-threaded: nothing here is shared.
pub struct CycleRunner<S: InputSource, B: ActuatorBackend> {
    config: ControlUnitConfig,
    arbiter: Arbiter,
    slot: ControllerSlot<S::Pad>,
    source: S,
    actuators: Actuators<B>,
    stats: CycleStats,
    activity: ActivityStats,
    cycle_time: Duration,
    attached: Option<u32>,
}

impl<S: InputSource, B: ActuatorBackend> CycleRunner<S, B> {
    /// Build a runner. `config` must already be validated.
    pub fn new(config: ControlUnitConfig, source: S, backend: B) -> Self {
        info!(backend = backend.name(), "actuator backend ready");
        Self {
            arbiter: Arbiter::new(config.arbiter_config()),
            cycle_time: config.cycle_time(),
            config,
            slot: ControllerSlot::new(),
            source,
            actuators: Actuators::new(backend),
            stats: CycleStats::default(),
            activity: ActivityStats::default(),
            attached: None,
        }
    }

    pub fn config(&self) -> &ControlUnitConfig {
        &self.config
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn actuators(&self) -> &Actuators<B> {
        &self.actuators
    }

    pub fn slot(&self) -> &ControllerSlot<S::Pad> {
        &self.slot
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn activity(&self) -> &ActivityStats {
        &self.activity
    }

    /// Move the arbiter is currently playing.
    pub fn current_move(&self) -> Option<Move> {
        self.arbiter.current_move()
    }

    /// Finite source ran out.
    pub fn is_finished(&self) -> bool {
        self.source.is_finished()
    }

    /// Run one cycle at `now`. Returns what the arbiter did, `None` when
    /// there was nothing to do.
    pub fn tick(&mut self, now: Instant) -> Option<CycleOutcome> {
        self.source.update(now, &mut self.slot);
        self.track_attachment();

        let snapshot = self.slot.live_mut().map(|pad| pad.snapshot());
        let outcome = match snapshot {
            Some(snapshot) => Some(self.arbiter.cycle(&snapshot, now, &mut self.actuators)),
            None => self.arbiter.service_running_move(now, &mut self.actuators),
        };

        if let Some(outcome) = &outcome {
            self.activity.record(outcome);
            if *outcome == CycleOutcome::Disconnect {
                self.drop_controller();
            }
        }
        outcome
    }

    /// Loop until `running` clears or the source finishes, then stop the
    /// wheels and log a summary.
    pub fn run(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        info!(
            cycle_us = self.config.cycle.cycle_time_us,
            rt = cfg!(feature = "rt"),
            "control loop started"
        );

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(running);
        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(running);

        if let Some(mv) = self.arbiter.on_controller_lost(&mut self.actuators, true) {
            self.activity.moves_aborted += 1;
            warn!(mv = %mv, "move cut short by shutdown");
        }
        self.actuators.stop();
        self.log_summary();
        result
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now_ts = || clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")));
        let mut next_wake = now_ts()?;

        let step_ns = self.cycle_time.as_nanos() as i64;

        while running.load(Ordering::Relaxed) && !self.source.is_finished() {
            let wake = next_wake;
            next_wake = timespec_add_ns(next_wake, step_ns);

            let cycle_start = now_ts()?;
            self.tick(Instant::now());
            let cycle_end = now_ts()?;

            let body = Duration::from_nanos(timespec_diff_ns(&cycle_end, &cycle_start).max(0) as u64);
            let latency = Duration::from_nanos(timespec_diff_ns(&cycle_start, &wake).unsigned_abs());
            self.record_cycle(body, latency);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        while running.load(Ordering::Relaxed) && !self.source.is_finished() {
            let cycle_start = Instant::now();
            self.tick(cycle_start);

            let elapsed = cycle_start.elapsed();
            self.record_cycle(elapsed, Duration::ZERO);

            if let Some(remaining) = self.cycle_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }

    fn record_cycle(&mut self, body: Duration, wake_latency: Duration) {
        if self.stats.record(body, wake_latency, self.cycle_time) {
            warn!(
                body_us = body.as_micros() as u64,
                budget_us = self.cycle_time.as_micros() as u64,
                overruns = self.stats.overruns,
                "cycle overrun"
            );
        }
    }

    /// Log attach/detach edges and apply the failsafe on detach.
    fn track_attachment(&mut self) {
        let current = self.slot.get().map(Gamepad::id);
        if current == self.attached {
            return;
        }
        if let Some(id) = self.attached {
            info!(id, "controller detached");
            self.on_loss();
        }
        if let Some(id) = current {
            info!(id, "controller attached");
        }
        self.attached = current;
    }

    fn drop_controller(&mut self) {
        if let Some(pad) = self.slot.get_mut() {
            pad.disconnect();
        }
        if let Some(pad) = self.slot.release() {
            info!(id = pad.id(), "controller dropped by disconnect gesture");
        }
        self.attached = None;
        self.on_loss();
    }

    fn on_loss(&mut self) {
        self.activity.controller_losses += 1;
        let failsafe = self.config.safety.stop_on_controller_loss;
        if let Some(mv) = self.arbiter.on_controller_lost(&mut self.actuators, failsafe) {
            self.activity.moves_aborted += 1;
            warn!(mv = %mv, "move cut short by controller loss");
        }
    }

    fn log_summary(&self) {
        info!(
            cycles = self.stats.cycles,
            mean_us = self.stats.mean().as_micros() as u64,
            fastest_us = self.stats.fastest.unwrap_or_default().as_micros() as u64,
            slowest_us = self.stats.slowest.as_micros() as u64,
            worst_wake_us = self.stats.worst_wake_latency.as_micros() as u64,
            overruns = self.stats.overruns,
            "cycle statistics"
        );
        info!(
            started = self.activity.moves_started,
            completed = self.activity.moves_completed,
            aborted = self.activity.moves_aborted,
            disconnects = self.activity.disconnects,
            controller_losses = self.activity.controller_losses,
            "activity summary"
        );
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;

    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
