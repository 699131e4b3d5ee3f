//! # WARBOT Control Unit
//!
//! Runs the arbitration + choreography engine against a recorded gamepad
//! session on the simulated actuator backend.
//!
//! Loads the TOML config (defaults when the file is missing), performs RT
//! setup, and cycles until the replay ends or Ctrl-C.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use warbot_common::config::{ConfigError, LogLevel};
use warbot_common::consts::DEFAULT_CONFIG_PATH;
use warbot_control_unit::config::{ControlUnitConfig, load_config};
use warbot_control_unit::cycle::{CycleRunner, rt_setup};
use warbot_control_unit::sim::{ReplayScript, ReplaySource, SimulatedActuators};

/// WARBOT Control Unit: gamepad → actuator arbitration loop
#[derive(Parser, Debug)]
#[command(name = "warbot_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Action arbitration and motion sequencing for the WARBOT combat robot")]
struct Args {
    /// Path to the control unit configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// JSON-lines gamepad replay to play.
    #[arg(long, value_name = "FILE")]
    replay: PathBuf,

    /// Keep the last replay frame active this long before exiting [ms].
    #[arg(long, default_value_t = 500)]
    tail_ms: u64,

    /// CPU core to pin the RT thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let (config, config_missing) = match load_config(&args.config) {
        Ok(config) => (Ok(config), false),
        Err(ConfigError::FileNotFound) => (Ok(ControlUnitConfig::default()), true),
        Err(e) => (Err(e), false),
    };

    let log_level = config
        .as_ref()
        .map_or(LogLevel::default(), |c| c.shared.log_level);
    setup_tracing(&args, log_level);

    info!("WARBOT Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));
    if config_missing {
        warn!(
            "Config '{}' not found, using built-in defaults",
            args.config.display()
        );
    }

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("WARBOT Control Unit shutdown complete");
}

fn run(args: &Args, config: ControlUnitConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = %config.shared.service_name,
        cycle_us = config.cycle.cycle_time_us,
        hold_ms = config.safety.disconnect_hold_ms,
        interruptible = config.choreography.interruptible,
        "Config OK"
    );

    let script = ReplayScript::load(&args.replay)?;
    info!(
        frames = script.frames().len(),
        duration_ms = script.duration().as_millis() as u64,
        "Replay loaded from {}",
        args.replay.display()
    );
    let source = ReplaySource::new(script).with_tail(Duration::from_millis(args.tail_ms));

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let mut runner = CycleRunner::new(config, source, SimulatedActuators::new());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    runner.run(&running)?;
    Ok(())
}

const fn tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// `--verbose` raises the configured level to at least DEBUG.
fn effective_level(configured: LogLevel, verbose: bool) -> Level {
    let level = tracing_level(configured);
    if verbose { level.max(Level::DEBUG) } else { level }
}

/// Setup tracing subscriber from the configured level and CLI flags.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = effective_level(configured, args.verbose);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
