//! Ticker daemon entry point.
//!
//! Drives the cooperative scheduler from the host monotonic clock with a
//! small demo workload, until a signal or the configured tick limit stops it.

mod demo;
mod signals;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use ticker_common::config::{duration_to_ms, TickerConfig};
use ticker_common::metrics::DispatchStats;
use ticker_runtime::clock::MonotonicClock;
use ticker_runtime::scheduler::Scheduler;
use tracing::{debug, info, warn};

use crate::demo::Demo;
use crate::signals::SignalHandler;

/// Ticker daemon command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "ticker-daemon",
    about = "Ticker demo - cooperative scheduler and rate flags on the host clock",
    version,
    long_about = None
)]
struct Args {
    /// Path to a configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many tick calls (overrides config; 0 = run until signalled).
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// Print final dispatch statistics as JSON on stdout.
    #[arg(long)]
    json_stats: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ticker daemon");

    let mut config = load_config(&args)?;
    if let Some(max_ticks) = args.max_ticks {
        config.demo.max_ticks = max_ticks;
    }
    config.validate().context("Invalid configuration")?;

    info!(
        ticks_per_ms = config.ticks_per_ms,
        blink_rate = %config.demo.blink_rate,
        status_rate = %config.demo.status_rate,
        max_ticks = config.demo.max_ticks,
        "Configuration loaded"
    );

    let signal_handler = SignalHandler::new().context("Failed to set up signal handlers")?;

    let stats = run_loop(&config, &signal_handler)?;

    if args.json_stats {
        let json = serde_json::to_string_pretty(&stats).context("Failed to encode statistics")?;
        println!("{json}");
    }

    Ok(())
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!("ticker_daemon={level},ticker_runtime={level},ticker_common={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `TICKER_CONFIG_PATH` environment variable
/// 3. `config/ticker.toml` (local development)
/// 4. Built-in defaults
fn load_config(args: &Args) -> Result<TickerConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return TickerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    if let Ok(env_path) = std::env::var("TICKER_CONFIG_PATH") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from TICKER_CONFIG_PATH");
            return TickerConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from TICKER_CONFIG_PATH={env_path:?}")
            });
        }
        warn!(
            path = %env_path,
            "TICKER_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    let local_path = PathBuf::from("config/ticker.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from local path");
        return TickerConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {local_path:?}"));
    }

    info!("No config file found, using built-in defaults");
    Ok(TickerConfig::default())
}

/// Main loop: one tick call per iteration until shutdown or the tick limit.
fn run_loop(config: &TickerConfig, signal_handler: &SignalHandler) -> Result<DispatchStats> {
    let clock = MonotonicClock::with_ticks_per_ms(config.ticks_per_ms);
    let mut scheduler: Scheduler<MonotonicClock> = Scheduler::builder(clock)
        .ticks_per_ms(config.ticks_per_ms)
        .build()
        .context("Failed to build scheduler")?;

    let startup_ms = duration_to_ms(config.demo.startup_delay).unwrap_or(0);
    if startup_ms > 0 {
        info!(startup_ms, "Blocking startup delay");
        let mut polls = 0u64;
        scheduler.delay_ms(startup_ms, Some(&mut || polls += 1));
        debug!(polls, "Startup delay complete");
        scheduler.initialize();
    }

    let mut demo = Demo::new(config.demo.clone());
    demo.install(&mut scheduler)
        .context("Failed to schedule demo tasks")?;

    let max_ticks = config.demo.max_ticks;
    let loop_interval = config.demo.loop_interval;
    let mut ticks = 0u64;

    info!(capacity = scheduler.capacity(), "Entering main loop");

    while !signal_handler.shutdown_requested() {
        scheduler.tick();
        demo.on_tick(&scheduler);

        ticks += 1;
        if max_ticks > 0 && ticks >= max_ticks {
            info!(ticks, "Maximum tick count reached");
            break;
        }

        if !loop_interval.is_zero() {
            std::thread::sleep(loop_interval);
        }
    }

    let stats = *scheduler.stats();
    info!(
        tick_calls = stats.tick_calls(),
        fired = stats.fired(),
        rearmed = stats.rearmed(),
        completed = stats.completed(),
        errored = stats.errored(),
        max_fired_per_tick = stats.max_fired_per_tick(),
        blinks = demo.blinks(),
        heartbeats = demo.heartbeats(),
        signals = signal_handler.signal_count(),
        "Ticker daemon shutdown complete"
    );

    Ok(stats)
}
