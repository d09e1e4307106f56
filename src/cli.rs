//! CLI entrypoint: argument parsing, config merging, and composition of the
//! logger and the supervision loop. This is the only place process stdout
//! becomes a log destination.

use crate::config::types::{ConfigOverlay, ExecMode, TickerConfig};
use crate::config::{env as env_file, validator};
use crate::core::ticker::Ticker;
use crate::logging::{LogLevel, Logger};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "cadence",
    version,
    about = "Periodically re-execute a PHP script or shell command under resource ceilings"
)]
struct Cli {
    /// Path to a PHP script (.php) or a quoted shell command
    target: Option<String>,

    /// Sleep interval between runs, in seconds
    #[arg(short, long, value_name = "SECS")]
    interval: Option<u64>,

    /// Supervisor memory ceiling, e.g. 128M or 1G (0 = unlimited)
    #[arg(short = 'm', long, value_name = "SIZE")]
    max_memory: Option<String>,

    /// Total runtime ceiling in seconds (0 = unlimited)
    #[arg(short = 't', long, value_name = "SECS")]
    max_runtime: Option<u64>,

    /// Cycle-count ceiling (0 = unlimited)
    #[arg(short = 'n', long, value_name = "COUNT")]
    max_cycles: Option<u64>,

    /// Append log entries to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Minimum log level: debug, info, warning, error, quiet
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Env file with CAD_* settings (default: .env next to the script)
    #[arg(short, long, value_name = "PATH")]
    env: Option<PathBuf>,

    /// Print the effective configuration before starting
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long)]
    quiet: bool,

    /// Print the effective configuration and exit
    #[arg(short, long)]
    config: bool,
}

/// Parse the process arguments, supervise, and return the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<i32> {
    let Some(target) = cli.target.clone() else {
        if cli.config {
            // No target yet: show what the defaults and env file resolve to.
            let config = build_config(&cli, String::new(), ExecMode::Command)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(0);
        }
        eprintln!("Error: script path or command is required. Run 'cadence --help' for usage.");
        return Ok(1);
    };

    let mode = detect_mode(&target);
    let config = build_config(&cli, target, mode)?;

    if cli.config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(0);
    }

    let errors = validator::validate(&config);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Error: {error}");
        }
        return Ok(1);
    }

    if cli.verbose {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    let logger = Arc::new(Logger::new(config.log_level, config.log_file.clone()));
    let mut ticker = Ticker::new(config, logger);

    Ok(ticker.run())
}

/// A target is a script when it looks like one (.php) or names an existing
/// file; anything else is a shell command line.
fn detect_mode(target: &str) -> ExecMode {
    if target.ends_with(".php") || Path::new(target).exists() {
        ExecMode::Script
    } else {
        ExecMode::Command
    }
}

fn build_config(cli: &Cli, target: String, mode: ExecMode) -> anyhow::Result<TickerConfig> {
    let script = (mode == ExecMode::Script).then(|| Path::new(target.as_str()));
    let env_overlay = env_file::load(cli.env.as_deref(), script)?;
    let cli_overlay = overlay_from(cli)?;

    Ok(TickerConfig::from_overlays(
        target,
        mode,
        env_overlay,
        cli_overlay,
    )?)
}

fn overlay_from(cli: &Cli) -> anyhow::Result<ConfigOverlay> {
    let mut log_level = cli
        .log_level
        .as_deref()
        .map(str::parse::<LogLevel>)
        .transpose()?;
    if cli.quiet {
        log_level = Some(LogLevel::Quiet);
    }

    Ok(ConfigOverlay {
        interval: cli.interval,
        max_memory: cli.max_memory.clone(),
        max_runtime: cli.max_runtime,
        max_cycles: cli.max_cycles,
        log_file: cli.log_file.clone(),
        log_level,
    })
}
