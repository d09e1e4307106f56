/// Core types for the cadence supervisor
use crate::logging::LogLevel;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// How the configured target is launched.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Target is a script path handed to the PHP interpreter.
    Script,
    /// Target is a literal shell command line.
    Command,
}

/// Supervision configuration, built once before the loop starts.
///
/// The record is pre-merged and pre-validated; the core never parses or
/// validates it. An absent ceiling means unbounded.
#[derive(Clone, Debug, Serialize)]
pub struct TickerConfig {
    /// Script path or shell command line, per `mode`.
    pub target: String,
    pub mode: ExecMode,
    /// Sleep interval between cycles, in seconds.
    pub interval: u64,
    /// Resident-memory ceiling for the supervisor itself, in bytes.
    pub max_memory: Option<u64>,
    /// Wall-clock runtime ceiling, in seconds.
    pub max_runtime: Option<u64>,
    /// Cycle-count ceiling.
    pub max_cycles: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
}

/// Partial configuration collected from one source (env file or CLI flags).
///
/// `None` means the source did not mention the field. Memory is kept as the
/// raw size string until the merge so a bad value surfaces as one
/// configuration error no matter which source it came from.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverlay {
    pub interval: Option<u64>,
    pub max_memory: Option<String>,
    pub max_runtime: Option<u64>,
    pub max_cycles: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
}

impl TickerConfig {
    pub const DEFAULT_INTERVAL: u64 = 60;
    pub const DEFAULT_MAX_MEMORY: &'static str = "128M";
    pub const DEFAULT_MAX_RUNTIME: u64 = 3600;

    /// Merge defaults, env-file values, and CLI flags into the final record.
    /// Later sources win field by field; a ceiling of 0 disables the ceiling.
    pub fn from_overlays(
        target: String,
        mode: ExecMode,
        env: ConfigOverlay,
        cli: ConfigOverlay,
    ) -> Result<Self> {
        let memory_size = cli
            .max_memory
            .or(env.max_memory)
            .unwrap_or_else(|| Self::DEFAULT_MAX_MEMORY.to_string());

        Ok(TickerConfig {
            target,
            mode,
            interval: cli
                .interval
                .or(env.interval)
                .unwrap_or(Self::DEFAULT_INTERVAL),
            max_memory: bounded(parse_memory_size(&memory_size)?),
            max_runtime: bounded(
                cli.max_runtime
                    .or(env.max_runtime)
                    .unwrap_or(Self::DEFAULT_MAX_RUNTIME),
            ),
            max_cycles: cli.max_cycles.or(env.max_cycles).and_then(bounded),
            log_file: cli.log_file.or(env.log_file),
            log_level: cli.log_level.or(env.log_level).unwrap_or(LogLevel::Info),
        })
    }
}

/// A ceiling of 0 means "no ceiling".
fn bounded(value: u64) -> Option<u64> {
    (value != 0).then_some(value)
}

/// Parse a memory size string like `128M`, `1G`, `64K`, or a plain byte
/// count. Suffixes are case-insensitive.
pub fn parse_memory_size(input: &str) -> Result<u64> {
    let input = input.trim();
    let upper = input.to_ascii_uppercase();

    let (digits, multiplier) = match upper.as_bytes().last() {
        Some(b'K') => (&upper[..upper.len() - 1], 1024u64),
        Some(b'M') => (&upper[..upper.len() - 1], 1024 * 1024),
        Some(b'G') => (&upper[..upper.len() - 1], 1024 * 1024 * 1024),
        _ => (upper.as_str(), 1),
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| CadenceError::Config(format!("Invalid memory size: {input}")))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| CadenceError::Config(format!("Memory size out of range: {input}")))
}

#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),
}

pub type Result<T> = std::result::Result<T, CadenceError>;
