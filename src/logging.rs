//! Leveled log sink shared by the supervisor loop and the process runner.
//!
//! The sink owns physical formatting (`[YYYY-MM-DD HH:MM:SS] [level]`) and
//! the destination: append to a file when one is configured, otherwise an
//! injected stream. Only the outermost composition point (the CLI) hands it
//! process stdout; the core never touches global streams itself.

use crate::config::types::CadenceError;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

/// Log severity. `Quiet` is a filter-only level: configuring it silences
/// the sink entirely, and no entry is ever emitted at it.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Quiet,
}

impl LogLevel {
    pub const VALID: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Quiet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Quiet => "quiet",
        }
    }

    fn priority(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
            LogLevel::Quiet => 4,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::VALID
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = LogLevel::VALID.iter().map(|l| l.as_str()).collect();
                CadenceError::Config(format!(
                    "Log level must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

enum Sink {
    /// Opened in append mode per write; survives external log rotation.
    File(PathBuf),
    Stream(Mutex<Box<dyn Write + Send>>),
}

/// Minimum-level filtering log sink.
pub struct Logger {
    level: LogLevel,
    sink: Sink,
}

impl Logger {
    /// Sink writing to `log_file` when given, else to process stdout.
    pub fn new(level: LogLevel, log_file: Option<PathBuf>) -> Self {
        match log_file {
            Some(path) => Logger {
                level,
                sink: Sink::File(path),
            },
            None => Logger::with_stream(level, Box::new(std::io::stdout())),
        }
    }

    /// Sink writing to an arbitrary stream. Tests inject shared buffers here.
    pub fn with_stream(level: LogLevel, stream: Box<dyn Write + Send>) -> Self {
        Logger {
            level,
            sink: Sink::Stream(Mutex::new(stream)),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Emit one entry. Entries below the configured level are dropped; write
    /// failures are swallowed — the supervisor must not die because its log
    /// destination went away.
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.should_log(level) {
            return;
        }

        let line = self.format(level, message);

        match &self.sink {
            Sink::File(path) => {
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "{line}");
                }
            }
            Sink::Stream(stream) => {
                if let Ok(mut stream) = stream.lock() {
                    let _ = writeln!(stream, "{line}");
                    let _ = stream.flush();
                }
            }
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        if self.level == LogLevel::Quiet {
            return false;
        }
        level.priority() >= self.level.priority()
    }

    fn format(&self, level: LogLevel, message: &str) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        format!("[{timestamp}] [{level}] {message}")
    }
}
