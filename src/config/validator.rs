//! Startup validation of the merged configuration.

use crate::config::types::{ExecMode, TickerConfig};
use std::path::Path;

/// Validate the record before the loop starts. Returns every violation so
/// the user can fix them in one pass; an empty list means the record is
/// runnable.
pub fn validate(config: &TickerConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.target.is_empty() {
        errors.push("Script path or command is required".to_string());
    } else if config.mode == ExecMode::Script && !Path::new(&config.target).exists() {
        errors.push(format!("Script not found: {}", config.target));
    }

    if config.interval < 1 {
        errors.push("Interval must be at least 1 second".to_string());
    }

    errors
}
