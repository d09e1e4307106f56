//! Env-file configuration overlay.
//!
//! An explicit `--env` path wins; otherwise a `.env` sitting next to the
//! target script is picked up automatically. A missing file is not an
//! error — it simply contributes nothing. Values of recognized `CAD_*`
//! keys override the built-in defaults and are themselves overridden by
//! CLI flags.

use crate::config::types::{CadenceError, ConfigOverlay, Result};
use std::path::{Path, PathBuf};

/// Load the overlay from an explicit path, or from a `.env` discovered next
/// to the target script.
pub fn load(explicit: Option<&Path>, script: Option<&Path>) -> Result<ConfigOverlay> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => script.and_then(find_env_file),
    };

    match path {
        Some(path) if path.exists() => parse_file(&path),
        _ => Ok(ConfigOverlay::default()),
    }
}

/// `.env` in the directory of the (canonicalized) script, if present.
pub fn find_env_file(script: &Path) -> Option<PathBuf> {
    let script = script
        .canonicalize()
        .unwrap_or_else(|_| script.to_path_buf());
    let candidate = script.parent()?.join(".env");

    candidate.exists().then_some(candidate)
}

fn parse_file(path: &Path) -> Result<ConfigOverlay> {
    let contents = std::fs::read_to_string(path)?;
    let mut overlay = ConfigOverlay::default();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = unquote(value.trim());
        // An empty value means "leave this field to the other sources".
        if value.is_empty() {
            continue;
        }

        apply(&mut overlay, key, value)?;
    }

    Ok(overlay)
}

fn apply(overlay: &mut ConfigOverlay, key: &str, value: &str) -> Result<()> {
    match key {
        "CAD_INTERVAL" => overlay.interval = Some(parse_int(key, value)?),
        "CAD_MAX_MEMORY" => overlay.max_memory = Some(value.to_string()),
        "CAD_MAX_RUNTIME" => overlay.max_runtime = Some(parse_int(key, value)?),
        "CAD_MAX_CYCLES" => overlay.max_cycles = Some(parse_int(key, value)?),
        "CAD_LOG_FILE" => overlay.log_file = Some(PathBuf::from(value)),
        "CAD_LOG_LEVEL" => overlay.log_level = Some(value.parse()?),
        // Unrecognized keys belong to the application being supervised.
        _ => {}
    }

    Ok(())
}

fn parse_int(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| CadenceError::Config(format!("{key}: expected an integer, got '{value}'")))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
