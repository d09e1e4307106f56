//! End-to-end supervision loop behavior with real child processes.

#![cfg(unix)]

use cadence::{ExecMode, LogLevel, Logger, Ticker, TickerConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn command_config(command: &str) -> TickerConfig {
    TickerConfig {
        target: command.to_string(),
        mode: ExecMode::Command,
        interval: 1,
        max_memory: None,
        max_runtime: None,
        max_cycles: None,
        log_file: None,
        log_level: LogLevel::Quiet,
    }
}

fn quiet_logger() -> Arc<Logger> {
    Arc::new(Logger::with_stream(
        LogLevel::Quiet,
        Box::new(std::io::sink()),
    ))
}

#[test]
fn completes_configured_cycles_and_returns_success() {
    let mut config = command_config("true");
    config.max_cycles = Some(3);
    let mut ticker = Ticker::new(config, quiet_logger());

    let before = Instant::now();
    let code = ticker.run();
    let elapsed = before.elapsed();

    assert_eq!(code, 0);
    assert_eq!(ticker.cycles(), 3);
    // Three executions separated by two interruptible sleeps.
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(6), "elapsed {elapsed:?}");
}

#[test]
fn continues_after_child_failure() {
    let mut config = command_config("exit 3");
    config.max_cycles = Some(2);
    let mut ticker = Ticker::new(config, quiet_logger());

    let code = ticker.run();

    assert_eq!(code, 0);
    assert_eq!(ticker.cycles(), 2);
}

#[test]
fn missing_target_still_counts_cycles() {
    // Whether the interpreter is absent (spawn failure) or the script is
    // (interpreter error exit), every scheduled cycle runs and the loop
    // finishes cleanly.
    let config = TickerConfig {
        target: "/nonexistent/cadence-job.php".to_string(),
        mode: ExecMode::Script,
        interval: 1,
        max_memory: None,
        max_runtime: None,
        max_cycles: Some(2),
        log_file: None,
        log_level: LogLevel::Quiet,
    };
    let mut ticker = Ticker::new(config, quiet_logger());

    let code = ticker.run();

    assert_eq!(code, 0);
    assert_eq!(ticker.cycles(), 2);
}

#[test]
fn runtime_ceiling_bounds_elapsed_time() {
    let mut config = command_config("true");
    config.max_runtime = Some(2);
    let mut ticker = Ticker::new(config, quiet_logger());

    let before = Instant::now();
    let code = ticker.run();
    let elapsed = before.elapsed();

    assert_eq!(code, 0);
    // Termination lands within [max_runtime, max_runtime + interval).
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
    assert!(ticker.elapsed() >= Duration::from_secs(2));
}

#[cfg(target_os = "linux")]
#[test]
fn memory_ceiling_stops_after_one_cycle() {
    let mut config = command_config("true");
    // Far below any real resident size, with a long interval: only the
    // memory check can end the loop this quickly.
    config.max_memory = Some(1);
    config.interval = 5;
    let mut ticker = Ticker::new(config, quiet_logger());

    let before = Instant::now();
    let code = ticker.run();

    assert_eq!(code, 0);
    assert_eq!(ticker.cycles(), 1);
    assert!(before.elapsed() < Duration::from_secs(2));
}

#[test]
fn sigterm_interrupts_a_sleeping_supervisor() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("signal.log");

    // Long interval: the supervisor will be inside the interruptible sleep
    // when the signal lands.
    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_cadence"))
        .args(["true", "-i", "60", "--log-file"])
        .arg(&log_path)
        .spawn()
        .expect("spawn supervisor binary");

    std::thread::sleep(Duration::from_millis(1500));
    unsafe {
        libc::kill(child.id() as i32, libc::SIGTERM);
    }

    let status = child.wait().expect("supervisor exit status");

    assert!(status.success());
    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("Received SIGTERM"));
    assert!(contents.contains("Received stop signal"));
    assert!(contents.contains("cadence stopped after 1 cycles"));
}

#[test]
fn log_file_records_the_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("cadence.log");

    let mut config = command_config("echo hi");
    config.max_cycles = Some(1);
    let logger = Arc::new(Logger::new(LogLevel::Debug, Some(log_path.clone())));
    let mut ticker = Ticker::new(config, logger);

    let code = ticker.run();

    assert_eq!(code, 0);
    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("Starting cadence for: echo hi"));
    assert!(contents.contains("Cycle #1"));
    assert!(contents.contains("Output: hi"));
    assert!(contents.contains("cadence stopped after 1 cycles"));
}
