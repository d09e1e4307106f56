//! The supervision loop.
//!
//! Single thread of control: execute one cycle, evaluate the stop
//! conditions, sleep the interval. The only state shared with other
//! contexts is the stop flag, and the signal path only ever sets it to
//! true. A running child is never interrupted; stop requests and ceilings
//! take effect at the next check point.

use crate::config::types::TickerConfig;
use crate::core::limits::{self, LimitProbe, StopReason};
use crate::exec::runner::ProcessRunner;
use crate::logging::Logger;
use crate::{signal, telemetry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub struct Ticker {
    config: TickerConfig,
    logger: Arc<Logger>,
    runner: ProcessRunner,
    cycles: u64,
    started: Instant,
    stop: Arc<AtomicBool>,
}

impl Ticker {
    pub fn new(config: TickerConfig, logger: Arc<Logger>) -> Self {
        let runner = ProcessRunner::new(&config, Arc::clone(&logger));

        Ticker {
            config,
            logger,
            runner,
            cycles: 0,
            started: Instant::now(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run cycles until a stop condition holds.
    ///
    /// Always returns 0: reaching a ceiling or receiving a signal is the
    /// normal way for a supervisor to finish, not an error.
    pub fn run(&mut self) -> i32 {
        signal::install_handlers();

        self.logger
            .info(&format!("Starting cadence for: {}", self.config.target));
        self.logger
            .info(&format!("Interval: {}s", self.config.interval));

        let reason = loop {
            if self.stop_requested() {
                break StopReason::Signal;
            }

            self.tick();

            if let Some(reason) = self.check_stop() {
                break reason;
            }

            self.sleep_interval();
        };

        self.log_stop(reason);
        self.logger
            .info(&format!("cadence stopped after {} cycles", self.cycles));

        0
    }

    fn log_stop(&self, reason: StopReason) {
        if reason == StopReason::Signal {
            if let Some(name) = signal::received_signal_name() {
                self.logger.info(&format!("Received {name}"));
            }
        }
        self.logger.info(reason.message());
    }

    /// Request a stop. Idempotent; honored at the next check point, within
    /// one second during a sleeping interval.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn tick(&mut self) {
        self.cycles += 1;
        self.logger.info(&format!("Cycle #{}", self.cycles));

        let result = self.runner.run_once();

        if let Some(usage) = telemetry::usage_line() {
            self.logger.info(&usage);
        }

        if result.exit_code != 0 {
            self.logger
                .warning(&format!("Script exited with code: {}", result.exit_code));
        }
    }

    fn check_stop(&self) -> Option<StopReason> {
        let probe = LimitProbe {
            stop_requested: self.stop_requested(),
            cycles: self.cycles,
            elapsed: self.started.elapsed(),
            resident_memory: telemetry::resident_memory_bytes(),
        };

        limits::evaluate(&probe, &self.config)
    }

    /// Sleep the configured interval in one-second slices, re-checking the
    /// stop flag between slices.
    fn sleep_interval(&self) {
        for _ in 0..self.config.interval {
            if self.stop_requested() {
                break;
            }
            thread::sleep(Duration::from_secs(1));
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst) || signal::shutdown_requested()
    }
}
