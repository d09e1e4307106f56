//! Stop-condition evaluation between cycles.
//!
//! Pure decision logic: loop state plus live telemetry in, at most one stop
//! reason out. Runs only between cycles — a child that is still executing is
//! never interrupted by a ceiling.

use crate::config::types::TickerConfig;
use std::time::Duration;

/// Why the loop is stopping.
///
/// When several conditions hold at once, only the first in the fixed order
/// Signal > Memory > Runtime > Cycles is reported. The order is a
/// reproducibility convention, not a correctness requirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Stop was requested, by an OS signal or an explicit `stop()`.
    Signal,
    /// Supervisor resident memory reached the configured ceiling.
    Memory,
    /// Wall-clock runtime reached the configured ceiling.
    Runtime,
    /// Cycle count reached the configured ceiling.
    Cycles,
}

impl StopReason {
    /// Line logged at INFO when the loop stops for this reason.
    pub fn message(&self) -> &'static str {
        match self {
            StopReason::Signal => "Received stop signal",
            StopReason::Memory => "Memory limit exceeded, stopping",
            StopReason::Runtime => "Runtime limit exceeded, stopping",
            StopReason::Cycles => "Cycle limit reached, stopping",
        }
    }
}

/// Snapshot of loop state and telemetry taken at a check point.
#[derive(Clone, Copy, Debug)]
pub struct LimitProbe {
    pub stop_requested: bool,
    pub cycles: u64,
    pub elapsed: Duration,
    /// Current resident memory of the supervisor; `None` when the platform
    /// exposes no reading, in which case the memory ceiling never triggers.
    pub resident_memory: Option<u64>,
}

/// Evaluate the stop conditions. An absent ceiling never triggers.
pub fn evaluate(probe: &LimitProbe, config: &TickerConfig) -> Option<StopReason> {
    if probe.stop_requested {
        return Some(StopReason::Signal);
    }

    if let (Some(ceiling), Some(resident)) = (config.max_memory, probe.resident_memory) {
        if resident >= ceiling {
            return Some(StopReason::Memory);
        }
    }

    if let Some(ceiling) = config.max_runtime {
        if probe.elapsed >= Duration::from_secs(ceiling) {
            return Some(StopReason::Runtime);
        }
    }

    if let Some(ceiling) = config.max_cycles {
        if probe.cycles >= ceiling {
            return Some(StopReason::Cycles);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ExecMode;
    use crate::logging::LogLevel;

    fn config() -> TickerConfig {
        TickerConfig {
            target: "job.php".into(),
            mode: ExecMode::Script,
            interval: 1,
            max_memory: None,
            max_runtime: None,
            max_cycles: None,
            log_file: None,
            log_level: LogLevel::Quiet,
        }
    }

    fn probe() -> LimitProbe {
        LimitProbe {
            stop_requested: false,
            cycles: 0,
            elapsed: Duration::ZERO,
            resident_memory: None,
        }
    }

    #[test]
    fn unbounded_config_never_stops() {
        let probe = LimitProbe {
            cycles: 1_000_000,
            elapsed: Duration::from_secs(86_400),
            resident_memory: Some(u64::MAX),
            ..probe()
        };

        assert_eq!(evaluate(&probe, &config()), None);
    }

    #[test]
    fn signal_wins_over_every_other_reason() {
        let config = TickerConfig {
            max_memory: Some(1),
            max_runtime: Some(1),
            max_cycles: Some(1),
            ..config()
        };
        let probe = LimitProbe {
            stop_requested: true,
            cycles: 10,
            elapsed: Duration::from_secs(10),
            resident_memory: Some(10),
        };

        assert_eq!(evaluate(&probe, &config), Some(StopReason::Signal));
    }

    #[test]
    fn memory_wins_over_runtime_and_cycles() {
        let config = TickerConfig {
            max_memory: Some(1),
            max_runtime: Some(1),
            max_cycles: Some(1),
            ..config()
        };
        let probe = LimitProbe {
            cycles: 10,
            elapsed: Duration::from_secs(10),
            resident_memory: Some(10),
            ..probe()
        };

        assert_eq!(evaluate(&probe, &config), Some(StopReason::Memory));
    }

    #[test]
    fn runtime_wins_over_cycles() {
        let config = TickerConfig {
            max_runtime: Some(1),
            max_cycles: Some(1),
            ..config()
        };
        let probe = LimitProbe {
            cycles: 10,
            elapsed: Duration::from_secs(10),
            ..probe()
        };

        assert_eq!(evaluate(&probe, &config), Some(StopReason::Runtime));
    }

    #[test]
    fn ceilings_are_inclusive() {
        let config = TickerConfig {
            max_cycles: Some(3),
            ..config()
        };

        let under = LimitProbe {
            cycles: 2,
            ..probe()
        };
        let at = LimitProbe {
            cycles: 3,
            ..probe()
        };

        assert_eq!(evaluate(&under, &config), None);
        assert_eq!(evaluate(&at, &config), Some(StopReason::Cycles));
    }

    #[test]
    fn memory_ceiling_needs_a_reading() {
        let config = TickerConfig {
            max_memory: Some(1),
            ..config()
        };

        // No telemetry on this platform: the ceiling must not trigger.
        assert_eq!(evaluate(&probe(), &config), None);
    }

    #[test]
    fn runtime_boundary_is_inclusive() {
        let config = TickerConfig {
            max_runtime: Some(2),
            ..config()
        };

        let under = LimitProbe {
            elapsed: Duration::from_millis(1_999),
            ..probe()
        };
        let at = LimitProbe {
            elapsed: Duration::from_secs(2),
            ..probe()
        };

        assert_eq!(evaluate(&under, &config), None);
        assert_eq!(evaluate(&at, &config), Some(StopReason::Runtime));
    }
}
