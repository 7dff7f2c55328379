//! Latency budgets for chatlens operations.
//!
//! Each budget names an operation and three thresholds. [`Timer`] measures
//! one run and logs at `debug` when within budget and at `warn` once the
//! warning threshold is crossed. The criterion benches use the same
//! constants so regressions show up in both places.
//!
//! | Budget | Target | Warning | Critical |
//! |--------|--------|---------|----------|
//! | `parse_export` | 100ms | 500ms | 5s |
//! | `analyze_chat` | 100ms | 1s | 10s |
//! | `analyze_screenshot` | 10ms | 50ms | 500ms |
//! | `storage_open` | 10ms | 50ms | 500ms |
//! | `storage_lookup` | 1ms | 5ms | 50ms |
//! | `storage_save` | 5ms | 20ms | 200ms |

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Latency budget for an operation.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    pub name: &'static str,
    /// Expected p99.
    pub target: Duration,
    pub warning: Duration,
    /// Past this the run is treated as a failure in benches.
    pub critical: Duration,
}

impl Budget {
    pub const fn new(
        name: &'static str,
        target_ms: u64,
        warning_ms: u64,
        critical_ms: u64,
    ) -> Self {
        Self {
            name,
            target: Duration::from_millis(target_ms),
            warning: Duration::from_millis(warning_ms),
            critical: Duration::from_millis(critical_ms),
        }
    }

    /// 1ms target.
    pub const fn instant(name: &'static str) -> Self {
        Self::new(name, 1, 5, 50)
    }

    /// 10ms target.
    pub const fn fast(name: &'static str) -> Self {
        Self::new(name, 10, 50, 500)
    }

    /// 100ms target.
    pub const fn normal(name: &'static str) -> Self {
        Self::new(name, 100, 500, 5000)
    }

    #[must_use]
    pub fn status(&self, duration: Duration) -> BudgetStatus {
        if duration <= self.target {
            BudgetStatus::OnTarget
        } else if duration <= self.warning {
            BudgetStatus::Acceptable
        } else if duration <= self.critical {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Exceeded
        }
    }
}

/// Where a measured duration falls relative to its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OnTarget,
    Acceptable,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::OnTarget | Self::Acceptable)
    }
}

/// Reading and validating one export file.
pub const PARSE_EXPORT: Budget = Budget::normal("parse_export");

/// Full engine run over a typical export (tens of thousands of messages).
pub const ANALYZE_CHAT: Budget = Budget::new("analyze_chat", 100, 1000, 10_000);

/// Screenshot text analysis, excluding OCR.
pub const ANALYZE_SCREENSHOT: Budget = Budget::fast("analyze_screenshot");

pub const STORAGE_OPEN: Budget = Budget::fast("storage_open");

pub const STORAGE_LOOKUP: Budget = Budget::instant("storage_lookup");

pub const STORAGE_SAVE: Budget = Budget::new("storage_save", 5, 20, 200);

/// Measures one operation against its budget.
#[derive(Debug)]
pub struct Timer {
    budget: Budget,
    start: Instant,
}

impl Timer {
    #[must_use]
    pub fn start(budget: Budget) -> Self {
        Self {
            budget,
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop and log; returns the measured duration.
    pub fn stop(self) -> Duration {
        let duration = self.elapsed();

        match self.budget.status(duration) {
            BudgetStatus::OnTarget | BudgetStatus::Acceptable => {
                debug!(
                    operation = self.budget.name,
                    duration_ms = duration.as_millis(),
                    target_ms = self.budget.target.as_millis(),
                    "Operation completed"
                );
            }
            BudgetStatus::Warning => {
                warn!(
                    operation = self.budget.name,
                    duration_ms = duration.as_millis(),
                    warning_ms = self.budget.warning.as_millis(),
                    "Operation exceeded warning threshold"
                );
            }
            BudgetStatus::Exceeded => {
                warn!(
                    operation = self.budget.name,
                    duration_ms = duration.as_millis(),
                    critical_ms = self.budget.critical.as_millis(),
                    "Operation exceeded critical threshold"
                );
            }
        }

        duration
    }
}

/// Time an expression against a budget.
#[macro_export]
macro_rules! timed {
    ($budget:expr, $expr:expr) => {{
        let timer = $crate::perf::Timer::start($budget);
        let result = $expr;
        timer.stop();
        result
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_status() {
        let budget = Budget::new("test", 10, 50, 100);

        assert_eq!(budget.status(Duration::from_millis(5)), BudgetStatus::OnTarget);
        assert_eq!(budget.status(Duration::from_millis(30)), BudgetStatus::Acceptable);
        assert_eq!(budget.status(Duration::from_millis(75)), BudgetStatus::Warning);
        assert_eq!(budget.status(Duration::from_millis(150)), BudgetStatus::Exceeded);
    }

    #[test]
    fn test_budget_status_is_ok() {
        assert!(BudgetStatus::OnTarget.is_ok());
        assert!(BudgetStatus::Acceptable.is_ok());
        assert!(!BudgetStatus::Warning.is_ok());
        assert!(!BudgetStatus::Exceeded.is_ok());
    }

    #[test]
    fn test_timer_measures() {
        let timer = Timer::start(Budget::normal("test"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.stop() >= Duration::from_millis(5));
    }

    #[test]
    fn test_timed_macro_returns_value() {
        let value = crate::timed!(Budget::instant("add"), 2 + 2);
        assert_eq!(value, 4);
    }

    #[test]
    fn test_predefined_budgets_are_ordered() {
        for budget in [
            PARSE_EXPORT,
            ANALYZE_CHAT,
            ANALYZE_SCREENSHOT,
            STORAGE_OPEN,
            STORAGE_LOOKUP,
            STORAGE_SAVE,
        ] {
            assert!(budget.target < budget.warning, "{}", budget.name);
            assert!(budget.warning < budget.critical, "{}", budget.name);
        }
    }
}
