//! Dispatch telemetry for observability.
//!
//! Lock-free atomic counters recording what the dispatch loop has done,
//! with a point-in-time snapshot for display.
//!
//! ```text
//! Driver / Dispatcher ─────► DispatchMetrics ─────► DispatchSnapshot ─────► Views
//!                            (atomic counters)      (point-in-time copy)    (CLI, etc.)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::dispatch::AppCommand;

/// Atomic counters shared between the driver and the dispatch loop.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Commands written by the lifecycle driver.
    commands_written: AtomicU64,

    /// Commands fully dispatched (pre + callback + post).
    commands_dispatched: AtomicU64,

    /// Dispatched commands that moved the lifecycle stage.
    stage_changes: AtomicU64,

    /// Dispatched InitWindow/TermWindow commands.
    window_events: AtomicU64,

    /// Dispatched SaveState commands.
    saves: AtomicU64,

    /// Wakeups with nothing to dispatch, plus unknown command bytes.
    anomalies: AtomicU64,
}

impl DispatchMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a command written by the driver.
    pub fn record_written(&self) {
        self.commands_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fully dispatched command.
    pub fn record_dispatched(&self, cmd: AppCommand) {
        self.commands_dispatched.fetch_add(1, Ordering::Relaxed);
        if cmd.is_stage_command() {
            self.stage_changes.fetch_add(1, Ordering::Relaxed);
        }
        match cmd {
            AppCommand::InitWindow | AppCommand::TermWindow => {
                self.window_events.fetch_add(1, Ordering::Relaxed);
            }
            AppCommand::SaveState => {
                self.saves.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Records a dispatch attempt that yielded nothing.
    pub fn record_anomaly(&self) {
        self.anomalies.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            commands_written: self.commands_written.load(Ordering::Relaxed),
            commands_dispatched: self.commands_dispatched.load(Ordering::Relaxed),
            stage_changes: self.stage_changes.load(Ordering::Relaxed),
            window_events: self.window_events.load(Ordering::Relaxed),
            saves: self.saves.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the dispatch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    /// Commands written by the lifecycle driver.
    pub commands_written: u64,
    /// Commands fully dispatched.
    pub commands_dispatched: u64,
    /// Dispatched commands that moved the lifecycle stage.
    pub stage_changes: u64,
    /// Dispatched window commands.
    pub window_events: u64,
    /// Dispatched SaveState commands.
    pub saves: u64,
    /// Empty wakeups and unknown command bytes.
    pub anomalies: u64,
}

impl DispatchSnapshot {
    /// Commands written but not yet dispatched at snapshot time.
    pub fn in_flight(&self) -> u64 {
        self.commands_written.saturating_sub(self.commands_dispatched)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_metrics_are_zero() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.snapshot(), DispatchSnapshot::default());
    }

    #[test]
    fn test_dispatched_commands_are_categorised() {
        let metrics = DispatchMetrics::new();

        metrics.record_dispatched(AppCommand::Start);
        metrics.record_dispatched(AppCommand::Resume);
        metrics.record_dispatched(AppCommand::InitWindow);
        metrics.record_dispatched(AppCommand::SaveState);
        metrics.record_dispatched(AppCommand::Destroy);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commands_dispatched, 5);
        assert_eq!(snapshot.stage_changes, 2);
        assert_eq!(snapshot.window_events, 1);
        assert_eq!(snapshot.saves, 1);
        assert_eq!(snapshot.anomalies, 0);
    }

    #[test]
    fn test_in_flight_accounting() {
        let metrics = DispatchMetrics::new();

        metrics.record_written();
        metrics.record_written();
        metrics.record_dispatched(AppCommand::Start);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commands_written, 2);
        assert_eq!(snapshot.in_flight(), 1);
    }

    #[test]
    fn test_anomalies_counted() {
        let metrics = DispatchMetrics::new();
        metrics.record_anomaly();
        metrics.record_anomaly();
        assert_eq!(metrics.snapshot().anomalies, 2);
    }
}
