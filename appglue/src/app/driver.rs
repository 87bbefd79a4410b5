//! Host side of the lifecycle command channel.
//!
//! The [`LifecycleDriver`] is what a host process (or a test) holds to send
//! commands into a running activity. It owns a clone of the channel's write
//! side, so it works from any thread without touching the registry.

use std::sync::Arc;

use tracing::debug;

use crate::channel::EventChannel;
use crate::dispatch::AppCommand;
use crate::telemetry::DispatchMetrics;

/// How [`LifecycleDriver::finish`] requests clean shutdown.
///
/// The reference platform declares `finish` without defining it, so the
/// behaviour is a deliberate choice here rather than a guess: both variants
/// go through the command channel, never mutating activity state directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FinishStrategy {
    /// Enqueue Stop, then Destroy — the conventional teardown sequence.
    #[default]
    StopThenDestroy,

    /// Enqueue only Destroy, for hosts that drive Stop themselves.
    DestroyOnly,
}

/// Write handle for a single activity's command channel.
///
/// Cloneable and thread-safe; the host lifecycle thread typically owns one
/// clone and a Ctrl-C handler another.
#[derive(Clone)]
pub struct LifecycleDriver {
    channel: Arc<EventChannel>,
    strategy: FinishStrategy,
    metrics: Option<Arc<DispatchMetrics>>,
}

impl LifecycleDriver {
    /// Creates a driver over the given channel.
    pub fn new(channel: Arc<EventChannel>) -> Self {
        Self {
            channel,
            strategy: FinishStrategy::default(),
            metrics: None,
        }
    }

    /// Creates a driver that also records write counts.
    pub fn with_metrics(channel: Arc<EventChannel>, metrics: Arc<DispatchMetrics>) -> Self {
        Self {
            channel,
            strategy: FinishStrategy::default(),
            metrics: Some(metrics),
        }
    }

    /// Sets the finish strategy.
    pub fn with_strategy(mut self, strategy: FinishStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enqueues one lifecycle command.
    pub fn send(&self, cmd: AppCommand) {
        debug!(%cmd, "Driver sending command");
        self.channel.write_event(cmd.code());
        if let Some(metrics) = &self.metrics {
            metrics.record_written();
        }
    }

    /// Requests clean shutdown of the activity.
    pub fn finish(&self) {
        debug!(strategy = ?self.strategy, "Driver requesting finish");
        match self.strategy {
            FinishStrategy::StopThenDestroy => {
                self.send(AppCommand::Stop);
                self.send(AppCommand::Destroy);
            }
            FinishStrategy::DestroyOnly => {
                self.send(AppCommand::Destroy);
            }
        }
    }
}

impl std::fmt::Debug for LifecycleDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDriver")
            .field("strategy", &self.strategy)
            .field("pending", &self.channel.pending())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRegistry;

    #[test]
    fn test_send_writes_command_code() {
        let registry = ChannelRegistry::new();
        let (_, channel) = registry.create();

        let driver = LifecycleDriver::new(Arc::clone(&channel));
        driver.send(AppCommand::Resume);

        assert_eq!(channel.read_event(), Some(AppCommand::Resume.code()));
    }

    #[test]
    fn test_finish_default_enqueues_stop_then_destroy() {
        let registry = ChannelRegistry::new();
        let (_, channel) = registry.create();

        LifecycleDriver::new(Arc::clone(&channel)).finish();

        assert_eq!(channel.read_event(), Some(AppCommand::Stop.code()));
        assert_eq!(channel.read_event(), Some(AppCommand::Destroy.code()));
        assert!(!channel.has_event());
    }

    #[test]
    fn test_finish_destroy_only() {
        let registry = ChannelRegistry::new();
        let (_, channel) = registry.create();

        LifecycleDriver::new(Arc::clone(&channel))
            .with_strategy(FinishStrategy::DestroyOnly)
            .finish();

        assert_eq!(channel.read_event(), Some(AppCommand::Destroy.code()));
        assert!(!channel.has_event());
    }

    #[test]
    fn test_metrics_count_writes() {
        let registry = ChannelRegistry::new();
        let (_, channel) = registry.create();
        let metrics = Arc::new(DispatchMetrics::new());

        let driver = LifecycleDriver::with_metrics(channel, Arc::clone(&metrics));
        driver.send(AppCommand::Start);
        driver.finish();

        assert_eq!(metrics.snapshot().commands_written, 3);
    }
}
