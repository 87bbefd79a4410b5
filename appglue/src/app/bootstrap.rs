//! Activity bootstrap implementation.
//!
//! This module contains [`Activity`], the running half of the glue, and
//! [`launch`], the single-shot entry point a host calls to start an
//! application. Any failure during bootstrap is fatal to startup; there is
//! no partial-bootstrap recovery.

use std::sync::Arc;

use tracing::{debug, info};

use super::config::AppConfig;
use super::driver::LifecycleDriver;
use super::error::AppError;
use crate::channel::{ChannelRegistry, EventChannel};
use crate::dispatch::{self, CommandHandler};
use crate::looper::{Looper, EVENT_INPUT, SOURCE_MAIN};
use crate::state::AppState;
use crate::telemetry::{DispatchMetrics, DispatchSnapshot};

/// A bootstrapped activity, ready to run its user main.
///
/// Owns the lifecycle state, the looper, and a reference to the channel
/// registry. The user main receives `&mut Activity` and drives its own
/// render/update loop, periodically calling
/// [`process_pending_commands`](Self::process_pending_commands) to service
/// the command channel.
pub struct Activity {
    /// Lifecycle state record.
    state: AppState,

    /// Readiness multiplexer for the dispatch thread.
    looper: Looper,

    /// Registry resolving channel handles for the looper scan.
    registry: Arc<ChannelRegistry>,

    /// Write side of the command channel, retained for `driver()`.
    channel: Arc<EventChannel>,

    /// Dispatch counters shared with drivers.
    metrics: Arc<DispatchMetrics>,
}

impl Activity {
    /// Constructs the activity: state record, command channel, looper
    /// registration.
    ///
    /// Call this before spawning the host lifecycle thread so it can take a
    /// [`driver`](Self::driver), then hand control to [`run`](Self::run).
    /// The looper binds to the calling thread, so [`run`](Self::run) must
    /// happen on the same thread as the bootstrap.
    ///
    /// # Errors
    ///
    /// Fails if the command channel cannot be registered with the looper;
    /// bootstrap failures are fatal and callers should abort startup.
    pub fn bootstrap(config: AppConfig, registry: Arc<ChannelRegistry>) -> Result<Self, AppError> {
        info!(
            install_dir = %config.install_dir.display(),
            writable_dir = %config.writable_dir.display(),
            args = config.args.len(),
            "Bootstrapping activity"
        );

        let (handle, channel) = registry.create();
        let state = AppState::new(handle, config);

        let mut looper = Looper::prepare();
        looper.add_source(handle, SOURCE_MAIN, EVENT_INPUT, dispatch::process_command)?;

        debug!(handle = handle.raw(), "Command channel wired into looper");

        Ok(Self {
            state,
            looper,
            registry,
            channel,
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }

    /// Returns a write handle for the host lifecycle thread.
    pub fn driver(&self) -> LifecycleDriver {
        LifecycleDriver::with_metrics(Arc::clone(&self.channel), Arc::clone(&self.metrics))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Mutable lifecycle state, for user mains that populate saved state
    /// outside a command callback.
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// True once the host has requested destruction.
    ///
    /// The user main is responsible for observing this and returning;
    /// termination is cooperative.
    pub fn destroy_requested(&self) -> bool {
        self.state.destroy_requested()
    }

    /// Point-in-time copy of the dispatch counters.
    pub fn metrics_snapshot(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Drains and dispatches every pending command, in FIFO order.
    ///
    /// Each command runs its full pre-transition/callback/post-transition
    /// triple before the next is dequeued. Returns the number of commands
    /// dispatched. Non-blocking: returns 0 when nothing is pending.
    pub fn process_pending_commands(&mut self, handler: &mut dyn CommandHandler) -> usize {
        let mut processed = 0;

        loop {
            let ready = self.looper.poll_ready(&self.registry);
            if ready.is_empty() {
                break;
            }

            for ident in ready {
                // Copy the fn pointer out so the looper borrow ends before
                // the state borrow begins.
                let Some(process) = self.looper.source(ident).map(|s| s.process) else {
                    continue;
                };

                match process(&mut self.state, &self.registry, handler) {
                    Some(cmd) => {
                        self.metrics.record_dispatched(cmd);
                        processed += 1;
                    }
                    None => {
                        self.metrics.record_anomaly();
                    }
                }
            }
        }

        processed
    }

    /// Runs the user main, then tears down.
    ///
    /// Marks the dispatch loop as running, blocks in `main` until it
    /// returns, then frees any remaining saved state, sets the terminal
    /// `destroyed` flag, and unregisters the command channel. Returns the
    /// final state for inspection.
    pub fn run(mut self, main: impl FnOnce(&mut Activity)) -> AppState {
        self.state.set_running(true);
        info!("Entering user main");

        main(&mut self);

        info!("User main returned; destroying activity");
        let Activity {
            mut state, registry, ..
        } = self;

        state.clear_saved_state();
        state.mark_destroyed();
        registry.remove(state.command_handle());

        state
    }
}

impl std::fmt::Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activity")
            .field("state", &self.state)
            .field("looper", &self.looper)
            .finish()
    }
}

/// Bootstraps an activity and runs it to completion.
///
/// The single-shot entry point: construct, wire, run the user main, tear
/// down. Returns the final [`AppState`] so hosts and tests can inspect the
/// terminal flags.
///
/// # Errors
///
/// Returns an error only for bootstrap failures; these are fatal and the
/// caller should abort startup.
pub fn launch(
    config: AppConfig,
    registry: Arc<ChannelRegistry>,
    main: impl FnOnce(&mut Activity),
) -> Result<AppState, AppError> {
    let activity = Activity::bootstrap(config, registry)?;
    Ok(activity.run(main))
}

// =============================================================================
// Tests
// =============================================================================
