//! AppGlue - Native activity lifecycle glue
//!
//! This library provides the event-loop plumbing that connects a host
//! lifecycle driver to a hosted application: a FIFO command channel, a
//! looper for readiness routing, a lifecycle state machine, and a
//! single-shot bootstrap that runs the application's main routine.
//!
//! # Architecture
//!
//! ```text
//! Lifecycle Driver ──write──► EventChannel ──ready──► Looper ──► Dispatcher
//!   (host thread)                                                    │
//!                                        pre-transition ─► callback ─► post-transition
//!                                                                    │
//!                                                               AppState
//! ```
//!
//! Termination is cooperative: the Destroy command sets
//! `destroy_requested`, the user main observes it and returns, and the
//! bootstrap tears down.

pub mod app;
pub mod channel;
pub mod dispatch;
pub mod log;
pub mod looper;
pub mod state;
pub mod telemetry;

pub use app::{launch, Activity, AppConfig, AppError, FinishStrategy, LifecycleDriver};
pub use channel::{ChannelHandle, ChannelRegistry, EventChannel};
pub use dispatch::{AppCommand, CommandHandler};
pub use looper::{Looper, LooperError, PollSource, SourceIdent, EVENT_INPUT, SOURCE_MAIN};
pub use state::{AppState, LifecycleStage, SavedState};
pub use telemetry::{DispatchMetrics, DispatchSnapshot};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
