//! Activity bootstrap and lifecycle management.
//!
//! This module owns the single-shot construction and run of a hosted
//! activity: allocate the state record, create the command channel, wire it
//! into the looper, hand control to the user's main routine, and tear down
//! when it returns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         launch()                             │
//! │                                                              │
//! │  1. AppState from AppConfig (args, directory paths)          │
//! │  2. ChannelRegistry::create ──► command channel + handle     │
//! │  3. Looper::prepare + add_source(SOURCE_MAIN)                │
//! │  4. running = true, invoke user main(&mut Activity)          │
//! │  5. teardown: clear saved state, destroyed = true            │
//! └──────────────────────────────────────────────────────────────┘
//!
//! Host side: Activity::driver() ──► LifecycleDriver ──► write commands
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use appglue::app::{launch, AppConfig};
//! use appglue::channel::ChannelRegistry;
//!
//! let registry = Arc::new(ChannelRegistry::new());
//! let config = AppConfig::new("/opt/app", "/var/app", "/mnt/external");
//!
//! let final_state = launch(config, registry, |activity| {
//!     let mut handler = |_state: &mut _, cmd| tracing::info!(%cmd, "lifecycle");
//!     while !activity.destroy_requested() {
//!         activity.process_pending_commands(&mut handler);
//!         // ... render / update ...
//!     }
//! })?;
//! ```

mod bootstrap;
mod config;
mod driver;
mod error;

pub use bootstrap::{launch, Activity};
pub use config::AppConfig;
pub use driver::{FinishStrategy, LifecycleDriver};
pub use error::AppError;
