//! Looper integration for the dispatch thread.
//!
//! The looper is the readiness-notification side of the event loop: poll
//! sources register a channel handle with it, and the dispatch thread scans
//! it for sources with pending events. The looper performs no dispatch of
//! its own — it only answers "which registered sources are readable" and
//! routes each answer to the source's processing function.
//!
//! # Architecture
//!
//! ```text
//! prepare() ──► Looper (bound to calling thread)
//!                 │
//!     add_source(handle, ident, EVENT_INPUT, process)
//!                 │
//!     poll_ready(&registry) ──► [SourceIdent, ...] ──► source().process(...)
//! ```
//!
//! One [`SourceIdent`] value, [`SOURCE_MAIN`], is reserved for the main
//! lifecycle command channel. The identifier space is open for additional
//! sources (input channels, sensors) registered by the same pattern.

use std::thread::{self, ThreadId};

use thiserror::Error;
use tracing::debug;

use crate::channel::{ChannelHandle, ChannelRegistry};
use crate::dispatch::{AppCommand, CommandHandler};
use crate::state::AppState;

/// Readability event bit, the only event class lifecycle sources use.
pub const EVENT_INPUT: u32 = 1;

/// Identifier tag for a registered poll source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceIdent(u32);

impl SourceIdent {
    /// Creates an identifier with the given raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Reserved identifier for the main lifecycle command channel.
pub const SOURCE_MAIN: SourceIdent = SourceIdent::new(1);

/// Processing function invoked when a source becomes readable.
///
/// The main command source points this at the command dispatcher; it reads
/// one command, applies the pre/post transitions around the user callback,
/// and reports which command it processed (or `None` on an anomaly).
pub type ProcessFn =
    fn(&mut AppState, &ChannelRegistry, &mut dyn CommandHandler) -> Option<AppCommand>;

/// A registered poll source: a routing record, nothing more.
///
/// Pairs a channel's readiness notification with the function that services
/// it. Carries no state machine of its own.
pub struct PollSource {
    /// Identifier tag routed back to the dispatch loop.
    pub ident: SourceIdent,

    /// The channel whose readiness this source watches.
    pub handle: ChannelHandle,

    /// Event classes this source subscribed to (`EVENT_INPUT` bitmask).
    pub events: u32,

    /// Function that services the source when it is readable.
    pub process: ProcessFn,
}

impl std::fmt::Debug for PollSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollSource")
            .field("ident", &self.ident)
            .field("handle", &self.handle)
            .field("events", &self.events)
            .finish()
    }
}

/// Errors from looper registration.
#[derive(Debug, Error)]
pub enum LooperError {
    /// A source with the same identifier is already registered.
    #[error("poll source {0} is already registered")]
    DuplicateSource(u32),

    /// The looper was used from a thread other than the one it was
    /// prepared on.
    #[error("looper used from a thread other than the one it was prepared on")]
    WrongThread,
}

/// Readiness multiplexer for one dispatch thread.
///
/// Prepared once per dispatch thread; registrations and polls must happen on
/// that thread. The blocking wait belongs to the caller's own loop — the
/// looper only offers the non-blocking [`poll_ready`](Self::poll_ready) scan.
pub struct Looper {
    sources: Vec<PollSource>,
    thread: ThreadId,
}

impl Looper {
    /// Associates a new looper with the calling thread.
    pub fn prepare() -> Self {
        debug!(thread = ?thread::current().id(), "Looper prepared");
        Self {
            sources: Vec::new(),
            thread: thread::current().id(),
        }
    }

    /// Registers a channel for readability notifications.
    ///
    /// # Errors
    ///
    /// Fails if called off the prepared thread or if `ident` is already
    /// registered.
    pub fn add_source(
        &mut self,
        handle: ChannelHandle,
        ident: SourceIdent,
        events: u32,
        process: ProcessFn,
    ) -> Result<(), LooperError> {
        if thread::current().id() != self.thread {
            return Err(LooperError::WrongThread);
        }
        if self.sources.iter().any(|s| s.ident == ident) {
            return Err(LooperError::DuplicateSource(ident.raw()));
        }

        debug!(ident = ident.raw(), handle = handle.raw(), "Poll source registered");
        self.sources.push(PollSource {
            ident,
            handle,
            events,
            process,
        });
        Ok(())
    }

    /// Scans registered sources and returns the identifiers of those with
    /// at least one pending event.
    ///
    /// Non-blocking. Identifiers are returned in registration order.
    pub fn poll_ready(&self, registry: &ChannelRegistry) -> Vec<SourceIdent> {
        debug_assert_eq!(
            thread::current().id(),
            self.thread,
            "looper polled off its prepared thread"
        );

        self.sources
            .iter()
            .filter(|source| source.events & EVENT_INPUT != 0)
            .filter(|source| {
                registry
                    .resolve(source.handle)
                    .is_some_and(|channel| channel.has_event())
            })
            .map(|source| source.ident)
            .collect()
    }

    /// Looks up a registered source by identifier.
    pub fn source(&self, ident: SourceIdent) -> Option<&PollSource> {
        self.sources.iter().find(|s| s.ident == ident)
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for Looper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Looper")
            .field("sources", &self.sources.len())
            .field("thread", &self.thread)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
