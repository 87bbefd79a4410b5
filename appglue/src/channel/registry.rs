//! Handle registry for event channels.
//!
//! Looper registration only accepts plain integer descriptors, so each
//! channel is published under a process-unique integer handle. The registry
//! is an explicit object (not a hidden global) owned by the process context
//! and passed by reference to anything that needs to resolve handles; this
//! also lets tests run multiple independent channels in one process.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::error;

use super::EventChannel;

/// First handle value issued by a registry.
///
/// Starting above zero keeps handles visually distinct from common sentinel
/// values (0, -1) used by integer-descriptor APIs.
const FIRST_HANDLE: i32 = 1;

/// Opaque identifier for a registered [`EventChannel`].
///
/// A newtype over the raw descriptor so channel handles cannot be mixed with
/// unrelated integers. Stable for the life of the registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelHandle(i32);

impl ChannelHandle {
    /// Returns the raw integer descriptor.
    ///
    /// Only needed at the boundary to descriptor-based APIs; everything
    /// inside the crate passes `ChannelHandle` around.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-wide handle-to-channel table.
///
/// Thread-safe; creation and resolution may happen from any thread. A
/// resolve miss means the caller passed a stale or foreign handle, which is
/// a host-integration bug rather than a runtime condition: debug builds
/// assert, release builds log and return `None`.
pub struct ChannelRegistry {
    channels: DashMap<i32, Arc<EventChannel>>,
    next_handle: AtomicI32,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            next_handle: AtomicI32::new(FIRST_HANDLE),
        }
    }

    /// Allocates a new channel and registers it under a fresh handle.
    pub fn create(&self) -> (ChannelHandle, Arc<EventChannel>) {
        let handle = ChannelHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let channel = Arc::new(EventChannel::new());
        self.channels.insert(handle.raw(), Arc::clone(&channel));
        (handle, channel)
    }

    /// Resolves a handle back to its channel.
    pub fn resolve(&self, handle: ChannelHandle) -> Option<Arc<EventChannel>> {
        match self.channels.get(&handle.raw()) {
            Some(entry) => Some(Arc::clone(entry.value())),
            None => {
                debug_assert!(false, "unknown channel handle {}", handle);
                error!(handle = handle.raw(), "Unknown channel handle");
                None
            }
        }
    }

    /// Removes a channel registration.
    ///
    /// Returns the channel if the handle was registered. Outstanding `Arc`
    /// clones keep the channel itself alive; only the handle mapping goes.
    pub fn remove(&self, handle: ChannelHandle) -> Option<Arc<EventChannel>> {
        self.channels.remove(&handle.raw()).map(|(_, channel)| channel)
    }

    /// Returns the number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true if no channels are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.channels.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
