//! Lifecycle command channel.
//!
//! The [`EventChannel`] is a process-local, unidirectional FIFO of single-byte
//! lifecycle command codes. The host lifecycle driver writes codes from its
//! own thread; the activity's dispatch thread drains them one at a time.
//!
//! # Architecture
//!
//! ```text
//! Lifecycle Driver ──write_event──► EventChannel ──read_event──► Dispatcher
//!   (any thread)                    (FIFO queue)                (main thread)
//!                                        │
//!                                   has_event ──► Looper readiness scan
//! ```
//!
//! Channels are created through the [`ChannelRegistry`], which hands out an
//! integer [`ChannelHandle`] alongside the shared channel instance. The handle
//! exists because looper-style registration APIs only accept plain integer
//! descriptors; the registry resolves a handle back to its channel.
//!
//! # Example
//!
//! ```ignore
//! use appglue::channel::ChannelRegistry;
//!
//! let registry = ChannelRegistry::new();
//! let (handle, channel) = registry.create();
//!
//! channel.write_event(4); // Start
//! assert!(channel.has_event());
//! assert_eq!(channel.read_event(), Some(4));
//! ```

mod registry;

pub use registry::{ChannelHandle, ChannelRegistry};

use std::collections::VecDeque;

use parking_lot::Mutex;

/// A single-producer/single-consumer queue of lifecycle command bytes.
///
/// Writes may come from a different thread than reads (the host driver vs.
/// the dispatch thread); the internal mutex serialises the two sides. Reads
/// are non-blocking: the blocking wait belongs to whatever event pump polls
/// the looper, not to the channel itself.
pub struct EventChannel {
    queue: Mutex<VecDeque<u8>>,
}

impl EventChannel {
    /// Creates an empty channel.
    ///
    /// Channels are normally created via [`ChannelRegistry::create`], which
    /// also assigns the integer handle.
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Enqueues one command byte.
    ///
    /// Safe to call from a thread other than the reader's. Lifecycle command
    /// volume is bounded, so the queue is unbounded without risk of growth.
    pub fn write_event(&self, code: u8) {
        self.queue.lock().push_back(code);
    }

    /// Returns true if at least one command byte is pending.
    pub fn has_event(&self) -> bool {
        !self.queue.lock().is_empty()
    }

    /// Dequeues the oldest pending command byte.
    ///
    /// Returns `None` when the queue is empty; callers that were woken by a
    /// readiness signal treat that as a protocol anomaly.
    pub fn read_event(&self) -> Option<u8> {
        self.queue.lock().pop_front()
    }

    /// Returns the number of pending command bytes.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("pending", &self.pending())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fresh_channel_has_no_event() {
        let channel = EventChannel::new();
        assert!(!channel.has_event());
        assert_eq!(channel.pending(), 0);
        assert_eq!(channel.read_event(), None);
    }

    #[test]
    fn test_readiness_tracks_writes_and_reads() {
        let channel = EventChannel::new();

        channel.write_event(7);
        assert!(channel.has_event());

        channel.write_event(3);
        assert_eq!(channel.pending(), 2);

        // Drain everything; readiness must drop back to false
        assert_eq!(channel.read_event(), Some(7));
        assert_eq!(channel.read_event(), Some(3));
        assert!(!channel.has_event());
    }

    #[test]
    fn test_fifo_order_basic() {
        let channel = EventChannel::new();
        for code in [4, 3, 1, 5, 9] {
            channel.write_event(code);
        }
        let drained: Vec<u8> = std::iter::from_fn(|| channel.read_event()).collect();
        assert_eq!(drained, vec![4, 3, 1, 5, 9]);
    }

    #[test]
    fn test_writer_on_separate_thread() {
        use std::sync::Arc;

        let channel = Arc::new(EventChannel::new());
        let writer = Arc::clone(&channel);

        let handle = std::thread::spawn(move || {
            for code in 0..100u8 {
                writer.write_event(code);
            }
        });
        handle.join().unwrap();

        let drained: Vec<u8> = std::iter::from_fn(|| channel.read_event()).collect();
        assert_eq!(drained, (0..100u8).collect::<Vec<_>>());
    }

    proptest! {
        /// FIFO property: any write sequence is read back in exact order.
        #[test]
        fn test_fifo_order_preserved(codes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let channel = EventChannel::new();
            for &code in &codes {
                channel.write_event(code);
            }

            let mut drained = Vec::with_capacity(codes.len());
            while let Some(code) = channel.read_event() {
                drained.push(code);
            }

            prop_assert_eq!(drained, codes);
            prop_assert!(!channel.has_event());
        }
    }
}
