//! Application lifecycle state.
//!
//! One [`AppState`] exists per hosted activity. It is owned and mutated only
//! by the dispatch thread: all mutation happens inside the command
//! dispatcher's pre/post transition steps (and final teardown), so no
//! locking is needed around the record itself.
//!
//! The saved-state buffer is modelled as an owned, nullable value type
//! ([`SavedState`]) rather than a pointer/length pair, so "free and null
//! together" holds by construction.

use std::path::{Path, PathBuf};

use crate::app::AppConfig;
use crate::channel::ChannelHandle;

/// Coarse lifecycle stage of the hosted activity.
///
/// Driven exclusively by external lifecycle commands; only the stage
/// commands (Resume/Start/Pause/Stop) ever change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleStage {
    /// Activity is in the foreground and interactive.
    Resumed,
    /// Activity is started but not yet resumed.
    Started,
    /// Activity has lost foreground focus.
    Paused,
    /// Activity is stopped and invisible.
    Stopped,
}

/// Owned, nullable saved-state buffer.
///
/// At most one owner at any time; clearing drops the bytes and the recorded
/// length in one step. Populated by the application during `SaveState`
/// handling, consumed (or discarded) on the next `Resume`.
#[derive(Debug, Default)]
pub struct SavedState {
    bytes: Option<Vec<u8>>,
}

impl SavedState {
    /// Stores a new buffer, replacing any previous one.
    pub fn set(&mut self, bytes: Vec<u8>) {
        self.bytes = Some(bytes);
    }

    /// Takes ownership of the buffer, leaving the slot empty.
    pub fn take(&mut self) -> Option<Vec<u8>> {
        self.bytes.take()
    }

    /// Drops any stored buffer.
    pub fn clear(&mut self) {
        self.bytes = None;
    }

    /// Returns true if a buffer is present.
    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }

    /// Returns the buffer length, or 0 when empty.
    pub fn len(&self) -> usize {
        self.bytes.as_ref().map_or(0, Vec::len)
    }

    /// Returns true when no buffer is stored.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_none()
    }
}

/// Mutable lifecycle record for one hosted activity.
///
/// Created once by bootstrap and destroyed (logically, via the `destroyed`
/// flag) after the user's main routine returns. The `destroy_requested` and
/// `destroyed` flags are monotonic: once set they never revert.
pub struct AppState {
    /// Read side of the lifecycle command channel. Immutable.
    command_handle: ChannelHandle,

    /// Current lifecycle stage; `None` until the first stage command lands.
    stage: Option<LifecycleStage>,

    /// True between InitWindow and the matching TermWindow.
    window_present: bool,

    /// Set by the Destroy command; never reset.
    destroy_requested: bool,

    /// Set once teardown completes; terminal marker.
    destroyed: bool,

    /// True after a SaveState command has been processed.
    state_saved: bool,

    /// Application-populated saved-state buffer.
    saved_state: SavedState,

    /// True once the dispatch loop has been entered.
    running: bool,

    /// Launch arguments, passed through unchanged.
    args: Vec<String>,

    /// Application install directory.
    install_dir: PathBuf,

    /// Writable data directory.
    writable_dir: PathBuf,

    /// External files directory.
    external_files_dir: PathBuf,
}

impl AppState {
    /// Builds the state record from bootstrap parameters.
    pub(crate) fn new(command_handle: ChannelHandle, config: AppConfig) -> Self {
        Self {
            command_handle,
            stage: None,
            window_present: false,
            destroy_requested: false,
            destroyed: false,
            state_saved: false,
            saved_state: SavedState::default(),
            running: false,
            args: config.args,
            install_dir: config.install_dir,
            writable_dir: config.writable_dir,
            external_files_dir: config.external_files_dir,
        }
    }

    /// Handle of the command channel this activity reads from.
    pub fn command_handle(&self) -> ChannelHandle {
        self.command_handle
    }

    /// Current lifecycle stage, if any stage command has arrived yet.
    pub fn stage(&self) -> Option<LifecycleStage> {
        self.stage
    }

    /// True while a window is available to render into.
    pub fn window_present(&self) -> bool {
        self.window_present
    }

    /// True once the host has requested destruction.
    pub fn destroy_requested(&self) -> bool {
        self.destroy_requested
    }

    /// True once teardown has completed.
    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    /// True after a SaveState command has been processed.
    pub fn state_saved(&self) -> bool {
        self.state_saved
    }

    /// True once the dispatch loop has been entered.
    pub fn running(&self) -> bool {
        self.running
    }

    /// Launch arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Application install directory.
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Writable data directory.
    pub fn writable_dir(&self) -> &Path {
        &self.writable_dir
    }

    /// External files directory.
    pub fn external_files_dir(&self) -> &Path {
        &self.external_files_dir
    }

    /// Stores a saved-state buffer.
    ///
    /// Intended to be called from a command handler while it services
    /// `SaveState`. The buffer survives until the next `Resume` command
    /// clears it (or teardown does).
    pub fn save_state(&mut self, bytes: Vec<u8>) {
        self.saved_state.set(bytes);
    }

    /// Takes ownership of the saved-state buffer, if present.
    pub fn take_saved_state(&mut self) -> Option<Vec<u8>> {
        self.saved_state.take()
    }

    /// Length of the saved-state buffer (0 when empty).
    pub fn saved_state_len(&self) -> usize {
        self.saved_state.len()
    }

    /// True if a saved-state buffer is currently stored.
    pub fn has_saved_state(&self) -> bool {
        self.saved_state.is_present()
    }

    // -------------------------------------------------------------------------
    // Dispatcher-side mutators
    // -------------------------------------------------------------------------

    pub(crate) fn set_stage(&mut self, stage: LifecycleStage) {
        self.stage = Some(stage);
    }

    pub(crate) fn set_window_present(&mut self, present: bool) {
        self.window_present = present;
    }

    pub(crate) fn request_destroy(&mut self) {
        self.destroy_requested = true;
    }

    /// Marks teardown complete.
    ///
    /// Implies a destruction request: `destroyed` must never be observable
    /// without `destroy_requested`.
    pub(crate) fn mark_destroyed(&mut self) {
        self.destroy_requested = true;
        self.destroyed = true;
    }

    pub(crate) fn set_state_saved(&mut self, saved: bool) {
        self.state_saved = saved;
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Drops the saved-state buffer and the `state_saved` marker together.
    pub(crate) fn clear_saved_state(&mut self) {
        self.saved_state.clear();
        self.state_saved = false;
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("command_handle", &self.command_handle)
            .field("stage", &self.stage)
            .field("window_present", &self.window_present)
            .field("destroy_requested", &self.destroy_requested)
            .field("destroyed", &self.destroyed)
            .field("state_saved", &self.state_saved)
            .field("saved_state_len", &self.saved_state.len())
            .field("running", &self.running)
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

    fn test_state() -> AppState {
        let registry = ChannelRegistry::new();
        let (handle, _) = registry.create();
        let config = AppConfig::new("/opt/app", "/var/app", "/mnt/external")
            .with_args(vec!["app".to_string()]);
        AppState::new(handle, config)
    }

    #[test]
    fn test_initial_state() {
        let state = test_state();
        assert_eq!(state.stage(), None);
        assert!(!state.window_present());
        assert!(!state.destroy_requested());
        assert!(!state.destroyed());
        assert!(!state.state_saved());
        assert!(!state.running());
        assert!(!state.has_saved_state());
        assert_eq!(state.args(), ["app".to_string()]);
        assert_eq!(state.install_dir(), Path::new("/opt/app"));
    }

    #[test]
    fn test_saved_state_clear_drops_buffer_and_marker() {
        let mut state = test_state();
        state.save_state(vec![1, 2, 3]);
        state.set_state_saved(true);

        assert!(state.has_saved_state());
        assert_eq!(state.saved_state_len(), 3);

        state.clear_saved_state();
        assert!(!state.has_saved_state());
        assert_eq!(state.saved_state_len(), 0);
        assert!(!state.state_saved());
    }

    #[test]
    fn test_saved_state_take_transfers_ownership() {
        let mut state = test_state();
        state.save_state(vec![9, 8]);

        assert_eq!(state.take_saved_state(), Some(vec![9, 8]));
        assert!(!state.has_saved_state());
        assert_eq!(state.take_saved_state(), None);
    }

    #[test]
    fn test_mark_destroyed_implies_destroy_requested() {
        let mut state = test_state();
        state.mark_destroyed();
        assert!(state.destroyed());
        assert!(state.destroy_requested());
    }

    #[test]
    fn test_saved_state_set_replaces_previous() {
        let mut buffer = SavedState::default();
        buffer.set(vec![1]);
        buffer.set(vec![2, 3]);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.take(), Some(vec![2, 3]));
        assert!(buffer.is_empty());
    }
}
