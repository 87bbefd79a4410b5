//! Lifecycle command dispatcher.
//!
//! The dispatcher is the state machine at the centre of the glue: it takes
//! one command byte off the channel, applies the pre-callback transition,
//! invokes the application's [`CommandHandler`], then applies the
//! post-callback transition. One command completes its full triple before
//! the next is dequeued; with a single dispatch thread, processing is
//! strictly FIFO.
//!
//! # Transition table
//!
//! ```text
//! Command        Pre-callback                Post-callback
//! InputChanged   -                            -
//! InitWindow     window_present = true        -
//! TermWindow     -                            window_present = false
//! Resume         stage = Resumed              saved state cleared
//! Start          stage = Started              -
//! Pause          stage = Paused               -
//! Stop           stage = Stopped              -
//! ConfigChanged  -                            -
//! SaveState      (cleared at dequeue)         state_saved = true
//! Destroy        destroy_requested = true     -
//! ```
//!
//! The SaveState clearing happens on the read side, before the callback: a
//! new save must not leak the previous buffer. A buffer the handler stores
//! *during* SaveState handling is deliberately not cleared by this path —
//! only the next Resume clears it. That ordering matches the reference
//! behaviour and is preserved as-is.

use tracing::{debug, error, warn};

use crate::channel::ChannelRegistry;
use crate::state::{AppState, LifecycleStage};

/// A lifecycle command delivered over the command channel.
///
/// Discriminants are the crate's wire codes. The host and the activity must
/// agree on them; both sides of this crate go through [`AppCommand::code`]
/// and [`AppCommand::from_code`], so the values are self-consistent.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppCommand {
    /// Input routing changed; informational.
    InputChanged = 0,
    /// A window is available for rendering.
    InitWindow = 1,
    /// The window is going away after this command is processed.
    TermWindow = 2,
    /// Activity moves to the foreground.
    Resume = 3,
    /// Activity becomes visible.
    Start = 4,
    /// Activity loses foreground focus.
    Pause = 5,
    /// Activity is no longer visible.
    Stop = 6,
    /// Configuration changed; informational.
    ConfigChanged = 7,
    /// The activity should persist its state.
    SaveState = 8,
    /// The activity must shut down.
    Destroy = 9,
}

impl AppCommand {
    /// Returns the wire code for this command.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a wire code, or `None` for an unknown byte.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::InputChanged),
            1 => Some(Self::InitWindow),
            2 => Some(Self::TermWindow),
            3 => Some(Self::Resume),
            4 => Some(Self::Start),
            5 => Some(Self::Pause),
            6 => Some(Self::Stop),
            7 => Some(Self::ConfigChanged),
            8 => Some(Self::SaveState),
            9 => Some(Self::Destroy),
            _ => None,
        }
    }

    /// Human-readable command name for logs and scripts.
    pub fn name(self) -> &'static str {
        match self {
            Self::InputChanged => "input-changed",
            Self::InitWindow => "init-window",
            Self::TermWindow => "term-window",
            Self::Resume => "resume",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::ConfigChanged => "config-changed",
            Self::SaveState => "save-state",
            Self::Destroy => "destroy",
        }
    }

    /// True for the four commands that move the lifecycle stage.
    pub fn is_stage_command(self) -> bool {
        matches!(self, Self::Resume | Self::Start | Self::Pause | Self::Stop)
    }
}

impl std::fmt::Display for AppCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Application-side command callback.
///
/// Invoked between the pre and post transitions for every dispatched
/// command. Implementations may inspect and mutate the state (for example,
/// storing a saved-state buffer while handling `SaveState`).
pub trait CommandHandler {
    /// Handles one lifecycle command.
    fn handle_command(&mut self, state: &mut AppState, cmd: AppCommand);
}

/// Any `FnMut(&mut AppState, AppCommand)` closure works as a handler.
impl<F> CommandHandler for F
where
    F: FnMut(&mut AppState, AppCommand),
{
    fn handle_command(&mut self, state: &mut AppState, cmd: AppCommand) {
        self(state, cmd)
    }
}

/// Dequeues and decodes one command from the activity's channel.
///
/// Returns `None` (after logging) when the channel cannot be resolved, has
/// no pending event, or yields an unknown code. When the dequeued command is
/// `SaveState`, any pre-existing saved-state buffer is cleared here, before
/// the dispatch triple runs — a new save must not leak the previous one.
pub fn read_command(state: &mut AppState, registry: &ChannelRegistry) -> Option<AppCommand> {
    let Some(channel) = registry.resolve(state.command_handle()) else {
        error!("No channel for command handle");
        return None;
    };

    if !channel.has_event() {
        error!("No data on command channel");
        return None;
    }

    let code = channel.read_event()?;
    match AppCommand::from_code(code) {
        Some(cmd) => {
            if cmd == AppCommand::SaveState {
                state.clear_saved_state();
            }
            Some(cmd)
        }
        None => {
            warn!(code, "Unknown lifecycle command code");
            None
        }
    }
}

/// Applies the state transition that precedes the user callback.
pub fn pre_transition(state: &mut AppState, cmd: AppCommand) {
    match cmd {
        AppCommand::InputChanged => {
            debug!("cmd: input-changed");
        }
        AppCommand::InitWindow => {
            debug!("cmd: init-window");
            state.set_window_present(true);
        }
        AppCommand::TermWindow => {
            debug!("cmd: term-window");
        }
        AppCommand::Resume => {
            debug!("stage: resumed");
            state.set_stage(LifecycleStage::Resumed);
        }
        AppCommand::Start => {
            debug!("stage: started");
            state.set_stage(LifecycleStage::Started);
        }
        AppCommand::Pause => {
            debug!("stage: paused");
            state.set_stage(LifecycleStage::Paused);
        }
        AppCommand::Stop => {
            debug!("stage: stopped");
            state.set_stage(LifecycleStage::Stopped);
        }
        AppCommand::ConfigChanged => {
            debug!("cmd: config-changed");
        }
        AppCommand::SaveState => {
            debug!("cmd: save-state");
        }
        AppCommand::Destroy => {
            debug!("cmd: destroy");
            state.request_destroy();
        }
    }
}

/// Applies the state transition that follows the user callback.
pub fn post_transition(state: &mut AppState, cmd: AppCommand) {
    match cmd {
        AppCommand::TermWindow => {
            state.set_window_present(false);
        }
        AppCommand::SaveState => {
            state.set_state_saved(true);
        }
        AppCommand::Resume => {
            // Saved state is consumed by resuming, whether or not anyone
            // actually read it.
            state.clear_saved_state();
        }
        _ => {}
    }
}

/// Processes one pending command: read, pre-transition, callback,
/// post-transition.
///
/// Returns the command that was processed, or `None` when nothing was
/// dispatched (anomaly or unknown code); in that case no transition runs and
/// the callback is not invoked.
pub fn process_command(
    state: &mut AppState,
    registry: &ChannelRegistry,
    handler: &mut dyn CommandHandler,
) -> Option<AppCommand> {
    let cmd = read_command(state, registry)?;
    pre_transition(state, cmd);
    handler.handle_command(state, cmd);
    post_transition(state, cmd);
    Some(cmd)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::channel::{ChannelRegistry, EventChannel};
    use std::sync::Arc;

    struct Fixture {
        registry: ChannelRegistry,
        channel: Arc<EventChannel>,
        state: AppState,
    }

    fn fixture() -> Fixture {
        let registry = ChannelRegistry::new();
        let (handle, channel) = registry.create();
        let config = AppConfig::new("/opt/app", "/var/app", "/mnt/external");
        let state = AppState::new(handle, config);
        Fixture {
            registry,
            channel,
            state,
        }
    }

    /// Records every callback invocation with the state observed at the time.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(AppCommand, Option<LifecycleStage>, bool)>,
    }

    impl CommandHandler for Recorder {
        fn handle_command(&mut self, state: &mut AppState, cmd: AppCommand) {
            self.seen.push((cmd, state.stage(), state.window_present()));
        }
    }

    fn dispatch(fx: &mut Fixture, cmd: AppCommand, handler: &mut dyn CommandHandler) {
        fx.channel.write_event(cmd.code());
        assert_eq!(
            process_command(&mut fx.state, &fx.registry, handler),
            Some(cmd)
        );
    }

    #[test]
    fn test_command_codes_round_trip() {
        for code in 0..=9u8 {
            let cmd = AppCommand::from_code(code).unwrap();
            assert_eq!(cmd.code(), code);
        }
        assert_eq!(AppCommand::from_code(10), None);
        assert_eq!(AppCommand::from_code(255), None);
    }

    #[test]
    fn test_stage_commands_move_the_stage() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        dispatch(&mut fx, AppCommand::Resume, &mut handler);
        assert_eq!(fx.state.stage(), Some(LifecycleStage::Resumed));

        dispatch(&mut fx, AppCommand::Pause, &mut handler);
        assert_eq!(fx.state.stage(), Some(LifecycleStage::Paused));

        dispatch(&mut fx, AppCommand::Start, &mut handler);
        assert_eq!(fx.state.stage(), Some(LifecycleStage::Started));

        dispatch(&mut fx, AppCommand::Stop, &mut handler);
        assert_eq!(fx.state.stage(), Some(LifecycleStage::Stopped));
    }

    #[test]
    fn test_non_stage_commands_leave_stage_untouched() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        dispatch(&mut fx, AppCommand::Resume, &mut handler);

        for cmd in [
            AppCommand::InputChanged,
            AppCommand::InitWindow,
            AppCommand::TermWindow,
            AppCommand::ConfigChanged,
            AppCommand::SaveState,
            AppCommand::Destroy,
        ] {
            dispatch(&mut fx, cmd, &mut handler);
            assert_eq!(fx.state.stage(), Some(LifecycleStage::Resumed));
        }
    }

    #[test]
    fn test_window_flag_idempotent() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        dispatch(&mut fx, AppCommand::InitWindow, &mut handler);
        dispatch(&mut fx, AppCommand::InitWindow, &mut handler);
        assert!(fx.state.window_present());

        dispatch(&mut fx, AppCommand::TermWindow, &mut handler);
        assert!(!fx.state.window_present());

        // Terminating an absent window stays false
        dispatch(&mut fx, AppCommand::TermWindow, &mut handler);
        assert!(!fx.state.window_present());
    }

    #[test]
    fn test_window_flag_set_before_callback_cleared_after() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        dispatch(&mut fx, AppCommand::InitWindow, &mut handler);
        dispatch(&mut fx, AppCommand::TermWindow, &mut handler);

        // Callback saw the window present in both cases: InitWindow sets it
        // pre-callback, TermWindow clears it only post-callback.
        assert!(handler.seen[0].2);
        assert!(handler.seen[1].2);
        assert!(!fx.state.window_present());
    }

    #[test]
    fn test_save_state_then_resume_clears_buffer() {
        let mut fx = fixture();
        let mut handler = |state: &mut AppState, cmd: AppCommand| {
            if cmd == AppCommand::SaveState {
                state.save_state(vec![0xAA; 16]);
            }
        };

        fx.channel.write_event(AppCommand::SaveState.code());
        process_command(&mut fx.state, &fx.registry, &mut handler).unwrap();

        // The buffer stored during SaveState handling survives...
        assert!(fx.state.has_saved_state());
        assert!(fx.state.state_saved());

        fx.channel.write_event(AppCommand::Resume.code());
        process_command(&mut fx.state, &fx.registry, &mut handler).unwrap();

        // ...until Resume consumes it.
        assert!(!fx.state.has_saved_state());
        assert_eq!(fx.state.saved_state_len(), 0);
        assert!(!fx.state.state_saved());
    }

    #[test]
    fn test_save_state_dequeue_clears_previous_buffer() {
        let mut fx = fixture();
        let mut observed_len = None;
        let mut handler = |state: &mut AppState, cmd: AppCommand| {
            if cmd == AppCommand::SaveState {
                observed_len = Some(state.saved_state_len());
            }
        };

        // A buffer left over from an earlier save
        fx.state.save_state(vec![1, 2, 3]);

        fx.channel.write_event(AppCommand::SaveState.code());
        process_command(&mut fx.state, &fx.registry, &mut handler).unwrap();

        // The stale buffer was cleared at dequeue, before the callback ran
        assert_eq!(observed_len, Some(0));
    }

    #[test]
    fn test_destroy_requested_is_monotonic() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        dispatch(&mut fx, AppCommand::Destroy, &mut handler);
        assert!(fx.state.destroy_requested());

        // No later command resets it
        for cmd in [AppCommand::Resume, AppCommand::Stop, AppCommand::ConfigChanged] {
            dispatch(&mut fx, cmd, &mut handler);
            assert!(fx.state.destroy_requested());
        }
    }

    #[test]
    fn test_empty_channel_is_an_anomaly_not_a_dispatch() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        assert_eq!(
            process_command(&mut fx.state, &fx.registry, &mut handler),
            None
        );
        assert!(handler.seen.is_empty());
        assert_eq!(fx.state.stage(), None);
    }

    #[test]
    fn test_unknown_code_skips_transitions_and_callback() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        fx.channel.write_event(0xFF);
        assert_eq!(
            process_command(&mut fx.state, &fx.registry, &mut handler),
            None
        );
        assert!(handler.seen.is_empty());

        // The bad byte was consumed; the channel is drained
        assert!(!fx.channel.has_event());
    }

    #[test]
    fn test_callback_runs_between_pre_and_post() {
        let mut fx = fixture();
        let mut handler = Recorder::default();

        dispatch(&mut fx, AppCommand::Start, &mut handler);

        // Pre-transition already applied when the callback observed the state
        assert_eq!(
            handler.seen,
            vec![(AppCommand::Start, Some(LifecycleStage::Started), false)]
        );
    }
}
