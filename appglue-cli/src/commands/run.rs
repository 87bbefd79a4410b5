//! Run command - launch a demo activity and drive its lifecycle.
//!
//! The scripted command sequence is played from a host thread with a delay
//! between commands, while the activity's main loop pumps the looper on the
//! primary thread. Ctrl-C requests a clean finish through the driver at any
//! point.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Args;
use tracing::{info, warn};

use appglue::log::{init_logging, LogConfig};
use appglue::{
    Activity, AppCommand, AppConfig, AppState, ChannelRegistry, DispatchSnapshot, FinishStrategy,
};

use super::common;
use crate::error::CliError;

/// Poll interval for the activity main loop.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Comma-separated lifecycle command script
    #[arg(
        long,
        default_value = "start,resume,init-window,save-state,pause,term-window,stop,destroy"
    )]
    pub script: String,

    /// Delay between scripted commands in milliseconds
    #[arg(long, default_value_t = 50)]
    pub tick_ms: u64,

    /// Writable data directory (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Send only Destroy (no Stop) when finishing via Ctrl-C
    #[arg(long)]
    pub destroy_only: bool,

    /// Disable the log file in the data directory
    #[arg(long)]
    pub no_log_file: bool,
}

/// Run the lifecycle simulation.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let script = common::parse_script(&args.script)?;

    let data_dir = args
        .data_dir
        .or_else(common::default_data_dir)
        .ok_or_else(|| {
            CliError::Config(
                "could not determine a writable data directory; use --data-dir".to_string(),
            )
        })?;
    std::fs::create_dir_all(&data_dir)?;

    let log_config = if args.no_log_file {
        LogConfig::new()
    } else {
        LogConfig::new().with_file_dir(&data_dir)
    };
    let _log_guard = init_logging(log_config);

    let config = AppConfig::new(std::env::current_dir()?, &data_dir, std::env::temp_dir())
        .with_args(std::env::args().collect());

    let registry = Arc::new(ChannelRegistry::new());
    let activity = Activity::bootstrap(config, registry)?;

    let strategy = if args.destroy_only {
        FinishStrategy::DestroyOnly
    } else {
        FinishStrategy::StopThenDestroy
    };
    let driver = activity.driver().with_strategy(strategy);

    // Ctrl-C finishes the activity through the same channel as any other
    // lifecycle command.
    let interrupt_driver = driver.clone();
    if let Err(e) = ctrlc::set_handler(move || interrupt_driver.finish()) {
        warn!(error = %e, "Could not install Ctrl-C handler");
    }

    println!("AppGlue Lifecycle Simulator v{}", appglue::VERSION);
    println!("Script:   {}", args.script);
    println!("Data dir: {}", data_dir.display());
    println!();

    // Host lifecycle thread plays the script
    let script_driver = driver.clone();
    let tick = Duration::from_millis(args.tick_ms);
    let host = thread::spawn(move || {
        for cmd in script {
            thread::sleep(tick);
            script_driver.send(cmd);
        }
    });

    let mut handler = |state: &mut AppState, cmd: AppCommand| {
        info!(%cmd, stage = ?state.stage(), window = state.window_present(), "Lifecycle command");
        if cmd == AppCommand::SaveState {
            state.save_state(b"demo-checkpoint".to_vec());
        }
    };

    let mut snapshot = DispatchSnapshot::default();
    let final_state = activity.run(|activity| {
        while !activity.destroy_requested() {
            activity.process_pending_commands(&mut handler);
            thread::sleep(POLL_INTERVAL);
        }
        snapshot = activity.metrics_snapshot();
    });

    let _ = host.join();

    println!();
    println!("Dispatch summary");
    println!("----------------");
    println!("Commands written:    {}", snapshot.commands_written);
    println!("Commands dispatched: {}", snapshot.commands_dispatched);
    println!("Stage changes:       {}", snapshot.stage_changes);
    println!("Window events:       {}", snapshot.window_events);
    println!("State saves:         {}", snapshot.saves);
    println!("Anomalies:           {}", snapshot.anomalies);
    println!();
    println!(
        "Final stage: {:?}, state saved: {}, destroyed: {}",
        final_state.stage(),
        final_state.state_saved(),
        final_state.destroyed()
    );

    Ok(())
}
