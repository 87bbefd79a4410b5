//! Activity configuration.
//!
//! This module defines `AppConfig`, the immutable process metadata supplied
//! by the host at launch: arguments and the three platform directory paths.
//! The strings pass through unchanged — no parsing or validation happens at
//! this layer.

use std::path::PathBuf;

/// Bootstrap parameters for one activity.
///
/// All fields are copied into the activity's state record at launch and are
/// immutable afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Launch arguments (conventionally, `args[0]` is the program name).
    pub args: Vec<String>,

    /// Application install directory.
    pub install_dir: PathBuf,

    /// Writable data directory.
    pub writable_dir: PathBuf,

    /// External files directory.
    pub external_files_dir: PathBuf,
}

impl AppConfig {
    /// Creates a config with the three platform directories and no args.
    pub fn new(
        install_dir: impl Into<PathBuf>,
        writable_dir: impl Into<PathBuf>,
        external_files_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            args: Vec::new(),
            install_dir: install_dir.into(),
            writable_dir: writable_dir.into(),
            external_files_dir: external_files_dir.into(),
        }
    }

    /// Sets the launch arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}
