//! Activity bootstrap error types.

use std::fmt;

use crate::looper::LooperError;

/// Errors that can occur while bootstrapping an activity.
///
/// All of these are fatal to startup: there is no partial-bootstrap
/// recovery path, so callers abort rather than retry.
#[derive(Debug)]
pub enum AppError {
    /// Failed to register the command channel with the looper.
    LooperSetup(LooperError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::LooperSetup(e) => {
                write!(f, "Failed to register command channel with looper: {}", e)
            }
            AppError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::LooperSetup(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<LooperError> for AppError {
    fn from(e: LooperError) -> Self {
        AppError::LooperSetup(e)
    }
}
