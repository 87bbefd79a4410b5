//! CLI error types.

use std::fmt;

use appglue::AppError;

/// Errors surfaced to the command line.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or environment.
    Config(String),

    /// Activity bootstrap failed.
    App(AppError),

    /// Filesystem or process-environment failure.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::App(e) => write!(f, "Failed to launch activity: {}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::App(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Config("bad script".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad script"));
    }
}
