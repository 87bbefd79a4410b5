//! Shared helpers for CLI commands.

use std::path::PathBuf;

use appglue::AppCommand;

use crate::error::CliError;

/// Parses a lifecycle command by its script name.
pub fn command_from_name(name: &str) -> Option<AppCommand> {
    match name {
        "input-changed" => Some(AppCommand::InputChanged),
        "init-window" => Some(AppCommand::InitWindow),
        "term-window" => Some(AppCommand::TermWindow),
        "resume" => Some(AppCommand::Resume),
        "start" => Some(AppCommand::Start),
        "pause" => Some(AppCommand::Pause),
        "stop" => Some(AppCommand::Stop),
        "config-changed" => Some(AppCommand::ConfigChanged),
        "save-state" => Some(AppCommand::SaveState),
        "destroy" => Some(AppCommand::Destroy),
        _ => None,
    }
}

/// Parses a comma-separated lifecycle script into commands.
///
/// Whitespace around entries is ignored; empty entries are rejected along
/// with unknown command names.
pub fn parse_script(script: &str) -> Result<Vec<AppCommand>, CliError> {
    script
        .split(',')
        .map(str::trim)
        .map(|name| {
            command_from_name(name).ok_or_else(|| {
                CliError::Config(format!(
                    "unknown lifecycle command '{}' in script (try e.g. start,resume,destroy)",
                    name
                ))
            })
        })
        .collect()
}

/// Platform default for the activity's writable data directory.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("appglue"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_round_trip() {
        for code in 0..=9u8 {
            let cmd = AppCommand::from_code(code).unwrap();
            assert_eq!(command_from_name(cmd.name()), Some(cmd));
        }
    }

    #[test]
    fn test_parse_script_with_whitespace() {
        let script = parse_script(" start , resume ,destroy").unwrap();
        assert_eq!(
            script,
            vec![AppCommand::Start, AppCommand::Resume, AppCommand::Destroy]
        );
    }

    #[test]
    fn test_parse_script_rejects_unknown_names() {
        let err = parse_script("start,launch").unwrap_err();
        assert!(err.to_string().contains("unknown lifecycle command"));
    }
}
