//! CLI-specific error types and exit code mapping.

use ralph_core::{CoreError, PathError, ProcessError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The supervised command could not be started.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (stdin, stdout, working directory).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings file or path error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Spawn failures use the shell's conventions (127 not found, 126 not
    /// executable); the rest follow sysexits.h.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Process(ProcessError::ExecutableNotFound { .. }) => 127,
            Self::Process(ProcessError::PermissionDenied { .. }) => 126,
            Self::Process(_) => 71, // EX_OSERR
            Self::Arguments(_) => 2,
            Self::Io(_) => 74,     // EX_IOERR
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Process(e) => Self::Process(e),
            CoreError::Settings(e) => e.into(),
            CoreError::Path(e) => e.into(),
            CoreError::Validation(msg) => Self::Arguments(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found: CliError = ProcessError::ExecutableNotFound {
            program: "ralph-tui".to_string(),
        }
        .into();
        assert_eq!(not_found.exit_code(), 127);
        assert_eq!(not_found.to_string(), "Executable not found: ralph-tui");

        let config: CliError = SettingsError::InvalidLogMaxLines(0).into();
        assert_eq!(config.exit_code(), 78);
        assert_eq!(CliError::Arguments("x".to_string()).exit_code(), 2);
    }

    #[test]
    fn test_core_error_mapping() {
        let err: CliError = CoreError::Validation("empty project name".to_string()).into();
        assert!(matches!(err, CliError::Arguments(ref msg) if msg == "empty project name"));

        let err: CliError = CoreError::Process(ProcessError::EmptyCommand).into();
        assert_eq!(err.exit_code(), 71);
    }
}
