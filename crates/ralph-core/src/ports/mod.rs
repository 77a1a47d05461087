//! Port definitions (trait abstractions) and the error taxonomy.
//!
//! # Design Rules
//!
//! - The process core publishes through `ProcessObserver` and never depends
//!   on the log layer or any broadcast layer directly
//! - Errors are semantic: callers match on `ProcessError` variants, not on
//!   `std::io::Error` kinds

pub mod process_observer;

use std::path::PathBuf;
use thiserror::Error;

pub use process_observer::ProcessObserver;

/// Errors that prevent a process from reaching the requested state.
///
/// Failures that happen while the process is already gone (signal delivery
/// to an exited process, closed pipes) are absorbed by the runtime and never
/// surface as `ProcessError`.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be found.
    #[error("Executable not found: {program}")]
    ExecutableNotFound { program: String },

    /// The executable exists but could not be executed.
    #[error("Permission denied executing: {program}")]
    PermissionDenied { program: String },

    /// The working directory does not exist.
    #[error("Working directory not found: {}", .0.display())]
    WorkingDirectoryNotFound(PathBuf),

    /// The command vector was empty.
    #[error("Cannot launch an empty command")]
    EmptyCommand,

    /// Spawning failed for another reason.
    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },
}

impl ProcessError {
    /// Classify an `io::Error` returned by spawning `program`.
    pub fn from_spawn_error(program: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ExecutableNotFound {
                program: program.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                program: program.to_string(),
            },
            _ => Self::SpawnFailed {
                program: program.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

/// Core error type aggregating the domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Process lifecycle error.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Settings validation or persistence error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Path resolution error.
    #[error(transparent)]
    Path(#[from] crate::paths::PathError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),
}
