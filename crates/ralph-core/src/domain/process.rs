//! Supervised process lifecycle types.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a supervised process.
///
/// ```text
/// Idle ──start──▶ Running ──exit 0──▶ Completed
///                  │  ▲    └─exit≠0─▶ Error
///            pause │  │ resume
///                  ▼  │
///                 Paused
/// ```
///
/// `stop()` on a Running or Paused process returns it to `Idle`, which keeps
/// "the dashboard told it to die" distinct from "it died on its own".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// No OS process (never started, or stopped by request).
    #[default]
    Idle,
    /// Process started and its reader tasks are active.
    Running,
    /// Process suspended with SIGSTOP.
    Paused,
    /// Process exited with code 0.
    Completed,
    /// Process exited with a nonzero code or failed to start.
    Error,
}

impl ProcessStatus {
    /// Whether a process in this status still owns a live OS process.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Whether this status is terminal (the process ended on its own).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Status for a process that exited on its own with `exit_code`.
    #[must_use]
    pub const fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            Self::Completed
        } else {
            Self::Error
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which output pipe a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of a supervised process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    /// Project (entity) name the process is bound to.
    pub project: String,
    /// OS process id, absent until started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Argument vector used to launch the process.
    pub command: Vec<String>,
    /// Working directory of the process.
    pub cwd: PathBuf,
    /// Current lifecycle status.
    pub status: ProcessStatus,
    /// When the process was started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Exit code, absent until the process exits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ProcessInfo {
    /// Command line joined with spaces, for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_exit_code() {
        assert_eq!(ProcessStatus::from_exit_code(0), ProcessStatus::Completed);
        assert_eq!(ProcessStatus::from_exit_code(1), ProcessStatus::Error);
        assert_eq!(ProcessStatus::from_exit_code(-9), ProcessStatus::Error);
    }

    #[test]
    fn test_live_statuses() {
        assert!(ProcessStatus::Running.is_live());
        assert!(ProcessStatus::Paused.is_live());
        assert!(!ProcessStatus::Idle.is_live());
        assert!(!ProcessStatus::Completed.is_live());
        assert!(!ProcessStatus::Error.is_live());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProcessStatus::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        assert_eq!(ProcessStatus::default(), ProcessStatus::Idle);
    }

    #[test]
    fn test_process_info_serialization() {
        let info = ProcessInfo {
            project: "alpha".to_string(),
            pid: Some(42),
            command: vec!["ralph-tui".to_string(), "run".to_string()],
            cwd: PathBuf::from("/tmp/alpha"),
            status: ProcessStatus::Running,
            started_at: None,
            exit_code: None,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"status\":\"running\""));
        assert!(json.contains("\"pid\":42"));
        assert!(!json.contains("exitCode"));
        assert_eq!(info.command_line(), "ralph-tui run");
    }
}
