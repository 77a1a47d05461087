//! Events published by the supervisor for live consumers.
//!
//! `ProcessEvent` is the fan-out payload of every supervised process.
//! `LogStreamMessage` is the per-project subscription contract: one
//! `log_history` message when a subscriber joins, then `log` deltas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::StreamKind;

/// Process lifecycle and output event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessEvent {
    /// One captured output line.
    Output {
        project: String,
        stream: StreamKind,
        line: String,
        timestamp: DateTime<Utc>,
    },
    /// The process exited.
    #[serde(rename_all = "camelCase")]
    Exited { project: String, exit_code: i32 },
}

impl ProcessEvent {
    /// Create an output event stamped with the current time.
    pub fn output(project: impl Into<String>, stream: StreamKind, line: impl Into<String>) -> Self {
        Self::Output {
            project: project.into(),
            stream,
            line: line.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an exit event.
    pub fn exited(project: impl Into<String>, exit_code: i32) -> Self {
        Self::Exited {
            project: project.into(),
            exit_code,
        }
    }

    /// Project the event belongs to.
    #[must_use]
    pub fn project(&self) -> &str {
        match self {
            Self::Output { project, .. } | Self::Exited { project, .. } => project,
        }
    }
}

/// Message pushed to a per-project log subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogStreamMessage {
    /// Recent history sent once when the subscriber joins.
    LogHistory { project: String, lines: Vec<String> },
    /// Lines appended since the previous message.
    Log { project: String, lines: Vec<String> },
}

impl LogStreamMessage {
    #[must_use]
    pub fn lines(&self) -> &[String] {
        match self {
            Self::LogHistory { lines, .. } | Self::Log { lines, .. } => lines,
        }
    }
}
