//! Log line domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Severity of a log line.
///
/// Buffers store pre-formatted text, so a level is either parsed out of a
/// line after the fact or used as a textual filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Map a level name to a level. `warn` and `fatal` are accepted as
    /// synonyms for `Warning` and `Critical`. Matching is case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" | "fatal" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Whether `line` mentions this level by name (case-insensitive).
    ///
    /// This is the best-effort textual filter used on buffered lines.
    #[must_use]
    pub fn matches_text(self, line: &str) -> bool {
        line.to_ascii_uppercase()
            .contains(&self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown log level: {s}"))
    }
}

/// A log line split into its structured parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp, when one could be parsed from the line.
    pub timestamp: Option<NaiveDateTime>,
    pub level: LogLevel,
    pub message: String,
    /// Where the line came from (file path, project name, ...).
    pub source: String,
    pub line_number: usize,
}
