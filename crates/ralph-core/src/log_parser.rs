//! Structuring of raw log lines.
//!
//! Three line shapes are recognized, tried in order:
//!
//! 1. `2024-01-15 10:30:45[.123] [INFO] message`
//! 2. `2024-01-15T10:30:45[.123][Z] INFO message`
//! 3. `[INFO] message`
//!
//! Anything else becomes an `Info` entry whose message is the whole line.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::domain::{LogEntry, LogLevel};

static LINE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(
            r"^(?P<timestamp>\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}(?:\.\d+)?)\s+\[(?P<level>\w+)\]\s+(?P<message>.*)$",
        )
        .expect("standard log pattern is valid"),
        Regex::new(
            r"^(?P<timestamp>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z?)\s+(?P<level>DEBUG|INFO|WARN(?:ING)?|ERROR|CRITICAL)\s+(?P<message>.*)$",
        )
        .expect("ISO log pattern is valid"),
        Regex::new(r"^\[(?P<level>DEBUG|INFO|WARN(?:ING)?|ERROR|CRITICAL)\]\s+(?P<message>.*)$")
            .expect("bracketed level pattern is valid"),
    ]
});

/// Timestamp formats, first successful parse wins.
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse one raw log line into a [`LogEntry`].
///
/// Pure and deterministic. Timestamps that match a line shape but none of the
/// known formats are left as `None`; unknown level names map to `Info`.
pub fn parse_log_line(line: &str, line_number: usize, source: &str) -> LogEntry {
    for pattern in LINE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };

        let level = caps
            .name("level")
            .and_then(|m| LogLevel::from_name(m.as_str()))
            .unwrap_or_default();
        let timestamp = caps
            .name("timestamp")
            .and_then(|m| parse_timestamp(m.as_str()));
        let message = caps
            .name("message")
            .map_or(line, |m| m.as_str())
            .to_string();

        return LogEntry {
            timestamp,
            level,
            message,
            source: source.to_string(),
            line_number,
        };
    }

    LogEntry {
        timestamp: None,
        level: LogLevel::Info,
        message: line.to_string(),
        source: source.to_string(),
        line_number,
    }
}
