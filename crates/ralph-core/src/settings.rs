//! Supervisor settings, persisted as JSON in the dashboard config file.
//!
//! All fields are optional so partially written or older config files load
//! with graceful defaults. Keys belonging to other dashboard components are
//! ignored.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default number of lines retained per project log buffer.
pub const DEFAULT_LOG_MAX_LINES: usize = 10_000;

/// Default settle delay before each scripted stdin response.
pub const DEFAULT_AUTO_RESPOND_DELAY_MS: u64 = 1_500;

/// Default grace period after SIGTERM before escalating to a forceful kill.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;

/// Default wait after the forceful kill.
pub const DEFAULT_KILL_TIMEOUT_SECS: u64 = 5;

/// Default idle poll interval of a file watcher that reached end of file.
pub const DEFAULT_WATCH_POLL_INTERVAL_MS: u64 = 100;

/// Default poll interval of a file watcher waiting for its file to appear.
pub const DEFAULT_WATCH_WAIT_INTERVAL_MS: u64 = 500;

/// Default number of history lines sent to a new log subscriber.
pub const DEFAULT_HISTORY_LINES: usize = 200;

/// Supervisor settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum lines retained per project log buffer.
    pub log_max_lines: Option<usize>,

    /// Settle delay before each scripted stdin response, in milliseconds.
    pub auto_respond_delay_ms: Option<u64>,

    /// Grace period after SIGTERM, in seconds.
    pub stop_timeout_secs: Option<u64>,

    /// Wait after the forceful kill, in seconds.
    pub kill_timeout_secs: Option<u64>,

    /// Poll interval of a file watcher at end of file, in milliseconds.
    pub watch_poll_interval_ms: Option<u64>,

    /// Poll interval of a file watcher waiting for its file, in milliseconds.
    pub watch_wait_interval_ms: Option<u64>,

    /// History lines sent to a new log subscriber.
    pub history_lines: Option<usize>,
}

impl Settings {
    /// Create settings with every field set to its default.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            log_max_lines: Some(DEFAULT_LOG_MAX_LINES),
            auto_respond_delay_ms: Some(DEFAULT_AUTO_RESPOND_DELAY_MS),
            stop_timeout_secs: Some(DEFAULT_STOP_TIMEOUT_SECS),
            kill_timeout_secs: Some(DEFAULT_KILL_TIMEOUT_SECS),
            watch_poll_interval_ms: Some(DEFAULT_WATCH_POLL_INTERVAL_MS),
            watch_wait_interval_ms: Some(DEFAULT_WATCH_WAIT_INTERVAL_MS),
            history_lines: Some(DEFAULT_HISTORY_LINES),
        }
    }

    #[must_use]
    pub fn effective_log_max_lines(&self) -> usize {
        self.log_max_lines.unwrap_or(DEFAULT_LOG_MAX_LINES)
    }

    #[must_use]
    pub fn effective_auto_respond_delay(&self) -> Duration {
        Duration::from_millis(
            self.auto_respond_delay_ms
                .unwrap_or(DEFAULT_AUTO_RESPOND_DELAY_MS),
        )
    }

    #[must_use]
    pub fn effective_stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs.unwrap_or(DEFAULT_STOP_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn effective_kill_timeout(&self) -> Duration {
        Duration::from_secs(self.kill_timeout_secs.unwrap_or(DEFAULT_KILL_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn effective_watch_poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.watch_poll_interval_ms
                .unwrap_or(DEFAULT_WATCH_POLL_INTERVAL_MS),
        )
    }

    #[must_use]
    pub fn effective_watch_wait_interval(&self) -> Duration {
        Duration::from_millis(
            self.watch_wait_interval_ms
                .unwrap_or(DEFAULT_WATCH_WAIT_INTERVAL_MS),
        )
    }

    #[must_use]
    pub fn effective_history_lines(&self) -> usize {
        self.history_lines.unwrap_or(DEFAULT_HISTORY_LINES)
    }
}

/// Settings validation or persistence error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Log buffer size must be between 1 and 1,000,000 lines, got {0}")]
    InvalidLogMaxLines(usize),

    #[error("History lines must not exceed the log buffer size ({max}), got {got}")]
    InvalidHistoryLines { got: usize, max: usize },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("Failed to access settings file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    let max_lines = settings.effective_log_max_lines();
    if !(1..=1_000_000).contains(&max_lines) {
        return Err(SettingsError::InvalidLogMaxLines(max_lines));
    }

    let history = settings.effective_history_lines();
    if history > max_lines {
        return Err(SettingsError::InvalidHistoryLines {
            got: history,
            max: max_lines,
        });
    }

    let intervals = [
        ("stop_timeout_secs", settings.stop_timeout_secs),
        ("kill_timeout_secs", settings.kill_timeout_secs),
        ("watch_poll_interval_ms", settings.watch_poll_interval_ms),
        ("watch_wait_interval_ms", settings.watch_wait_interval_ms),
    ];
    for (field, value) in intervals {
        if value == Some(0) {
            return Err(SettingsError::ZeroDuration { field });
        }
    }

    Ok(())
}

/// Load settings from `path`.
///
/// A missing file yields defaults. A malformed file is logged and also
/// yields defaults, so a hand-edited config never prevents startup. The
/// loaded settings are validated.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Settings::with_defaults());
        }
        Err(e) => {
            return Err(SettingsError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };

    let settings = match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse settings file, using defaults");
            return Ok(Settings::with_defaults());
        }
    };

    validate_settings(&settings)?;
    Ok(settings)
}

/// Persist settings to `path` as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    validate_settings(settings)?;

    let io_err = |e: io::Error| SettingsError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SettingsError::Serialize(e.to_string()))?;
    fs::write(path, json).map_err(io_err)?;

    info!(path = %path.display(), "Settings saved");
    Ok(())
}
