//! Core domain types and port definitions for the Ralph dashboard supervisor.
//!
//! This crate has no process or filesystem-watching code. It defines what the
//! runtime talks about (process status, log entries, events), the port the
//! runtime publishes through (`ProcessObserver`), the error taxonomy, and the
//! persisted dashboard settings.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod log_parser;
pub mod paths;
pub mod ports;
pub mod settings;

pub use domain::{LogEntry, LogLevel, ProcessInfo, ProcessStatus, StreamKind};
pub use events::{LogStreamMessage, ProcessEvent};
pub use log_parser::parse_log_line;
pub use paths::{PathError, config_dir, config_file_path};
pub use ports::{CoreError, ProcessError, ProcessObserver};
pub use settings::{
    DEFAULT_AUTO_RESPOND_DELAY_MS, DEFAULT_HISTORY_LINES, DEFAULT_KILL_TIMEOUT_SECS,
    DEFAULT_LOG_MAX_LINES, DEFAULT_STOP_TIMEOUT_SECS, DEFAULT_WATCH_POLL_INTERVAL_MS,
    DEFAULT_WATCH_WAIT_INTERVAL_MS, Settings, SettingsError, load_settings, save_settings,
    validate_settings,
};
