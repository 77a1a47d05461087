//! Log capture and streaming.
//!
//! - `LogBuffer` - bounded ring of lines with a monotonic append counter
//! - `LogFileWatcher` - tails one file into a buffer
//! - `ProjectLogManager` - one buffer and any number of watchers per project
//! - `LogSubscription` - history, then deltas, for one live consumer

mod buffer;
mod discovery;
mod file;
mod manager;
mod subscription;
mod watcher;

pub use buffer::{LogBuffer, LogDelta};
pub use discovery::find_log_files;
pub use file::{DEFAULT_PAGE_LINES, read_log_file};
pub use manager::ProjectLogManager;
pub use subscription::LogSubscription;
pub use watcher::{LogFileWatcher, WatcherConfig};
