//! Domain types shared between the runtime and its adapters.

mod log;
mod process;

pub use log::{LogEntry, LogLevel};
pub use process::{ProcessInfo, ProcessStatus, StreamKind};
