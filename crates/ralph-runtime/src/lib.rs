//! Process supervision and log streaming for the Ralph dashboard.
//!
//! - [`process`] launches agent processes, captures their output and drives
//!   their lifecycle (stop, pause, resume)
//! - [`logs`] keeps a bounded buffer per project, tails log files into it and
//!   serves history-then-delta subscriptions
//! - [`ProcessEventBroadcaster`] republishes process events to live consumers
//! - [`Supervisor`] wires the three together

#![deny(unsafe_code)]

mod broadcaster;
pub mod logs;
pub mod process;
mod supervisor;

pub use broadcaster::ProcessEventBroadcaster;
pub use logs::{
    LogBuffer, LogDelta, LogFileWatcher, LogSubscription, ProjectLogManager, WatcherConfig,
    find_log_files, read_log_file,
};
pub use process::{
    LaunchSpec, ManagedProcess, ObserverRegistry, ProcessManager, ShutdownOutcome,
    SupervisorConfig,
};
pub use supervisor::Supervisor;
