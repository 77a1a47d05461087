//! Process supervision.
//!
//! # Structure
//!
//! - `ManagedProcess` - one external process: sanitized environment, output
//!   capture, scripted stdin, stop/pause/resume
//! - `ProcessManager` - one process per project, launch-replaces, observer
//!   fan-out
//! - `ObserverRegistry` - isolated delivery of output and exit events
//! - `signals` / `shutdown` - PID signalling and SIGTERM → kill escalation

mod env;
mod managed;
mod manager;
mod observers;
pub mod shutdown;
pub mod signals;
pub(crate) mod stream;
mod types;

pub use env::{CHILD_ENV_OVERRIDES, CHILD_ENV_REMOVED, apply_sanitized_env};
pub use managed::ManagedProcess;
pub use manager::ProcessManager;
pub use observers::ObserverRegistry;
pub use shutdown::ShutdownOutcome;
pub use signals::SignalError;
pub use types::{LaunchSpec, SupervisorConfig};
