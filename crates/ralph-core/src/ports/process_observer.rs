//! Observer port for supervised process output and exit events.
//!
//! The log layer and any broadcast layer subscribe through this port so the
//! process core never depends on them.

use crate::domain::StreamKind;

/// Receives output and exit events from every supervised process.
///
/// Implementations must be thread-safe and should return promptly: they are
/// called inline from the reader and exit-waiter tasks. An error or a panic
/// from one observer is logged by the caller and does not affect other
/// observers or the task that delivered the event.
pub trait ProcessObserver: Send + Sync {
    /// One line captured from a process output stream.
    ///
    /// # Arguments
    ///
    /// * `project` - Project the process is bound to
    /// * `stream` - Which pipe the line came from
    /// * `line` - The line content (without trailing newline)
    fn on_output(&self, project: &str, stream: StreamKind, line: &str) -> anyhow::Result<()> {
        let _ = (project, stream, line);
        Ok(())
    }

    /// The process bound to `project` exited with `exit_code`.
    fn on_exit(&self, project: &str, exit_code: i32) -> anyhow::Result<()> {
        let _ = (project, exit_code);
        Ok(())
    }
}
