//! Graceful termination with SIGTERM → kill escalation.
//!
//! The `Child` handle is owned by the exit waiter task, so termination works
//! by PID plus two channels: the waiter publishes the exit code on a `watch`
//! channel, and cancelling `kill` makes the waiter force-kill its child.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::signals::{self, SignalError};
use super::types::SupervisorConfig;

/// How a termination request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The process had exited before any signal landed.
    AlreadyGone,
    /// The process exited within the grace period after SIGTERM.
    Graceful,
    /// The process was force-killed and reaped.
    Forced,
    /// The process did not report an exit even after the forceful kill.
    Unresponsive,
}

/// Wait until the exit channel carries a code, up to `limit`.
///
/// A dropped sender means the waiter is gone, which only happens after it
/// published; that counts as exited.
async fn wait_exit(exit_rx: &mut watch::Receiver<Option<i32>>, limit: Duration) -> bool {
    timeout(limit, exit_rx.wait_for(Option::is_some))
        .await
        .is_ok()
}

/// Terminate `pid`: SIGTERM, wait `stop_timeout`, force kill, wait
/// `kill_timeout`.
///
/// A paused process gets SIGCONT right after SIGTERM so the signal is
/// actually delivered.
pub(crate) async fn terminate_with_escalation(
    project: &str,
    pid: u32,
    paused: bool,
    mut exit_rx: watch::Receiver<Option<i32>>,
    kill: &CancellationToken,
    config: &SupervisorConfig,
) -> ShutdownOutcome {
    if exit_rx.borrow().is_some() {
        return ShutdownOutcome::AlreadyGone;
    }

    let term_sent = match signals::terminate(pid) {
        Ok(()) => true,
        Err(SignalError::ProcessGone { .. }) => {
            debug!(project = %project, pid = %pid, "Process already gone before SIGTERM");
            // The waiter still has to reap and publish.
            wait_exit(&mut exit_rx, config.kill_timeout).await;
            return ShutdownOutcome::AlreadyGone;
        }
        Err(e) => {
            warn!(project = %project, pid = %pid, error = %e, "SIGTERM failed, escalating");
            false
        }
    };

    if term_sent && paused {
        if let Err(e) = signals::resume(pid) {
            if !e.is_gone() {
                warn!(project = %project, pid = %pid, error = %e, "SIGCONT after SIGTERM failed");
            }
        }
    }

    if term_sent && wait_exit(&mut exit_rx, config.stop_timeout).await {
        return ShutdownOutcome::Graceful;
    }

    warn!(
        project = %project,
        pid = %pid,
        timeout_secs = config.stop_timeout.as_secs(),
        "Process did not exit after SIGTERM, killing"
    );
    kill.cancel();

    if wait_exit(&mut exit_rx, config.kill_timeout).await {
        ShutdownOutcome::Forced
    } else {
        warn!(project = %project, pid = %pid, "Process did not exit after kill");
        ShutdownOutcome::Unresponsive
    }
}
