//! Signal delivery to supervised processes by PID.
//!
//! Signal failures are never fatal: callers log them and carry on. A
//! process that is already gone reports `SignalError::ProcessGone`, which
//! callers treat as success where that makes sense (stop).

use thiserror::Error;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Failure to deliver a signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// No such process (ESRCH).
    #[error("process {pid} no longer exists")]
    ProcessGone { pid: u32 },

    /// Job control signals are not available on this platform.
    #[error("{signal} is not supported on this platform")]
    Unsupported { signal: &'static str },

    /// Any other delivery failure.
    #[error("failed to send {signal} to process {pid}: {reason}")]
    Failed {
        pid: u32,
        signal: &'static str,
        reason: String,
    },
}

impl SignalError {
    /// Whether the target process had already exited.
    #[must_use]
    pub const fn is_gone(&self) -> bool {
        matches!(self, Self::ProcessGone { .. })
    }
}

#[cfg(unix)]
fn send(pid: u32, sig: Signal) -> Result<(), SignalError> {
    let raw = i32::try_from(pid).map_err(|_| SignalError::Failed {
        pid,
        signal: sig.as_str(),
        reason: "pid out of range".to_string(),
    })?;

    match signal::kill(Pid::from_raw(raw), sig) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(SignalError::ProcessGone { pid }),
        Err(e) => Err(SignalError::Failed {
            pid,
            signal: sig.as_str(),
            reason: e.to_string(),
        }),
    }
}

/// Ask the process to terminate (SIGTERM).
pub fn terminate(pid: u32) -> Result<(), SignalError> {
    #[cfg(unix)]
    {
        send(pid, Signal::SIGTERM)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(SignalError::Unsupported { signal: "SIGTERM" })
    }
}

/// Suspend the process (SIGSTOP).
pub fn suspend(pid: u32) -> Result<(), SignalError> {
    #[cfg(unix)]
    {
        send(pid, Signal::SIGSTOP)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(SignalError::Unsupported { signal: "SIGSTOP" })
    }
}

/// Continue a suspended process (SIGCONT).
pub fn resume(pid: u32) -> Result<(), SignalError> {
    #[cfg(unix)]
    {
        send(pid, Signal::SIGCONT)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(SignalError::Unsupported { signal: "SIGCONT" })
    }
}
