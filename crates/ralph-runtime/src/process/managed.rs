//! One supervised external process.
//!
//! A `ManagedProcess` owns the lifecycle state of one OS child. After
//! `start()` the child is driven by background tasks:
//!
//! - one reader per output pipe, forwarding lines to the observer registry
//! - an exit waiter owning the `Child`, which records the exit code, waits
//!   for the readers to drain and then notifies exit observers
//! - an optional stdin responder writing scripted responses
//!
//! Control operations (`stop`, `pause`, `resume`) act on the PID and never
//! block on the tasks.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use ralph_core::{ProcessError, ProcessInfo, ProcessStatus, StreamKind};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::env::apply_sanitized_env;
use super::observers::ObserverRegistry;
use super::shutdown::terminate_with_escalation;
use super::signals;
use super::stream::spawn_stream_reader;
use super::types::{LaunchSpec, SupervisorConfig};

/// How long the exit waiter lets readers drain after the child exits.
///
/// Grandchildren that inherited the pipes can keep them open indefinitely.
const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct ProcessState {
    status: ProcessStatus,
    pid: Option<u32>,
    started_at: Option<DateTime<Utc>>,
    exit_code: Option<i32>,
    started: bool,
    stop_requested: bool,
}

/// A supervised process bound to a project.
pub struct ManagedProcess {
    project: String,
    command: Vec<String>,
    cwd: PathBuf,
    auto_respond: Vec<String>,
    config: SupervisorConfig,
    observers: Arc<ObserverRegistry>,
    state: Mutex<ProcessState>,
    exit_tx: watch::Sender<Option<i32>>,
    /// Cancelled to make the exit waiter force-kill the child.
    kill: CancellationToken,
    /// Cancelled to end the reader and responder tasks.
    cancel: CancellationToken,
}

impl ManagedProcess {
    /// Create an idle process. Nothing is spawned until [`start`](Self::start).
    #[must_use]
    pub fn new(spec: LaunchSpec, config: SupervisorConfig, observers: Arc<ObserverRegistry>) -> Self {
        let (exit_tx, _) = watch::channel(None);
        Self {
            project: spec.project,
            command: spec.command,
            cwd: spec.cwd,
            auto_respond: spec.auto_respond,
            config,
            observers,
            state: Mutex::new(ProcessState::default()),
            exit_tx,
            kill: CancellationToken::new(),
            cancel: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn status(&self) -> ProcessStatus {
        self.state().status
    }

    pub fn pid(&self) -> Option<u32> {
        self.state().pid
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.state().exit_code
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state().started_at
    }

    /// Whether the OS process is alive (running or paused).
    pub fn is_running(&self) -> bool {
        self.status().is_live()
    }

    /// Serializable snapshot.
    pub fn info(&self) -> ProcessInfo {
        let state = self.state();
        ProcessInfo {
            project: self.project.clone(),
            pid: state.pid,
            command: self.command.clone(),
            cwd: self.cwd.clone(),
            status: state.status,
            started_at: state.started_at,
            exit_code: state.exit_code,
        }
    }

    /// Wait for the process to exit and return its exit code.
    ///
    /// Returns `None` immediately for a process that never started.
    pub async fn wait(&self) -> Option<i32> {
        if !self.state().started {
            return *self.exit_tx.borrow();
        }
        let mut rx = self.exit_tx.subscribe();
        rx.wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|code| *code)
    }

    fn fail(&self, err: ProcessError) -> ProcessError {
        self.state().status = ProcessStatus::Error;
        warn!(project = %self.project, error = %err, "Failed to start process");
        err
    }

    /// Spawn the process and its background tasks.
    ///
    /// On failure the status becomes `Error` and nothing keeps running.
    /// Starting an already started process is a no-op.
    pub fn start(self: &Arc<Self>) -> Result<(), ProcessError> {
        if self.state().started {
            debug!(project = %self.project, "Process already started");
            return Ok(());
        }

        let Some(program) = self.command.first() else {
            return Err(self.fail(ProcessError::EmptyCommand));
        };
        if !self.cwd.is_dir() {
            return Err(self.fail(ProcessError::WorkingDirectoryNotFound(self.cwd.clone())));
        }

        let mut cmd = Command::new(program);
        cmd.args(&self.command[1..])
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        apply_sanitized_env(&mut cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| self.fail(ProcessError::from_spawn_error(program, &e)))?;

        let pid = child.id();
        {
            let mut state = self.state();
            state.started = true;
            state.status = ProcessStatus::Running;
            state.pid = pid;
            state.started_at = Some(Utc::now());
        }
        info!(
            project = %self.project,
            pid = ?pid,
            command = %self.command.join(" "),
            cwd = %self.cwd.display(),
            "Process started"
        );

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_stream_reader(
                stdout,
                self.project.clone(),
                StreamKind::Stdout,
                Arc::clone(&self.observers),
                self.cancel.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_stream_reader(
                stderr,
                self.project.clone(),
                StreamKind::Stderr,
                Arc::clone(&self.observers),
                self.cancel.clone(),
            ));
        }

        let mut parked_stdin = child.stdin.take();
        if !self.auto_respond.is_empty() {
            if let Some(stdin) = parked_stdin.take() {
                tokio::spawn(Arc::clone(self).respond(stdin));
            }
        }

        tokio::spawn(Arc::clone(self).wait_child(child, readers, parked_stdin));
        Ok(())
    }

    /// Exit waiter. `stdin` is held open until the child exits.
    async fn wait_child(
        self: Arc<Self>,
        mut child: Child,
        readers: Vec<JoinHandle<()>>,
        stdin: Option<ChildStdin>,
    ) {
        let status = tokio::select! {
            status = child.wait() => status,
            () = self.kill.cancelled() => {
                if let Err(e) = child.start_kill() {
                    debug!(project = %self.project, error = %e, "Kill failed, process likely exited");
                }
                child.wait().await
            }
        };
        drop(stdin);

        let code = match status {
            Ok(status) => exit_code_of(status),
            Err(e) => {
                warn!(project = %self.project, error = %e, "Failed to wait for process");
                -1
            }
        };
        self.record_exit(code);

        if timeout(READER_DRAIN_TIMEOUT, join_all(readers)).await.is_err() {
            debug!(project = %self.project, "Output pipes still open after exit, cancelling readers");
            self.cancel.cancel();
        }

        self.observers.emit_exit(&self.project, code);
    }

    fn record_exit(&self, code: i32) {
        let status = {
            let mut state = self.state();
            state.exit_code = Some(code);
            state.status = if state.stop_requested {
                ProcessStatus::Idle
            } else {
                ProcessStatus::from_exit_code(code)
            };
            state.status
        };
        self.exit_tx.send_replace(Some(code));
        info!(project = %self.project, exit_code = code, status = %status, "Process exited");
    }

    /// Stdin responder: one response per settle delay, written verbatim.
    async fn respond(self: Arc<Self>, mut stdin: ChildStdin) {
        for response in &self.auto_respond {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return,
                () = sleep(self.config.auto_respond_delay) => {}
            }

            if !self.is_running() {
                debug!(project = %self.project, "Process gone, dropping remaining responses");
                return;
            }

            let written = match stdin.write_all(response.as_bytes()).await {
                Ok(()) => stdin.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                debug!(project = %self.project, error = %e, "Stdin closed, stopping responder");
                return;
            }
            debug!(project = %self.project, response = ?response, "Sent scripted response");
        }

        // Keep stdin open until the process is gone.
        let mut exit_rx = self.exit_tx.subscribe();
        tokio::select! {
            () = self.cancel.cancelled() => {}
            _ = exit_rx.wait_for(Option::is_some) => {}
        }
    }

    /// Terminate the process: SIGTERM, then a forceful kill if it does not
    /// exit in time. The status becomes `Idle` either way.
    ///
    /// Returns `false` without doing anything when the process is not
    /// running or paused, or when a stop is already in progress.
    pub async fn stop(&self) -> bool {
        let (pid, paused) = {
            let mut state = self.state();
            if !state.status.is_live() || state.stop_requested {
                return false;
            }
            state.stop_requested = true;
            (state.pid, state.status == ProcessStatus::Paused)
        };

        info!(project = %self.project, pid = ?pid, "Stopping process");
        let outcome = match pid {
            Some(pid) => Some(
                terminate_with_escalation(
                    &self.project,
                    pid,
                    paused,
                    self.exit_tx.subscribe(),
                    &self.kill,
                    &self.config,
                )
                .await,
            ),
            None => None,
        };

        self.state().status = ProcessStatus::Idle;
        self.cancel.cancel();
        info!(project = %self.project, outcome = ?outcome, "Process stopped");
        true
    }

    /// Suspend a running process (SIGSTOP).
    pub fn pause(&self) -> bool {
        let mut state = self.state();
        if state.status != ProcessStatus::Running {
            return false;
        }
        let Some(pid) = state.pid else {
            return false;
        };
        match signals::suspend(pid) {
            Ok(()) => {
                state.status = ProcessStatus::Paused;
                info!(project = %self.project, pid = %pid, "Process paused");
                true
            }
            Err(e) => {
                warn!(project = %self.project, pid = %pid, error = %e, "Failed to pause process");
                false
            }
        }
    }

    /// Continue a paused process (SIGCONT).
    pub fn resume(&self) -> bool {
        let mut state = self.state();
        if state.status != ProcessStatus::Paused {
            return false;
        }
        let Some(pid) = state.pid else {
            return false;
        };
        match signals::resume(pid) {
            Ok(()) => {
                state.status = ProcessStatus::Running;
                info!(project = %self.project, pid = %pid, "Process resumed");
                true
            }
            Err(e) => {
                warn!(project = %self.project, pid = %pid, error = %e, "Failed to resume process");
                false
            }
        }
    }
}

impl std::fmt::Debug for ManagedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ManagedProcess")
            .field("project", &self.project)
            .field("command", &self.command)
            .field("status", &state.status)
            .field("pid", &state.pid)
            .finish_non_exhaustive()
    }
}

/// Exit code of a finished child; a signal-terminated child reports
/// `-signum`.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.signal().map_or(-1, |sig| -sig)
    }

    #[cfg(not(unix))]
    {
        -1
    }
}
