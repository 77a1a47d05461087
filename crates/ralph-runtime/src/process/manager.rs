//! Process manager: at most one supervised process per project.
//!
//! `launch` replaces: a live process already bound to the project is stopped
//! before the new one starts. The project map is guarded by one async mutex
//! held across every lifecycle change (launch, stop, pause, resume and
//! shutdown), so a launch never overlaps a stop of the same project. Queries
//! only hold it long enough to copy a handle.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use ralph_core::{ProcessError, ProcessObserver, ProcessStatus, StreamKind};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::managed::ManagedProcess;
use super::observers::{ExitFn, ObserverRegistry, OutputFn};
use super::types::{LaunchSpec, SupervisorConfig};

/// Supervises one process per project and fans their events out to the
/// registered observers.
#[derive(Debug)]
pub struct ProcessManager {
    processes: Mutex<HashMap<String, Arc<ManagedProcess>>>,
    observers: Arc<ObserverRegistry>,
    config: SupervisorConfig,
}

impl ProcessManager {
    /// Create a manager with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SupervisorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: SupervisorConfig) -> Self {
        Self {
            processes: Mutex::new(HashMap::new()),
            observers: Arc::new(ObserverRegistry::new()),
            config,
        }
    }

    pub const fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Register an observer for output and exit events of every process,
    /// including processes launched before the call.
    pub fn register(&self, observer: Arc<dyn ProcessObserver>) {
        self.observers.register(observer);
    }

    /// Register an output callback `(project, stream, line)`.
    pub fn on_output<F>(&self, callback: F)
    where
        F: Fn(&str, StreamKind, &str) + Send + Sync + 'static,
    {
        self.register(Arc::new(OutputFn(callback)));
    }

    /// Register an exit callback `(project, exit_code)`.
    pub fn on_exit<F>(&self, callback: F)
    where
        F: Fn(&str, i32) + Send + Sync + 'static,
    {
        self.register(Arc::new(ExitFn(callback)));
    }

    /// Launch a process for `spec.project`, replacing any live one.
    ///
    /// The new process is registered even if it fails to start, so its
    /// `Error` status stays queryable; the error is returned to the caller.
    pub async fn launch(&self, spec: LaunchSpec) -> Result<Arc<ManagedProcess>, ProcessError> {
        let mut processes = self.processes.lock().await;

        if let Some(old) = processes.get(&spec.project) {
            self.retire(old).await;
        }

        let project = spec.project.clone();
        let process = Arc::new(ManagedProcess::new(
            spec,
            self.config,
            Arc::clone(&self.observers),
        ));
        let started = process.start();
        processes.insert(project, Arc::clone(&process));

        started.map(|()| process)
    }

    /// Make sure `old` is gone before its replacement starts.
    ///
    /// A stop started elsewhere (directly on the handle) makes `stop()`
    /// return `false` while the process is still alive; wait for that stop
    /// to finish instead.
    async fn retire(&self, old: &ManagedProcess) {
        if !old.is_running() {
            return;
        }
        info!(project = %old.project(), "Replacing running process");
        if old.stop().await {
            return;
        }

        let limit = self.config.stop_timeout + self.config.kill_timeout;
        if timeout(limit, old.wait()).await.is_err() {
            warn!(project = %old.project(), pid = ?old.pid(), "Previous process still alive after stop");
        }
    }

    /// Process currently bound to `project`, live or not.
    pub async fn get_process(&self, project: &str) -> Option<Arc<ManagedProcess>> {
        self.processes.lock().await.get(project).cloned()
    }

    /// Stop the process bound to `project`. Returns `false` if there is no
    /// live process.
    ///
    /// Holds the project map for the whole stop, so a concurrent `launch`
    /// only starts its process once this one has exited.
    pub async fn stop(&self, project: &str) -> bool {
        let processes = self.processes.lock().await;
        match processes.get(project) {
            Some(process) => process.stop().await,
            None => false,
        }
    }

    pub async fn pause(&self, project: &str) -> bool {
        let processes = self.processes.lock().await;
        processes.get(project).is_some_and(|process| process.pause())
    }

    pub async fn resume(&self, project: &str) -> bool {
        let processes = self.processes.lock().await;
        processes.get(project).is_some_and(|process| process.resume())
    }

    /// Status of the process bound to `project`; `Idle` if none was ever
    /// launched.
    pub async fn get_status(&self, project: &str) -> ProcessStatus {
        self.get_process(project)
            .await
            .map_or(ProcessStatus::Idle, |process| process.status())
    }

    /// Live (running or paused) processes by project.
    pub async fn list_active(&self) -> HashMap<String, Arc<ManagedProcess>> {
        self.processes
            .lock()
            .await
            .iter()
            .filter(|(_, process)| process.is_running())
            .map(|(project, process)| (project.clone(), Arc::clone(process)))
            .collect()
    }

    /// Stop every live process concurrently.
    pub async fn shutdown_all(&self) {
        let processes = self.processes.lock().await;
        let active: Vec<&Arc<ManagedProcess>> = processes
            .values()
            .filter(|process| process.is_running())
            .collect();
        if active.is_empty() {
            debug!("No live processes to stop");
            return;
        }

        info!(count = active.len(), "Stopping all processes");
        join_all(active.into_iter().map(|process| process.stop())).await;
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}
