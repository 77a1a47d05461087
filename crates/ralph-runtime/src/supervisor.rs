//! Composition root wiring processes, logs and events together.
//!
//! A `Supervisor` is built once per application and torn down explicitly
//! with [`Supervisor::shutdown`]. It registers the log manager and the event
//! broadcaster as observers of the process manager, so every captured line
//! lands in its project's buffer and on the event channel.

use std::path::PathBuf;
use std::sync::Arc;

use ralph_core::{ProcessError, ProcessStatus, Settings};
use tracing::info;

use crate::broadcaster::ProcessEventBroadcaster;
use crate::logs::{LogSubscription, ProjectLogManager, find_log_files};
use crate::process::{LaunchSpec, ManagedProcess, ProcessManager, SupervisorConfig};

/// Process manager, log manager and event broadcaster of one application.
#[derive(Debug)]
pub struct Supervisor {
    processes: ProcessManager,
    logs: Arc<ProjectLogManager>,
    events: Arc<ProcessEventBroadcaster>,
    history_lines: usize,
}

impl Supervisor {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let processes = ProcessManager::with_config(SupervisorConfig::from_settings(settings));
        let logs = Arc::new(ProjectLogManager::from_settings(settings));
        let events = Arc::new(ProcessEventBroadcaster::new());

        processes.register(logs.clone());
        processes.register(events.clone());

        Self {
            processes,
            logs,
            events,
            history_lines: settings.effective_history_lines(),
        }
    }

    pub const fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    pub fn logs(&self) -> &ProjectLogManager {
        &self.logs
    }

    pub fn events(&self) -> &ProcessEventBroadcaster {
        &self.events
    }

    /// Launch a project and tail its log files.
    ///
    /// Watchers from a previous launch are stopped first. The project's log
    /// files are discovered under its working directory; `extra_logs` are
    /// watched as well, whether or not they exist yet.
    pub async fn launch_project(
        &self,
        spec: LaunchSpec,
        extra_logs: &[PathBuf],
    ) -> Result<Arc<ManagedProcess>, ProcessError> {
        let project = spec.project.clone();
        let project_dir = spec.cwd.clone();

        self.logs.stop_watchers(&project).await;
        let process = self.processes.launch(spec).await?;

        let discovered = find_log_files(&project_dir);
        info!(
            project = %project,
            pid = ?process.pid(),
            log_files = discovered.len() + extra_logs.len(),
            "Project launched"
        );
        for path in discovered.into_iter().chain(extra_logs.iter().cloned()) {
            self.logs.watch_file(&project, path);
        }

        Ok(process)
    }

    /// Stop a project's process and, if one was stopped, its watchers.
    pub async fn stop_project(&self, project: &str) -> bool {
        let stopped = self.processes.stop(project).await;
        if stopped {
            self.logs.stop_watchers(project).await;
        }
        stopped
    }

    pub async fn status(&self, project: &str) -> ProcessStatus {
        self.processes.get_status(project).await
    }

    /// Subscribe to a project's log stream.
    pub fn subscribe_logs(&self, project: &str) -> LogSubscription {
        LogSubscription::new(project, self.logs.get_buffer(project), self.history_lines)
    }

    /// Stop every process, then every watcher.
    pub async fn shutdown(&self) {
        info!("Supervisor shutting down");
        self.processes.shutdown_all().await;
        self.logs.shutdown().await;
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(&Settings::with_defaults())
    }
}
