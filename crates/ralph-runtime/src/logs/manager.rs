//! Per-project log buffers and file watchers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use ralph_core::{DEFAULT_LOG_MAX_LINES, LogLevel, ProcessObserver, Settings, StreamKind};
use tracing::{debug, info};

use super::buffer::LogBuffer;
use super::file;
use super::watcher::{LogFileWatcher, WatcherConfig};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One lazily created buffer per project, plus any number of file watchers
/// feeding it.
///
/// Registered as a process observer, every line a supervised process prints
/// lands in its project's buffer.
#[derive(Debug)]
pub struct ProjectLogManager {
    max_lines: usize,
    watcher_config: WatcherConfig,
    buffers: Mutex<HashMap<String, Arc<LogBuffer>>>,
    watchers: Mutex<HashMap<String, Vec<LogFileWatcher>>>,
}

impl ProjectLogManager {
    /// Create a manager whose buffers retain `max_lines` lines each.
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self::with_watcher_config(max_lines, WatcherConfig::default())
    }

    #[must_use]
    pub fn with_watcher_config(max_lines: usize, watcher_config: WatcherConfig) -> Self {
        Self {
            max_lines,
            watcher_config,
            buffers: Mutex::new(HashMap::new()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_watcher_config(
            settings.effective_log_max_lines(),
            WatcherConfig::from_settings(settings),
        )
    }

    /// Buffer of `project`, created on first use.
    pub fn get_buffer(&self, project: &str) -> Arc<LogBuffer> {
        let mut buffers = lock(&self.buffers);
        Arc::clone(
            buffers
                .entry(project.to_string())
                .or_insert_with(|| Arc::new(LogBuffer::new(self.max_lines))),
        )
    }

    /// Append a line to the project's buffer.
    pub fn add_line(&self, project: &str, line: &str) {
        self.get_buffer(project).append(line);
    }

    /// Start tailing `path` into the project's buffer. Watchers accumulate;
    /// call [`stop_watchers`](Self::stop_watchers) to end them.
    pub fn watch_file(&self, project: &str, path: impl Into<PathBuf>) {
        let path = path.into();
        let buffer = self.get_buffer(project);
        info!(project = %project, path = %path.display(), "Watching log file");
        let watcher = LogFileWatcher::spawn(path, buffer, self.watcher_config);
        lock(&self.watchers)
            .entry(project.to_string())
            .or_default()
            .push(watcher);
    }

    /// Recent lines of `project`, filtered.
    ///
    /// `count == 0` selects the whole buffer, otherwise the most recent
    /// `count` lines. The keyword and level filters are case-insensitive
    /// substring matches applied after the count. An unknown project has no
    /// lines.
    pub fn get_logs(
        &self,
        project: &str,
        count: usize,
        keyword: Option<&str>,
        level: Option<LogLevel>,
    ) -> Vec<String> {
        let Some(buffer) = lock(&self.buffers).get(project).cloned() else {
            return Vec::new();
        };

        let mut lines = if count == 0 {
            buffer.get_all()
        } else {
            buffer.get_recent(count)
        };

        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            let keyword = keyword.to_lowercase();
            lines.retain(|line| line.to_lowercase().contains(&keyword));
        }
        if let Some(level) = level {
            lines.retain(|line| level.matches_text(line));
        }

        lines
    }

    /// One-shot paged read of a log file.
    pub async fn read_log_file(&self, path: &Path, max_lines: usize, offset: usize) -> Vec<String> {
        file::read_log_file(path, max_lines, offset).await
    }

    /// Empty the project's buffer. Files are untouched.
    pub fn clear_buffer(&self, project: &str) {
        if let Some(buffer) = lock(&self.buffers).get(project) {
            buffer.clear();
        }
    }

    /// Number of watchers currently attached to `project`.
    pub fn watcher_count(&self, project: &str) -> usize {
        lock(&self.watchers).get(project).map_or(0, Vec::len)
    }

    /// Projects that have a buffer, sorted.
    pub fn projects(&self) -> Vec<String> {
        let mut projects: Vec<String> = lock(&self.buffers).keys().cloned().collect();
        projects.sort();
        projects
    }

    /// Stop every watcher of `project` and wait for them to end.
    pub async fn stop_watchers(&self, project: &str) {
        let watchers = lock(&self.watchers).remove(project).unwrap_or_default();
        if watchers.is_empty() {
            return;
        }
        debug!(project = %project, count = watchers.len(), "Stopping log file watchers");
        for watcher in &watchers {
            watcher.stop();
        }
        join_all(watchers.into_iter().map(LogFileWatcher::shutdown)).await;
    }

    /// Stop every watcher of every project.
    pub async fn shutdown(&self) {
        let all: Vec<LogFileWatcher> = lock(&self.watchers)
            .drain()
            .flat_map(|(_, watchers)| watchers)
            .collect();
        if all.is_empty() {
            return;
        }
        info!(count = all.len(), "Stopping all log file watchers");
        for watcher in &all {
            watcher.stop();
        }
        join_all(all.into_iter().map(LogFileWatcher::shutdown)).await;
    }
}

impl Default for ProjectLogManager {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_MAX_LINES)
    }
}

impl ProcessObserver for ProjectLogManager {
    fn on_output(&self, project: &str, _stream: StreamKind, line: &str) -> anyhow::Result<()> {
        self.add_line(project, line);
        Ok(())
    }
}
