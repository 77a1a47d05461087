//! Tail a log file into a [`LogBuffer`].
//!
//! The watched file does not have to exist yet: the watcher appends a
//! sentinel line, polls until the file appears, then tails it from its end.
//! Only complete lines are appended; a partially written last line is held
//! until its newline arrives. A file truncated in place is re-read from the
//! start.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ralph_core::Settings;
use ralph_core::settings::{DEFAULT_WATCH_POLL_INTERVAL_MS, DEFAULT_WATCH_WAIT_INTERVAL_MS};
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::buffer::LogBuffer;
use crate::process::stream::trim_line_ending;

/// Polling intervals of a file watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Idle poll once the watcher reached end of file.
    pub poll_interval: Duration,
    /// Existence poll while waiting for the file to appear.
    pub wait_interval: Duration,
}

impl WatcherConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.effective_watch_poll_interval(),
            wait_interval: settings.effective_watch_wait_interval(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_WATCH_POLL_INTERVAL_MS),
            wait_interval: Duration::from_millis(DEFAULT_WATCH_WAIT_INTERVAL_MS),
        }
    }
}

/// Background task tailing one file into one buffer.
///
/// Once stopped a watcher never appends again. Watchers are not restarted.
#[derive(Debug)]
pub struct LogFileWatcher {
    path: PathBuf,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LogFileWatcher {
    /// Start tailing `path` into `buffer`. Must be called within a tokio
    /// runtime.
    pub fn spawn(path: impl Into<PathBuf>, buffer: Arc<LogBuffer>, config: WatcherConfig) -> Self {
        let path = path.into();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watch(path.clone(), buffer, config, cancel.clone()));
        debug!(path = %path.display(), "Started log file watcher");
        Self {
            path,
            cancel,
            handle,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Signal the watcher to stop. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }

    /// Stop the watcher and wait for its task to end.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.handle.await {
            warn!(path = %self.path.display(), error = %e, "Log file watcher task failed");
        }
    }
}

async fn watch(path: PathBuf, buffer: Arc<LogBuffer>, config: WatcherConfig, cancel: CancellationToken) {
    if let Err(e) = tail(&path, &buffer, config, &cancel).await {
        if !cancel.is_cancelled() {
            warn!(path = %path.display(), error = %e, "Log file watcher failed");
            buffer.append(format!("[LOG ERROR] Failed to watch {}: {e}", path.display()));
        }
    }
    debug!(path = %path.display(), "Log file watcher exiting");
}

/// Sleep for `interval` unless cancelled first. Returns `false` if cancelled.
async fn idle(interval: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = sleep(interval) => true,
    }
}

async fn tail(
    path: &Path,
    buffer: &LogBuffer,
    config: WatcherConfig,
    cancel: &CancellationToken,
) -> io::Result<()> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        buffer.append(format!("[LOG] Waiting for log file: {}", path.display()));
        loop {
            if !idle(config.wait_interval, cancel).await {
                return Ok(());
            }
            if fs::try_exists(path).await.unwrap_or(false) {
                break;
            }
        }
    }
    if cancel.is_cancelled() {
        return Ok(());
    }

    let mut file = File::open(path).await?;
    let mut pos = file.seek(SeekFrom::End(0)).await?;
    let mut reader = BufReader::new(file);
    let mut pending: Vec<u8> = Vec::with_capacity(1024);

    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let read = reader.read_until(b'\n', &mut pending).await?;
        if read == 0 {
            let len = reader.get_ref().metadata().await?.len();
            if len < pos {
                debug!(path = %path.display(), "Log file truncated, reading from start");
                pos = reader.seek(SeekFrom::Start(0)).await?;
                pending.clear();
                continue;
            }
            if !idle(config.poll_interval, cancel).await {
                return Ok(());
            }
            continue;
        }

        pos += read as u64;
        if pending.last() != Some(&b'\n') {
            // Partial line; wait for the rest.
            continue;
        }

        trim_line_ending(&mut pending);
        let line = String::from_utf8_lossy(&pending).into_owned();
        pending.clear();
        if cancel.is_cancelled() {
            return Ok(());
        }
        buffer.append(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn fast() -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_millis(10),
            wait_interval: Duration::from_millis(10),
        }
    }

    async fn wait_for_lines(buffer: &LogBuffer, n: usize) {
        for _ in 0..300 {
            if buffer.len() >= n {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }

    fn append_to(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_sentinel_then_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ralph.log");
        let buffer = Arc::new(LogBuffer::new(100));

        let watcher = LogFileWatcher::spawn(&path, Arc::clone(&buffer), fast());
        wait_for_lines(&buffer, 1).await;
        assert_eq!(
            buffer.get_all(),
            vec![format!("[LOG] Waiting for log file: {}", path.display())]
        );

        std::fs::write(&path, "").unwrap();
        // Let the watcher open the file and seek to its end.
        sleep(Duration::from_millis(100)).await;
        append_to(&path, "hello\nworld\n");
        wait_for_lines(&buffer, 3).await;
        assert_eq!(buffer.get_recent(2), vec!["hello", "world"]);

        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_tails_from_end_and_joins_partial_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ralph.log");
        std::fs::write(&path, "old line\n").unwrap();
        let buffer = Arc::new(LogBuffer::new(100));

        let watcher = LogFileWatcher::spawn(&path, Arc::clone(&buffer), fast());
        sleep(Duration::from_millis(100)).await;

        append_to(&path, "par");
        sleep(Duration::from_millis(50)).await;
        append_to(&path, "tial\r\n");
        wait_for_lines(&buffer, 1).await;

        assert_eq!(buffer.get_all(), vec!["partial"]);
        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_stopped_watcher_never_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ralph.log");
        std::fs::write(&path, "").unwrap();
        let buffer = Arc::new(LogBuffer::new(100));

        let watcher = LogFileWatcher::spawn(&path, Arc::clone(&buffer), fast());
        sleep(Duration::from_millis(50)).await;
        assert!(watcher.is_running());
        watcher.stop();
        assert!(!watcher.is_running());
        watcher.shutdown().await;

        append_to(&path, "after stop\n");
        sleep(Duration::from_millis(50)).await;
        assert_eq!(buffer.count(), 0);
    }

    #[tokio::test]
    async fn test_config_from_settings() {
        let settings = Settings {
            watch_poll_interval_ms: Some(25),
            ..Settings::default()
        };
        let config = WatcherConfig::from_settings(&settings);
        assert_eq!(config.poll_interval, Duration::from_millis(25));
        assert_eq!(config.wait_interval, WatcherConfig::default().wait_interval);
    }
}
