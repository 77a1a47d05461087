//! One-shot paged reads of log files.

use std::io;
use std::path::Path;

use tracing::{debug, error};

/// Default page size of [`read_log_file`].
pub const DEFAULT_PAGE_LINES: usize = 1000;

/// Read up to `max_lines` lines of `path`, skipping the first `offset`.
///
/// Invalid UTF-8 is replaced. A missing file yields no lines; any other read
/// failure is logged and also yields no lines.
pub async fn read_log_file(path: &Path, max_lines: usize, offset: usize) -> Vec<String> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Log file does not exist");
            return Vec::new();
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read log file");
            return Vec::new();
        }
    };

    String::from_utf8_lossy(&bytes)
        .lines()
        .skip(offset)
        .take(max_lines)
        .map(str::to_owned)
        .collect()
}
