//! `ralph tail`: follow a log file until interrupted.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use ralph_runtime::{LogBuffer, LogFileWatcher, LogSubscription, WatcherConfig};
use tracing::warn;

use crate::bootstrap::CliContext;

use super::print_lines;

pub async fn execute(ctx: &CliContext, file: &Path) -> Result<()> {
    let buffer = Arc::new(LogBuffer::new(ctx.settings().effective_log_max_lines()));
    let mut subscription = LogSubscription::new(file.display().to_string(), Arc::clone(&buffer), 0);
    let watcher = LogFileWatcher::spawn(
        file,
        buffer,
        WatcherConfig::from_settings(ctx.settings()),
    );

    let result = loop {
        tokio::select! {
            message = subscription.next() => {
                if let Err(e) = print_lines(message.lines()) {
                    break Err(e.into());
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break Ok(());
            }
        }
    };

    watcher.shutdown().await;
    result
}
