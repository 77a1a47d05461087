//! Process event broadcasting for live consumers.
//!
//! The broadcaster is a process observer: registered on the
//! `ProcessManager`, it republishes every output line and exit as a
//! [`ProcessEvent`] on a `tokio::sync::broadcast` channel.

use ralph_core::{ProcessEvent, ProcessObserver, StreamKind};
use tokio::sync::broadcast;
use tracing::debug;

/// Events a receiver may fall behind by before it sees
/// `RecvError::Lagged` and skips ahead.
const CHANNEL_CAPACITY: usize = 1024;

/// Fans process events out to any number of live receivers.
///
/// Publishing never blocks and never fails: with no receiver the event is
/// simply dropped.
#[derive(Debug)]
pub struct ProcessEventBroadcaster {
    sender: broadcast::Sender<ProcessEvent>,
}

impl ProcessEventBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish `event`; returns how many receivers it was queued for.
    pub fn broadcast(&self, event: ProcessEvent) -> usize {
        if let ProcessEvent::Exited { project, exit_code } = &event {
            debug!(project = %project, exit_code, "Publishing exit event");
        }
        self.sender.send(event).unwrap_or(0)
    }

    /// A new receiver sees every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProcessEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessObserver for ProcessEventBroadcaster {
    fn on_output(&self, project: &str, stream: StreamKind, line: &str) -> anyhow::Result<()> {
        // Output is the hot path; skip building the event when nobody listens.
        if self.subscriber_count() > 0 {
            self.broadcast(ProcessEvent::output(project, stream, line));
        }
        Ok(())
    }

    fn on_exit(&self, project: &str, exit_code: i32) -> anyhow::Result<()> {
        self.broadcast(ProcessEvent::exited(project, exit_code));
        Ok(())
    }
}
