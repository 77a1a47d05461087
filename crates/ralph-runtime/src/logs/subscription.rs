//! History-then-delta log subscriptions.
//!
//! A subscriber first receives the most recent lines of a project as one
//! `log_history` message, then `log` messages carrying exactly the lines
//! appended since the previous message.

use std::sync::Arc;

use ralph_core::LogStreamMessage;
use tokio::sync::watch;
use tracing::warn;

use super::buffer::LogBuffer;

/// Live view of one project's log buffer.
#[derive(Debug)]
pub struct LogSubscription {
    project: String,
    buffer: Arc<LogBuffer>,
    cursor: u64,
    counter: watch::Receiver<u64>,
    history: Vec<String>,
}

impl LogSubscription {
    /// Subscribe to `buffer`, capturing up to `history_lines` recent lines.
    pub fn new(project: impl Into<String>, buffer: Arc<LogBuffer>, history_lines: usize) -> Self {
        let counter = buffer.subscribe_counter();
        let (history, cursor) = buffer.recent_with_cursor(history_lines);
        Self {
            project: project.into(),
            buffer,
            cursor,
            counter,
            history,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Counter value up to which lines have been delivered.
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }

    /// The initial history message, or `None` when the buffer was empty.
    ///
    /// The history is handed out once; later calls return `None`.
    pub fn history(&mut self) -> Option<LogStreamMessage> {
        if self.history.is_empty() {
            return None;
        }
        Some(LogStreamMessage::LogHistory {
            project: self.project.clone(),
            lines: std::mem::take(&mut self.history),
        })
    }

    /// Lines appended since the last delivery, without waiting.
    pub fn try_next(&mut self) -> Option<LogStreamMessage> {
        let delta = self.buffer.since(self.cursor);
        self.cursor = delta.cursor;
        if delta.dropped > 0 {
            warn!(
                project = %self.project,
                dropped = delta.dropped,
                "Log subscriber fell behind, lines were evicted before delivery"
            );
        }
        if delta.lines.is_empty() {
            return None;
        }
        Some(LogStreamMessage::Log {
            project: self.project.clone(),
            lines: delta.lines,
        })
    }

    /// Wait for new lines and return them as one message.
    ///
    /// Never ends on its own: the subscription keeps the buffer, and with it
    /// the counter's sender, alive.
    pub async fn next(&mut self) -> LogStreamMessage {
        loop {
            if let Some(message) = self.try_next() {
                return message;
            }
            // Cannot fail while `self.buffer` holds the sender.
            let _ = self.counter.changed().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_history_then_nothing() {
        let buffer = Arc::new(LogBuffer::new(10));
        for line in ["a", "b", "c"] {
            buffer.append(line);
        }
        let mut sub = LogSubscription::new("alpha", Arc::clone(&buffer), 2);
        assert_eq!(
            sub.history(),
            Some(LogStreamMessage::LogHistory {
                project: "alpha".to_string(),
                lines: vec!["b".to_string(), "c".to_string()],
            })
        );
        assert_eq!(sub.history(), None);
        assert_eq!(sub.try_next(), None);
        assert_eq!(sub.cursor(), 3);
    }

    #[test]
    fn test_empty_buffer_has_no_history() {
        let buffer = Arc::new(LogBuffer::new(10));
        let mut sub = LogSubscription::new("alpha", buffer, 200);
        assert_eq!(sub.history(), None);
    }

    #[tokio::test]
    async fn test_next_delivers_each_line_once() {
        let buffer = Arc::new(LogBuffer::new(10));
        buffer.append("before");
        let mut sub = LogSubscription::new("alpha", Arc::clone(&buffer), 200);

        let writer = Arc::clone(&buffer);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.append("one");
            writer.append("two");
        });

        let mut received = Vec::new();
        while received.len() < 2 {
            let message = timeout(Duration::from_secs(2), sub.next())
                .await
                .expect("timed out waiting for lines");
            received.extend(message.lines().iter().cloned());
        }
        assert_eq!(received, vec!["one", "two"]);
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test]
    async fn test_next_outlives_other_buffer_handles() {
        let buffer = Arc::new(LogBuffer::new(10));
        let mut sub = LogSubscription::new("alpha", Arc::clone(&buffer), 0);
        buffer.append("last");
        drop(buffer);

        let message = timeout(Duration::from_secs(1), sub.next())
            .await
            .expect("pending line delivered");
        assert_eq!(message.lines(), ["last".to_string()]);
        assert!(timeout(Duration::from_millis(50), sub.next()).await.is_err());
    }
}
