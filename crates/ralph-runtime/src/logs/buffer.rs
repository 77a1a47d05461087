//! Bounded per-project ring buffer of log lines.
//!
//! Besides the retained lines the buffer keeps a total-append counter that
//! only ever grows. Subscribers remember the counter value they last saw and
//! ask for everything after it with [`LogBuffer::since`]; the counter is also
//! published on a `watch` channel so they can await new lines instead of
//! polling.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ralph_core::DEFAULT_LOG_MAX_LINES;
use tokio::sync::watch;
use tokio::time::timeout;

#[derive(Debug, Default)]
struct Ring {
    lines: VecDeque<String>,
    total: u64,
}

/// Lines appended after a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogDelta {
    /// New lines still retained, oldest first.
    pub lines: Vec<String>,
    /// Counter value to pass to the next `since` call.
    pub cursor: u64,
    /// Lines appended after the old cursor that were evicted (or cleared)
    /// before they could be read.
    pub dropped: u64,
}

/// Thread-safe bounded log buffer for one project.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    ring: Mutex<Ring>,
    counter: watch::Sender<u64>,
}

impl LogBuffer {
    /// Create a buffer retaining at most `capacity` lines (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (counter, _) = watch::channel(0);
        Self {
            capacity,
            ring: Mutex::new(Ring {
                lines: VecDeque::with_capacity(capacity.min(1024)),
                total: 0,
            }),
            counter,
        }
    }

    fn ring(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one line, evicting the oldest line at capacity, and wake
    /// anyone waiting for new data.
    pub fn append(&self, line: impl Into<String>) {
        let total = {
            let mut ring = self.ring();
            if ring.lines.len() >= self.capacity {
                ring.lines.pop_front();
            }
            ring.lines.push_back(line.into());
            ring.total += 1;
            ring.total
        };

        // Concurrent appends may publish out of order; keep the published
        // value monotonic.
        self.counter.send_if_modified(|published| {
            if total > *published {
                *published = total;
                true
            } else {
                false
            }
        });
    }

    /// Copy of all retained lines, oldest first.
    pub fn get_all(&self) -> Vec<String> {
        self.ring().lines.iter().cloned().collect()
    }

    /// Copy of the most recent `n` lines, oldest first.
    pub fn get_recent(&self, n: usize) -> Vec<String> {
        let ring = self.ring();
        let skip = ring.lines.len().saturating_sub(n);
        ring.lines.iter().skip(skip).cloned().collect()
    }

    /// Most recent `n` lines together with the counter value they end at.
    pub fn recent_with_cursor(&self, n: usize) -> (Vec<String>, u64) {
        let ring = self.ring();
        let skip = ring.lines.len().saturating_sub(n);
        (ring.lines.iter().skip(skip).cloned().collect(), ring.total)
    }

    /// Drop all retained lines. The append counter is left untouched.
    pub fn clear(&self) {
        self.ring().lines.clear();
    }

    /// Total number of lines ever appended.
    pub fn count(&self) -> u64 {
        self.ring().total
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.ring().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines appended after `cursor` that are still retained.
    ///
    /// Passing the returned cursor to the next call never yields a line
    /// twice.
    pub fn since(&self, cursor: u64) -> LogDelta {
        let ring = self.ring();
        if cursor >= ring.total {
            return LogDelta {
                lines: Vec::new(),
                cursor: ring.total,
                dropped: 0,
            };
        }

        let new = ring.total - cursor;
        let retained = u64::try_from(ring.lines.len()).unwrap_or(u64::MAX);
        let available = new.min(retained);
        // `available` is bounded by the retained length, a usize.
        let take = usize::try_from(available).unwrap_or(usize::MAX);
        let skip = ring.lines.len() - take;

        LogDelta {
            lines: ring.lines.iter().skip(skip).cloned().collect(),
            cursor: ring.total,
            dropped: new - available,
        }
    }

    /// Receiver of the append counter.
    pub fn subscribe_counter(&self) -> watch::Receiver<u64> {
        self.counter.subscribe()
    }

    /// Wait until the counter moves past `cursor`. Returns `false` on
    /// timeout.
    pub async fn wait_for_new(&self, cursor: u64, limit: Duration) -> bool {
        let mut rx = self.counter.subscribe();
        let changed = timeout(limit, rx.wait_for(|&count| count > cursor))
            .await
            .is_ok_and(|changed| changed.is_ok());
        changed
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_MAX_LINES)
    }
}
