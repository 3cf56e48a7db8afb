//! Diagnostic sinks for failed provider exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::error;

/// Destination for diagnostic entries. Recording never fails.
pub trait ErrorSink: Send + Sync {
    fn record(&self, source: &str, message: &str);
}

/// Forwards every entry to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn record(&self, source: &str, message: &str) {
        error!(source = %source, "{}", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub recorded_at: DateTime<Utc>,
    pub source: String,
    pub message: String,
}

/// Keeps the most recent entries in memory for the admin error log, and
/// forwards them to `tracing` as well.
pub struct RecentErrorSink {
    entries: Mutex<VecDeque<ErrorLogEntry>>,
    capacity: usize,
}

impl RecentErrorSink {
    pub const DEFAULT_CAPACITY: usize = 30;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<ErrorLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecentErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSink for RecentErrorSink {
    fn record(&self, source: &str, message: &str) {
        TracingErrorSink.record(source, message);

        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(ErrorLogEntry {
            recorded_at: Utc::now(),
            source: source.to_string(),
            message: message.to_string(),
        });
        entries.truncate(self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_sink_keeps_newest_first() {
        let sink = RecentErrorSink::new();
        sink.record("handle_code_callback", "first");
        sink.record("handle_token_delivery", "second");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, "handle_token_delivery");
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn test_recent_sink_is_bounded() {
        let sink = RecentErrorSink::with_capacity(3);
        for i in 0..10 {
            sink.record("test", &format!("entry {}", i));
        }

        let entries = sink.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "entry 9");
        assert_eq!(entries[2].message, "entry 7");
    }

    #[test]
    fn test_zero_capacity_only_forwards() {
        let sink = RecentErrorSink::with_capacity(0);
        sink.record("test", "dropped");
        assert!(sink.is_empty());
    }
}
