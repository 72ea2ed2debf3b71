//! Tap run options and statistics

use crate::error::Error;
use serde::Serialize;
use serde_json::{json, Value};

/// Options for one `read` run
#[derive(Debug, Clone)]
pub struct TapOptions {
    /// Streams to emit (`None` selects every stream)
    pub streams: Option<Vec<String>>,
    /// Maximum records emitted per stream (0 = unlimited)
    pub max_records: usize,
    /// Abort the run on the first stream failure
    pub fail_fast: bool,
}

impl Default for TapOptions {
    fn default() -> Self {
        Self {
            streams: None,
            max_records: 0,
            fail_fast: true,
        }
    }
}

impl TapOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the run to the named streams
    #[must_use]
    pub fn with_streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let streams: Vec<String> = streams.into_iter().map(Into::into).collect();
        self.streams = if streams.is_empty() {
            None
        } else {
            Some(streams)
        };
        self
    }

    /// Set max records per stream
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Whether `count` records already reach the per-stream limit
    pub fn limit_reached(&self, count: u64) -> bool {
        self.max_records > 0 && count >= self.max_records as u64
    }
}

/// Outcome of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    Success,
    Failed,
}

/// Statistics for one stream
#[derive(Debug, Clone, Serialize)]
pub struct StreamStats {
    /// Stream name
    pub stream: String,
    /// Final status
    pub status: StreamStatus,
    /// Records emitted
    pub records_synced: u64,
    /// Invocations started (one per parent record for child streams)
    pub invocations: u64,
    /// Time spent in this stream
    pub duration_ms: u64,
    /// Error message of the first failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error classification of the first failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl StreamStats {
    /// Fresh stats for a stream
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            status: StreamStatus::Success,
            records_synced: 0,
            invocations: 0,
            duration_ms: 0,
            error: None,
            error_kind: None,
        }
    }

    /// Mark the stream failed, keeping the first error
    pub fn fail(&mut self, error: &Error) {
        self.record_failure(error.to_string(), error.kind().as_str());
    }

    /// Mark the stream failed with a message and error kind name
    pub fn record_failure(&mut self, message: String, kind: &'static str) {
        self.status = StreamStatus::Failed;
        if self.error.is_none() {
            self.error = Some(message);
            self.error_kind = Some(kind);
        }
    }

    /// Check if the stream failed
    pub fn is_failed(&self) -> bool {
        self.status == StreamStatus::Failed
    }
}

/// Statistics for a whole run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Per-stream statistics, in catalog order
    pub streams: Vec<StreamStats>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl SyncSummary {
    /// Records emitted across all streams
    pub fn total_records(&self) -> u64 {
        self.streams.iter().map(|s| s.records_synced).sum()
    }

    /// Number of failed streams
    pub fn failed_streams(&self) -> usize {
        self.streams.iter().filter(|s| s.is_failed()).count()
    }

    /// `SUCCEEDED`, `PARTIAL` or `FAILED`
    pub fn status(&self) -> &'static str {
        match self.failed_streams() {
            0 => "SUCCEEDED",
            n if n == self.streams.len() => "FAILED",
            _ => "PARTIAL",
        }
    }

    /// Get stats for a stream
    pub fn stream(&self, name: &str) -> Option<&StreamStats> {
        self.streams.iter().find(|s| s.stream == name)
    }

    pub(crate) fn stream_mut(&mut self, name: &str) -> Option<&mut StreamStats> {
        self.streams.iter_mut().find(|s| s.stream == name)
    }

    /// Summary document for the `SYNC_SUMMARY` message
    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status(),
            "total_records": self.total_records(),
            "duration_ms": self.duration_ms,
            "streams": self.streams,
        })
    }
}
