//! In-memory log observation for tests.
//!
//! An observed logger tees every entry, JSON-encoded, into a shared buffer.
//! [`ObservedLogs`] is the read side: it parses the buffer back into
//! structured entries on demand, so assertions can look at levels, messages
//! and fields instead of raw output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// A single log entry captured by an observed logger.
#[derive(Debug, Clone)]
pub struct CapturedEntry {
    /// Severity of the entry.
    pub level: Level,
    /// Module path the entry was emitted from.
    pub target: String,
    /// The log message.
    pub message: String,
    /// Timestamp the engine stamped on the entry, when parseable.
    pub timestamp: Option<DateTime<Utc>>,
    /// Remaining structured fields.
    pub fields: Map<String, Value>,
}

impl CapturedEntry {
    fn parse(line: &str) -> Option<Self> {
        let Value::Object(mut entry) = serde_json::from_str::<Value>(line).ok()? else {
            return None;
        };

        let level: Level = entry.get("level")?.as_str()?.parse().ok()?;
        entry.remove("level");

        let target = take_string(&mut entry, "target");
        let message = take_string(&mut entry, "message");
        let timestamp = match entry.remove("timestamp") {
            Some(Value::String(raw)) => raw.parse::<DateTime<Utc>>().ok(),
            _ => None,
        };

        // Engine plumbing, not caller fields.
        entry.remove("filename");
        entry.remove("line_number");
        entry.remove("threadName");
        entry.remove("threadId");

        Some(Self {
            level,
            target,
            message,
            timestamp,
            fields: entry,
        })
    }
}

fn take_string(entry: &mut Map<String, Value>, key: &str) -> String {
    match entry.remove(key) {
        Some(Value::String(value)) => value,
        _ => String::new(),
    }
}

/// Thread-safe view over the entries an observed logger captured.
///
/// Cloning is cheap; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct ObservedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl ObservedLogs {
    /// A view with no writer attached; it never captures anything.
    pub(crate) fn disconnected() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> String {
        let guard = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&guard).into_owned()
    }

    /// All entries captured so far.
    #[must_use]
    pub fn all(&self) -> Vec<CapturedEntry> {
        self.snapshot()
            .lines()
            .filter_map(CapturedEntry::parse)
            .collect()
    }

    /// Number of entries captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether nothing has been captured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the buffer, returning everything captured so far.
    pub fn take_all(&self) -> Vec<CapturedEntry> {
        let drained = {
            let mut guard = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        String::from_utf8_lossy(&drained)
            .lines()
            .filter_map(CapturedEntry::parse)
            .collect()
    }

    /// Entries captured at exactly the given level.
    #[must_use]
    pub fn filter_level(&self, level: Level) -> Vec<CapturedEntry> {
        self.all()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }

    /// Whether any captured message contains the given snippet.
    #[must_use]
    pub fn contains(&self, snippet: &str) -> bool {
        self.all().iter().any(|entry| entry.message.contains(snippet))
    }
}

/// [`MakeWriter`] that appends entries to a shared in-memory buffer.
#[derive(Debug, Clone)]
pub struct ObserverWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl ObserverWriter {
    /// Create a writer together with the view over what it captures.
    #[must_use]
    pub fn pair() -> (Self, ObservedLogs) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                buffer: Arc::clone(&buffer),
            },
            ObservedLogs { buffer },
        )
    }
}

impl Write for ObserverWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for ObserverWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
