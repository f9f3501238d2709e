use crate::domain::LogEntry;
use std::time::Instant;
use uuid::Uuid;

/// What caused a batch to be drained from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Buffer reached the configured batch size inside `log()`.
    Size,
    /// The recurring flush timer fired.
    Timer,
    /// Final drain issued by `stop()`.
    Shutdown,
    /// Caller invoked `flush()` directly.
    Explicit,
}

impl FlushTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Timer => "timer",
            Self::Shutdown => "shutdown",
            Self::Explicit => "explicit",
        }
    }
}

/// The snapshot of buffered entries taken at the moment a flush begins.
///
/// Entries keep their insertion order. The id exists for transmission
/// headers and log correlation; it carries no delivery semantics.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    entries: Vec<LogEntry>,
    trigger: FlushTrigger,
    created_at: Instant,
}

impl Batch {
    pub fn new(entries: Vec<LogEntry>, trigger: FlushTrigger) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entries,
            trigger,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn trigger(&self) -> FlushTrigger {
        self.trigger
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}
