use serde::{Deserialize, Serialize};

/// Domain log level representing the severity of a log entry.
///
/// The ingestion wire format carries the level as a free-form uppercase
/// string, so `LogEntry` stores a `String`; this enum exists for the typed
/// convenience methods (`info`/`warn`/`error`/`debug`) and for callers that
/// want a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The uppercase wire representation of this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
