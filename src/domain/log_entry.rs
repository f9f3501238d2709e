use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Open-ended key/value data attached to a log entry by the caller.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Field names owned by `LogEntry` itself. Metadata keys that collide with
/// these overwrite the reserved field instead of being flattened alongside
/// it, matching the original AppVital client behavior (the collision is
/// reported through `tracing` so it is at least visible).
pub const RESERVED_FIELDS: [&str; 4] = ["timestamp", "level", "service", "message"];

/// A structured log entry ready for buffering and transmission.
///
/// This is the canonical representation throughout the pipeline, from the
/// `log()` call site through batch formation to the sender. Serialized as a
/// flat JSON object: the reserved fields plus every metadata key at the top
/// level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp, generated at creation time.
    pub timestamp: String,
    /// Uppercase severity string (free-form; not restricted to `LogLevel`).
    pub level: String,
    /// Name of the emitting service.
    pub service: String,
    pub message: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl LogEntry {
    /// Builds an entry with a fresh timestamp, upper-casing `level` and
    /// applying reserved-key overrides from `metadata`.
    pub fn new(service: &str, level: &str, message: &str, metadata: Metadata) -> Self {
        let mut entry = Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: level.to_uppercase(),
            service: service.to_string(),
            message: message.to_string(),
            metadata,
        };
        entry.apply_reserved_overrides();
        entry
    }

    /// Moves any metadata value whose key names a reserved field into that
    /// field, so the flattened JSON never carries duplicate keys.
    fn apply_reserved_overrides(&mut self) {
        for field in RESERVED_FIELDS {
            let Some(value) = self.metadata.remove(field) else {
                continue;
            };
            warn!(field, "metadata key overrides a reserved log field");
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            match field {
                "timestamp" => self.timestamp = text,
                "level" => self.level = text,
                "service" => self.service = text,
                "message" => self.message = text,
                _ => unreachable!(),
            }
        }
    }
}
