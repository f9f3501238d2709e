//! Domain layer for appvital-log-shipper.
//!
//! Contains the canonical types shared across all modules:
//! - `LogEntry`: The buffered and shipped data type
//! - `LogLevel`: Domain log severity (Debug/Info/Warn/Error)
//! - `ShipperError`: Top-level error type

pub mod error;
pub mod log_entry;
pub mod log_level;

pub use error::ShipperError;
pub use log_entry::{LogEntry, Metadata, RESERVED_FIELDS};
pub use log_level::LogLevel;
