#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Safe within realistic value bounds (durations, sizes)
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Documented where it matters (LogShipper::new)
    clippy::module_name_repetitions,  // e.g. ShipperConfig in shipper module
    clippy::must_use_candidate        // Annotated selectively on critical APIs
)]

pub mod domain;
pub mod logging;
pub mod sender;
pub mod shipper;

// Re-export main types for easy access
pub use domain::{LogEntry, LogLevel, Metadata, ShipperError};
pub use sender::{ConnectionStats, IngestClient};
pub use shipper::{Batch, FlushTrigger, LogShipper, ShipperConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
