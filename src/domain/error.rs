use thiserror::Error;

/// Top-level error type for the shipper.
///
/// Only construction surfaces errors; the logging path is fire-and-forget
/// and reports failures through `tracing` instead.
#[derive(Error, Debug)]
pub enum ShipperError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::shipper::ConfigError),

    #[error("Ingest client error: {0}")]
    Client(#[from] crate::sender::ClientError),
}
