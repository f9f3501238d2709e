pub mod client;
pub mod stats;

pub use client::{ClientError, IngestClient, ShipmentReceipt};
pub use stats::{ClientStats, ConnectionStats};
