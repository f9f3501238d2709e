//! The buffered log shipper: append-only buffer, dual-trigger flushing,
//! and lifecycle management.

mod batch;
mod config;

pub use batch::{Batch, FlushTrigger};
pub use config::{ConfigError, ShipperConfig};

use crate::domain::{LogEntry, LogLevel, Metadata, ShipperError};
use crate::sender::{ConnectionStats, IngestClient};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffered, batching log client for the AppVital ingestion API.
///
/// Entries accumulate in an owned buffer and are shipped in batches when
/// either the size threshold is reached or the recurring flush timer fires.
/// Logging calls never block on the network and never surface delivery
/// errors; a failed flush drops its batch and reports through `tracing`.
///
/// The handle is cheap to clone; all clones share one buffer and one timer.
#[derive(Debug, Clone)]
pub struct LogShipper {
    inner: Arc<ShipperInner>,
}

#[derive(Debug)]
struct ShipperInner {
    config: ShipperConfig,
    client: IngestClient,
    buffer: Mutex<Vec<LogEntry>>,
    running: AtomicBool,
    cancel: CancellationToken,
    handle: Handle,
}

impl LogShipper {
    /// Creates the shipper and starts its recurring flush timer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime (the timer and the
    /// fire-and-forget send tasks are spawned onto the current runtime).
    pub fn new(config: ShipperConfig) -> Result<Self, ShipperError> {
        config.validate()?;
        let client = IngestClient::new(&config)?;

        let inner = Arc::new(ShipperInner {
            config,
            client,
            buffer: Mutex::new(Vec::new()),
            running: AtomicBool::new(true),
            cancel: CancellationToken::new(),
            handle: Handle::current(),
        });

        spawn_flush_timer(&inner);

        info!(
            service = %inner.config.service_name,
            endpoint = %inner.client.batch_endpoint(),
            batch_size = inner.config.batch_size,
            flush_interval_ms = inner.config.flush_interval.as_millis() as u64,
            "log shipper started"
        );

        Ok(Self { inner })
    }

    /// Appends one entry to the buffer. Reaching the batch-size threshold
    /// drains the buffer and hands the batch to a background send task
    /// before this call returns; the caller never waits on the network.
    ///
    /// After `stop()` the entry is discarded (with a `tracing` warning), so
    /// a stopped shipper cannot accumulate entries that nothing will drain.
    pub fn log(&self, level: &str, message: &str, metadata: Metadata) {
        if !self.inner.running.load(Ordering::SeqCst) {
            warn!(
                service = %self.inner.config.service_name,
                dropped_message = message,
                "log entry discarded: shipper already stopped"
            );
            return;
        }

        let entry = LogEntry::new(&self.inner.config.service_name, level, message, metadata);

        // Append and size-check under one lock so a concurrently firing
        // timer flush can neither double-send nor observe a torn batch.
        let batch = {
            let mut buffer = self.inner.buffer.lock();
            buffer.push(entry);
            (buffer.len() >= self.inner.config.batch_size)
                .then(|| Batch::new(std::mem::take(&mut *buffer), FlushTrigger::Size))
        };

        if let Some(batch) = batch {
            let inner = Arc::clone(&self.inner);
            self.inner.handle.spawn(async move {
                inner.ship(batch).await;
            });
        }
    }

    pub fn info(&self, message: &str, metadata: Metadata) {
        self.log(LogLevel::Info.as_str(), message, metadata);
    }

    pub fn warn(&self, message: &str, metadata: Metadata) {
        self.log(LogLevel::Warn.as_str(), message, metadata);
    }

    pub fn error(&self, message: &str, metadata: Metadata) {
        self.log(LogLevel::Error.as_str(), message, metadata);
    }

    pub fn debug(&self, message: &str, metadata: Metadata) {
        self.log(LogLevel::Debug.as_str(), message, metadata);
    }

    /// Standardized info-level entry for cross-service call correlation.
    pub fn log_service_request(
        &self,
        requesting_service: &str,
        target_service: &str,
        request_id: &str,
        additional: Metadata,
    ) {
        let mut metadata = Metadata::new();
        metadata.insert("requesting_service".to_string(), requesting_service.into());
        metadata.insert("target_service".to_string(), target_service.into());
        metadata.insert("request_id".to_string(), request_id.into());
        metadata.extend(additional);
        self.info("Service request received", metadata);
    }

    /// Drains the buffer and attempts delivery. No-op when empty. Entries
    /// logged after the snapshot is taken ride the next batch.
    pub async fn flush(&self) {
        self.inner.flush(FlushTrigger::Explicit).await;
    }

    /// Stops the flush timer and drains whatever is still buffered.
    /// Idempotent; subsequent `log()` calls are discarded.
    pub async fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.inner.cancel.cancel();
        self.inner.flush(FlushTrigger::Shutdown).await;
        info!(service = %self.inner.config.service_name, "log shipper stopped");
    }

    /// Number of entries currently buffered.
    pub fn pending(&self) -> usize {
        self.inner.buffer.lock().len()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn service_name(&self) -> &str {
        &self.inner.config.service_name
    }

    /// Request counters of the underlying ingest client.
    pub fn connection_stats(&self) -> ConnectionStats {
        self.inner.client.connection_stats()
    }
}

impl ShipperInner {
    /// Swap-and-clear is the sole drain primitive: every trigger path goes
    /// through here, so one entry can only ever belong to one batch.
    fn drain(&self, trigger: FlushTrigger) -> Option<Batch> {
        let mut buffer = self.buffer.lock();
        if buffer.is_empty() {
            return None;
        }
        Some(Batch::new(std::mem::take(&mut *buffer), trigger))
    }

    async fn flush(&self, trigger: FlushTrigger) {
        if let Some(batch) = self.drain(trigger) {
            self.ship(batch).await;
        }
    }

    async fn ship(&self, batch: Batch) {
        let entries = batch.size();
        match self.client.send_batch(&batch).await {
            Ok(receipt) => {
                debug!(
                    batch_id = %receipt.batch_id,
                    entries,
                    bytes_sent = receipt.bytes_sent,
                    latency_ms = receipt.latency.as_millis() as u64,
                    trigger = batch.trigger().as_str(),
                    "shipped log batch"
                );
            }
            Err(e) => {
                // Best-effort delivery: the batch is dropped, not retried.
                warn!(
                    batch_id = %batch.id(),
                    entries,
                    error = %e,
                    "failed to ship log batch, dropping it"
                );
            }
        }
    }
}

/// Timer task holds only a weak reference, so dropping every `LogShipper`
/// clone without calling `stop()` still lets the task exit on its next tick.
fn spawn_flush_timer(inner: &Arc<ShipperInner>) {
    let weak = Arc::downgrade(inner);
    let cancel = inner.cancel.clone();
    let period = inner.config.flush_interval;

    inner.handle.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first real
        // flush happens one full interval after construction.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(inner) = weak.upgrade() else { break };
                    inner.flush(FlushTrigger::Timer).await;
                }
            }
        }
    });
}
