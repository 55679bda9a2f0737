//! Persistence service for async snapshot writes
//!
//! Provides:
//! - Fire-and-forget snapshot saves that never block the caller
//! - Coalescing of queued saves down to the newest document
//! - Flush acknowledgement for callers that need durability (tests, shutdown)
//! - Write failures logged and counted, never surfaced

use crate::persistence::{PersistenceConfig, SnapshotFile, SnapshotRead};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Background snapshot writer
pub struct PersistenceService {
    /// Channel sender for async saves
    sender: mpsc::UnboundedSender<PersistCommand>,

    /// Snapshot handle for synchronous loads
    file: SnapshotFile,

    /// Counters shared with the writer thread
    counters: Arc<WriterCounters>,
}

/// Commands sent to the background writer
enum PersistCommand {
    /// Replace the snapshot with this document
    Save(Box<Value>),

    /// Acknowledge once every earlier save has been handled
    Flush(oneshot::Sender<()>),

    /// Shutdown the service
    Shutdown,
}

#[derive(Default)]
struct WriterCounters {
    writes: AtomicU64,
    failures: AtomicU64,
    coalesced: AtomicU64,
}

/// Writer statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceStats {
    /// Snapshots written successfully
    pub writes: u64,
    /// Snapshot writes that failed
    pub failures: u64,
    /// Saves skipped because a newer one was already queued
    pub coalesced: u64,
}

impl PersistenceService {
    /// Create a new persistence service and start its writer thread
    pub fn new(config: PersistenceConfig) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let file = SnapshotFile::new(config.clone());
        let counters = Arc::new(WriterCounters::default());

        let writer_file = file.clone();
        let writer_counters = Arc::clone(&counters);
        std::thread::Builder::new()
            .name("gencache-persistence".to_string())
            .spawn(move || {
                if let Err(e) = run_writer(writer_file, receiver, writer_counters) {
                    error!("Persistence writer thread failed: {}", e);
                }
            })?;

        info!("Persistence service started with snapshot: {:?}", config.snapshot_path);

        Ok(Self {
            sender,
            file,
            counters,
        })
    }

    /// Read the current snapshot document from disk
    pub fn load(&self) -> SnapshotRead {
        self.file.read()
    }

    /// Queue a snapshot for writing
    pub fn save(&self, document: Value) {
        if let Err(e) = self.sender.send(PersistCommand::Save(Box::new(document))) {
            warn!("Failed to queue snapshot: {}", e);
        }
    }

    /// Wait until every save queued before this call has been handled
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if let Err(e) = self.sender.send(PersistCommand::Flush(ack)) {
            warn!("Failed to send flush command: {}", e);
            return;
        }
        if done.await.is_err() {
            warn!("Persistence writer stopped before acknowledging flush");
        }
    }

    /// Current writer statistics
    pub fn stats(&self) -> PersistenceStats {
        PersistenceStats {
            writes: self.counters.writes.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
        }
    }

    /// Snapshot path this service writes to
    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl Drop for PersistenceService {
    fn drop(&mut self) {
        // Signal shutdown
        let _ = self.sender.send(PersistCommand::Shutdown);
    }
}

/// Background writer task
fn run_writer(
    file: SnapshotFile,
    mut receiver: mpsc::UnboundedReceiver<PersistCommand>,
    counters: Arc<WriterCounters>,
) -> std::io::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        while let Some(cmd) = receiver.recv().await {
            let mut next = Some(cmd);

            while let Some(cmd) = next.take() {
                match cmd {
                    PersistCommand::Save(document) => {
                        let mut latest = document;

                        // Drain queued saves, keeping only the newest
                        while let Ok(queued) = receiver.try_recv() {
                            match queued {
                                PersistCommand::Save(newer) => {
                                    counters.coalesced.fetch_add(1, Ordering::Relaxed);
                                    latest = newer;
                                }
                                other => {
                                    next = Some(other);
                                    break;
                                }
                            }
                        }

                        write_snapshot(&file, &latest, &counters);
                    }
                    PersistCommand::Flush(ack) => {
                        let _ = ack.send(());
                    }
                    PersistCommand::Shutdown => {
                        debug!("Persistence writer shutting down");
                        return;
                    }
                }
            }
        }
    });

    Ok(())
}

fn write_snapshot(file: &SnapshotFile, document: &Value, counters: &WriterCounters) {
    match file.write(document) {
        Ok(()) => {
            counters.writes.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            error!("Snapshot save failed for {:?}: {}", file.path(), e);
        }
    }
}
