//! gencache Telemetry
//!
//! Persistence and counters for the gencache learning engine.
//!
//! Provides:
//! - Atomic, tolerant snapshot file persistence
//! - A background persistence service that never blocks callers
//! - Lock-free counters for cache, adaptive and external traffic

pub mod metrics;
pub mod persistence;
pub mod service;

pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use persistence::{PersistenceConfig, SnapshotFile, SnapshotRead};
pub use service::{PersistenceService, PersistenceStats};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::MetricsCollector;
    pub use crate::persistence::{PersistenceConfig, SnapshotFile};
    pub use crate::service::PersistenceService;
}
