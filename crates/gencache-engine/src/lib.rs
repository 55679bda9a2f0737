//! gencache Engine
//!
//! Learns from an expensive external generator and progressively answers
//! requests from its own memory.
//!
//! Provides:
//! - Context extraction and weighted similarity over learned examples
//! - Per-category models with readiness-driven learning/production modes
//! - Adaptation of stored examples and synthesis of placeholder outputs
//! - A result cache and fallback orchestrator in front of the generator
//! - Versioned snapshots of the learned state

pub mod adaptive;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod generator;
pub mod model;
pub mod orchestrator;
pub mod pattern_store;
pub mod quality;
pub mod similarity;
pub mod snapshot;

pub use adaptive::AdaptiveGenerator;
pub use cache::{CacheKey, ResultCache};
pub use config::{EngineConfig, OrchestratorConfig};
pub use context::ContextExtractor;
pub use engine::{CategoryStats, LearningEngine};
pub use generator::ExternalGenerator;
pub use model::{LearnOutcome, ModelState, ServingMode};
pub use orchestrator::{FallbackOrchestrator, OptimizeReport, OrchestratorStatus};
pub use pattern_store::{bucket_key, BestMatch, Pattern, PatternStore};
pub use quality::evaluate_quality;
pub use similarity::similarity;
pub use snapshot::{EngineSnapshot, TrainingRecord, SNAPSHOT_VERSION};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{EngineConfig, OrchestratorConfig};
    pub use crate::engine::LearningEngine;
    pub use crate::generator::ExternalGenerator;
    pub use crate::orchestrator::FallbackOrchestrator;
    pub use gencache_core::prelude::*;
}
