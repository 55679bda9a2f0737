//! Configuration for the learning engine and the fallback orchestrator

use serde::{Deserialize, Serialize};

/// Learning and readiness parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Accuracy every model starts with
    #[serde(default = "default_initial_accuracy")]
    pub initial_accuracy: f64,

    /// Accuracy gained per unit of example quality
    #[serde(default = "default_accuracy_rate")]
    pub accuracy_rate: f64,

    /// Hard ceiling on accuracy
    #[serde(default = "default_accuracy_ceiling")]
    pub accuracy_ceiling: f64,

    /// Accuracy needed before a category may serve from the cache
    #[serde(default = "default_ready_accuracy")]
    pub ready_accuracy: f64,

    /// Learned examples needed before a category may serve from the cache
    #[serde(default = "default_ready_training_count")]
    pub ready_training_count: u64,

    /// Minimum similarity for a stored pattern to be reused
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Maximum number of keywords kept per context
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Learned examples retained in the training history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_accuracy: default_initial_accuracy(),
            accuracy_rate: default_accuracy_rate(),
            accuracy_ceiling: default_accuracy_ceiling(),
            ready_accuracy: default_ready_accuracy(),
            ready_training_count: default_ready_training_count(),
            match_threshold: default_match_threshold(),
            max_keywords: default_max_keywords(),
            history_limit: default_history_limit(),
        }
    }
}

/// Result cache and fallback policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Serve ready categories from the adaptive generator
    #[serde(default = "default_true")]
    pub enable_adaptive: bool,

    /// Call the external generator when the adaptive path does not answer
    #[serde(default = "default_true")]
    pub fallback_to_external: bool,

    /// Memoize results by exact input
    #[serde(default = "default_true")]
    pub cache_results: bool,

    /// Result cache size that triggers a trim
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Entries kept (most recently inserted) after a trim
    #[serde(default = "default_cache_retain")]
    pub cache_retain: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_adaptive: true,
            fallback_to_external: true,
            cache_results: true,
            cache_capacity: default_cache_capacity(),
            cache_retain: default_cache_retain(),
        }
    }
}

fn default_initial_accuracy() -> f64 {
    0.1
}

fn default_accuracy_rate() -> f64 {
    0.02
}

fn default_accuracy_ceiling() -> f64 {
    0.95
}

fn default_ready_accuracy() -> f64 {
    0.4
}

fn default_ready_training_count() -> u64 {
    5
}

fn default_match_threshold() -> f64 {
    0.6
}

fn default_max_keywords() -> usize {
    5
}

fn default_history_limit() -> usize {
    500
}

fn default_cache_capacity() -> usize {
    100
}

fn default_cache_retain() -> usize {
    50
}

fn default_true() -> bool {
    true
}
