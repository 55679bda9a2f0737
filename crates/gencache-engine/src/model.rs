//! Per-category learned model and readiness rules

use crate::config::EngineConfig;
use crate::pattern_store::PatternStore;
use gencache_core::{Category, Context, GenerationOutput};
use serde::{Deserialize, Serialize};

/// How a category's requests are served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingMode {
    /// Defer to the external generator and learn from its output
    Learning,
    /// Serve from learned patterns or synthesis only
    Production,
}

/// Learned state of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    pub category: Category,

    /// Learned examples, monotonically increasing
    pub training_count: u64,

    /// Confidence estimate, never above the configured ceiling
    pub accuracy: f64,

    pub patterns: PatternStore,

    /// Operator hold keeping the category in learning mode
    #[serde(default)]
    pub pinned_learning: bool,
}

/// Effect of one learned example on its model
#[derive(Debug, Clone, PartialEq)]
pub struct LearnOutcome {
    pub category: Category,
    pub bucket: String,
    pub quality: f64,
    pub training_count: u64,
    pub accuracy: f64,
    pub ready: bool,
}

impl ModelState {
    /// Fresh model with priors
    pub fn new(category: Category, config: &EngineConfig) -> Self {
        Self {
            category,
            training_count: 0,
            accuracy: config.initial_accuracy,
            patterns: PatternStore::new(),
            pinned_learning: false,
        }
    }

    /// Record one example and advance the counters
    pub fn train(
        &mut self,
        config: &EngineConfig,
        input: &str,
        context: Context,
        output: GenerationOutput,
        quality: f64,
    ) -> LearnOutcome {
        let bucket = self.patterns.insert(context, output, quality, input);

        self.training_count += 1;
        self.accuracy =
            (self.accuracy + quality * config.accuracy_rate).min(config.accuracy_ceiling);

        LearnOutcome {
            category: self.category,
            bucket,
            quality,
            training_count: self.training_count,
            accuracy: self.accuracy,
            ready: self.is_ready(config),
        }
    }

    /// Both readiness thresholds hold
    pub fn is_ready(&self, config: &EngineConfig) -> bool {
        self.accuracy >= config.ready_accuracy
            && self.training_count >= config.ready_training_count
    }

    /// Current serving mode
    pub fn mode(&self, config: &EngineConfig) -> ServingMode {
        if !self.pinned_learning && self.is_ready(config) {
            ServingMode::Production
        } else {
            ServingMode::Learning
        }
    }
}
