//! Learning engine
//!
//! Owns one [`ModelState`] per category, each behind its own lock. Learning
//! takes the write lock only for the in-memory update; similarity scans take
//! the read lock, so they always see a complete pattern table. After every
//! learned example a full snapshot is queued on the persistence service.

use crate::adaptive::AdaptiveGenerator;
use crate::config::EngineConfig;
use crate::context::ContextExtractor;
use crate::model::{LearnOutcome, ModelState, ServingMode};
use crate::pattern_store::Pattern;
use crate::quality::evaluate_quality;
use crate::snapshot::{EngineSnapshot, TrainingRecord, SNAPSHOT_VERSION};
use chrono::Utc;
use gencache_core::{Category, Context, GenerationOutput, Result};
use gencache_telemetry::persistence::SnapshotRead;
use gencache_telemetry::PersistenceService;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Per-category summary reported by [`LearningEngine::stats`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Accuracy as a percentage with one decimal, e.g. `"16.4%"`
    pub accuracy: String,
    pub training_count: u64,
    pub patterns_learned: usize,
    pub ready_for_production: bool,
    pub mode: ServingMode,
}

pub struct LearningEngine {
    config: EngineConfig,
    extractor: ContextExtractor,
    generator: AdaptiveGenerator,
    models: [RwLock<ModelState>; 4],
    history: Mutex<VecDeque<TrainingRecord>>,
    learning: AtomicBool,
    persistence: Option<PersistenceService>,
    /// Serializes snapshot capture with its send, so the newest queued
    /// document always reflects every mutation made before it
    persist_lock: Mutex<()>,
}

impl LearningEngine {
    /// Engine with fresh priors and no persistence
    pub fn new(config: EngineConfig) -> Result<Self> {
        let extractor = ContextExtractor::new(config.max_keywords)?;
        let generator = AdaptiveGenerator::new()?;
        let models = Category::ALL.map(|category| RwLock::new(ModelState::new(category, &config)));

        Ok(Self {
            config,
            extractor,
            generator,
            models,
            history: Mutex::new(VecDeque::new()),
            learning: AtomicBool::new(true),
            persistence: None,
            persist_lock: Mutex::new(()),
        })
    }

    /// Engine that restores its last snapshot and saves after every example
    ///
    /// A missing, corrupt or unsupported snapshot starts from priors.
    pub fn with_persistence(config: EngineConfig, persistence: PersistenceService) -> Result<Self> {
        let mut engine = Self::new(config)?;

        match persistence.load() {
            SnapshotRead::Missing => {
                info!("Starting with fresh learned state");
            }
            SnapshotRead::Corrupt(reason) => {
                warn!(
                    "Ignoring unreadable snapshot {:?}: {}",
                    persistence.path(),
                    reason
                );
            }
            SnapshotRead::Loaded(document) => {
                match EngineSnapshot::decode(document, &engine.extractor) {
                    Ok(snapshot) => {
                        engine.restore(snapshot);
                        info!("Learned state loaded from {:?}", persistence.path());
                    }
                    Err(e) => {
                        warn!("Ignoring snapshot {:?}: {}", persistence.path(), e);
                    }
                }
            }
        }

        engine.persistence = Some(persistence);
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derive the context of `input`
    pub fn extract_context(&self, input: &str) -> Context {
        self.extractor.extract(input)
    }

    fn slot(&self, category: Category) -> &RwLock<ModelState> {
        &self.models[category as usize]
    }

    /// Record an externally generated example
    ///
    /// Returns `None` when learning is globally disabled or the output was
    /// itself served by the cache.
    pub fn learn(
        &self,
        input: &str,
        output: &GenerationOutput,
        category: Category,
    ) -> Result<Option<LearnOutcome>> {
        output.ensure_category(category)?;

        if !self.is_learning() {
            debug!("Learning disabled, not recording {} example", category);
            return Ok(None);
        }
        if output.is_cache_generated() {
            debug!("Not learning from cache-generated {} output", category);
            return Ok(None);
        }

        let quality = evaluate_quality(output);
        let context = self.extractor.extract(input);

        let (was_ready, outcome) = {
            let mut model = self.slot(category).write();
            let was_ready = model.is_ready(&self.config);
            let outcome = model.train(&self.config, input, context, output.clone(), quality);
            (was_ready, outcome)
        };

        self.push_history(TrainingRecord {
            input: input.to_string(),
            category,
            output: output.clone(),
            quality,
            recorded_at: Utc::now(),
        });
        self.persist();

        info!(
            "Learned from {} example - training: {}, accuracy: {:.1}%",
            category,
            outcome.training_count,
            outcome.accuracy * 100.0
        );
        if outcome.ready && !was_ready {
            info!("{} model ready for production", category);
        }

        Ok(Some(outcome))
    }

    fn push_history(&self, record: TrainingRecord) {
        let mut history = self.history.lock();
        history.push_back(record);
        while history.len() > self.config.history_limit {
            history.pop_front();
        }
    }

    /// Serve `input` from learned patterns, or synthesize when none match
    ///
    /// Returns `None` while the category is still learning.
    pub fn generate_adaptive(&self, category: Category, input: &str) -> Option<GenerationOutput> {
        let context = self.extractor.extract(input);

        let (accuracy, adapted) = {
            let model = self.slot(category).read();
            if model.mode(&self.config) != ServingMode::Production {
                return None;
            }

            let adapted = model
                .patterns
                .find_best_match(&context, self.config.match_threshold)
                .map(|found| {
                    debug!(
                        "Adapting {} pattern {:?} (similarity {:.3})",
                        category, found.key, found.score
                    );
                    let output = self.generator.adapt(found.pattern, &context, model.accuracy);
                    (found.key.to_string(), output)
                });
            (model.accuracy, adapted)
        };

        info!(
            "Generating {} from learned state ({:.1}% accuracy)",
            category,
            accuracy * 100.0
        );

        match adapted {
            Some((key, output)) => {
                self.slot(category).write().patterns.record_use(&key);
                Some(output)
            }
            None => Some(
                self.generator
                    .synthesize(category, input, &context, accuracy),
            ),
        }
    }

    /// Copy of the best stored pattern for `input`, if any clears the threshold
    pub fn find_best_match(&self, category: Category, input: &str) -> Option<Pattern> {
        let context = self.extractor.extract(input);
        let model = self.slot(category).read();
        model
            .patterns
            .find_best_match(&context, self.config.match_threshold)
            .map(|found| found.pattern.clone())
    }

    /// Copy of a category's model
    pub fn model(&self, category: Category) -> ModelState {
        self.slot(category).read().clone()
    }

    pub fn is_ready(&self, category: Category) -> bool {
        self.slot(category).read().is_ready(&self.config)
    }

    pub fn mode(&self, category: Category) -> ServingMode {
        self.slot(category).read().mode(&self.config)
    }

    /// Hold a category in learning mode regardless of readiness
    pub fn force_learning(&self, category: Category) {
        self.slot(category).write().pinned_learning = true;
        self.persist();
        info!("{} pinned to learning mode", category);
    }

    /// Let a category be promoted automatically again
    pub fn release(&self, category: Category) {
        self.slot(category).write().pinned_learning = false;
        self.persist();
        info!("{} released to automatic promotion", category);
    }

    /// Stop recording new examples
    pub fn enable_production_mode(&self) {
        self.learning.store(false, Ordering::SeqCst);
        info!("Production mode enabled - no longer recording examples");
    }

    /// Resume recording new examples
    pub fn enable_learning_mode(&self) {
        self.learning.store(true, Ordering::SeqCst);
        info!("Learning mode enabled");
    }

    pub fn is_learning(&self) -> bool {
        self.learning.load(Ordering::SeqCst)
    }

    /// Per-category summary
    pub fn stats(&self) -> BTreeMap<Category, CategoryStats> {
        Category::ALL
            .iter()
            .map(|&category| {
                let model = self.slot(category).read();
                let stats = CategoryStats {
                    accuracy: format!("{:.1}%", model.accuracy * 100.0),
                    training_count: model.training_count,
                    patterns_learned: model.patterns.len(),
                    ready_for_production: model.is_ready(&self.config),
                    mode: model.mode(&self.config),
                };
                (category, stats)
            })
            .collect()
    }

    /// Copy of the full learned state
    pub fn snapshot(&self) -> EngineSnapshot {
        let models = Category::ALL
            .iter()
            .map(|&category| (category, self.model(category)))
            .collect();
        let training_history = self.history.lock().iter().cloned().collect();

        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            models,
            training_history,
        }
    }

    /// Replace learned state with `snapshot`
    pub fn restore(&self, snapshot: EngineSnapshot) {
        for (category, mut model) in snapshot.models {
            model.category = category;
            model.accuracy = model.accuracy.clamp(0.0, self.config.accuracy_ceiling);
            *self.slot(category).write() = model;
        }

        let skip = snapshot
            .training_history
            .len()
            .saturating_sub(self.config.history_limit);
        *self.history.lock() = snapshot.training_history.into_iter().skip(skip).collect();
    }

    /// Number of examples in the training history
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Wait for queued snapshot writes to land
    pub async fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.flush().await;
        }
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        let _guard = self.persist_lock.lock();
        match self.snapshot().encode() {
            Ok(document) => persistence.save(document),
            Err(e) => error!("Failed to encode snapshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gencache_core::{MovieOutput, Provenance, Scene, VoiceOutput};
    use serde_json::json;

    fn movie(description: &str) -> GenerationOutput {
        GenerationOutput::Movie(MovieOutput {
            scenes: vec![Scene {
                title: "One".to_string(),
                description: description.to_string(),
                ..Default::default()
            }],
            metadata: json!({"model": "gpt-4o"}).as_object().cloned(),
            ..Default::default()
        })
    }

    fn ready_config() -> EngineConfig {
        EngineConfig {
            ready_accuracy: 0.1,
            ready_training_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_learning_disabled_records_nothing() {
        let engine = LearningEngine::new(EngineConfig::default()).unwrap();
        engine.enable_production_mode();

        let outcome = engine
            .learn("a film", &movie("slow"), Category::Movie)
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(engine.model(Category::Movie).training_count, 0);

        engine.enable_learning_mode();
        assert!(engine
            .learn("a film", &movie("slow"), Category::Movie)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_category_mismatch_is_rejected() {
        let engine = LearningEngine::new(EngineConfig::default()).unwrap();
        let result = engine.learn("x", &movie("slow"), Category::Voice);
        assert!(result.is_err());
        assert_eq!(engine.model(Category::Voice).training_count, 0);
    }

    #[test]
    fn test_cache_generated_outputs_are_not_learned() {
        let engine = LearningEngine::new(EngineConfig::default()).unwrap();
        let mut output = GenerationOutput::Voice(VoiceOutput::default());
        output.set_provenance(Provenance::synthesized(0.5));

        assert!(engine.learn("hi", &output, Category::Voice).unwrap().is_none());
    }

    #[test]
    fn test_generate_adaptive_requires_production() {
        let engine = LearningEngine::new(EngineConfig::default()).unwrap();
        engine
            .learn("a dark night", &movie("dark night"), Category::Movie)
            .unwrap();
        assert!(engine.generate_adaptive(Category::Movie, "a dark night").is_none());
    }

    #[test]
    fn test_generate_adaptive_adapts_then_synthesizes() {
        let engine = LearningEngine::new(ready_config()).unwrap();
        let input = "detective story in the rain";
        engine.learn(input, &movie("slow rain"), Category::Movie).unwrap();

        let output = engine.generate_adaptive(Category::Movie, input).unwrap();
        assert!(output.is_cache_generated());
        assert_eq!(output.scenes()[0].description, "slow rain");

        // Selecting the pattern bumps its use counter
        let pattern = engine.find_best_match(Category::Movie, input).unwrap();
        assert_eq!(pattern.uses, 2);

        // Nothing similar stored: synthesized from scratch
        let output = engine
            .generate_adaptive(Category::Movie, &"x".repeat(400))
            .unwrap();
        assert!(matches!(
            output.provenance().map(|p| &p.source),
            Some(gencache_core::ProvenanceSource::Synthesized)
        ));
    }

    #[test]
    fn test_force_learning_and_release() {
        let engine = LearningEngine::new(ready_config()).unwrap();
        engine.learn("x", &movie("y"), Category::Movie).unwrap();
        assert_eq!(engine.mode(Category::Movie), ServingMode::Production);

        engine.force_learning(Category::Movie);
        assert_eq!(engine.mode(Category::Movie), ServingMode::Learning);
        assert!(engine.generate_adaptive(Category::Movie, "x").is_none());

        engine.release(Category::Movie);
        assert_eq!(engine.mode(Category::Movie), ServingMode::Production);
    }

    #[test]
    fn test_history_is_bounded() {
        let engine = LearningEngine::new(EngineConfig {
            history_limit: 3,
            ..Default::default()
        })
        .unwrap();

        for i in 0..5 {
            engine
                .learn(&format!("input {i}"), &movie("d"), Category::Movie)
                .unwrap();
        }

        assert_eq!(engine.history_len(), 3);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.training_history[0].input, "input 2");
    }

    #[test]
    fn test_stats_format() {
        let engine = LearningEngine::new(EngineConfig::default()).unwrap();
        engine.learn("a film", &movie("d"), Category::Movie).unwrap();

        let stats = engine.stats();
        assert_eq!(stats.len(), 4);
        let movie_stats = &stats[&Category::Movie];
        // 0.1 + 0.8 * 0.02
        assert_eq!(movie_stats.accuracy, "11.6%");
        assert_eq!(movie_stats.training_count, 1);
        assert_eq!(movie_stats.patterns_learned, 1);
        assert!(!movie_stats.ready_for_production);
        assert_eq!(stats[&Category::Voice].accuracy, "10.0%");
    }
}
