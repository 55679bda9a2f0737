//! Fallback orchestrator
//!
//! Answers a request from, in order:
//! 1. The result cache (exact input match)
//! 2. The adaptive generator, when the category is serving in production
//! 3. The external generator, learning from its output
//!
//! When neither the adaptive nor the external path is permitted the request
//! fails with a configuration error.

use crate::cache::{CacheKey, ResultCache};
use crate::config::OrchestratorConfig;
use crate::engine::{CategoryStats, LearningEngine};
use crate::generator::ExternalGenerator;
use gencache_core::{Category, Error, GenerationOutput, Result};
use gencache_telemetry::{MetricsCollector, MetricsSnapshot};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of [`FallbackOrchestrator::optimize`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeReport {
    /// Categories that met the readiness thresholds
    pub ready_categories: Vec<Category>,
    /// Whether production mode was switched on
    pub production_enabled: bool,
    pub cache_size_before: usize,
    pub cache_size_after: usize,
}

/// Operator view of the orchestrator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorStatus {
    pub config: OrchestratorConfig,
    pub learning: bool,
    pub cache_size: usize,
    pub models: BTreeMap<Category, CategoryStats>,
    pub metrics: MetricsSnapshot,
}

pub struct FallbackOrchestrator {
    engine: Arc<LearningEngine>,
    config: RwLock<OrchestratorConfig>,
    cache: ResultCache,
    metrics: MetricsCollector,
}

impl FallbackOrchestrator {
    pub fn new(engine: Arc<LearningEngine>, config: OrchestratorConfig) -> Self {
        let cache = ResultCache::new(config.cache_capacity, config.cache_retain);
        Self {
            engine,
            config: RwLock::new(config),
            cache,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn engine(&self) -> &Arc<LearningEngine> {
        &self.engine
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn config(&self) -> OrchestratorConfig {
        self.config.read().clone()
    }

    /// Serve `input`, calling `external` only when nothing cheaper may answer
    ///
    /// `external` is invoked at most once and no internal lock is held while
    /// its future runs.
    pub async fn generate_with_fallback<F, Fut, E>(
        &self,
        category: Category,
        input: &str,
        external: F,
    ) -> Result<GenerationOutput>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<GenerationOutput, E>>,
        E: Display,
    {
        self.metrics.record_request();
        let config = self.config();
        let key = CacheKey::new(category, input);

        if config.cache_results {
            if let Some(output) = self.cache.get(&key) {
                debug!("Result cache hit for {}", category);
                self.metrics.record_cache_hit();
                metrics::counter!("gencache_requests_total", "category" => category.as_str(), "source" => "cache")
                    .increment(1);
                return Ok(output);
            }
        }

        if config.enable_adaptive {
            if let Some(output) = self.engine.generate_adaptive(category, input) {
                self.metrics.record_adaptive();
                metrics::counter!("gencache_requests_total", "category" => category.as_str(), "source" => "adaptive")
                    .increment(1);
                self.remember(&config, key, &output);
                return Ok(output);
            }
        }

        if !config.fallback_to_external {
            self.metrics.record_config_error();
            metrics::counter!("gencache_failures_total", "category" => category.as_str(), "kind" => "config")
                .increment(1);
            return Err(Error::config(format!(
                "no generation path for {category}: adaptive generation unavailable and external fallback disabled"
            )));
        }

        debug!("Calling external generator for {}", category);
        let start = Instant::now();
        let output = match external().await {
            Ok(output) => output,
            Err(e) => {
                self.metrics.record_external_failure();
                metrics::counter!("gencache_failures_total", "category" => category.as_str(), "kind" => "external")
                    .increment(1);
                warn!("External {} generation failed: {}", category, e);
                return Err(Error::generation(category, e.to_string()));
            }
        };

        let latency_us = start.elapsed().as_micros() as u64;
        self.metrics.record_external(latency_us);
        metrics::histogram!("gencache_external_latency_us", "category" => category.as_str())
            .record(latency_us as f64);
        metrics::counter!("gencache_requests_total", "category" => category.as_str(), "source" => "external")
            .increment(1);

        self.engine.learn(input, &output, category)?;
        self.remember(&config, key, &output);

        Ok(output)
    }

    /// [`generate_with_fallback`](Self::generate_with_fallback) over a trait object
    pub async fn generate_with(
        &self,
        category: Category,
        input: &str,
        generator: &dyn ExternalGenerator,
    ) -> Result<GenerationOutput> {
        self.generate_with_fallback(category, input, || generator.generate(category, input))
            .await
    }

    fn remember(&self, config: &OrchestratorConfig, key: CacheKey, output: &GenerationOutput) {
        if config.cache_results {
            self.cache.insert(key, output.clone());
        }
    }

    /// Serve only from learned state: no external calls, no new examples
    pub fn enable_production_mode(&self) {
        self.config.write().fallback_to_external = false;
        self.engine.enable_production_mode();
        info!("Orchestrator in production mode - external fallback disabled");
    }

    /// Fall back to the external generator and keep learning from it
    pub fn enable_development_mode(&self) {
        self.config.write().fallback_to_external = true;
        self.engine.enable_learning_mode();
        info!("Orchestrator in development mode - external fallback enabled");
    }

    /// Switch to production once any category is ready and trim the cache
    pub fn optimize(&self) -> OptimizeReport {
        let ready_categories: Vec<Category> = Category::ALL
            .iter()
            .copied()
            .filter(|&category| self.engine.is_ready(category))
            .collect();

        let production_enabled = !ready_categories.is_empty();
        if production_enabled {
            self.enable_production_mode();
        }

        let cache_size_before = self.cache.len();
        self.cache.trim();
        let cache_size_after = self.cache.len();

        info!(
            "Optimized: {} ready categories, cache {} -> {}",
            ready_categories.len(),
            cache_size_before,
            cache_size_after
        );

        OptimizeReport {
            ready_categories,
            production_enabled,
            cache_size_before,
            cache_size_after,
        }
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            config: self.config(),
            learning: self.engine.is_learning(),
            cache_size: self.cache.len(),
            models: self.engine.stats(),
            metrics: self.metrics.snapshot(),
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("Result cache cleared");
    }
}
