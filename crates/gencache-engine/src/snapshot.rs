//! Versioned snapshot format for learned state
//!
//! Current layout (version 1):
//!
//! ```json
//! {
//!   "version": 1,
//!   "savedAt": "2026-01-01T00:00:00Z",
//!   "models": { "movie": { "trainingCount": 3, "accuracy": 0.148, "patterns": { ... } } },
//!   "trainingHistory": [ ... ]
//! }
//! ```
//!
//! Documents without a `version` field but with a `models` object are the
//! older unversioned layout (untyped outputs, `trainingData` history, model
//! keys by type name). They are upgraded on load.

use crate::context::ContextExtractor;
use crate::model::ModelState;
use crate::pattern_store::{bucket_key, Pattern};
use chrono::{DateTime, TimeZone, Utc};
use gencache_core::{Category, Context, Error, GenerationOutput, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Version written by this build
pub const SNAPSHOT_VERSION: u64 = 1;

/// Full persisted state of a learning engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub version: u64,
    pub saved_at: DateTime<Utc>,
    pub models: BTreeMap<Category, ModelState>,
    #[serde(default)]
    pub training_history: Vec<TrainingRecord>,
}

/// One learned example as kept in the bounded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    pub input: String,
    pub category: Category,
    pub output: GenerationOutput,
    pub quality: f64,
    pub recorded_at: DateTime<Utc>,
}

impl EngineSnapshot {
    /// Serialize to a JSON document
    pub fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode any supported snapshot version
    pub fn decode(document: Value, extractor: &ContextExtractor) -> Result<Self> {
        match document.get("version") {
            Some(version) => match version.as_u64() {
                Some(SNAPSHOT_VERSION) => Ok(serde_json::from_value(document)?),
                Some(other) => Err(Error::snapshot(format!(
                    "unsupported snapshot version {other}"
                ))),
                None => Err(Error::snapshot("snapshot version is not an integer")),
            },
            None if document.get("models").is_some_and(Value::is_object) => {
                debug!("Upgrading unversioned snapshot");
                migrate_unversioned(document, extractor)
            }
            None => Err(Error::snapshot("document is not a snapshot")),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnversionedDocument {
    #[serde(default)]
    models: BTreeMap<String, UnversionedModel>,
    #[serde(default)]
    training_data: Vec<UnversionedExample>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnversionedModel {
    #[serde(default)]
    patterns: BTreeMap<String, UnversionedPattern>,
    #[serde(default)]
    training_count: u64,
    #[serde(default)]
    accuracy: f64,
}

#[derive(Deserialize)]
struct UnversionedPattern {
    input: String,
    output: Value,
    #[serde(default)]
    quality: f64,
    #[serde(default)]
    context: Option<Context>,
    #[serde(default)]
    uses: u64,
}

#[derive(Deserialize)]
struct UnversionedExample {
    input: String,
    output: Value,
    #[serde(rename = "type")]
    category: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    quality: f64,
}

fn migrate_unversioned(document: Value, extractor: &ContextExtractor) -> Result<EngineSnapshot> {
    let old: UnversionedDocument = serde_json::from_value(document)?;
    let mut models = BTreeMap::new();

    for (name, old_model) in old.models {
        let Ok(category) = name.parse::<Category>() else {
            warn!("Dropping model for unknown category {:?}", name);
            continue;
        };

        let mut model = ModelState {
            category,
            training_count: old_model.training_count,
            accuracy: old_model.accuracy,
            patterns: Default::default(),
            pinned_learning: false,
        };

        for (old_key, old_pattern) in old_model.patterns {
            let output = match GenerationOutput::from_json(category, old_pattern.output) {
                Ok(output) => output,
                Err(e) => {
                    warn!("Dropping unreadable {} pattern {:?}: {}", category, old_key, e);
                    continue;
                }
            };
            let context = old_pattern
                .context
                .unwrap_or_else(|| extractor.extract(&old_pattern.input));

            model.patterns.restore(
                bucket_key(&context),
                Pattern {
                    input_text: old_pattern.input,
                    context,
                    output,
                    quality: old_pattern.quality,
                    uses: old_pattern.uses,
                },
            );
        }

        models.insert(category, model);
    }

    let training_history = old
        .training_data
        .into_iter()
        .filter_map(|example| {
            let category = example.category.parse::<Category>().ok()?;
            let output = GenerationOutput::from_json(category, example.output).ok()?;
            Some(TrainingRecord {
                input: example.input,
                category,
                output,
                quality: example.quality,
                recorded_at: Utc
                    .timestamp_millis_opt(example.timestamp)
                    .single()
                    .unwrap_or_else(Utc::now),
            })
        })
        .collect();

    Ok(EngineSnapshot {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        models,
        training_history,
    })
}
