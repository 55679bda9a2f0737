//! Snapshot persistence through the learning engine

use gencache_core::{Category, GenerationOutput, MusicOutput, Section};
use gencache_engine::{EngineConfig, LearningEngine, SNAPSHOT_VERSION};
use gencache_telemetry::{PersistenceConfig, PersistenceService};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

fn service(path: &Path) -> PersistenceService {
    PersistenceService::new(PersistenceConfig::at(path)).unwrap()
}

fn music(description: &str) -> GenerationOutput {
    GenerationOutput::Music(MusicOutput {
        structure: vec![Section {
            section: "Intro".to_string(),
            description: description.to_string(),
            ..Default::default()
        }],
        ..Default::default()
    })
}

#[tokio::test]
async fn test_learned_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");

    let engine = LearningEngine::with_persistence(EngineConfig::default(), service(&path)).unwrap();
    engine
        .learn("smooth jazz at night", &music("slow sax"), Category::Music)
        .unwrap();
    engine
        .learn("upbeat synth pop", &music("fast drums"), Category::Music)
        .unwrap();
    engine.force_learning(Category::Voice);
    engine.flush().await;
    let before = engine.snapshot();
    drop(engine);

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["version"], SNAPSHOT_VERSION);
    assert_eq!(document["models"]["music"]["trainingCount"], 2);

    let restored =
        LearningEngine::with_persistence(EngineConfig::default(), service(&path)).unwrap();
    let after = restored.snapshot();
    assert_eq!(after.models, before.models);
    assert_eq!(after.training_history, before.training_history);
    assert!(restored.model(Category::Voice).pinned_learning);
}

#[tokio::test]
async fn test_concurrent_learners_leave_newest_state_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    let engine = LearningEngine::with_persistence(EngineConfig::default(), service(&path)).unwrap();

    std::thread::scope(|s| {
        for worker in 0..8 {
            let engine = &engine;
            s.spawn(move || {
                for i in 0..25 {
                    engine
                        .learn(
                            &format!("worker {worker} track {i}"),
                            &music("slow"),
                            Category::Music,
                        )
                        .unwrap();
                }
            });
        }
    });
    engine.flush().await;

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(engine.model(Category::Music).training_count, 200);
    assert_eq!(document["models"]["music"]["trainingCount"], 200);
    assert_eq!(
        document["trainingHistory"].as_array().map(Vec::len),
        Some(200)
    );
}

#[tokio::test]
async fn test_missing_snapshot_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let engine = LearningEngine::with_persistence(
        EngineConfig::default(),
        service(&dir.path().join("absent.json")),
    )
    .unwrap();

    assert_eq!(engine.model(Category::Movie).training_count, 0);
    assert_eq!(engine.history_len(), 0);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_fresh_and_is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    std::fs::write(&path, "{ not json").unwrap();

    let engine = LearningEngine::with_persistence(EngineConfig::default(), service(&path)).unwrap();
    assert_eq!(engine.model(Category::Music).training_count, 0);

    engine
        .learn("cello solo", &music("sad"), Category::Music)
        .unwrap();
    engine.flush().await;

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["models"]["music"]["trainingCount"], 1);
}

#[tokio::test]
async fn test_unversioned_snapshot_is_upgraded_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    let legacy = json!({
        "models": {
            "voice": {
                "patterns": {
                    "0.0-11-read-this": {
                        "input": "read this aloud",
                        "output": {"audioUrl": "/v.wav", "duration": 3},
                        "quality": 0.6,
                        "uses": 2
                    }
                },
                "trainingCount": 9,
                "accuracy": 0.99
            }
        },
        "trainingData": [],
        "lastSaved": 1700000000000i64
    });
    std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

    let engine = LearningEngine::with_persistence(EngineConfig::default(), service(&path)).unwrap();
    let voice = engine.model(Category::Voice);

    assert_eq!(voice.training_count, 9);
    // Accuracy above the ceiling is clamped on restore
    assert_eq!(voice.accuracy, 0.95);
    assert_eq!(voice.patterns.len(), 1);
    assert!(engine.is_ready(Category::Voice));
    assert!(engine.find_best_match(Category::Voice, "read this aloud").is_some());
}

#[tokio::test]
async fn test_future_snapshot_version_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.json");
    std::fs::write(&path, r#"{"version": 42, "models": {}}"#).unwrap();

    let engine = LearningEngine::with_persistence(EngineConfig::default(), service(&path)).unwrap();
    assert_eq!(engine.model(Category::Voice).training_count, 0);
}
