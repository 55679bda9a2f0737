//! Structural quality scoring of generation outputs
//!
//! The score only looks at which known fields are present and non-empty,
//! never at their contents.

use gencache_core::GenerationOutput;

const BASE_QUALITY: f64 = 0.5;
const SCENES_BONUS: f64 = 0.2;
const STRUCTURE_BONUS: f64 = 0.2;
const METADATA_BONUS: f64 = 0.1;

/// Score `output` in [0, 1]
pub fn evaluate_quality(output: &GenerationOutput) -> f64 {
    let mut quality = BASE_QUALITY;

    if !output.scenes().is_empty() {
        quality += SCENES_BONUS;
    }
    if !output.structure().is_empty() {
        quality += STRUCTURE_BONUS;
    }
    if output.metadata().is_some_and(|m| !m.is_empty()) {
        quality += METADATA_BONUS;
    }

    quality.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gencache_core::{AnalysisOutput, MovieOutput, MusicOutput, Scene, Section};
    use serde_json::{json, Map};

    fn metadata() -> Option<Map<String, serde_json::Value>> {
        json!({"model": "gpt-4o"}).as_object().cloned()
    }

    #[test]
    fn test_bare_output_scores_base() {
        let output = GenerationOutput::Analysis(AnalysisOutput::default());
        assert_eq!(evaluate_quality(&output), 0.5);
    }

    #[test]
    fn test_movie_with_scenes_and_metadata() {
        let output = GenerationOutput::Movie(MovieOutput {
            scenes: vec![Scene::default()],
            metadata: metadata(),
            ..Default::default()
        });
        assert!((evaluate_quality(&output) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_lists_earn_nothing() {
        let output = GenerationOutput::Music(MusicOutput {
            structure: Vec::new(),
            metadata: Some(Map::new()),
            ..Default::default()
        });
        assert_eq!(evaluate_quality(&output), 0.5);
    }

    #[test]
    fn test_music_with_structure() {
        let output = GenerationOutput::Music(MusicOutput {
            structure: vec![Section::default(), Section::default()],
            ..Default::default()
        });
        assert!((evaluate_quality(&output) - 0.7).abs() < 1e-9);
    }
}
