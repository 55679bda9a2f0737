//! Template-based stand-in for an expensive generation backend

use async_trait::async_trait;
use gencache_core::{
    AnalysisOutput, Category, GenerationOutput, Mood, MovieOutput, MusicOutput, Scene, Section,
    TechnicalSpecs, VoiceOutput,
};
use gencache_engine::ExternalGenerator;
use rand::prelude::*;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Mock generator producing plausible outputs with optional latency and failures
pub struct TemplateGenerator {
    latency: Duration,
    failure_rate: f64,
    templates: SceneTemplates,
}

impl TemplateGenerator {
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            templates: SceneTemplates::new(),
        }
    }

    fn render(&self, category: Category, input: &str) -> GenerationOutput {
        let mut rng = rand::thread_rng();
        let id: u32 = rng.gen();
        let metadata = metadata(input);

        match category {
            Category::Movie => GenerationOutput::Movie(MovieOutput {
                video_url: Some(format!("/media/movie_{id:08x}.mp4")),
                audio_url: Some(format!("/media/movie_{id:08x}.wav")),
                thumbnail_url: Some(format!("/media/movie_{id:08x}.jpg")),
                duration: Some(rng.gen_range(45..240) as f64),
                quality: Some("1080p".to_string()),
                scenes: self
                    .templates
                    .scenes
                    .choose_multiple(&mut rng, 3)
                    .enumerate()
                    .map(|(i, description)| Scene {
                        title: format!("Scene {}", i + 1),
                        description: (*description).to_string(),
                        duration: Some(rng.gen_range(10..60) as f64),
                        ..Default::default()
                    })
                    .collect(),
                metadata: Some(metadata),
                ..Default::default()
            }),
            Category::Music => GenerationOutput::Music(MusicOutput {
                audio_url: Some(format!("/media/track_{id:08x}.wav")),
                waveform_data: (0..64).map(|_| rng.gen::<f64>()).collect(),
                duration: Some(rng.gen_range(90..300) as f64),
                style: self.templates.styles.choose(&mut rng).map(|s| s.to_string()),
                structure: ["Intro", "Verse", "Chorus", "Outro"]
                    .iter()
                    .map(|section| Section {
                        section: section.to_string(),
                        description: self
                            .templates
                            .passages
                            .choose(&mut rng)
                            .map(|p| p.to_string())
                            .unwrap_or_default(),
                        ..Default::default()
                    })
                    .collect(),
                technical_specs: Some(TechnicalSpecs {
                    bpm: rng.gen_range(70..160),
                    key: "A Minor".to_string(),
                    time_signature: "4/4".to_string(),
                    sample_rate: "48kHz/24bit".to_string(),
                }),
                metadata: Some(metadata),
                ..Default::default()
            }),
            Category::Voice => GenerationOutput::Voice(VoiceOutput {
                audio_url: Some(format!("/media/voice_{id:08x}.wav")),
                duration: Some((input.chars().count() as f64 / 12.0).max(2.0)),
                voice: Some("studio-narrator".to_string()),
                speed: Some("normal".to_string()),
                metadata: Some(metadata),
                ..Default::default()
            }),
            Category::Analysis => GenerationOutput::Analysis(AnalysisOutput {
                mood: Some(Mood {
                    rating: rng.gen_range(3.0..9.0),
                    confidence: rng.gen_range(0.6..0.99),
                    description: "Measured and reflective".to_string(),
                }),
                genre: self.templates.styles.choose(&mut rng).map(|s| s.to_string()),
                complexity: Some(rng.gen_range(1.0..10.0)),
                suggestions: vec!["Tighten the second act".to_string()],
                metadata: Some(metadata),
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl ExternalGenerator for TemplateGenerator {
    async fn generate(&self, category: Category, input: &str) -> anyhow::Result<GenerationOutput> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if rand::thread_rng().gen_bool(self.failure_rate) {
            anyhow::bail!("simulated {} backend failure", category);
        }

        Ok(self.render(category, input))
    }

    fn name(&self) -> &str {
        "template"
    }
}

fn metadata(input: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("generator".to_string(), json!("template"));
    map.insert("prompt".to_string(), json!(input));
    map
}

/// Canned fragments the mock stitches together
struct SceneTemplates {
    scenes: Vec<&'static str>,
    passages: Vec<&'static str>,
    styles: Vec<&'static str>,
}

impl SceneTemplates {
    fn new() -> Self {
        Self {
            scenes: vec![
                "A slow pan across a dark harbour at dawn",
                "Rain streaks the window of a quiet diner",
                "A fast chase through neon-lit alleys",
                "Sad farewell on an empty platform",
                "Bright morning light floods the valley",
                "A crowd gathers in the ancient square",
            ],
            passages: vec![
                "slow piano over soft pads",
                "bright brass stabs",
                "dark cello drone",
                "fast hi-hats and a driving bass",
                "happy whistled melody",
            ],
            styles: vec!["Cinematic", "Lo-fi", "Orchestral", "Synthwave", "Folk"],
        }
    }
}

/// Prompts used to simulate traffic
pub fn sample_prompts(category: Category) -> &'static [&'static str] {
    match category {
        Category::Movie => &[
            "A detective walks through a rainy city at night",
            "A beautiful sunrise over the mountains",
            "Robots exploring an abandoned space station",
            "A terrible storm hits a small fishing village",
            "Two friends on an amazing road trip",
        ],
        Category::Music => &[
            "Smooth jazz for a late night drive",
            "Epic orchestral battle theme",
            "Sad piano ballad in the rain",
            "Happy ukulele tune for a summer day",
        ],
        Category::Voice => &[
            "Welcome to the museum of natural history",
            "Your order has shipped and will arrive tomorrow",
            "Once upon a time in a distant kingdom",
        ],
        Category::Analysis => &[
            "Review this short story about a lonely lighthouse keeper",
            "Assess the pacing of this thriller screenplay",
            "Evaluate the mood of this wonderful poem",
        ],
    }
}
