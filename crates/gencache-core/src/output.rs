//! Typed generation outputs
//!
//! Every category has its own output shape. Only a handful of fields are
//! understood by the cache: scene and section lists (adapted and scored),
//! the metadata object (scored) and the provenance stamp. Everything else a
//! collaborator returns is carried through untouched in `extra`.

use crate::error::{Error, Result};
use crate::types::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of a generation request, tagged by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationOutput {
    Movie(MovieOutput),
    Music(MusicOutput),
    Voice(VoiceOutput),
    Analysis(AnalysisOutput),
}

impl GenerationOutput {
    /// Lift an untyped collaborator response into the variant for `category`
    pub fn from_json(category: Category, value: Value) -> Result<Self> {
        let output = match category {
            Category::Movie => Self::Movie(serde_json::from_value(value)?),
            Category::Music => Self::Music(serde_json::from_value(value)?),
            Category::Voice => Self::Voice(serde_json::from_value(value)?),
            Category::Analysis => Self::Analysis(serde_json::from_value(value)?),
        };
        Ok(output)
    }

    /// Serialize the variant body without the `kind` tag
    pub fn to_untagged_json(&self) -> Result<Value> {
        let value = match self {
            Self::Movie(o) => serde_json::to_value(o)?,
            Self::Music(o) => serde_json::to_value(o)?,
            Self::Voice(o) => serde_json::to_value(o)?,
            Self::Analysis(o) => serde_json::to_value(o)?,
        };
        Ok(value)
    }

    /// Category this output belongs to
    pub fn category(&self) -> Category {
        match self {
            Self::Movie(_) => Category::Movie,
            Self::Music(_) => Category::Music,
            Self::Voice(_) => Category::Voice,
            Self::Analysis(_) => Category::Analysis,
        }
    }

    /// Fail unless this output belongs to `expected`
    pub fn ensure_category(&self, expected: Category) -> Result<()> {
        let actual = self.category();
        if actual == expected {
            Ok(())
        } else {
            Err(Error::CategoryMismatch { expected, actual })
        }
    }

    /// Scene list (movies only)
    pub fn scenes(&self) -> &[Scene] {
        match self {
            Self::Movie(o) => &o.scenes,
            _ => &[],
        }
    }

    /// Section structure (music only)
    pub fn structure(&self) -> &[Section] {
        match self {
            Self::Music(o) => &o.structure,
            _ => &[],
        }
    }

    /// Metadata object, when the output carries one
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Movie(o) => o.metadata.as_ref(),
            Self::Music(o) => o.metadata.as_ref(),
            Self::Voice(o) => o.metadata.as_ref(),
            Self::Analysis(o) => o.metadata.as_ref(),
        }
    }

    /// Mutable descriptions the adaptive generator is allowed to rewrite
    pub fn adaptable_descriptions_mut(&mut self) -> Vec<&mut String> {
        match self {
            Self::Movie(o) => o.scenes.iter_mut().map(|s| &mut s.description).collect(),
            Self::Music(o) => o
                .structure
                .iter_mut()
                .map(|s| &mut s.description)
                .collect(),
            Self::Voice(_) | Self::Analysis(_) => Vec::new(),
        }
    }

    /// Provenance stamp, present only on outputs produced by the cache itself
    pub fn provenance(&self) -> Option<&Provenance> {
        match self {
            Self::Movie(o) => o.provenance.as_ref(),
            Self::Music(o) => o.provenance.as_ref(),
            Self::Voice(o) => o.provenance.as_ref(),
            Self::Analysis(o) => o.provenance.as_ref(),
        }
    }

    /// Stamp provenance onto the output
    pub fn set_provenance(&mut self, provenance: Provenance) {
        let slot = match self {
            Self::Movie(o) => &mut o.provenance,
            Self::Music(o) => &mut o.provenance,
            Self::Voice(o) => &mut o.provenance,
            Self::Analysis(o) => &mut o.provenance,
        };
        *slot = Some(provenance);
    }

    /// Whether the output was served without calling the external generator
    pub fn is_cache_generated(&self) -> bool {
        self.provenance().is_some()
    }
}

/// Where a cache-served output came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Adapted from a stored example or synthesized from scratch
    pub source: ProvenanceSource,

    /// Serving category's accuracy at generation time
    pub accuracy: f64,

    /// When the output was produced
    pub generated_at: DateTime<Utc>,
}

impl Provenance {
    /// Provenance for an output adapted from a stored example
    pub fn adapted(adapted_from: impl Into<String>, accuracy: f64) -> Self {
        Self {
            source: ProvenanceSource::Adapted {
                adapted_from: adapted_from.into(),
            },
            accuracy,
            generated_at: Utc::now(),
        }
    }

    /// Provenance for an output synthesized from context numbers alone
    pub fn synthesized(accuracy: f64) -> Self {
        Self {
            source: ProvenanceSource::Synthesized,
            accuracy,
            generated_at: Utc::now(),
        }
    }
}

/// Origin of a cache-served output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProvenanceSource {
    /// Rewritten from a learned example
    Adapted {
        /// Excerpt of the example input the output was adapted from
        #[serde(rename = "adaptedFrom")]
        adapted_from: String,
    },

    /// Built without any stored example
    Synthesized,
}

/// Movie generation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    #[serde(default)]
    pub scenes: Vec<Scene>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    /// Collaborator fields the cache does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One scene of a movie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Music generation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waveform_data: Vec<f64>,

    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default)]
    pub structure: Vec<Section>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specs: Option<TechnicalSpecs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One section of a music structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub section: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instrumentation: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Production parameters of a music track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSpecs {
    #[serde(default)]
    pub bpm: u32,

    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub time_signature: String,

    #[serde(default)]
    pub sample_rate: String,
}

/// Voice generation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content analysis result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mood assessment of analysed content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mood {
    /// Rating on a 1-10 scale
    #[serde(default)]
    pub rating: f64,

    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub description: String,
}
