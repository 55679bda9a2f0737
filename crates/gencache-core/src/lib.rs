//! gencache Core
//!
//! Core types and error handling shared across gencache components.
//!
//! This crate provides:
//! - Content categories and the derived input context used for similarity
//! - Typed generation outputs, one variant per category
//! - Provenance stamps for outputs served without the external generator
//! - Error types and result handling

pub mod error;
pub mod output;
pub mod types;

pub use error::{Error, Result};
pub use output::{
    AnalysisOutput, GenerationOutput, Mood, MovieOutput, MusicOutput, Provenance,
    ProvenanceSource, Scene, Section, TechnicalSpecs, VoiceOutput,
};
pub use types::{Category, Context};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::output::{GenerationOutput, Provenance, ProvenanceSource};
    pub use crate::types::{Category, Context};
}
