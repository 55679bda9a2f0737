//! External generator trait

use async_trait::async_trait;
use gencache_core::{Category, GenerationOutput};

/// The expensive generator the cache sits in front of
#[async_trait]
pub trait ExternalGenerator: Send + Sync {
    /// Produce an output of `category` for `input`
    async fn generate(&self, category: Category, input: &str) -> anyhow::Result<GenerationOutput>;

    /// Get the generator name
    fn name(&self) -> &str;
}
