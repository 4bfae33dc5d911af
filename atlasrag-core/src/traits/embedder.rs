//! Embedding generation trait.
//!
//! Embedders turn text into dense vectors. The vector store handle uses one
//! to embed query text before a similarity search and to embed documents
//! before insertion.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::Result;

/// Generates dense embeddings for text content.
///
/// # Examples
///
/// ```rust,no_run
/// use atlasrag_core::traits::Embedder;
/// use atlasrag_core::Result;
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct ConstantEmbedder {
///     dimension: usize,
/// }
///
/// #[async_trait]
/// impl Embedder for ConstantEmbedder {
///     async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
///         Ok(vec![0.1; self.dimension])
///     }
///
///     async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
///         Ok(texts.iter().map(|_| vec![0.1; self.dimension]).collect())
///     }
///
///     fn dimension(&self) -> usize {
///         self.dimension
///     }
///
///     fn model_name(&self) -> &str {
///         "constant"
///     }
/// }
/// ```
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Generate the embedding for a single text.
    ///
    /// The returned vector has `dimension()` entries.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for several texts.
    ///
    /// The output has one embedding per input, in input order.
    async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the produced embeddings.
    fn dimension(&self) -> usize;

    /// Identifier of the embedding model, exactly as configured.
    fn model_name(&self) -> &str;

    /// Human-readable name of this embedder.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Check that the embedder can serve requests.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Metadata describing the model.
    fn metadata(&self) -> HashMap<String, serde_json::Value> {
        let mut metadata = HashMap::new();
        metadata.insert("model_name".to_string(), self.model_name().into());
        metadata.insert("dimension".to_string(), self.dimension().into());
        metadata
    }
}

/// Statistics about embedding operations.
#[derive(Debug, Clone)]
pub struct EmbeddingStats {
    /// Number of texts embedded.
    pub texts_embedded: usize,

    /// Number of texts whose embedding failed.
    pub embeddings_failed: usize,

    /// Number of texts served from a cache.
    pub cache_hits: usize,

    /// Total time spent embedding.
    pub duration: std::time::Duration,

    /// Average time per embedding.
    pub avg_time_per_embedding: std::time::Duration,
}

impl EmbeddingStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self {
            texts_embedded: 0,
            embeddings_failed: 0,
            cache_hits: 0,
            duration: std::time::Duration::ZERO,
            avg_time_per_embedding: std::time::Duration::ZERO,
        }
    }

    /// Success rate as a percentage.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let total = self.texts_embedded + self.embeddings_failed;
        if total == 0 {
            0.0
        } else {
            (self.texts_embedded as f64 / total as f64) * 100.0
        }
    }

    /// Recompute the average time per embedding.
    #[allow(clippy::cast_possible_truncation)]
    pub fn update_avg_time(&mut self) {
        let total = self.texts_embedded + self.embeddings_failed;
        if total > 0 {
            self.avg_time_per_embedding = self.duration / total as u32;
        }
    }
}

impl Default for EmbeddingStats {
    fn default() -> Self {
        Self::new()
    }
}
