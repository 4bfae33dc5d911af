//! Similarity search queries.

use std::collections::HashMap;

/// Default number of results, matching what the retrieval chain asks for.
pub const DEFAULT_TOP_K: usize = 4;

/// A similarity search request.
///
/// Either `text` is embedded by the handle before searching, or a
/// precomputed `embedding` is used directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The query text.
    pub text: String,

    /// Precomputed query embedding.
    pub embedding: Option<Vec<f32>>,

    /// Exact-match metadata filters.
    pub filters: HashMap<String, serde_json::Value>,

    /// Maximum number of results.
    pub top_k: usize,

    /// Drop results scoring below this value.
    pub similarity_threshold: Option<f32>,
}

impl Query {
    /// Create a text query with default settings.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            embedding: None,
            filters: HashMap::new(),
            top_k: DEFAULT_TOP_K,
            similarity_threshold: None,
        }
    }

    /// Create a query from a precomputed vector.
    pub fn from_vector(embedding: Vec<f32>, top_k: usize) -> Self {
        Self {
            text: String::new(),
            embedding: Some(embedding),
            filters: HashMap::new(),
            top_k,
            similarity_threshold: None,
        }
    }

    /// Set the number of results.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Add an exact-match metadata filter.
    #[must_use]
    pub fn with_filter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Set a minimum similarity score.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Attach a precomputed embedding.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Whether any filters are set.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Whether an embedding is attached.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}
