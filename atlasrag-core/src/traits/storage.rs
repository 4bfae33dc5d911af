//! Vector storage and retrieval trait.
//!
//! A vector store persists nodes with their embeddings and answers
//! nearest-neighbour queries. Backends range from a brute-force in-memory
//! map to a managed Atlas collection with a vector search index.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{Node, Query, Result, ScoredNode};

/// Stores and retrieves vector embeddings with associated nodes.
///
/// # Examples
///
/// ```rust,no_run
/// use atlasrag_core::traits::VectorStore;
/// use atlasrag_core::{Node, Query, ScoredNode, Result};
/// use async_trait::async_trait;
/// use uuid::Uuid;
///
/// #[derive(Debug)]
/// struct NullStore;
///
/// #[async_trait]
/// impl VectorStore for NullStore {
///     async fn add(&self, nodes: Vec<Node>) -> Result<Vec<Uuid>> {
///         Ok(nodes.iter().map(|n| n.id).collect())
///     }
///
///     async fn update(&self, _nodes: Vec<Node>) -> Result<()> {
///         Ok(())
///     }
///
///     async fn delete(&self, _node_ids: Vec<Uuid>) -> Result<()> {
///         Ok(())
///     }
///
///     async fn search(&self, _query: &Query) -> Result<Vec<ScoredNode>> {
///         Ok(vec![])
///     }
///
///     async fn get(&self, node_ids: Vec<Uuid>) -> Result<Vec<Option<Node>>> {
///         Ok(vec![None; node_ids.len()])
///     }
///
///     async fn health_check(&self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Insert nodes. Every node must carry an embedding.
    ///
    /// Returns the ids of the inserted nodes in input order.
    async fn add(&self, nodes: Vec<Node>) -> Result<Vec<Uuid>>;

    /// Replace existing nodes, inserting the ones that do not exist yet.
    /// Every node must carry an embedding.
    async fn update(&self, nodes: Vec<Node>) -> Result<()>;

    /// Delete nodes by id. Unknown ids are ignored.
    async fn delete(&self, node_ids: Vec<Uuid>) -> Result<()>;

    /// Nearest-neighbour search. The query must carry an embedding.
    ///
    /// Results are ordered by descending score and hold at most
    /// `query.top_k` entries.
    async fn search(&self, query: &Query) -> Result<Vec<ScoredNode>>;

    /// Search with a raw vector.
    async fn search_by_vector(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredNode>> {
        self.search(&Query::from_vector(vector.to_vec(), k)).await
    }

    /// Fetch nodes by id, preserving request order; missing ids yield `None`.
    async fn get(&self, node_ids: Vec<Uuid>) -> Result<Vec<Option<Node>>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Human-readable name of this store.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Number of stored nodes.
    async fn count(&self) -> Result<usize> {
        Ok(0)
    }

    /// Backend description (type, location, index, ...).
    async fn metadata(&self) -> Result<HashMap<String, serde_json::Value>> {
        Ok(HashMap::new())
    }

    /// Remove every node.
    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    /// Create the similarity index described by `config`.
    async fn create_index(&self, _config: &IndexConfig) -> Result<()> {
        Ok(())
    }

    /// Operation counters.
    async fn stats(&self) -> Result<StorageStats> {
        Ok(StorageStats::default())
    }
}

/// Description of a vector similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Index name.
    pub name: String,

    /// Number of vector dimensions.
    pub dimension: usize,

    /// Similarity function.
    pub distance_metric: DistanceMetric,

    /// Metadata fields that can be used as pre-filters.
    pub filter_fields: Vec<String>,
}

impl IndexConfig {
    /// Create an index description with cosine similarity and no filters.
    pub fn new<S: Into<String>>(name: S, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            distance_metric: DistanceMetric::Cosine,
            filter_fields: Vec::new(),
        }
    }

    /// Set the similarity function.
    #[must_use]
    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Set the filterable metadata fields.
    #[must_use]
    pub fn with_filter_fields(mut self, fields: Vec<String>) -> Self {
        self.filter_fields = fields;
        self
    }
}

/// Similarity functions supported by the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine similarity.
    #[default]
    Cosine,

    /// Euclidean distance.
    Euclidean,

    /// Dot product.
    DotProduct,
}

/// Counters describing vector store usage.
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Number of nodes currently known to be stored.
    pub total_nodes: usize,

    /// Number of search operations.
    pub search_operations: usize,

    /// Number of insert operations.
    pub insert_operations: usize,

    /// Number of update operations.
    pub update_operations: usize,

    /// Number of delete operations.
    pub delete_operations: usize,
}

impl StorageStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of operations recorded.
    pub fn total_operations(&self) -> usize {
        self.search_operations
            + self.insert_operations
            + self.update_operations
            + self.delete_operations
    }
}
