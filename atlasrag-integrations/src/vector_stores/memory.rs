//! In-memory vector store.
//!
//! Brute-force search over every stored node. Scores are normalised the
//! same way Atlas Vector Search normalises them, so similarity thresholds
//! behave alike against both stores. Intended for development and tests.

use async_trait::async_trait;
use atlasrag_core::{
    AtlasRagError, Result,
    traits::{DistanceMetric, IndexConfig, StorageStats, VectorStore},
    types::{Node, Query, ScoredNode},
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// In-memory vector store.
///
/// # Examples
///
/// ```rust
/// use atlasrag_integrations::InMemoryVectorStore;
/// use atlasrag_core::traits::DistanceMetric;
///
/// let store = InMemoryVectorStore::new(768, DistanceMetric::Cosine);
/// assert_eq!(store.dimension(), 768);
/// ```
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimension: usize,
    distance_metric: DistanceMetric,
    nodes: RwLock<HashMap<Uuid, Node>>,
    stats: RwLock<StorageStats>,
}

impl InMemoryVectorStore {
    /// Create an empty store for vectors of `dimension`.
    pub fn new(dimension: usize, distance_metric: DistanceMetric) -> Self {
        info!(
            "Creating InMemoryVectorStore with dimension {} and metric {:?}",
            dimension, distance_metric
        );

        Self {
            dimension,
            distance_metric,
            nodes: RwLock::new(HashMap::new()),
            stats: RwLock::new(StorageStats::new()),
        }
    }

    /// Vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Similarity function.
    pub fn distance_metric(&self) -> DistanceMetric {
        self.distance_metric
    }

    /// Normalised score in `[0, 1]`, higher is closer.
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.distance_metric {
            DistanceMetric::Cosine => (1.0 + cosine_similarity(a, b)) / 2.0,
            DistanceMetric::DotProduct => (1.0 + dot_product(a, b)) / 2.0,
            DistanceMetric::Euclidean => 1.0 / (1.0 + euclidean_distance(a, b)),
        }
    }

    fn validate_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(AtlasRagError::validation(format!(
                "Vector dimension {} does not match store dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    fn validate_node(&self, node: &Node) -> Result<()> {
        let embedding = node.embedding.as_ref().ok_or_else(|| {
            AtlasRagError::validation(format!("Node {} has no embedding", node.id))
        })?;
        self.validate_vector(embedding)
    }

    /// Insert or replace `nodes`. Nothing is written if any node is invalid.
    fn upsert(&self, nodes: Vec<Node>) -> Result<()> {
        for node in &nodes {
            self.validate_node(node)?;
        }

        let total = {
            let mut storage = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
            storage.extend(nodes.into_iter().map(|node| (node.id, node)));
            storage.len()
        };
        self.record(|stats| stats.total_nodes = total);
        Ok(())
    }

    fn record(&self, update: impl FnOnce(&mut StorageStats)) {
        update(&mut self.stats.write().unwrap_or_else(PoisonError::into_inner));
    }
}

fn matches_filters(node: &Node, filters: &HashMap<String, serde_json::Value>) -> bool {
    filters
        .iter()
        .all(|(key, expected)| node.metadata.get(key) == Some(expected))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, nodes: Vec<Node>) -> Result<Vec<Uuid>> {
        debug!("Adding {} nodes to InMemoryVectorStore", nodes.len());

        let ids: Vec<Uuid> = nodes.iter().map(|node| node.id).collect();
        self.upsert(nodes)?;

        self.record(|stats| stats.insert_operations += 1);
        Ok(ids)
    }

    async fn update(&self, nodes: Vec<Node>) -> Result<()> {
        debug!("Updating {} nodes in InMemoryVectorStore", nodes.len());

        self.upsert(nodes)?;

        self.record(|stats| stats.update_operations += 1);
        Ok(())
    }

    async fn delete(&self, node_ids: Vec<Uuid>) -> Result<()> {
        debug!("Deleting {} nodes from InMemoryVectorStore", node_ids.len());

        let total = {
            let mut storage = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
            for id in &node_ids {
                storage.remove(id);
            }
            storage.len()
        };

        self.record(|stats| {
            stats.delete_operations += 1;
            stats.total_nodes = total;
        });
        Ok(())
    }

    async fn search(&self, query: &Query) -> Result<Vec<ScoredNode>> {
        let query_embedding = query.embedding.as_ref().ok_or_else(|| {
            AtlasRagError::validation("Query must have an embedding for vector search")
        })?;
        self.validate_vector(query_embedding)?;

        let mut scored: Vec<ScoredNode> = {
            let storage = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
            storage
                .values()
                .filter(|node| matches_filters(node, &query.filters))
                .filter_map(|node| {
                    let embedding = node.embedding.as_ref()?;
                    let score = self.score(query_embedding, embedding);
                    match query.similarity_threshold {
                        Some(threshold) if score < threshold => None,
                        _ => Some(ScoredNode::new(node.clone(), score)),
                    }
                })
                .collect()
        };

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(query.top_k);

        self.record(|stats| stats.search_operations += 1);
        debug!("In-memory search returned {} results", scored.len());
        Ok(scored)
    }

    async fn get(&self, node_ids: Vec<Uuid>) -> Result<Vec<Option<Node>>> {
        let storage = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(node_ids.iter().map(|id| storage.get(id).cloned()).collect())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemoryVectorStore"
    }

    async fn count(&self) -> Result<usize> {
        Ok(self
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len())
    }

    async fn metadata(&self) -> Result<HashMap<String, serde_json::Value>> {
        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), "in_memory".into());
        metadata.insert("dimension".to_string(), self.dimension.into());
        metadata.insert(
            "distance_metric".to_string(),
            serde_json::to_value(self.distance_metric)?,
        );
        metadata.insert("node_count".to_string(), self.count().await?.into());
        Ok(metadata)
    }

    async fn clear(&self) -> Result<()> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.record(|stats| stats.total_nodes = 0);
        Ok(())
    }

    async fn create_index(&self, config: &IndexConfig) -> Result<()> {
        if config.dimension != self.dimension {
            return Err(AtlasRagError::validation(format!(
                "Index dimension {} does not match store dimension {}",
                config.dimension, self.dimension
            )));
        }
        Ok(())
    }

    async fn stats(&self) -> Result<StorageStats> {
        Ok(self
            .stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product(a, b) / (norm_a * norm_b)
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(content: &str, embedding: Vec<f32>) -> Node {
        Node::new(content).with_embedding(embedding)
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = InMemoryVectorStore::new(3, DistanceMetric::Cosine);
        let a = node("a", vec![1.0, 0.0, 0.0]);
        let b = node("b", vec![0.0, 1.0, 0.0]);
        let missing = Uuid::new_v4();

        let ids = store.add(vec![a.clone(), b.clone()]).await.unwrap();
        assert_eq!(ids, vec![a.id, b.id]);

        let fetched = store.get(vec![b.id, missing, a.id]).await.unwrap();
        assert_eq!(fetched[0].as_ref().unwrap().content, "b");
        assert!(fetched[1].is_none());
        assert_eq!(fetched[2].as_ref().unwrap().content, "a");
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_orders_by_score() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::Cosine);
        store
            .add(vec![
                node("far", vec![-1.0, 0.0]),
                node("near", vec![1.0, 0.1]),
                node("middle", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search_by_vector(&[1.0, 0.0], 2).await.unwrap();

        let contents: Vec<&str> = results.iter().map(|r| r.node.content.as_str()).collect();
        assert_eq!(contents, vec!["near", "middle"]);
        assert!(results[0].score > results[1].score);
        assert!((results[1].score - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_with_filters_and_threshold() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::Cosine);
        store
            .add(vec![
                node("wiki", vec![1.0, 0.0]).with_metadata("source", "wiki"),
                node("blog", vec![1.0, 0.0]).with_metadata("source", "blog"),
                node("orthogonal", vec![0.0, 1.0]).with_metadata("source", "wiki"),
            ])
            .await
            .unwrap();

        let query = Query::from_vector(vec![1.0, 0.0], 10)
            .with_filter("source", "wiki")
            .with_similarity_threshold(0.9);
        let results = store.search(&query).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].node.content, "wiki");
    }

    #[tokio::test]
    async fn test_euclidean_score() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::Euclidean);
        store.add(vec![node("p", vec![3.0, 4.0])]).await.unwrap();

        let results = store.search_by_vector(&[0.0, 0.0], 1).await.unwrap();
        assert!((results[0].score - 1.0 / 6.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::Cosine);
        let original = node("v1", vec![1.0, 0.0]);
        store.add(vec![original.clone()]).await.unwrap();

        let mut revised = original.clone();
        revised.content = "v2".to_string();
        revised.embedding = Some(vec![0.0, 1.0]);
        store.update(vec![revised]).await.unwrap();

        let fetched = store.get(vec![original.id]).await.unwrap();
        let fetched = fetched[0].as_ref().unwrap();
        assert_eq!(fetched.content, "v2");
        assert_eq!(fetched.embedding, Some(vec![0.0, 1.0]));
        assert_eq!(store.count().await.unwrap(), 1);

        store.delete(vec![original.id]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.insert_operations, 1);
        assert_eq!(stats.update_operations, 1);
        assert_eq!(stats.delete_operations, 1);
        assert_eq!(stats.total_nodes, 0);
    }

    #[tokio::test]
    async fn test_update_inserts_unknown_node() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::Cosine);
        let fresh = node("fresh", vec![1.0, 0.0]);

        store.update(vec![fresh.clone()]).await.unwrap();

        let fetched = store.get(vec![fresh.id]).await.unwrap();
        assert_eq!(fetched[0].as_ref().unwrap().content, "fresh");
        assert_eq!(store.stats().await.unwrap().total_nodes, 1);
    }

    #[tokio::test]
    async fn test_update_requires_embedding() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::Cosine);
        let kept = node("kept", vec![1.0, 0.0]);
        store.add(vec![kept.clone()]).await.unwrap();

        let mut stripped = kept.clone();
        stripped.embedding = None;
        let err = store
            .update(vec![node("valid", vec![0.0, 1.0]), stripped])
            .await
            .unwrap_err();

        assert!(matches!(err, AtlasRagError::Validation { .. }));
        assert_eq!(store.count().await.unwrap(), 1);
        let fetched = store.get(vec![kept.id]).await.unwrap();
        assert_eq!(fetched[0].as_ref().unwrap().embedding, Some(vec![1.0, 0.0]));
    }

    #[tokio::test]
    async fn test_validation() {
        let store = InMemoryVectorStore::new(3, DistanceMetric::Cosine);

        assert!(store.add(vec![node("short", vec![1.0])]).await.is_err());
        assert!(store.add(vec![Node::new("no embedding")]).await.is_err());
        assert!(store.search(&Query::new("text only")).await.is_err());
        assert!(
            store
                .create_index(&IndexConfig::new("idx", 768))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_clear_and_metadata() {
        let store = InMemoryVectorStore::new(2, DistanceMetric::DotProduct);
        store.add(vec![node("x", vec![1.0, 1.0])]).await.unwrap();
        store.clear().await.unwrap();

        let metadata = store.metadata().await.unwrap();
        assert_eq!(metadata["type"], serde_json::json!("in_memory"));
        assert_eq!(metadata["distance_metric"], serde_json::json!("dot_product"));
        assert_eq!(metadata["node_count"], serde_json::json!(0));
    }
}
