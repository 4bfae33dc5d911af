//! The composed vector store handle.
//!
//! A [`VectorStoreHandle`] binds a remote collection, an embedding model and
//! a named vector search index. Callers use it to run text similarity
//! searches without touching either client directly.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    AtlasRagError, Node, Query, Result, ScoredNode,
    config::VectorStoreConfig,
    traits::{Embedder, IndexConfig, StorageStats, VectorStore},
};

/// Names identifying where a handle's data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDescriptor {
    /// Database name.
    pub database_name: String,

    /// Collection name.
    pub collection_name: String,

    /// Vector search index name.
    pub index_name: String,
}

impl StoreDescriptor {
    /// Create a descriptor.
    pub fn new<D, C, I>(database_name: D, collection_name: C, index_name: I) -> Self
    where
        D: Into<String>,
        C: Into<String>,
        I: Into<String>,
    {
        Self {
            database_name: database_name.into(),
            collection_name: collection_name.into(),
            index_name: index_name.into(),
        }
    }

    /// Take the names from a vector store configuration.
    pub fn from_config(config: &VectorStoreConfig) -> Self {
        Self::new(
            config.database_name.clone(),
            config.collection_name.clone(),
            config.index_name.clone(),
        )
    }
}

/// A vector store bound to an embedding model.
///
/// Cloning is cheap; clones share the underlying clients. The handle
/// implements both [`Embedder`] and [`VectorStore`] by delegation so it can
/// be passed wherever either capability is expected.
#[derive(Debug, Clone)]
pub struct VectorStoreHandle {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    descriptor: StoreDescriptor,
}

impl VectorStoreHandle {
    /// Compose a handle.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        descriptor: StoreDescriptor,
    ) -> Self {
        Self {
            store,
            embedder,
            descriptor,
        }
    }

    /// Names of the database, collection and index.
    pub fn descriptor(&self) -> &StoreDescriptor {
        &self.descriptor
    }

    /// Database name.
    pub fn database_name(&self) -> &str {
        &self.descriptor.database_name
    }

    /// Collection name.
    pub fn collection_name(&self) -> &str {
        &self.descriptor.collection_name
    }

    /// Vector search index name.
    pub fn index_name(&self) -> &str {
        &self.descriptor.index_name
    }

    /// Identifier of the bound embedding model.
    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// The underlying embedder.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Embed `texts` and store them.
    ///
    /// `metadatas`, when given, must hold one map per text.
    pub async fn add_texts(
        &self,
        texts: &[&str],
        metadatas: Option<Vec<HashMap<String, serde_json::Value>>>,
    ) -> Result<Vec<Uuid>> {
        if let Some(metadatas) = &metadatas {
            if metadatas.len() != texts.len() {
                return Err(AtlasRagError::validation(format!(
                    "Got {} metadata entries for {} texts",
                    metadatas.len(),
                    texts.len()
                )));
            }
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed_batch(texts.to_vec()).await?;
        if embeddings.len() != texts.len() {
            return Err(AtlasRagError::embedding(format!(
                "Embedder returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        let mut metadatas = metadatas.map(Vec::into_iter);
        let nodes: Vec<Node> = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| {
                let metadata = metadatas
                    .as_mut()
                    .and_then(Iterator::next)
                    .unwrap_or_default();
                Node::builder()
                    .content(*text)
                    .metadata_map(metadata)
                    .embedding(embedding)
                    .build()
            })
            .collect();

        debug!(
            "Adding {} texts to {}.{}",
            nodes.len(),
            self.database_name(),
            self.collection_name()
        );
        self.store.add(nodes).await
    }

    /// Embed `text` and return the `k` most similar nodes.
    pub async fn similarity_search(&self, text: &str, k: usize) -> Result<Vec<ScoredNode>> {
        self.similarity_search_with_query(Query::new(text).with_top_k(k))
            .await
    }

    /// Run a full query. The query text is embedded unless the query already
    /// carries an embedding.
    pub async fn similarity_search_with_query(&self, mut query: Query) -> Result<Vec<ScoredNode>> {
        if query.top_k == 0 {
            return Ok(Vec::new());
        }
        if query.embedding.is_none() {
            query.embedding = Some(self.embedder.embed(&query.text).await?);
        }
        debug!(
            "Searching index '{}' for top {} results",
            self.index_name(),
            query.top_k
        );
        self.store.search(&query).await
    }

    /// Return the `k` nodes most similar to `vector`.
    pub async fn similarity_search_by_vector(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredNode>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        self.store.search_by_vector(vector, k).await
    }
}

#[async_trait]
impl Embedder for VectorStoreHandle {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).await
    }

    async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        self.embedder.embed_batch(texts).await
    }

    fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    fn name(&self) -> &'static str {
        "VectorStoreHandle"
    }

    async fn health_check(&self) -> Result<()> {
        Embedder::health_check(self.embedder.as_ref()).await
    }
}

#[async_trait]
impl VectorStore for VectorStoreHandle {
    async fn add(&self, nodes: Vec<Node>) -> Result<Vec<Uuid>> {
        self.store.add(nodes).await
    }

    async fn update(&self, nodes: Vec<Node>) -> Result<()> {
        self.store.update(nodes).await
    }

    async fn delete(&self, node_ids: Vec<Uuid>) -> Result<()> {
        self.store.delete(node_ids).await
    }

    async fn search(&self, query: &Query) -> Result<Vec<ScoredNode>> {
        self.similarity_search_with_query(query.clone()).await
    }

    async fn get(&self, node_ids: Vec<Uuid>) -> Result<Vec<Option<Node>>> {
        self.store.get(node_ids).await
    }

    async fn health_check(&self) -> Result<()> {
        VectorStore::health_check(self.store.as_ref()).await
    }

    fn name(&self) -> &'static str {
        "VectorStoreHandle"
    }

    async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    async fn metadata(&self) -> Result<HashMap<String, serde_json::Value>> {
        let mut metadata = self.store.metadata().await?;
        metadata.insert("database_name".to_string(), self.database_name().into());
        metadata.insert("collection_name".to_string(), self.collection_name().into());
        metadata.insert("index_name".to_string(), self.index_name().into());
        metadata.insert("embedding_model".to_string(), self.embedding_model().into());
        Ok(metadata)
    }

    async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    async fn create_index(&self, config: &IndexConfig) -> Result<()> {
        self.store.create_index(config).await
    }

    async fn stats(&self) -> Result<StorageStats> {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        #[allow(clippy::cast_precision_loss)]
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "model/embeddings-001"
        }
    }

    #[derive(Debug, Default)]
    struct RecordingStore {
        nodes: Mutex<Vec<Node>>,
        queries: Mutex<Vec<Query>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn add(&self, nodes: Vec<Node>) -> Result<Vec<Uuid>> {
            let ids = nodes.iter().map(|n| n.id).collect();
            self.nodes.lock().unwrap().extend(nodes);
            Ok(ids)
        }

        async fn update(&self, _nodes: Vec<Node>) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _node_ids: Vec<Uuid>) -> Result<()> {
            Ok(())
        }

        async fn search(&self, query: &Query) -> Result<Vec<ScoredNode>> {
            self.queries.lock().unwrap().push(query.clone());
            let nodes = self.nodes.lock().unwrap();
            Ok(nodes
                .iter()
                .take(query.top_k)
                .map(|n| ScoredNode::new(n.clone(), 1.0))
                .collect())
        }

        async fn get(&self, node_ids: Vec<Uuid>) -> Result<Vec<Option<Node>>> {
            Ok(vec![None; node_ids.len()])
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    fn handle() -> (VectorStoreHandle, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        let handle = VectorStoreHandle::new(
            store.clone(),
            Arc::new(LengthEmbedder),
            StoreDescriptor::new("db", "coll", "idx"),
        );
        (handle, store)
    }

    #[test]
    fn test_accessors() {
        let (handle, _) = handle();
        assert_eq!(handle.database_name(), "db");
        assert_eq!(handle.collection_name(), "coll");
        assert_eq!(handle.index_name(), "idx");
        assert_eq!(handle.embedding_model(), "model/embeddings-001");
        assert_eq!(Embedder::dimension(&handle), 2);
    }

    #[tokio::test]
    async fn test_add_texts_embeds_and_stores() {
        let (handle, store) = handle();
        let mut meta = HashMap::new();
        meta.insert("source".to_string(), serde_json::json!("a.txt"));

        let ids = handle
            .add_texts(&["abc", "de"], Some(vec![meta, HashMap::new()]))
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        let nodes = store.nodes.lock().unwrap();
        assert_eq!(nodes[0].content, "abc");
        assert_eq!(nodes[0].embedding, Some(vec![3.0, 1.0]));
        assert_eq!(nodes[0].get_metadata("source"), Some(&"a.txt".into()));
        assert!(nodes[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_add_texts_rejects_metadata_mismatch() {
        let (handle, store) = handle();
        let err = handle
            .add_texts(&["a", "b"], Some(vec![HashMap::new()]))
            .await
            .unwrap_err();
        assert!(matches!(err, AtlasRagError::Validation { .. }));
        assert!(store.nodes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_similarity_search_embeds_query() {
        let (handle, store) = handle();
        handle.add_texts(&["one", "two", "three"], None).await.unwrap();

        let results = handle.similarity_search("four", 2).await.unwrap();
        assert_eq!(results.len(), 2);

        let queries = store.queries.lock().unwrap();
        assert_eq!(queries[0].embedding, Some(vec![4.0, 1.0]));
        assert_eq!(queries[0].top_k, 2);
    }

    #[tokio::test]
    async fn test_precomputed_embedding_is_kept() {
        let (handle, store) = handle();
        let query = Query::new("ignored").with_embedding(vec![9.0, 9.0]);
        handle.similarity_search_with_query(query).await.unwrap();

        assert_eq!(
            store.queries.lock().unwrap()[0].embedding,
            Some(vec![9.0, 9.0])
        );
    }

    #[tokio::test]
    async fn test_zero_k_returns_nothing() {
        let (handle, store) = handle();
        assert!(handle.similarity_search("x", 0).await.unwrap().is_empty());
        assert!(
            handle
                .similarity_search_by_vector(&[1.0, 0.0], 0)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(store.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_includes_descriptor() {
        let (handle, _) = handle();
        let metadata = VectorStore::metadata(&handle).await.unwrap();
        assert_eq!(metadata["index_name"], "idx");
        assert_eq!(metadata["embedding_model"], "model/embeddings-001");
    }
}
