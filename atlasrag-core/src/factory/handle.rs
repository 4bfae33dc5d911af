//! Assembles a [`VectorStoreHandle`] from settings.

use std::sync::Arc;
use tracing::{info, warn};

use super::{EmbedderFactory, VectorStoreFactory};
use crate::{
    AtlasRagError, Result,
    config::Settings,
    handle::{StoreDescriptor, VectorStoreHandle},
    traits::IndexConfig,
};

/// Builds vector store handles.
///
/// The factory owns no connections; each call to
/// [`get_vector_store`](Self::get_vector_store) creates fresh clients
/// through the injected store and embedder factories.
#[derive(Debug, Clone)]
pub struct VectorStoreHandleFactory {
    store_factory: Arc<dyn VectorStoreFactory>,
    embedder_factory: Arc<dyn EmbedderFactory>,
}

impl VectorStoreHandleFactory {
    /// Create a factory from its two collaborators.
    pub fn new(
        store_factory: Arc<dyn VectorStoreFactory>,
        embedder_factory: Arc<dyn EmbedderFactory>,
    ) -> Self {
        Self {
            store_factory,
            embedder_factory,
        }
    }

    /// Build a handle for `settings`.
    ///
    /// Settings are validated first; on a configuration error neither the
    /// store nor the embedder is created. Errors from the store or embedder
    /// factories are returned unchanged.
    pub async fn get_vector_store(&self, settings: &Settings) -> Result<VectorStoreHandle> {
        settings.validate()?;

        if !self.embedder_factory.can_create(&settings.embedder) {
            return Err(AtlasRagError::configuration(format!(
                "Embedder factory {} does not support provider '{}'",
                self.embedder_factory.name(),
                settings.embedder.provider()
            )));
        }

        let config = &settings.vector_store;
        info!(
            "Building vector store handle for {}.{} (index '{}', model '{}')",
            config.database_name,
            config.collection_name,
            config.index_name,
            settings.embedder.model_name()
        );

        let store = self.store_factory.create_vector_store(config).await?;
        let embedder = self
            .embedder_factory
            .create_embedder(&settings.embedder)
            .await?;

        if embedder.model_name() != settings.embedder.model_name() {
            warn!(
                "Embedder reports model '{}' but '{}' was configured",
                embedder.model_name(),
                settings.embedder.model_name()
            );
        }

        if config.create_index_if_missing {
            let dimension = config.dimension.unwrap_or_else(|| embedder.dimension());
            let index = IndexConfig::new(config.index_name.clone(), dimension)
                .with_distance_metric(config.distance_metric)
                .with_filter_fields(config.filter_fields.clone());
            store.create_index(&index).await?;
        }

        Ok(VectorStoreHandle::new(
            store,
            embedder,
            StoreDescriptor::from_config(config),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Node, Query, ScoredNode,
        config::{EmbedderConfig, VectorStoreConfig},
        traits::{Embedder, VectorStore},
    };
    use async_trait::async_trait;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use uuid::Uuid;

    mock! {
        pub StoreMaker {}

        #[async_trait]
        impl VectorStoreFactory for StoreMaker {
            async fn create_vector_store(
                &self,
                config: &VectorStoreConfig,
            ) -> Result<Arc<dyn VectorStore>>;
        }
    }

    mock! {
        pub EmbedderMaker {}

        #[async_trait]
        impl EmbedderFactory for EmbedderMaker {
            async fn create_embedder(&self, config: &EmbedderConfig) -> Result<Arc<dyn Embedder>>;
            fn supported_types(&self) -> Vec<&'static str>;
        }
    }

    impl std::fmt::Debug for MockStoreMaker {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("MockStoreMaker")
        }
    }

    impl std::fmt::Debug for MockEmbedderMaker {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("MockEmbedderMaker")
        }
    }

    #[derive(Debug, Default)]
    struct NullStore {
        indexes: Mutex<Vec<IndexConfig>>,
    }

    #[async_trait]
    impl VectorStore for NullStore {
        async fn add(&self, nodes: Vec<Node>) -> Result<Vec<Uuid>> {
            Ok(nodes.iter().map(|n| n.id).collect())
        }

        async fn update(&self, _nodes: Vec<Node>) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _node_ids: Vec<Uuid>) -> Result<()> {
            Ok(())
        }

        async fn search(&self, _query: &Query) -> Result<Vec<ScoredNode>> {
            Ok(Vec::new())
        }

        async fn get(&self, node_ids: Vec<Uuid>) -> Result<Vec<Option<Node>>> {
            Ok(vec![None; node_ids.len()])
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn create_index(&self, config: &IndexConfig) -> Result<()> {
            self.indexes.lock().unwrap().push(config.clone());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct NamedEmbedder {
        model: String,
    }

    #[async_trait]
    impl Embedder for NamedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0; 768])
        }

        async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![0.0; 768]; texts.len()])
        }

        fn dimension(&self) -> usize {
            768
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }

    fn embedder_maker() -> MockEmbedderMaker {
        let mut maker = MockEmbedderMaker::new();
        maker.expect_supported_types().return_const(vec!["google"]);
        maker.expect_create_embedder().returning(|config| {
            Ok(Arc::new(NamedEmbedder {
                model: config.model_name().to_string(),
            }) as Arc<dyn Embedder>)
        });
        maker
    }

    #[tokio::test]
    async fn test_handle_references_configured_names() {
        let captured: Arc<Mutex<Option<VectorStoreConfig>>> = Arc::default();
        let sink = captured.clone();

        let mut store_maker = MockStoreMaker::new();
        store_maker
            .expect_create_vector_store()
            .times(1)
            .returning(move |config| {
                *sink.lock().unwrap() = Some(config.clone());
                Ok(Arc::new(NullStore::default()) as Arc<dyn VectorStore>)
            });

        let factory =
            VectorStoreHandleFactory::new(Arc::new(store_maker), Arc::new(embedder_maker()));
        let settings = Settings::atlas("mongodb+srv://cluster.example.net", "key");

        let handle = factory.get_vector_store(&settings).await.unwrap();

        assert_eq!(handle.database_name(), "vector_store_database");
        assert_eq!(handle.collection_name(), "embeddings_stream");
        assert_eq!(handle.index_name(), "vector_index_ghw");
        assert_eq!(handle.embedding_model(), "model/embeddings-001");

        let captured = captured.lock().unwrap().clone().unwrap();
        assert_eq!(captured.index_name, "vector_index_ghw");
        assert_eq!(captured.connection_uri(), "mongodb+srv://cluster.example.net");
    }

    #[tokio::test]
    async fn test_missing_uri_constructs_nothing() {
        let mut store_maker = MockStoreMaker::new();
        store_maker.expect_create_vector_store().times(0);
        let mut embedder_maker = MockEmbedderMaker::new();
        embedder_maker.expect_create_embedder().times(0);
        embedder_maker.expect_supported_types().times(0);

        let factory =
            VectorStoreHandleFactory::new(Arc::new(store_maker), Arc::new(embedder_maker));
        let settings = Settings::atlas("", "key");

        let err = factory.get_vector_store(&settings).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_unsupported_provider_constructs_nothing() {
        let mut store_maker = MockStoreMaker::new();
        store_maker.expect_create_vector_store().times(0);

        let factory =
            VectorStoreHandleFactory::new(Arc::new(store_maker), Arc::new(embedder_maker()));
        let mut settings = Settings::atlas("mongodb://localhost", "key");
        settings.embedder = EmbedderConfig::api("openai", "text-embedding-3-small", "key");

        let err = factory.get_vector_store(&settings).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let mut store_maker = MockStoreMaker::new();
        store_maker
            .expect_create_vector_store()
            .returning(|_| Err(AtlasRagError::vector_store("server selection timeout")));
        let mut embedder_maker = MockEmbedderMaker::new();
        embedder_maker.expect_supported_types().return_const(vec!["google"]);
        embedder_maker.expect_create_embedder().times(0);

        let factory =
            VectorStoreHandleFactory::new(Arc::new(store_maker), Arc::new(embedder_maker));
        let settings = Settings::atlas("mongodb://localhost", "key");

        let err = factory.get_vector_store(&settings).await.unwrap_err();
        assert!(matches!(err, AtlasRagError::VectorStore { .. }));
    }

    #[tokio::test]
    async fn test_repeated_calls_give_identical_descriptors() {
        let mut store_maker = MockStoreMaker::new();
        store_maker
            .expect_create_vector_store()
            .times(2)
            .returning(|_| Ok(Arc::new(NullStore::default()) as Arc<dyn VectorStore>));

        let factory =
            VectorStoreHandleFactory::new(Arc::new(store_maker), Arc::new(embedder_maker()));
        let settings = Settings::atlas("mongodb://localhost", "key");

        let first = factory.get_vector_store(&settings).await.unwrap();
        let second = factory.get_vector_store(&settings).await.unwrap();

        assert_eq!(first.descriptor(), second.descriptor());
        assert_eq!(first.embedding_model(), second.embedding_model());
        assert!(!Arc::ptr_eq(first.store(), second.store()));
    }

    #[tokio::test]
    async fn test_index_created_when_requested() {
        let store = Arc::new(NullStore::default());
        let shared = store.clone();

        let mut store_maker = MockStoreMaker::new();
        store_maker
            .expect_create_vector_store()
            .returning(move |_| Ok(shared.clone() as Arc<dyn VectorStore>));

        let factory =
            VectorStoreHandleFactory::new(Arc::new(store_maker), Arc::new(embedder_maker()));
        let mut settings = Settings::atlas("mongodb://localhost", "key");
        settings.vector_store = settings
            .vector_store
            .with_create_index_if_missing(true)
            .with_filter_fields(vec!["source".to_string()]);

        factory.get_vector_store(&settings).await.unwrap();

        let indexes = store.indexes.lock().unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "vector_index_ghw");
        assert_eq!(indexes[0].dimension, 768);
        assert_eq!(indexes[0].filter_fields, vec!["source".to_string()]);
    }
}
