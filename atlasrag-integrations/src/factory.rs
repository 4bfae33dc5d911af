//! Factories plugging the concrete backends into
//! [`VectorStoreHandleFactory`](atlasrag_core::factory::VectorStoreHandleFactory).

use async_trait::async_trait;
use atlasrag_core::{
    Result,
    config::{EmbedderConfig, VectorStoreConfig},
    factory::{EmbedderFactory, VectorStoreFactory, VectorStoreHandleFactory},
    traits::{Embedder, VectorStore},
};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "google")]
use crate::embedders::GoogleEmbedder;
#[cfg(feature = "mongodb")]
use crate::vector_stores::MongoVectorStore;

/// Builds [`GoogleEmbedder`]s for `provider = "google"` configurations.
#[cfg(feature = "google")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleEmbedderFactory;

#[cfg(feature = "google")]
#[async_trait]
impl EmbedderFactory for GoogleEmbedderFactory {
    async fn create_embedder(&self, config: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
        debug!("Creating Google embedder for model '{}'", config.model_name());
        let embedder = GoogleEmbedder::from_embedder_config(config)?;
        Ok(Arc::new(embedder))
    }

    fn supported_types(&self) -> Vec<&'static str> {
        vec!["google"]
    }

    fn name(&self) -> &'static str {
        "GoogleEmbedderFactory"
    }
}

/// Connects [`MongoVectorStore`]s.
#[cfg(feature = "mongodb")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoVectorStoreFactory;

#[cfg(feature = "mongodb")]
#[async_trait]
impl VectorStoreFactory for MongoVectorStoreFactory {
    async fn create_vector_store(
        &self,
        config: &VectorStoreConfig,
    ) -> Result<Arc<dyn VectorStore>> {
        debug!(
            "Creating MongoDB vector store for {}.{}",
            config.database_name, config.collection_name
        );
        let store = MongoVectorStore::new(config.clone()).await?;
        Ok(Arc::new(store))
    }

    fn name(&self) -> &'static str {
        "MongoVectorStoreFactory"
    }
}

/// Handle factory wired to MongoDB Atlas and Google embeddings.
#[cfg(all(feature = "google", feature = "mongodb"))]
pub fn atlas_handle_factory() -> VectorStoreHandleFactory {
    VectorStoreHandleFactory::new(
        Arc::new(MongoVectorStoreFactory),
        Arc::new(GoogleEmbedderFactory),
    )
}
