//! Factory for creating vector stores from configuration.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Result, config::VectorStoreConfig, traits::VectorStore};

/// Creates vector stores from configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use atlasrag_core::factory::VectorStoreFactory;
/// use atlasrag_core::config::VectorStoreConfig;
/// use atlasrag_core::traits::VectorStore;
/// use atlasrag_core::Result;
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct MyVectorStoreFactory;
///
/// #[async_trait]
/// impl VectorStoreFactory for MyVectorStoreFactory {
///     async fn create_vector_store(
///         &self,
///         config: &VectorStoreConfig,
///     ) -> Result<Arc<dyn VectorStore>> {
///         todo!("connect to {}", config.collection_name)
///     }
/// }
/// ```
#[async_trait]
pub trait VectorStoreFactory: Send + Sync + std::fmt::Debug {
    /// Open a client and address the configured database and collection.
    async fn create_vector_store(&self, config: &VectorStoreConfig)
    -> Result<Arc<dyn VectorStore>>;

    /// Human-readable name of this factory.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
