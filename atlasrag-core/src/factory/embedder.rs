//! Factory for creating embedders from configuration.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Result, config::EmbedderConfig, traits::Embedder};

/// Creates embedders from configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use atlasrag_core::factory::EmbedderFactory;
/// use atlasrag_core::config::EmbedderConfig;
/// use atlasrag_core::traits::Embedder;
/// use atlasrag_core::Result;
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct MyEmbedderFactory;
///
/// #[async_trait]
/// impl EmbedderFactory for MyEmbedderFactory {
///     async fn create_embedder(&self, config: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
///         todo!("build an embedder for {}", config.model_name())
///     }
///
///     fn supported_types(&self) -> Vec<&'static str> {
///         vec!["my-provider"]
///     }
/// }
/// ```
#[async_trait]
pub trait EmbedderFactory: Send + Sync + std::fmt::Debug {
    /// Create an embedder from configuration.
    ///
    /// Implementations must not modify the configured model identifier.
    async fn create_embedder(&self, config: &EmbedderConfig) -> Result<Arc<dyn Embedder>>;

    /// Provider identifiers this factory handles.
    fn supported_types(&self) -> Vec<&'static str>;

    /// Whether this factory can handle `config`.
    fn can_create(&self, config: &EmbedderConfig) -> bool {
        self.supported_types().contains(&config.provider())
    }

    /// Human-readable name of this factory.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
