//! Top-level settings for building a vector store handle.

use secrecy::ExposeSecret;
use serde::Deserialize;

use super::{EmbedderConfig, Secrets, VectorStoreConfig};
use crate::Result;

/// Secret holding the MongoDB connection string.
pub const MONGO_URI_KEY: &str = "MONGO_URI";

/// Secret holding the Google Generative Language API key.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Database holding the embeddings collection.
pub const DATABASE_NAME: &str = "vector_store_database";

/// Collection holding the embedded documents.
pub const COLLECTION_NAME: &str = "embeddings_stream";

/// Atlas vector search index name.
pub const INDEX_NAME: &str = "vector_index_ghw";

/// Hosted embedding model identifier.
pub const EMBEDDING_MODEL: &str = "model/embeddings-001";

/// Embedding provider used with [`EMBEDDING_MODEL`].
pub const EMBEDDING_PROVIDER: &str = "google";

/// Everything the factory needs: where the collection lives and which
/// embedding model to bind to it.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Atlas collection and index.
    pub vector_store: VectorStoreConfig,

    /// Embedding model.
    pub embedder: EmbedderConfig,
}

impl Settings {
    /// Create settings from explicit parts.
    pub fn new(vector_store: VectorStoreConfig, embedder: EmbedderConfig) -> Self {
        Self {
            vector_store,
            embedder,
        }
    }

    /// Settings for the fixed database, collection, index and model names.
    pub fn atlas<U: Into<String>, K: Into<String>>(connection_uri: U, api_key: K) -> Self {
        Self::new(
            VectorStoreConfig::new(connection_uri, DATABASE_NAME, COLLECTION_NAME, INDEX_NAME),
            EmbedderConfig::api(EMBEDDING_PROVIDER, EMBEDDING_MODEL, api_key),
        )
    }

    /// Resolve the fixed settings from secrets.
    ///
    /// Fails with a configuration error when [`MONGO_URI_KEY`] or
    /// [`GOOGLE_API_KEY`] is missing or empty.
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        let uri = secrets.require(MONGO_URI_KEY)?;
        let api_key = secrets.require(GOOGLE_API_KEY)?;
        Ok(Self::atlas(
            uri.expose_secret().as_str(),
            api_key.expose_secret().as_str(),
        ))
    }

    /// Validate both parts.
    pub fn validate(&self) -> Result<()> {
        self.vector_store.validate()?;
        self.embedder.validate()
    }
}
