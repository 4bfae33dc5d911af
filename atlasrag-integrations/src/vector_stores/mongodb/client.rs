//! MongoDB client management.

use atlasrag_core::{Result, config::VectorStoreConfig, traits::IndexConfig};
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, SearchIndexModel, SearchIndexType, options::ClientOptions,
};
use tracing::{debug, error, info};

use super::{error::map_mongo_error, pipeline::index_definition};

/// Client, database and collection handles for one Atlas collection.
///
/// The driver pools connections internally, so this type is cheap to clone
/// and no network traffic happens until the first operation.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    database: Database,
    collection: Collection<Document>,
    config: VectorStoreConfig,
}

impl std::fmt::Debug for MongoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoClient")
            .field("database", &self.config.database_name)
            .field("collection", &self.config.collection_name)
            .field("index", &self.config.index_name)
            .finish_non_exhaustive()
    }
}

impl MongoClient {
    /// Create a client for `config`.
    ///
    /// Parsing a `mongodb+srv://` URI resolves its DNS records. With
    /// `verify_connection` set the deployment is pinged before returning.
    pub async fn new(config: VectorStoreConfig) -> Result<Self> {
        config.validate()?;

        info!(
            "Creating MongoClient for {}.{}",
            config.database_name, config.collection_name
        );

        let mut options = ClientOptions::parse(config.connection_uri())
            .await
            .map_err(|e| {
                error!("Failed to parse MongoDB connection string: {}", e);
                map_mongo_error(e)
            })?;
        if let Some(app_name) = &config.app_name {
            options.app_name = Some(app_name.clone());
        }

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let database = client.database(&config.database_name);
        let collection = database.collection::<Document>(&config.collection_name);

        let mongo_client = Self {
            client,
            database,
            collection,
            config,
        };

        if mongo_client.config.verify_connection {
            mongo_client.health_check().await?;
        }

        Ok(mongo_client)
    }

    /// The underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The configured database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The configured collection.
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// The configuration.
    pub fn config(&self) -> &VectorStoreConfig {
        &self.config
    }

    /// Run `{ ping: 1 }` against the database.
    pub async fn health_check(&self) -> Result<()> {
        debug!("Pinging MongoDB database '{}'", self.config.database_name);
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                error!("MongoDB health check failed: {}", e);
                map_mongo_error(e)
            })?;
        Ok(())
    }

    /// Names of the search indexes defined on the collection.
    pub async fn search_index_names(&self) -> Result<Vec<String>> {
        let indexes: Vec<Document> = self
            .collection
            .list_search_indexes()
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        Ok(indexes
            .iter()
            .filter_map(|index| index.get_str("name").ok().map(str::to_string))
            .collect())
    }

    /// Create the vector search index described by `index` unless an index
    /// with that name already exists.
    ///
    /// Returns `true` when an index was created. Atlas builds the index
    /// asynchronously; it becomes queryable once the build finishes.
    pub async fn ensure_search_index(&self, index: &IndexConfig) -> Result<bool> {
        if self.search_index_names().await?.contains(&index.name) {
            debug!("Search index '{}' already exists", index.name);
            return Ok(false);
        }

        let model = vector_search_index_model(index, &self.config.embedding_key);

        let name = self
            .collection
            .create_search_index(model)
            .await
            .map_err(|e| {
                error!("Failed to create search index '{}': {}", index.name, e);
                map_mongo_error(e)
            })?;

        info!(
            "Created vector search index '{}' ({} dimensions) on {}.{}",
            name, index.dimension, self.config.database_name, self.config.collection_name
        );
        Ok(true)
    }
}

/// Search index model for a `vectorSearch` index over `embedding_key`.
pub fn vector_search_index_model(index: &IndexConfig, embedding_key: &str) -> SearchIndexModel {
    SearchIndexModel::builder()
        .definition(index_definition(index, embedding_key))
        .name(index.name.clone())
        .index_type(SearchIndexType::VectorSearch)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vector_search_index_model() {
        let index = IndexConfig::new("vector_index_ghw", 768);

        let model = vector_search_index_model(&index, "embedding");

        assert_eq!(model.name.as_deref(), Some("vector_index_ghw"));
        assert!(matches!(model.index_type, Some(SearchIndexType::VectorSearch)));
        assert_eq!(model.definition, index_definition(&index, "embedding"));
    }

    #[tokio::test]
    async fn test_client_without_server() {
        let config = VectorStoreConfig::new(
            "mongodb://localhost:27017",
            "vector_store_database",
            "embeddings_stream",
            "vector_index_ghw",
        )
        .with_app_name("atlasrag-tests");

        let client = MongoClient::new(config).await.unwrap();

        assert_eq!(client.database().name(), "vector_store_database");
        assert_eq!(client.collection().name(), "embeddings_stream");
        assert!(format!("{client:?}").contains("vector_index_ghw"));
    }
}
