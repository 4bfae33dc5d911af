//! MongoDB Atlas Vector Search store.
//!
//! - `client`: driver client wrapper, ping and search index management
//! - `conversion`: node to document mapping
//! - `pipeline`: `$vectorSearch` pipelines and index definitions
//! - `store`: the [`VectorStore`](atlasrag_core::traits::VectorStore) implementation
//! - `error`: driver error mapping

pub mod client;
pub mod conversion;
pub mod error;
pub mod pipeline;
pub mod store;

pub use client::{MongoClient, vector_search_index_model};
pub use error::map_mongo_error;
pub use pipeline::{VectorSearchPipeline, index_definition, search_pipeline};
pub use store::MongoVectorStore;
