//! Google Generative Language embeddings.
//!
//! Talks to the REST API directly with `reqwest`:
//!
//! - `embed` calls `{model}:embedContent` with task type `RETRIEVAL_QUERY`
//! - `embed_batch` calls `{model}:batchEmbedContents` with task type
//!   `RETRIEVAL_DOCUMENT`, at most 100 texts per request
//!
//! The API key travels in the `x-goog-api-key` header. Embeddings are cached
//! in memory by default.

pub mod cache;
pub mod config;
pub mod embedder;
pub mod error;


pub use cache::{CacheKey, CacheStats, EmbeddingCache, InMemoryCache};
pub use config::{DEFAULT_BASE_URL, GoogleEmbedderConfig, MAX_BATCH_SIZE};
pub use embedder::{GoogleEmbedder, TaskType};
pub use error::{GoogleEmbedderError, Result};
