//! Prelude module for convenient imports.
//!
//! ```rust
//! use atlasrag_core::prelude::*;
//!
//! let query = Query::new("What is Atlas vector search?").with_top_k(3);
//! assert_eq!(query.top_k, 3);
//! ```

pub use crate::error::{AtlasRagError, Result};

pub use crate::types::{DEFAULT_TOP_K, Node, NodeBuilder, Query, ScoredNode};

pub use crate::traits::{
    DistanceMetric, Embedder, EmbeddingStats, IndexConfig, StorageStats, VectorStore,
};

pub use crate::config::{EmbedderConfig, Secrets, Settings, VectorStoreConfig};

pub use crate::factory::{EmbedderFactory, VectorStoreFactory, VectorStoreHandleFactory};

pub use crate::handle::{StoreDescriptor, VectorStoreHandle};
