//! Core traits.
//!
//! [`Embedder`] and [`VectorStore`] are the two capabilities a vector store
//! handle composes. Concrete backends live in `atlasrag-integrations`.

pub mod embedder;
pub mod storage;

pub use embedder::*;
pub use storage::*;
