//! External service integrations for atlasrag.
//!
//! This crate provides the MongoDB Atlas vector store and the Google
//! Generative Language embedder, plus the factories that plug them into
//! [`VectorStoreHandleFactory`](atlasrag_core::factory::VectorStoreHandleFactory).
//! An in-memory store is always available for development and tests.
//!
//! Backends are gated behind the `mongodb` and `google` features, both on
//! by default.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod embedders;
#[cfg(any(feature = "google", feature = "mongodb"))]
pub mod factory;
pub mod vector_stores;

// Re-export commonly used types
pub use vector_stores::InMemoryVectorStore;

#[cfg(feature = "google")]
pub use embedders::{GoogleEmbedder, GoogleEmbedderConfig};
#[cfg(feature = "google")]
pub use factory::GoogleEmbedderFactory;

#[cfg(feature = "mongodb")]
pub use factory::MongoVectorStoreFactory;
#[cfg(feature = "mongodb")]
pub use vector_stores::MongoVectorStore;

#[cfg(all(feature = "google", feature = "mongodb"))]
pub use factory::atlas_handle_factory;
