//! # atlasrag
//!
//! A MongoDB Atlas vector store bound to a Google embedding model, ready to
//! hand to a retrieval-augmented generation application.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use atlasrag::prelude::*;
//!
//! # async fn example() -> atlasrag::core::Result<()> {
//! atlasrag::init_logging();
//!
//! // Reads MONGO_URI and GOOGLE_API_KEY from the environment or secrets.toml
//! let handle = atlasrag::get_vector_store_from_secrets().await?;
//!
//! for hit in handle.similarity_search("How do I create an index?", 4).await? {
//!     println!("{:.3} {}", hit.score, hit.node.content);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **atlasrag-core**: traits, types, configuration and the handle
//! - **atlasrag-integrations**: MongoDB Atlas store and Google embedder

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export all public APIs from sub-crates
pub use atlasrag_core as core;
pub use atlasrag_integrations as integrations;

#[cfg(all(feature = "google", feature = "mongodb"))]
use atlasrag_core::{
    Result, VectorStoreHandle,
    config::{Secrets, Settings},
};
use tracing_subscriber::EnvFilter;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use atlasrag_core::prelude::*;

    pub use atlasrag_integrations::InMemoryVectorStore;
    #[cfg(feature = "google")]
    pub use atlasrag_integrations::{GoogleEmbedder, GoogleEmbedderFactory};
    #[cfg(feature = "mongodb")]
    pub use atlasrag_integrations::{MongoVectorStore, MongoVectorStoreFactory};
}

/// Build a handle over MongoDB Atlas and Google embeddings.
///
/// Fails with a configuration error, before any client is created, when
/// `settings` is incomplete. No network round trip happens unless
/// `verify_connection` or `create_index_if_missing` is set.
#[cfg(all(feature = "google", feature = "mongodb"))]
pub async fn get_vector_store(settings: &Settings) -> Result<VectorStoreHandle> {
    atlasrag_integrations::atlas_handle_factory()
        .get_vector_store(settings)
        .await
}

/// Build a handle from `secrets` and the fixed database, collection, index
/// and model names.
#[cfg(all(feature = "google", feature = "mongodb"))]
pub async fn get_vector_store_with_secrets(secrets: &Secrets) -> Result<VectorStoreHandle> {
    let settings = Settings::from_secrets(secrets)?;
    tracing::debug!("Resolved settings from {} secrets", secrets.len());
    get_vector_store(&settings).await
}

/// Build a handle from secrets found in the environment or the default
/// secrets files.
///
/// Environment variables take precedence over file entries.
#[cfg(all(feature = "google", feature = "mongodb"))]
pub async fn get_vector_store_from_secrets() -> Result<VectorStoreHandle> {
    let secrets = Secrets::load()?;
    get_vector_store_with_secrets(&secrets).await
}

/// Install a global `tracing` subscriber filtered by `RUST_LOG`, defaulting
/// to `info`.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Version information for atlasrag.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
