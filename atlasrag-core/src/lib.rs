//! # Atlasrag Core
//!
//! Core traits, types and configuration for building a MongoDB Atlas
//! vector store handle bound to a hosted embedding model.
//!
//! - **Data structures**: [`Node`], [`ScoredNode`] and [`Query`]
//! - **Core traits**: [`Embedder`] and [`VectorStore`]
//! - **Configuration**: [`config::Settings`] resolved from [`config::Secrets`]
//! - **Factories**: [`factory::VectorStoreHandleFactory`] composes a store and
//!   an embedder into a [`VectorStoreHandle`]
//!
//! Concrete MongoDB and Google implementations live in
//! `atlasrag-integrations`.
//!
//! ## Quick Start
//!
//! ```rust
//! use atlasrag_core::prelude::*;
//!
//! let settings = Settings::atlas("mongodb+srv://cluster.example.net", "api-key");
//! assert_eq!(settings.vector_store.index_name, "vector_index_ghw");
//! assert!(settings.validate().is_ok());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude;

pub mod config;
pub mod error;
pub mod factory;
pub mod handle;
pub mod traits;
pub mod types;

pub use error::{AtlasRagError, Result};
pub use handle::{StoreDescriptor, VectorStoreHandle};
pub use types::{Node, Query, ScoredNode};

pub use traits::*;

/// Version information for the atlasrag core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the atlasrag core library.
pub const NAME: &str = env!("CARGO_PKG_NAME");
