//! Embedding model implementations.

#[cfg(feature = "google")]
pub mod google;

#[cfg(feature = "google")]
pub use google::{GoogleEmbedder, GoogleEmbedderConfig};
