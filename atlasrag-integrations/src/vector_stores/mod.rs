//! Vector store implementations.

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use memory::InMemoryVectorStore;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoVectorStore;
