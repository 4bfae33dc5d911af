//! Factory traits for creating components from configuration.
//!
//! [`EmbedderFactory`] and [`VectorStoreFactory`] are the seams concrete
//! backends plug into. [`VectorStoreHandleFactory`] composes them into a
//! [`VectorStoreHandle`](crate::VectorStoreHandle).

pub mod embedder;
pub mod handle;
pub mod storage;

pub use embedder::*;
pub use handle::*;
pub use storage::*;
