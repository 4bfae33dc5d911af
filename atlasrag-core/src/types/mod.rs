//! Core data types: stored nodes and search queries.

pub mod node;
pub mod query;

pub use node::*;
pub use query::*;
