//! Configuration types.
//!
//! Configurations are plain data with builder-style setters and a
//! `validate()` method. Secrets are wrapped in [`secrecy::SecretString`] so
//! they never show up in `Debug` output or logs.

pub mod embedder;
pub mod secrets;
pub mod settings;
pub mod storage;

pub use embedder::*;
pub use secrets::*;
pub use settings::*;
pub use storage::*;
