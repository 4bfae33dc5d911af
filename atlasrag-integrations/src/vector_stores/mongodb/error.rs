//! Mapping of MongoDB driver errors into [`AtlasRagError`].

use atlasrag_core::AtlasRagError;
use mongodb::error::{Error as MongoError, ErrorKind};

/// Server error code for a command against a missing namespace.
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Convert a driver error into an [`AtlasRagError`].
///
/// Unreachable deployments become timeouts, rejected credentials become
/// authentication failures, malformed connection strings become
/// configuration errors. Everything else is a vector store error carrying
/// the driver message.
pub fn map_mongo_error(error: MongoError) -> AtlasRagError {
    match error.kind.as_ref() {
        ErrorKind::InvalidArgument { message, .. } => {
            AtlasRagError::configuration(format!("Invalid MongoDB argument: {message}"))
        }
        ErrorKind::Authentication { message, .. } => {
            tracing::error!("MongoDB authentication failed: {message}");
            AtlasRagError::Authentication
        }
        ErrorKind::ServerSelection { message, .. } => {
            AtlasRagError::timeout(format!("MongoDB server selection: {message}"))
        }
        ErrorKind::DnsResolve { message, .. } => {
            AtlasRagError::vector_store(format!("MongoDB DNS resolution failed: {message}"))
        }
        ErrorKind::Command(command) if command.code == NAMESPACE_NOT_FOUND => {
            AtlasRagError::not_found(format!("MongoDB namespace: {}", command.message))
        }
        ErrorKind::Command(command) => AtlasRagError::vector_store(format!(
            "MongoDB command failed ({} {}): {}",
            command.code, command.code_name, command.message
        )),
        _ => AtlasRagError::vector_store(format!("MongoDB error: {error}")),
    }
}

/// Convert a BSON serialization error.
pub fn map_bson_error(error: bson::ser::Error) -> AtlasRagError {
    AtlasRagError::vector_store(format!("BSON conversion failed: {error}"))
}
