//! Conversion between [`Node`] and stored BSON documents.
//!
//! Documents have the shape
//! `{ _id: "<uuid>", <text_key>: "...", <embedding_key>: [f64], ...metadata }`
//! with metadata flattened into top-level fields so it can be declared as
//! `filter` paths in the vector search index.
//!
//! Documents written by other clients may carry any `_id`. Those ids are
//! mapped to stable UUIDs and handed back as the node's foreign id so the
//! store can address the original document again.

use atlasrag_core::{AtlasRagError, Result, config::VectorStoreConfig, types::Node};
use bson::{Bson, Document, oid::ObjectId};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use super::error::map_bson_error;

/// Field holding the document id.
pub const ID_FIELD: &str = "_id";

/// Field holding the similarity score in search results.
pub const SCORE_FIELD: &str = "score";

/// Metadata key that keeps a non-UUID `_id` of a foreign document.
pub const SOURCE_ID_KEY: &str = "source_id";

/// Namespace for UUIDs derived from foreign `_id` values.
const FOREIGN_ID_NAMESPACE: Uuid = Uuid::from_u128(0x8c3f_51d2_7a64_4e0b_b1a9_2f6d_0e47_c935);

/// A node decoded from a stored document.
#[derive(Debug, Clone)]
pub struct StoredNode {
    /// The decoded node.
    pub node: Node,
    /// Similarity score, present on search results.
    pub score: Option<f32>,
    /// The raw `_id` when it is not a UUID string.
    pub foreign_id: Option<Bson>,
}

/// Convert a node into the document stored for it.
///
/// Metadata keys that collide with the id, text, embedding or score fields
/// are skipped.
pub fn node_to_document(node: &Node, config: &VectorStoreConfig) -> Result<Document> {
    let mut document = Document::new();
    document.insert(ID_FIELD, node.id.to_string());
    document.insert(config.text_key.as_str(), node.content.as_str());

    if let Some(embedding) = &node.embedding {
        let values: Vec<f64> = embedding.iter().map(|&v| f64::from(v)).collect();
        document.insert(config.embedding_key.as_str(), values);
    }

    let mut keys: Vec<&String> = node.metadata.keys().collect();
    keys.sort();
    for key in keys {
        if is_reserved(key, config) {
            warn!("Skipping metadata key '{}' that collides with a document field", key);
            continue;
        }
        let value = bson::to_bson(&node.metadata[key]).map_err(map_bson_error)?;
        document.insert(key.as_str(), value);
    }

    Ok(document)
}

/// Convert a stored document back into a node.
///
/// Search results carry a `score` field which is returned separately and
/// removed from the metadata.
pub fn document_to_node(
    mut document: Document,
    config: &VectorStoreConfig,
) -> Result<StoredNode> {
    let mut metadata = HashMap::new();

    let raw_id = document
        .remove(ID_FIELD)
        .ok_or_else(|| AtlasRagError::vector_store("Stored document has no _id field"))?;
    let (id, foreign_id) = match raw_id.as_str().and_then(|raw| Uuid::parse_str(raw).ok()) {
        Some(id) => (id, None),
        None => {
            let source = match &raw_id {
                Bson::String(text) => Value::String(text.clone()),
                Bson::ObjectId(oid) => Value::String(oid.to_hex()),
                other => other.clone().into_relaxed_extjson(),
            };
            metadata.insert(SOURCE_ID_KEY.to_string(), source);
            (foreign_id_to_uuid(&raw_id), Some(raw_id))
        }
    };

    let content = match document.remove(&config.text_key) {
        Some(Bson::String(text)) => text,
        Some(other) => {
            warn!(
                "Field '{}' of document {} is not a string",
                config.text_key, id
            );
            other.to_string()
        }
        None => String::new(),
    };

    let embedding = match document.remove(&config.embedding_key) {
        Some(Bson::Array(values)) => Some(array_to_vector(&values)?),
        Some(_) => {
            return Err(AtlasRagError::vector_store(format!(
                "Field '{}' of document {} is not an array",
                config.embedding_key, id
            )));
        }
        None => None,
    };

    let score = match document.remove(SCORE_FIELD) {
        Some(value) => Some(bson_to_f32(&value).ok_or_else(|| {
            AtlasRagError::vector_store(format!("Invalid score in document {id}"))
        })?),
        None => None,
    };

    for (key, value) in document {
        metadata.insert(key, value.into_relaxed_extjson());
    }

    Ok(StoredNode {
        node: Node {
            id,
            content,
            metadata,
            embedding,
        },
        score,
        foreign_id,
    })
}

/// Map a foreign `_id` to the UUID its node is known by.
///
/// `ObjectId`s are left-padded with zeros. Every other value gets a name
/// based UUID over its type and extended JSON form, so reading the same
/// document twice yields the same node id.
pub fn foreign_id_to_uuid(raw: &Bson) -> Uuid {
    match raw {
        Bson::ObjectId(oid) => object_id_to_uuid(*oid),
        other => {
            let name = format!(
                "{:?}:{}",
                other.element_type(),
                other.clone().into_relaxed_extjson()
            );
            Uuid::new_v5(&FOREIGN_ID_NAMESPACE, name.as_bytes())
        }
    }
}

/// Values to match against `_id` when looking up `ids`.
///
/// Each id matches its UUID string, the foreign id it was read from if
/// known, and the `ObjectId` it would have been padded from.
pub fn id_filter_values(ids: &[Uuid], foreign_ids: &HashMap<Uuid, Bson>) -> Vec<Bson> {
    let mut values = Vec::with_capacity(ids.len());
    for id in ids {
        values.push(Bson::String(id.to_string()));
        if let Some(raw) = foreign_ids.get(id) {
            values.push(raw.clone());
        } else if let Some(oid) = object_id_from_uuid(*id) {
            values.push(Bson::ObjectId(oid));
        }
    }
    values
}

fn is_reserved(key: &str, config: &VectorStoreConfig) -> bool {
    key == ID_FIELD || key == SCORE_FIELD || key == config.text_key || key == config.embedding_key
}

/// Map a 12-byte `ObjectId` into a UUID by left-padding with zeros.
fn object_id_to_uuid(oid: ObjectId) -> Uuid {
    let mut bytes = [0_u8; 16];
    bytes[4..].copy_from_slice(&oid.bytes());
    Uuid::from_bytes(bytes)
}

fn object_id_from_uuid(id: Uuid) -> Option<ObjectId> {
    let bytes = id.as_bytes();
    if bytes[..4] != [0; 4] {
        return None;
    }
    let mut oid = [0_u8; 12];
    oid.copy_from_slice(&bytes[4..]);
    Some(ObjectId::from_bytes(oid))
}

fn array_to_vector(values: &[Bson]) -> Result<Vec<f32>> {
    values
        .iter()
        .map(|value| {
            bson_to_f32(value).ok_or_else(|| {
                AtlasRagError::vector_store("Embedding contains a non-numeric value")
            })
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn bson_to_f32(value: &Bson) -> Option<f32> {
    match value {
        Bson::Double(v) => Some(*v as f32),
        Bson::Int32(v) => Some(*v as f32),
        Bson::Int64(v) => Some(*v as f32),
        _ => None,
    }
}
