//! Stored text chunks and scored search hits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A piece of text stored in a vector store together with its embedding.
///
/// A node maps one-to-one onto a document in the backing collection: the
/// id becomes the primary key, the content is stored under the configured
/// text field and metadata fields are kept alongside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique identifier.
    pub id: Uuid,

    /// Text content of the node.
    pub content: String,

    /// Arbitrary metadata stored next to the text.
    pub metadata: HashMap<String, serde_json::Value>,

    /// Dense embedding of `content`, if computed.
    pub embedding: Option<Vec<f32>>,
}

/// A node returned from a similarity search with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredNode {
    /// The matching node.
    pub node: Node,

    /// Similarity score, higher means more similar.
    pub score: f32,
}

impl Node {
    /// Create a node with a fresh id and no embedding.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            metadata: HashMap::new(),
            embedding: None,
        }
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> NodeBuilder {
        NodeBuilder::new()
    }

    /// Set the embedding.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Whether an embedding is present.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

impl ScoredNode {
    /// Create a new scored node.
    pub fn new(node: Node, score: f32) -> Self {
        Self { node, score }
    }
}

/// Builder for [`Node`].
#[derive(Debug, Default)]
pub struct NodeBuilder {
    id: Option<Uuid>,
    content: Option<String>,
    metadata: HashMap<String, serde_json::Value>,
    embedding: Option<Vec<f32>>,
}

impl NodeBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific id instead of a random one.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace all metadata.
    #[must_use]
    pub fn metadata_map(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the embedding.
    #[must_use]
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Build the node. Missing content becomes an empty string.
    #[must_use]
    pub fn build(self) -> Node {
        Node {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            content: self.content.unwrap_or_default(),
            metadata: self.metadata,
            embedding: self.embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_builder() {
        let id = Uuid::new_v4();
        let node = Node::builder()
            .id(id)
            .content("hello")
            .metadata("source", "a.txt")
            .embedding(vec![0.1, 0.2])
            .build();

        assert_eq!(node.id, id);
        assert_eq!(node.content, "hello");
        assert_eq!(node.get_metadata("source"), Some(&"a.txt".into()));
        assert!(node.has_embedding());
    }

    #[test]
    fn test_new_nodes_get_distinct_ids() {
        let a = Node::new("same");
        let b = Node::new("same");
        assert_ne!(a.id, b.id);
        assert!(!a.has_embedding());
    }
}
