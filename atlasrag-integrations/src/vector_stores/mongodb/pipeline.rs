//! Aggregation pipelines and index definitions for Atlas Vector Search.

use atlasrag_core::{
    AtlasRagError, Result,
    config::VectorStoreConfig,
    traits::{DistanceMetric, IndexConfig},
};
use bson::{Bson, Document, doc};
use serde_json::Value;
use std::collections::HashMap;

use super::{conversion::SCORE_FIELD, error::map_bson_error};

/// Upper bound Atlas accepts for `numCandidates`.
pub const MAX_NUM_CANDIDATES: usize = 10_000;

/// Builder for a `$vectorSearch` aggregation pipeline.
///
/// ```rust
/// use atlasrag_integrations::vector_stores::mongodb::VectorSearchPipeline;
///
/// let pipeline = VectorSearchPipeline::new("vector_index_ghw", "embedding", &[0.1, 0.2], 4)
///     .num_candidates(40)
///     .build();
/// assert_eq!(pipeline.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct VectorSearchPipeline<'a> {
    index: &'a str,
    path: &'a str,
    query_vector: &'a [f32],
    limit: usize,
    num_candidates: usize,
    filter: Option<Document>,
    min_score: Option<f32>,
}

impl<'a> VectorSearchPipeline<'a> {
    /// Search `index` over the vectors in `path` for the `limit` nearest
    /// neighbours of `query_vector`.
    pub fn new(index: &'a str, path: &'a str, query_vector: &'a [f32], limit: usize) -> Self {
        Self {
            index,
            path,
            query_vector,
            limit,
            num_candidates: limit,
            filter: None,
            min_score: None,
        }
    }

    /// Number of candidates considered by the approximate search.
    ///
    /// Clamped to `[limit, MAX_NUM_CANDIDATES]`.
    #[must_use]
    pub fn num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = num_candidates.clamp(self.limit, MAX_NUM_CANDIDATES.max(self.limit));
        self
    }

    /// Pre-filter on indexed filter fields.
    #[must_use]
    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Drop results scoring below `min_score`.
    #[must_use]
    pub fn min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Build the pipeline stages.
    pub fn build(self) -> Vec<Document> {
        let query_vector: Vec<f64> = self.query_vector.iter().map(|&v| f64::from(v)).collect();
        let mut vector_search = doc! {
            "index": self.index,
            "path": self.path,
            "queryVector": query_vector,
            "numCandidates": to_bson_int(self.num_candidates),
            "limit": to_bson_int(self.limit),
        };
        if let Some(filter) = self.filter {
            vector_search.insert("filter", filter);
        }

        let mut stages = vec![
            doc! { "$vectorSearch": vector_search },
            doc! { "$set": { SCORE_FIELD: { "$meta": "vectorSearchScore" } } },
        ];
        if let Some(min_score) = self.min_score {
            stages.push(doc! { "$match": { SCORE_FIELD: { "$gte": f64::from(min_score) } } });
        }
        stages
    }
}

/// Build the `$vectorSearch` filter for metadata equality filters.
///
/// Each entry becomes `{ field: { $eq: value } }`; several entries are
/// combined with `$and`. Fields are ordered by name.
pub fn build_filter(filters: &HashMap<String, Value>) -> Result<Option<Document>> {
    let mut fields: Vec<&String> = filters.keys().collect();
    fields.sort();

    let mut clauses = Vec::with_capacity(fields.len());
    for field in fields {
        let value = bson::to_bson(&filters[field]).map_err(map_bson_error)?;
        if matches!(value, Bson::Array(_) | Bson::Document(_)) {
            return Err(AtlasRagError::validation(format!(
                "Filter on '{field}' must be a scalar value"
            )));
        }
        clauses.push(doc! { field.as_str(): { "$eq": value } });
    }

    Ok(match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(doc! { "$and": clauses }),
    })
}

/// Pipeline for a query against the configured collection.
pub fn search_pipeline(
    config: &VectorStoreConfig,
    query_vector: &[f32],
    top_k: usize,
    filters: &HashMap<String, Value>,
    min_score: Option<f32>,
) -> Result<Vec<Document>> {
    let mut pipeline = VectorSearchPipeline::new(
        &config.index_name,
        &config.embedding_key,
        query_vector,
        top_k,
    )
    .num_candidates(top_k.saturating_mul(config.num_candidates_multiplier));

    if let Some(filter) = build_filter(filters)? {
        pipeline = pipeline.filter(filter);
    }
    if let Some(min_score) = min_score {
        pipeline = pipeline.min_score(min_score);
    }

    Ok(pipeline.build())
}

/// Atlas `vectorSearch` index definition for `index` over `embedding_key`.
pub fn index_definition(index: &IndexConfig, embedding_key: &str) -> Document {
    let mut fields = vec![Bson::Document(doc! {
        "type": "vector",
        "path": embedding_key,
        "numDimensions": to_bson_int(index.dimension),
        "similarity": similarity_name(index.distance_metric),
    })];
    fields.extend(index.filter_fields.iter().map(|field| {
        Bson::Document(doc! {
            "type": "filter",
            "path": field.as_str(),
        })
    }));

    doc! { "fields": fields }
}

/// Atlas name of a similarity function.
pub fn similarity_name(metric: DistanceMetric) -> &'static str {
    match metric {
        DistanceMetric::Cosine => "cosine",
        DistanceMetric::Euclidean => "euclidean",
        DistanceMetric::DotProduct => "dotProduct",
    }
}

fn to_bson_int(value: usize) -> Bson {
    i64::try_from(value).map_or(Bson::Int64(i64::MAX), Bson::Int64)
}
