//! Embedder backed by the Generative Language REST API.

use async_trait::async_trait;
use atlasrag_core::{
    AtlasRagError, Result as CoreResult,
    config::EmbedderConfig,
    traits::{Embedder, EmbeddingStats},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{
    cache::{CacheKey, CacheStats, EmbeddingCache, InMemoryCache},
    config::GoogleEmbedderConfig,
    error::{GoogleEmbedderError, Result},
};

/// Task type attached to each embedding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Text used as a search query.
    RetrievalQuery,
    /// Text stored for retrieval.
    RetrievalDocument,
}

impl TaskType {
    fn as_str(self) -> &'static str {
        match self {
            Self::RetrievalQuery => "RETRIEVAL_QUERY",
            Self::RetrievalDocument => "RETRIEVAL_DOCUMENT",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Google Generative Language embedder.
///
/// Single texts are embedded as queries through `embedContent`; batches are
/// embedded as documents through `batchEmbedContents`, split into chunks of
/// at most `batch_size` texts.
///
/// # Examples
///
/// ```rust,no_run
/// use atlasrag_integrations::embedders::google::{GoogleEmbedder, GoogleEmbedderConfig};
/// use atlasrag_core::traits::Embedder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let embedder = GoogleEmbedder::new(GoogleEmbedderConfig::new("embedding-001", "api-key"))?;
///
/// let query = embedder.embed("What is Atlas?").await?;
/// let documents = embedder.embed_batch(vec!["Atlas is a database", "Rust"]).await?;
/// assert_eq!(documents.len(), 2);
/// # let _ = query;
/// # Ok(())
/// # }
/// ```
pub struct GoogleEmbedder {
    config: GoogleEmbedderConfig,
    model_path: String,
    http: reqwest::Client,
    cache: Option<Box<dyn EmbeddingCache>>,
    stats: Mutex<EmbeddingStats>,
}

impl std::fmt::Debug for GoogleEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleEmbedder")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .field("cache_enabled", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl GoogleEmbedder {
    /// Create an embedder from its configuration.
    pub fn new(config: GoogleEmbedderConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                GoogleEmbedderError::network(format!("Failed to create HTTP client: {e}"))
            })?;

        let cache = config
            .enable_cache
            .then(|| Box::new(InMemoryCache::new()) as Box<dyn EmbeddingCache>);

        info!(
            "Created Google embedder for model '{}' ({} dimensions)",
            config.model, config.dimension
        );

        Ok(Self {
            model_path: config.model_path(),
            config,
            http,
            cache,
            stats: Mutex::new(EmbeddingStats::default()),
        })
    }

    /// Create an embedder from a generic [`EmbedderConfig`].
    pub fn from_embedder_config(config: &EmbedderConfig) -> Result<Self> {
        Self::new(GoogleEmbedderConfig::from_embedder_config(config)?)
    }

    /// The configuration in use.
    pub fn config(&self) -> &GoogleEmbedderConfig {
        &self.config
    }

    /// Embedding statistics.
    pub async fn stats(&self) -> EmbeddingStats {
        self.stats.lock().await.clone()
    }

    /// Cache statistics, if caching is enabled.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            Some(cache) => Some(cache.stats().await),
            None => None,
        }
    }

    /// Remove every cached embedding.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
    }

    /// Drop expired cache entries, returning how many were removed.
    pub async fn cleanup_cache(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.cleanup().await,
            None => 0,
        }
    }

    /// Embed `texts` for `task`, serving what it can from the cache.
    async fn embed_with_cache(&self, texts: &[&str], task: TaskType) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut pending = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let cached = match &self.cache {
                Some(cache) => {
                    cache
                        .get(&CacheKey::new(&self.config.model, task.as_str(), text))
                        .await
                }
                None => None,
            };
            match cached {
                Some(embedding) => results[i] = Some(embedding),
                None => pending.push(i),
            }
        }

        let cache_hits = texts.len() - pending.len();
        if cache_hits > 0 {
            debug!("{} of {} embeddings served from cache", cache_hits, texts.len());
        }

        let outcome = self.embed_pending(texts, &pending, task, &mut results).await;

        let mut stats = self.stats.lock().await;
        stats.cache_hits += cache_hits;
        stats.duration += start.elapsed();
        match &outcome {
            Ok(()) => stats.texts_embedded += texts.len(),
            Err(_) => stats.embeddings_failed += pending.len(),
        }
        stats.update_avg_time();
        drop(stats);

        outcome?;
        results
            .into_iter()
            .map(|embedding| {
                embedding.ok_or_else(|| GoogleEmbedderError::unexpected("Missing embedding"))
            })
            .collect()
    }

    async fn embed_pending(
        &self,
        texts: &[&str],
        pending: &[usize],
        task: TaskType,
        results: &mut [Option<Vec<f32>>],
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }

        for chunk in pending.chunks(self.config.batch_size) {
            let chunk_texts: Vec<&str> = chunk.iter().map(|&i| texts[i]).collect();
            let embeddings = match task {
                TaskType::RetrievalQuery if chunk_texts.len() == 1 => {
                    vec![self.embed_content(chunk_texts[0], task).await?]
                }
                _ => self.batch_embed_contents(&chunk_texts, task).await?,
            };

            for ((&index, text), embedding) in chunk.iter().zip(&chunk_texts).zip(embeddings) {
                if let Some(cache) = &self.cache {
                    cache
                        .put(
                            CacheKey::new(&self.config.model, task.as_str(), text),
                            embedding.clone(),
                            self.config.cache_ttl,
                        )
                        .await;
                }
                results[index] = Some(embedding);
            }
        }

        Ok(())
    }

    async fn embed_content(&self, text: &str, task: TaskType) -> Result<Vec<f32>> {
        let request = self.request(text, task);
        let response: EmbedContentResponse = self
            .post(&self.config.endpoint("embedContent"), &request)
            .await?;
        Ok(response.embedding.values)
    }

    async fn batch_embed_contents(&self, texts: &[&str], task: TaskType) -> Result<Vec<Vec<f32>>> {
        let request = BatchEmbedContentsRequest {
            requests: texts.iter().map(|text| self.request(text, task)).collect(),
        };
        debug!("Requesting {} embeddings from {}", texts.len(), self.model_path);

        let response: BatchEmbedContentsResponse = self
            .post(&self.config.endpoint("batchEmbedContents"), &request)
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(GoogleEmbedderError::unexpected(format!(
                "Requested {} embeddings but received {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn request<'a>(&'a self, text: &'a str, task: TaskType) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: &self.model_path,
            content: Content {
                parts: [Part { text }],
            },
            task_type: task,
        }
    }

    /// POST `body` to `url`, retrying retryable failures up to `max_retries`.
    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.post_once(url, body).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.config.max_retries && e.is_retryable() => {
                    let delay = e
                        .retry_delay()
                        .unwrap_or_default()
                        .saturating_mul(2_u32.saturating_pow(attempt));
                    warn!(
                        "Embedding request failed on attempt {}, retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| GoogleEmbedderError::from_reqwest(&e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleEmbedderError::from_status(status.as_u16(), &body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GoogleEmbedderError::unexpected(e.to_string()))
    }
}

#[async_trait]
impl Embedder for GoogleEmbedder {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        let embeddings = self
            .embed_with_cache(&[text], TaskType::RetrievalQuery)
            .await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AtlasRagError::embedding("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: Vec<&str>) -> CoreResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .embed_with_cache(&texts, TaskType::RetrievalDocument)
            .await?)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn name(&self) -> &'static str {
        "GoogleEmbedder"
    }

    async fn health_check(&self) -> CoreResult<()> {
        self.embed_content("health check", TaskType::RetrievalQuery)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    fn metadata(&self) -> HashMap<String, serde_json::Value> {
        let mut metadata = HashMap::new();
        metadata.insert("provider".to_string(), "google".into());
        metadata.insert("model".to_string(), self.config.model.clone().into());
        metadata.insert("model_path".to_string(), self.model_path.clone().into());
        metadata.insert("dimension".to_string(), self.config.dimension.into());
        metadata.insert("batch_size".to_string(), self.config.batch_size.into());
        metadata.insert("cache_enabled".to_string(), self.cache.is_some().into());
        metadata
    }
}
