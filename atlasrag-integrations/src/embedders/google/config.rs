//! Configuration for the Google Generative Language embedder.

use atlasrag_core::config::EmbedderConfig;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use super::error::{GoogleEmbedderError, Result};

/// Default REST endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Largest batch accepted by `batchEmbedContents`.
pub const MAX_BATCH_SIZE: usize = 100;

/// Provider identifier used in [`EmbedderConfig`].
pub const PROVIDER: &str = "google";

/// Configuration for [`GoogleEmbedder`](super::GoogleEmbedder).
#[derive(Debug, Clone)]
pub struct GoogleEmbedderConfig {
    /// Model identifier exactly as configured.
    pub model: String,

    /// API key sent in the `x-goog-api-key` header.
    pub api_key: SecretString,

    /// Base URL of the REST API.
    pub base_url: String,

    /// Texts per `batchEmbedContents` request.
    pub batch_size: usize,

    /// Retries for retryable failures. Zero disables retrying.
    pub max_retries: u32,

    /// Timeout for a single HTTP request.
    pub timeout: Duration,

    /// Enable the in-memory embedding cache.
    pub enable_cache: bool,

    /// Time to live of cached embeddings.
    pub cache_ttl: Duration,

    /// Reported vector dimension.
    pub dimension: usize,
}

impl GoogleEmbedderConfig {
    /// Create a configuration with defaults for `model`.
    pub fn new<M: Into<String>, K: Into<String>>(model: M, api_key: K) -> Self {
        let model = model.into();
        let dimension = known_dimension(&model);
        Self {
            model,
            api_key: SecretString::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            max_retries: 0,
            timeout: Duration::from_secs(30),
            enable_cache: true,
            cache_ttl: Duration::from_secs(3600),
            dimension,
        }
    }

    /// Build from a generic [`EmbedderConfig`].
    ///
    /// Recognised `additional_config` keys: `dimension`, `max_retries`,
    /// `timeout_secs`, `enable_cache` and `cache_ttl_secs`.
    pub fn from_embedder_config(config: &EmbedderConfig) -> Result<Self> {
        let EmbedderConfig::Api { provider, .. } = config else {
            return Err(GoogleEmbedderError::configuration(
                "Google embedder requires an API embedder configuration",
            ));
        };
        if provider != PROVIDER {
            return Err(GoogleEmbedderError::configuration(format!(
                "Unsupported embedding provider '{provider}'"
            )));
        }

        let api_key = config
            .api_key()
            .map(|key| key.expose_secret().clone())
            .unwrap_or_default();

        let mut result = Self::new(config.model_name(), api_key)
            .with_batch_size(config.batch_size().min(MAX_BATCH_SIZE));
        if let Some(base_url) = config.base_url() {
            result = result.with_base_url(base_url);
        }

        let extra = config.additional_config();
        if let Some(dimension) = extra.get("dimension").and_then(serde_json::Value::as_u64) {
            result.dimension = usize::try_from(dimension).map_err(|_| {
                GoogleEmbedderError::configuration(format!("Invalid dimension {dimension}"))
            })?;
        }
        if let Some(retries) = extra.get("max_retries").and_then(serde_json::Value::as_u64) {
            result.max_retries = u32::try_from(retries).unwrap_or(u32::MAX);
        }
        if let Some(secs) = extra.get("timeout_secs").and_then(serde_json::Value::as_u64) {
            result.timeout = Duration::from_secs(secs);
        }
        if let Some(enable) = extra.get("enable_cache").and_then(serde_json::Value::as_bool) {
            result.enable_cache = enable;
        }
        if let Some(secs) = extra.get("cache_ttl_secs").and_then(serde_json::Value::as_u64) {
            result.cache_ttl = Duration::from_secs(secs);
        }

        Ok(result)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable caching.
    #[must_use]
    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Set the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Override the reported dimension.
    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Resource path of the model, e.g. `models/embedding-001`.
    ///
    /// Identifiers that already name a resource (`models/...` or
    /// `tunedModels/...`) are used as is; anything else is placed under
    /// `models/`.
    pub fn model_path(&self) -> String {
        if self.model.starts_with("models/") || self.model.starts_with("tunedModels/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    /// URL of `method` on the configured model.
    pub fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model_path(),
            method
        )
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(GoogleEmbedderError::configuration(
                "Model name cannot be empty",
            ));
        }

        if self.api_key.expose_secret().trim().is_empty() {
            return Err(GoogleEmbedderError::configuration(
                "Google API key cannot be empty",
            ));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(GoogleEmbedderError::configuration(format!(
                "Batch size must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }

        if self.timeout.is_zero() {
            return Err(GoogleEmbedderError::configuration(
                "Timeout must be greater than 0",
            ));
        }

        if self.dimension == 0 {
            return Err(GoogleEmbedderError::configuration(
                "Dimension must be greater than 0",
            ));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            GoogleEmbedderError::configuration(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;

        Ok(())
    }
}

/// Output size of the hosted embedding models.
fn known_dimension(model: &str) -> usize {
    match model.rsplit('/').next().unwrap_or(model) {
        "gemini-embedding-001" | "gemini-embedding-exp-03-07" => 3072,
        _ => 768,
    }
}
