//! Configuration for embedding services.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

use crate::{AtlasRagError, Result};

/// Configuration for an embedding provider.
///
/// # Examples
///
/// ```rust
/// use atlasrag_core::config::EmbedderConfig;
///
/// let config = EmbedderConfig::google("model/embeddings-001", "api-key")
///     .with_batch_size(50);
///
/// assert_eq!(config.provider(), "google");
/// assert_eq!(config.model_name(), "model/embeddings-001");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmbedderConfig {
    /// Remote API embedding service.
    Api {
        /// Provider name (e.g. "google").
        provider: String,

        /// Model identifier, passed to the provider unchanged.
        model_name: String,

        /// API key for authentication.
        #[serde(default = "empty_secret")]
        api_key: SecretString,

        /// Custom base URL.
        #[serde(default)]
        base_url: Option<String>,

        /// Texts per request.
        #[serde(default = "default_batch_size")]
        batch_size: usize,

        /// Provider-specific settings.
        #[serde(default)]
        additional_config: HashMap<String, serde_json::Value>,
    },

    /// Custom embedding implementation registered by the application.
    Custom {
        /// Implementation identifier.
        implementation: String,

        /// Free-form parameters.
        #[serde(default)]
        config: HashMap<String, serde_json::Value>,
    },
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_batch_size() -> usize {
    100
}

impl EmbedderConfig {
    /// Create a Google Generative Language embedder configuration.
    pub fn google<M: Into<String>, K: Into<String>>(model_name: M, api_key: K) -> Self {
        Self::api("google", model_name, api_key)
    }

    /// Create an API embedder configuration for any provider.
    pub fn api<P, M, K>(provider: P, model_name: M, api_key: K) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        K: Into<String>,
    {
        Self::Api {
            provider: provider.into(),
            model_name: model_name.into(),
            api_key: SecretString::new(api_key.into()),
            base_url: None,
            batch_size: default_batch_size(),
            additional_config: HashMap::new(),
        }
    }

    /// Create a custom embedder configuration.
    pub fn custom<S: Into<String>>(implementation: S) -> Self {
        Self::Custom {
            implementation: implementation.into(),
            config: HashMap::new(),
        }
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        match &mut self {
            Self::Api { batch_size: bs, .. } => *bs = batch_size,
            Self::Custom { config, .. } => {
                config.insert("batch_size".to_string(), batch_size.into());
            }
        }
        self
    }

    /// Set a custom base URL for API embedders.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, url: S) -> Self {
        if let Self::Api { base_url, .. } = &mut self {
            *base_url = Some(url.into());
        }
        self
    }

    /// Add a provider-specific setting.
    #[must_use]
    pub fn with_config<S: Into<String>>(mut self, key: S, value: serde_json::Value) -> Self {
        match &mut self {
            Self::Api {
                additional_config, ..
            } => {
                additional_config.insert(key.into(), value);
            }
            Self::Custom { config, .. } => {
                config.insert(key.into(), value);
            }
        }
        self
    }

    /// Replace the API key.
    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, key: S) -> Self {
        if let Self::Api { api_key, .. } = &mut self {
            *api_key = SecretString::new(key.into());
        }
        self
    }

    /// Provider identifier used to pick a factory.
    pub fn provider(&self) -> &str {
        match self {
            Self::Api { provider, .. } => provider,
            Self::Custom { implementation, .. } => implementation,
        }
    }

    /// Model identifier.
    pub fn model_name(&self) -> &str {
        match self {
            Self::Api { model_name, .. } => model_name,
            Self::Custom { config, .. } => config
                .get("model_name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(""),
        }
    }

    /// API key, for API embedders.
    pub fn api_key(&self) -> Option<&SecretString> {
        match self {
            Self::Api { api_key, .. } => Some(api_key),
            Self::Custom { .. } => None,
        }
    }

    /// Custom base URL, if set.
    pub fn base_url(&self) -> Option<&str> {
        match self {
            Self::Api { base_url, .. } => base_url.as_deref(),
            Self::Custom { .. } => None,
        }
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        match self {
            Self::Api { batch_size, .. } => *batch_size,
            Self::Custom { config, .. } => config
                .get("batch_size")
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or_else(default_batch_size),
        }
    }

    /// Provider-specific settings.
    pub fn additional_config(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::Api {
                additional_config, ..
            } => additional_config,
            Self::Custom { config, .. } => config,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Api {
                provider,
                model_name,
                api_key,
                batch_size,
                ..
            } => {
                if provider.trim().is_empty() {
                    return Err(AtlasRagError::configuration(
                        "Embedding provider cannot be empty",
                    ));
                }
                if model_name.trim().is_empty() {
                    return Err(AtlasRagError::configuration(
                        "Embedding model name cannot be empty",
                    ));
                }
                if api_key.expose_secret().trim().is_empty() {
                    return Err(AtlasRagError::configuration(format!(
                        "API key for embedding provider '{provider}' is missing"
                    )));
                }
                if *batch_size == 0 {
                    return Err(AtlasRagError::configuration(
                        "Batch size must be greater than 0",
                    ));
                }
            }
            Self::Custom { implementation, .. } => {
                if implementation.trim().is_empty() {
                    return Err(AtlasRagError::configuration(
                        "Custom embedder implementation cannot be empty",
                    ));
                }
            }
        }
        Ok(())
    }
}
