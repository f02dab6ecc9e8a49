//! OpenAI embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};

use super::http_client::HttpClientTrait;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Model used when the caller does not specify one and no override has
/// been configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// OpenAI embedding provider
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    default_model: RwLock<String>,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// Create a new OpenAI embedding provider. An empty API key is
    /// rejected at construction.
    pub fn new(client: C, api_key: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new provider with a custom base URL
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(DomainError::configuration("OpenAI API key is not set"));
        }

        let auth_header = format!("Bearer {}", api_key);
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            auth_header,
            base_url,
            default_model: RwLock::new(DEFAULT_EMBEDDING_MODEL.to_string()),
        })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn resolve_model(&self, model: Option<&str>) -> String {
        match model {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self.default_model(),
        }
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Vec<f32>, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::provider("openai", "no embedding returned from API"))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn generate_embedding(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<f32>, DomainError> {
        let url = self.embeddings_url();
        let body = serde_json::json!({
            "model": self.resolve_model(model),
            "input": [text],
        });

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn set_default_model(&self, model: &str) {
        *self
            .default_model
            .write()
            .unwrap_or_else(PoisonError::into_inner) = model.to_string();
    }

    fn default_model(&self) -> String {
        self.default_model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}
