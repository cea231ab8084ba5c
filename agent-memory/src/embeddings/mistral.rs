//! Mistral embeddings backend, feature-gated behind `mistral`.
//!
//! Mirrors [`super::openai::OpenAiEmbeddingProvider`]'s shape; the two
//! providers differ only in endpoint and response envelope.

#![cfg(feature = "mistral")]

use super::circuit_breaker::CircuitBreaker;
use super::provider::{provider_error, EmbeddingProvider, ProviderFailureClass};
use crate::error::{MemoryError, Result};
use crate::model::Vector;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct MistralEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimension: usize,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDatum>,
}

#[derive(Deserialize)]
struct EmbedDatum {
    embedding: Vec<f32>,
}

impl MistralEmbeddingProvider {
    #[must_use]
    pub fn new(api_key: String, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            dimension,
            breaker: CircuitBreaker::new(5, Duration::from_secs(30)),
            retry: RetryPolicy::embedding_default(),
        }
    }

    async fn embed_once(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if !self.breaker.allow() {
            return Err(MemoryError::EmbeddingFailed(
                "circuit breaker open for Mistral provider".to_string(),
            ));
        }
        let response = self
            .client
            .post("https://api.mistral.ai/v1/embeddings")
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                self.breaker.record_success();
                let body: EmbedResponse = resp
                    .json()
                    .await
                    .map_err(|e| provider_error(ProviderFailureClass::Transient, e.to_string()))?;
                Ok(body.data.into_iter().map(|d| d.embedding).collect())
            }
            Ok(resp) if resp.status().as_u16() == 429 || resp.status().is_server_error() => {
                self.breaker.record_failure();
                Err(MemoryError::RateLimited { retry_after_ms: 1000 })
            }
            Ok(resp) => {
                self.breaker.record_success();
                Err(provider_error(
                    ProviderFailureClass::Permanent,
                    format!("Mistral embeddings returned {}", resp.status()),
                ))
            }
            Err(e) => {
                self.breaker.record_failure();
                Err(provider_error(ProviderFailureClass::Transient, e.to_string()))
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MistralEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.retry
            .run(|| self.embed_once(texts), MemoryError::is_retryable)
            .await
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        self.breaker.allow()
    }
}
