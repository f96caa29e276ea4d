//! Ollama HTTP client.

use crate::error::{OllamaError, OllamaResult};
use crate::types::*;
use ragdrop_config::OllamaConfig;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Client for interacting with Ollama's API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OllamaConfig) -> OllamaResult<Self> {
        Self::with_timeout(&config.host, Duration::from_secs(config.timeout_seconds))
    }

    /// Create a new client with default settings.
    pub fn new(host: impl Into<String>) -> OllamaResult<Self> {
        Self::with_timeout(&host.into(), Duration::from_secs(120))
    }

    fn with_timeout(host: &str, timeout: Duration) -> OllamaResult<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(OllamaError::InvalidConfig("ollama host is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OllamaError::Http)?;

        Ok(Self {
            client,
            host: host.to_string(),
            timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check if Ollama server is available.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List all available models.
    pub async fn list_models(&self) -> OllamaResult<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.host);
        debug!("Listing models from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = self.check_status(response, None).await?;

        let list: ListModelsResponse = response.json().await?;
        Ok(list.models)
    }

    /// Check if a specific model is available.
    pub async fn has_model(&self, model: &str) -> OllamaResult<bool> {
        let models = self.list_models().await?;
        // Check both exact match and model without tag
        Ok(models
            .iter()
            .any(|m| m.name == model || m.name.starts_with(&format!("{}:", model))))
    }

    /// Generate an embedding for text.
    pub async fn embed(&self, model: &str, text: &str) -> OllamaResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.host);
        debug!(
            "Generating embedding with model {} for text length {}",
            model,
            text.len()
        );

        let request = EmbeddingRequest {
            model: model.to_string(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = self.check_status(response, Some(model)).await?;

        let embedding_response: EmbeddingResponse = response.json().await?;
        if embedding_response.embedding.is_empty() {
            return Err(OllamaError::ParseError(format!(
                "model {} returned an empty embedding",
                model
            )));
        }
        debug!(
            "Generated embedding with {} dimensions",
            embedding_response.embedding.len()
        );

        Ok(embedding_response.embedding)
    }

    /// Run a non-streaming chat completion.
    pub async fn chat(&self, request: ChatRequest) -> OllamaResult<ChatResponse> {
        let url = format!("{}/api/chat", self.host);
        debug!(
            "Chat with model {} ({} messages)",
            request.model,
            request.messages.len()
        );

        let mut request = request;
        request.stream = false;

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = self.check_status(response, Some(&request.model)).await?;

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }

    fn send_error(&self, e: reqwest::Error) -> OllamaError {
        if e.is_connect() {
            OllamaError::ServerNotRunning {
                host: self.host.clone(),
            }
        } else if e.is_timeout() {
            OllamaError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            OllamaError::Http(e)
        }
    }

    async fn check_status(&self, response: Response, model: Option<&str>) -> OllamaResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if let Some(model) = model {
            if status.as_u16() == 404 || text.contains("not found") {
                return Err(OllamaError::ModelNotFound {
                    model: model.to_string(),
                });
            }
        }

        Err(OllamaError::ApiError {
            status: status.as_u16(),
            message: text,
        })
    }
}
