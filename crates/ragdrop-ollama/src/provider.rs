//! Core provider contracts implemented on top of [`OllamaClient`].

use crate::client::OllamaClient;
use crate::types::{ChatRequest, GenerateOptions};
use async_trait::async_trait;
use ragdrop_config::OllamaConfig;
use ragdrop_core::{ChatMessage, EmbeddingProvider, GenerationProvider, Result};

/// Embedding provider bound to one Ollama embedding model.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(client: OllamaClient, config: &OllamaConfig) -> Self {
        Self::new(client, &config.embedding_model)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.client.embed(&self.model, text).await?)
    }
}

/// Generation provider bound to one Ollama chat model.
#[derive(Clone)]
pub struct OllamaChat {
    client: OllamaClient,
    model: String,
    temperature: f32,
}

impl OllamaChat {
    pub fn new(client: OllamaClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(client: OllamaClient, config: &OllamaConfig) -> Self {
        Self::new(client, &config.model, config.temperature)
    }

    fn request(&self, messages: &[ChatMessage]) -> ChatRequest {
        ChatRequest::new(&self.model, messages.to_vec())
            .with_options(GenerateOptions::new().with_temperature(self.temperature))
    }
}

#[async_trait]
impl GenerationProvider for OllamaChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.client.chat(self.request(messages)).await?;
        Ok(response.message.content)
    }
}
