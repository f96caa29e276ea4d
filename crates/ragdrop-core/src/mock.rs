//! Deterministic stand-ins for the external providers.
//!
//! These run fully offline and are what the test suites wire into the
//! pipeline and the query engine.

use crate::error::{Error, Result};
use crate::provider::{EmbeddingProvider, GenerationProvider};
use crate::types::ChatMessage;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Bag-of-words embedder: each lower-cased word is hashed into one of
/// `dims` buckets and the result is L2-normalised.
///
/// Texts that share words score a positive cosine similarity; texts with no
/// words in common score close to zero.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) as usize
                % self.dims;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash-bow"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

/// Wraps an embedder and fails any request whose text contains `trigger`.
///
/// Simulates an unreachable provider for one particular document.
pub struct FaultyEmbedder<E> {
    inner: E,
    trigger: String,
    failures: AtomicUsize,
}

impl<E> FaultyEmbedder<E> {
    pub fn new(inner: E, trigger: impl Into<String>) -> Self {
        Self {
            inner,
            trigger: trigger.into(),
            failures: AtomicUsize::new(0),
        }
    }

    /// Number of requests that were failed.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: EmbeddingProvider> EmbeddingProvider for FaultyEmbedder<E> {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(&self.trigger) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(Error::Provider("embedding provider unreachable".to_string()));
        }
        self.inner.embed(text).await
    }
}

/// Replies with a fixed answer and records every prompt it receives.
pub struct ScriptedGenerator {
    reply: Result<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with a provider error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(Error::Provider(message.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(Error::Provider(e.to_string())),
        }
    }
}
