//! Ragdrop Ollama - Ollama-backed embedding and generation providers.
//!
//! [`OllamaClient`] speaks the HTTP API; [`OllamaEmbedder`] and
//! [`OllamaChat`] bind it to a model and implement the core provider
//! contracts.

mod client;
mod error;
mod provider;
mod types;

pub use client::OllamaClient;
pub use error::{OllamaError, OllamaResult};
pub use provider::{OllamaChat, OllamaEmbedder};
pub use types::*;
