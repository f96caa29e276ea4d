//! Core domain types for ragdrop.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for chunks.
pub type ChunkId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Where a chunk came from.
///
/// Every chunk carries exactly one owning source file name. The name is the
/// one the file had when it was ingested, before the processed marker was
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name of the source document.
    pub source: String,
    /// 1-based page number within the source document.
    pub page: u32,
    /// Character offset of the chunk within its page text.
    pub start_index: usize,
}

impl ChunkMetadata {
    pub fn new(source: impl Into<String>, page: u32, start_index: usize) -> Self {
        Self {
            source: source.into(),
            page,
            start_index,
        }
    }
}

/// A bounded excerpt of document text, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    /// Create a chunk with a freshly generated identifier.
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            metadata,
        }
    }
}

/// A chunk paired with its embedding, as handed to the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: DocumentChunk,
    pub vector: Vec<f32>,
}

/// A chunk returned from a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    /// Similarity to the query vector; higher is closer.
    pub score: f32,
}

/// Summary counts for a vector store collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub chunks: usize,
    pub sources: usize,
}

/// Ingestion state of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Unprocessed,
    Processed,
}

impl SourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceState::Unprocessed => "unprocessed",
            SourceState::Processed => "processed",
        }
    }
}

impl std::fmt::Display for SourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file in the watched directory.
///
/// The processed state is carried entirely by the file name: a name that
/// starts with the processed prefix has already been ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
    pub state: SourceState,
}

impl SourceFile {
    /// Classify a path using the processed-marker prefix.
    ///
    /// Returns `None` for paths without a UTF-8 file name.
    pub fn from_path(path: &Path, processed_prefix: &str) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let state = if !processed_prefix.is_empty() && name.starts_with(processed_prefix) {
            SourceState::Processed
        } else {
            SourceState::Unprocessed
        };

        Some(Self {
            path: path.to_path_buf(),
            name,
            state,
        })
    }

    pub fn is_processed(&self) -> bool {
        self.state == SourceState::Processed
    }

    /// Lower-cased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn of a chat prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// The answer to a question together with the chunks that grounded it.
///
/// Exists for a single query-response cycle and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub context: Vec<ScoredChunk>,
}
