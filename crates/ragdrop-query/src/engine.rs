//! Retrieval-augmented query engine.

use crate::error::{EngineResult, QueryError};
use crate::operation::{Operation, Progress};
use crate::prompt::{build_messages, NO_ANSWER};
use ragdrop_core::{
    EmbeddingProvider, GenerationProvider, QueryResult, ScoredChunk, StopSignal, VectorStore,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Retrieval settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// Maximum number of chunks handed to the model.
    pub top_k: usize,
    /// Chunks scoring below this are dropped before prompting.
    pub min_similarity: Option<f32>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_similarity: None,
        }
    }
}

impl QueryOptions {
    pub fn from_config(config: &ragdrop_config::QueryConfig) -> Self {
        Self {
            top_k: config.top_k.max(1),
            min_similarity: config.min_similarity,
        }
    }
}

/// Answers questions from the vector store.
///
/// Holds no state between questions: every call embeds, retrieves and
/// generates from scratch.
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    store: Arc<dyn VectorStore>,
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Embed the question and fetch the most similar chunks, best first.
    pub async fn retrieve(&self, question: &str) -> EngineResult<Vec<ScoredChunk>> {
        let vector = self
            .embedder
            .embed(question)
            .await
            .map_err(QueryError::Provider)?;

        let mut chunks = self
            .store
            .query_similar(&vector, self.options.top_k)
            .await
            .map_err(QueryError::Store)?;

        if let Some(min) = self.options.min_similarity {
            chunks.retain(|c| c.score >= min);
        }

        debug!("Retrieved {} context chunks", chunks.len());
        Ok(chunks)
    }

    /// Answer a question using only retrieved context.
    ///
    /// With nothing retrieved the model is not called and the answer is
    /// [`NO_ANSWER`].
    pub async fn answer(&self, question: &str) -> EngineResult<QueryResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let context = self.retrieve(question).await?;
        if context.is_empty() {
            info!("No relevant context found");
            return Ok(QueryResult {
                answer: NO_ANSWER.to_string(),
                context,
            });
        }

        let messages = build_messages(question, &context);
        let answer = self
            .generator
            .generate(&messages)
            .await
            .map_err(QueryError::Provider)?;

        Ok(QueryResult {
            answer: answer.trim().to_string(),
            context,
        })
    }
}

/// Front end for an interactive surface: at most one question in flight.
pub struct QuerySession {
    engine: Arc<QueryEngine>,
    in_flight: Semaphore,
    operation: Operation,
}

impl QuerySession {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self {
            engine,
            in_flight: Semaphore::new(1),
            operation: Operation::new(),
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.available_permits() == 0
    }

    /// Answer a question, reporting progress while it runs.
    ///
    /// Fails with [`QueryError::Busy`] if another question from this session
    /// has not finished yet.
    pub async fn ask<P>(&self, question: &str, on_tick: P) -> EngineResult<QueryResult>
    where
        P: FnMut(Progress),
    {
        self.run(&self.operation, question, on_tick).await
    }

    /// Like [`QuerySession::ask`], cancelled when `stop` fires.
    pub async fn ask_until<P>(
        &self,
        question: &str,
        stop: StopSignal,
        on_tick: P,
    ) -> EngineResult<QueryResult>
    where
        P: FnMut(Progress),
    {
        let operation = self.operation.clone().with_stop(stop);
        self.run(&operation, question, on_tick).await
    }

    async fn run<P>(
        &self,
        operation: &Operation,
        question: &str,
        on_tick: P,
    ) -> EngineResult<QueryResult>
    where
        P: FnMut(Progress),
    {
        let _permit = self
            .in_flight
            .try_acquire()
            .map_err(|_| QueryError::Busy)?;

        operation.run(self.engine.answer(question), on_tick).await
    }
}
