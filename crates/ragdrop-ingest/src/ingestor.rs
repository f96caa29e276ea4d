//! Main ingestion logic.

use crate::chunker::{ChunkConfig, Chunker};
use crate::error::{IngestError, IngestResult};
use crate::parsers::{DocumentLoader, Page, PdfLoader};
use crate::sanitize::sanitize;
use ragdrop_core::{
    ChunkMetadata, DocumentChunk, EmbeddedChunk, EmbeddingProvider, VectorStore,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Progress is reported every this many embedded chunks, and on the last one.
const PROGRESS_EVERY: usize = 10;

/// What happened to a file handed to the ingestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The file was chunked, embedded and stored.
    ///
    /// `chunks` may be zero for a document without extractable text.
    Ingested { chunks: usize },
    /// The file is not a supported document type and was left alone.
    Skipped { reason: String },
}

/// Embedding progress for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestProgress {
    pub file: String,
    pub done: usize,
    pub total: usize,
}

impl IngestProgress {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.done * 100 / self.total
        }
    }
}

type ProgressFn = Arc<dyn Fn(&IngestProgress) + Send + Sync>;

/// Main ingestor for processing files.
///
/// Owns the pipeline for a single document: load pages, sanitize, chunk,
/// embed each chunk, then write the whole file to the store in one batch.
pub struct Ingestor {
    loader: Arc<dyn DocumentLoader>,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    progress: Option<ProgressFn>,
}

impl Ingestor {
    /// Create a new ingestor reading PDFs.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        chunk_config: ChunkConfig,
    ) -> Self {
        Self {
            loader: Arc::new(PdfLoader::new()),
            chunker: Chunker::new(chunk_config),
            embedder,
            store,
            progress: None,
        }
    }

    /// Replace the document loader.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Register a callback for embedding progress.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&IngestProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Whether the loader handles this file's extension.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.supports_extension(ext))
            .unwrap_or(false)
    }

    /// Whether the loader reads files with this extension.
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.loader.supports(ext)
    }

    /// Ingest a single file.
    ///
    /// Nothing is written to the store unless every chunk of the file was
    /// embedded. The file itself is never modified.
    pub async fn ingest_file(&self, path: &Path) -> IngestResult<IngestOutcome> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if !self.accepts(path) {
            info!("Skipping unsupported file: {}", name);
            return Ok(IngestOutcome::Skipped {
                reason: format!("{} is not a supported document", name),
            });
        }

        if !path.is_file() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        info!("Processing file: {}", name);

        let pages = self.load_pages(path).await?;
        let chunks = self.prepare_chunks(&name, &pages);
        info!("Document split into {} chunks", chunks.len());

        if chunks.is_empty() {
            warn!("No text extracted from {}", name);
            return Ok(IngestOutcome::Ingested { chunks: 0 });
        }

        let batch = self.embed_chunks(&name, chunks).await?;
        let count = batch.len();

        self.store
            .upsert(batch)
            .await
            .map_err(IngestError::Store)?;

        info!("Successfully ingested {} chunks from {}", count, name);
        Ok(IngestOutcome::Ingested { chunks: count })
    }

    /// Turn loaded pages into chunks tagged with their source, page and
    /// character offset. Blank pages produce nothing.
    pub fn prepare_chunks(&self, source: &str, pages: &[Page]) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();

        for page in pages {
            if page.is_blank() {
                debug!("Skipping blank page {} of {}", page.number, source);
                continue;
            }

            let text = sanitize(&page.bytes);
            for (start_index, text) in self.chunker.split_with_offsets(&text) {
                chunks.push(DocumentChunk::new(
                    text,
                    ChunkMetadata::new(source, page.number, start_index),
                ));
            }
        }

        chunks
    }

    async fn load_pages(&self, path: &Path) -> IngestResult<Vec<Page>> {
        let loader = Arc::clone(&self.loader);
        let owned = path.to_path_buf();

        tokio::task::spawn_blocking(move || loader.load(&owned))
            .await
            .map_err(|e| IngestError::ParseError {
                path: path.to_path_buf(),
                message: format!("Loader task failed: {}", e),
            })?
    }

    async fn embed_chunks(
        &self,
        name: &str,
        chunks: Vec<DocumentChunk>,
    ) -> IngestResult<Vec<EmbeddedChunk>> {
        let total = chunks.len();
        let mut batch = Vec::with_capacity(total);

        for (i, chunk) in chunks.into_iter().enumerate() {
            let vector = self
                .embedder
                .embed(&chunk.text)
                .await
                .map_err(IngestError::Provider)?;
            batch.push(EmbeddedChunk { chunk, vector });

            let done = i + 1;
            if done % PROGRESS_EVERY == 0 || done == total {
                let progress = IngestProgress {
                    file: name.to_string(),
                    done,
                    total,
                };
                info!(
                    "Progress: {}/{} chunks processed ({}%)",
                    done,
                    total,
                    progress.percent()
                );
                if let Some(callback) = &self.progress {
                    callback(&progress);
                }
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pdf_with_pages, write_doc, FormFeedLoader};
    use async_trait::async_trait;
    use ragdrop_core::mock::{FaultyEmbedder, HashEmbedder};
    use ragdrop_core::{MemoryVectorStore, ScoredChunk, StoreStats};
    use std::sync::Mutex;

    fn ingestor(store: Arc<MemoryVectorStore>) -> Ingestor {
        Ingestor::new(
            Arc::new(HashEmbedder::default()),
            store,
            ChunkConfig::default(),
        )
        .with_loader(Arc::new(FormFeedLoader))
    }

    fn prose(words: usize, seed: &str) -> String {
        (0..words)
            .map(|i| format!("{}{}", seed, i % 37))
            .collect::<Vec<_>>()
            .join(" ")
    }

    struct RejectingStore;

    #[async_trait]
    impl VectorStore for RejectingStore {
        fn collection(&self) -> &str {
            "documents"
        }

        async fn upsert(&self, _batch: Vec<EmbeddedChunk>) -> ragdrop_core::Result<()> {
            Err(ragdrop_core::Error::Store("disk full".to_string()))
        }

        async fn query_similar(
            &self,
            _vector: &[f32],
            _k: usize,
        ) -> ragdrop_core::Result<Vec<ScoredChunk>> {
            Ok(vec![])
        }

        async fn stats(&self) -> ragdrop_core::Result<StoreStats> {
            Ok(StoreStats::default())
        }
    }

    #[tokio::test]
    async fn test_three_page_document() {
        let dir = tempfile::tempdir().unwrap();
        let pages: Vec<String> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|seed| prose(400, seed))
            .collect();
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        assert!(page_refs.iter().all(|p| p.chars().count() > 2000));
        let path = write_doc(dir.path(), "report.pdf", &page_refs);

        let store = Arc::new(MemoryVectorStore::default());
        let outcome = ingestor(store.clone()).ingest_file(&path).await.unwrap();

        let entries = store.entries().await;
        assert!(entries.len() >= 3);
        assert_eq!(outcome, IngestOutcome::Ingested { chunks: entries.len() });

        for entry in &entries {
            let meta = &entry.chunk.metadata;
            assert_eq!(meta.source, "report.pdf");
            assert!((1..=3).contains(&meta.page));
            assert!(entry.chunk.text.chars().count() <= 1000);
            assert_eq!(entry.vector.len(), 256);
        }
        for page in 1..=3 {
            assert!(entries.iter().any(|e| e.chunk.metadata.page == page));
        }
        assert!(entries
            .iter()
            .filter(|e| e.chunk.metadata.page == 2)
            .all(|e| e.chunk.text.contains("beta")));

        // The file is never touched by the pipeline itself.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_three_page_pdf_through_pdf_loader() {
        let page_of = |seed: &str| {
            let mut text = String::new();
            let mut i = 0;
            while text.len() < 834 {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&format!("{}{}", seed, i % 37));
                i += 1;
            }
            text
        };
        let pages = [page_of("alpha"), page_of("beta"), page_of("gamma")];
        let total: usize = pages.iter().map(|p| p.chars().count()).sum();
        assert!((2500..2550).contains(&total));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handbook.pdf");
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        std::fs::write(&path, pdf_with_pages(&page_refs)).unwrap();

        let store = Arc::new(MemoryVectorStore::default());
        let outcome = Ingestor::new(
            Arc::new(HashEmbedder::default()),
            store.clone(),
            ChunkConfig::default(),
        )
        .ingest_file(&path)
        .await
        .unwrap();

        let entries = store.entries().await;
        assert!(entries.len() >= 3);
        assert_eq!(outcome, IngestOutcome::Ingested { chunks: entries.len() });

        for entry in &entries {
            assert_eq!(entry.chunk.metadata.source, "handbook.pdf");
            assert!(entry.chunk.text.chars().count() <= 1000);
        }
        for (page, seed) in [(1, "alpha"), (2, "beta"), (3, "gamma")] {
            let on_page: Vec<_> = entries
                .iter()
                .filter(|e| e.chunk.metadata.page == page)
                .collect();
            assert!(!on_page.is_empty(), "no chunk from page {}", page);
            assert!(on_page.iter().all(|e| e.chunk.text.contains(seed)));
        }
    }

    #[tokio::test]
    async fn test_non_pdf_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "notes.txt", &["hello"]);

        let store = Arc::new(MemoryVectorStore::default());
        let outcome = ingestor(store.clone()).ingest_file(&path).await.unwrap();

        assert!(matches!(outcome, IngestOutcome::Skipped { .. }));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_pages_produce_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "sparse.pdf", &["first page", "   \n ", "third page"]);

        let store = Arc::new(MemoryVectorStore::default());
        ingestor(store.clone()).ingest_file(&path).await.unwrap();

        let pages: Vec<u32> = store
            .entries()
            .await
            .iter()
            .map(|e| e.chunk.metadata.page)
            .collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_document_without_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "scan.pdf", &["", "  "]);

        let store = Arc::new(MemoryVectorStore::default());
        let outcome = ingestor(store.clone()).ingest_file(&path).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Ingested { chunks: 0 });
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mangled.pdf");
        std::fs::write(&path, b"caf\xc3\xa9 \xff\xfeau lait").unwrap();

        let store = Arc::new(MemoryVectorStore::default());
        ingestor(store.clone()).ingest_file(&path).await.unwrap();

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].chunk.text, "café au lait");
    }

    #[tokio::test]
    async fn test_provider_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "bad.pdf", &["fine text", "BOOM here"]);

        let store = Arc::new(MemoryVectorStore::default());
        let embedder = Arc::new(FaultyEmbedder::new(HashEmbedder::default(), "BOOM"));
        let ingestor = Ingestor::new(embedder.clone(), store.clone(), ChunkConfig::default())
            .with_loader(Arc::new(FormFeedLoader));

        let err = ingestor.ingest_file(&path).await.unwrap_err();

        assert_eq!(err.kind(), "provider");
        assert!(err.is_transient());
        assert_eq!(embedder.failures(), 1);
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "ok.pdf", &["some text"]);

        let ingestor = Ingestor::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(RejectingStore),
            ChunkConfig::default(),
        )
        .with_loader(Arc::new(FormFeedLoader));

        let err = ingestor.ingest_file(&path).await.unwrap_err();
        assert_eq!(err.kind(), "store");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let store = Arc::new(MemoryVectorStore::default());
        let err = ingestor(store)
            .ingest_file(Path::new("/nonexistent/ghost.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_progress_reported_every_ten_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let pages: Vec<String> = (0..25).map(|i| format!("page number {}", i)).collect();
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        let path = write_doc(dir.path(), "many.pdf", &page_refs);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let store = Arc::new(MemoryVectorStore::default());
        let ingestor = ingestor(store).with_progress(move |p| {
            sink.lock().unwrap().push((p.done, p.total, p.percent()));
        });

        ingestor.ingest_file(&path).await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(10, 25, 40), (20, 25, 80), (25, 25, 100)]);
    }

    #[test]
    fn test_accepts_extension_case_insensitively() {
        let ingestor = Ingestor::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryVectorStore::default()),
            ChunkConfig::default(),
        );
        assert!(ingestor.accepts(Path::new("a/Report.PDF")));
        assert!(!ingestor.accepts(Path::new("a/notes.txt")));
        assert!(!ingestor.accepts(Path::new("a/README")));
    }
}
