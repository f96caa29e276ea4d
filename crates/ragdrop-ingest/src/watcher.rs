//! Polling folder watcher for automatic ingestion.
//!
//! Every interval the watched directory is listed, unprocessed documents are
//! ingested one at a time, and each success is marked by renaming the file
//! with the processed prefix. The rename is the only record of what has
//! been ingested.

use crate::error::{IngestError, IngestResult};
use crate::ingestor::{IngestOutcome, Ingestor};
use chrono::Local;
use glob::Pattern;
use ragdrop_core::{SourceFile, StopSignal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where the watch loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Scanning,
    ProcessingBatch,
}

/// Configuration for the folder watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directory to watch. Not searched recursively.
    pub directory: PathBuf,
    /// Time between scans.
    pub interval: Duration,
    /// File-name prefix that marks a file as ingested.
    pub processed_prefix: String,
    /// Lower-case extensions eligible for ingestion.
    pub extensions: Vec<String>,
    /// Patterns to ignore.
    pub ignore_patterns: Vec<Pattern>,
}

impl WatcherConfig {
    /// Watch `directory` with the default interval, prefix and extensions.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::from_config(&ragdrop_config::Config::default()).with_directory(directory)
    }

    /// Create from config.
    pub fn from_config(config: &ragdrop_config::Config) -> Self {
        let ignore_patterns = config
            .watch
            .ignore_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            directory: config.watch_directory(),
            interval: Duration::from_secs(config.watch.poll_interval_seconds.max(1)),
            processed_prefix: config.watch.processed_prefix.clone(),
            extensions: config
                .watch
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            ignore_patterns,
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Check if a file name should be ignored.
    pub fn should_ignore(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignore_patterns.iter().any(|p| p.matches(name))
    }

    /// Whether a file is an unprocessed document of an eligible type.
    pub fn is_eligible(&self, file: &SourceFile) -> bool {
        !file.is_processed()
            && !self.should_ignore(&file.name)
            && file
                .extension()
                .map(|ext| self.extensions.iter().any(|e| *e == ext))
                .unwrap_or(false)
    }

    /// List eligible files in the directory, sorted by name.
    pub fn eligible_files(&self) -> IngestResult<Vec<SourceFile>> {
        Ok(self
            .list_files()?
            .into_iter()
            .filter(|f| self.is_eligible(f))
            .collect())
    }

    /// Every regular file in the directory, processed or not, sorted by name.
    pub fn list_files(&self) -> IngestResult<Vec<SourceFile>> {
        let dir = &self.directory;
        if !dir.is_dir() {
            return Err(IngestError::FileNotFound(dir.clone()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            match SourceFile::from_path(&path, &self.processed_prefix) {
                Some(file) => files.push(file),
                None => debug!("Skipping file with non UTF-8 name: {:?}", path),
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

/// Result of handling one file in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Processed { chunks: usize, renamed_to: PathBuf },
    Skipped { reason: String },
    Failed { kind: &'static str, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: String,
    pub status: FileStatus,
}

/// Summary of one scan-and-process cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Files found eligible at scan time.
    pub eligible: usize,
    pub outcomes: Vec<FileOutcome>,
    /// True when a stop request cut the batch short.
    pub interrupted: bool,
}

impl CycleReport {
    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Processed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    pub fn chunks(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                FileStatus::Processed { chunks, .. } => chunks,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Polling watcher that feeds new documents to an [`Ingestor`].
pub struct FolderWatcher {
    config: WatcherConfig,
    ingestor: Ingestor,
    state: WatchState,
}

impl FolderWatcher {
    /// Create a new folder watcher.
    pub fn new(config: WatcherConfig, ingestor: Ingestor) -> Self {
        for ext in &config.extensions {
            if !ingestor.supports_extension(ext) {
                warn!("No loader for '.{}' files; they will not be watched", ext);
            }
        }

        Self {
            config,
            ingestor,
            state: WatchState::Idle,
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// List eligible files the ingestor can load, sorted by name.
    pub fn scan(&self) -> IngestResult<Vec<SourceFile>> {
        Ok(self
            .config
            .eligible_files()?
            .into_iter()
            .filter(|f| self.ingestor.accepts(&f.path))
            .collect())
    }

    /// Scan once and ingest everything eligible, in name order.
    ///
    /// A failed file is logged and left unprocessed; the rest of the batch
    /// carries on. Stop requests are honoured between files.
    pub async fn run_cycle(&mut self, stop: &StopSignal) -> IngestResult<CycleReport> {
        self.set_state(WatchState::Scanning);
        let files = match self.scan() {
            Ok(files) => files,
            Err(e) => {
                self.set_state(WatchState::Idle);
                return Err(e);
            }
        };

        let mut report = CycleReport {
            eligible: files.len(),
            ..CycleReport::default()
        };

        if files.is_empty() {
            info!(
                "[{}] No new documents found in {}. Next check in {} seconds",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                self.config.directory.display(),
                self.config.interval.as_secs()
            );
            self.set_state(WatchState::Idle);
            return Ok(report);
        }

        info!("Found {} new document(s) to process", files.len());
        self.set_state(WatchState::ProcessingBatch);

        for (i, file) in files.iter().enumerate() {
            if stop.is_stopped() {
                info!(
                    "Stop requested; {} file(s) left for the next run",
                    files.len() - i
                );
                report.interrupted = true;
                break;
            }

            let status = self.process_file(file).await;
            report.outcomes.push(FileOutcome {
                file: file.name.clone(),
                status,
            });
        }

        info!(
            "Batch complete: {} processed, {} failed",
            report.processed(),
            report.failed()
        );
        self.set_state(WatchState::Idle);
        Ok(report)
    }

    /// Run cycles until the stop signal fires.
    pub async fn run(&mut self, stop: StopSignal) {
        info!(
            "Watching {} every {} seconds",
            self.config.directory.display(),
            self.config.interval.as_secs()
        );

        loop {
            if stop.is_stopped() {
                break;
            }

            if let Err(e) = self.run_cycle(&stop).await {
                error!("Scan of {} failed: {}", self.config.directory.display(), e);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = stop.stopped() => break,
            }
        }

        self.set_state(WatchState::Idle);
        info!("Watcher stopped");
    }

    fn set_state(&mut self, state: WatchState) {
        if self.state != state {
            debug!("Watch state: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    async fn process_file(&self, file: &SourceFile) -> FileStatus {
        match self.ingestor.ingest_file(&file.path).await {
            Ok(IngestOutcome::Ingested { chunks }) => {
                match mark_processed(file, &self.config.processed_prefix) {
                    Ok(renamed_to) => FileStatus::Processed { chunks, renamed_to },
                    Err(e) => {
                        error!("{}", e);
                        FileStatus::Failed {
                            kind: e.kind(),
                            error: e.to_string(),
                        }
                    }
                }
            }
            Ok(IngestOutcome::Skipped { reason }) => FileStatus::Skipped { reason },
            Err(e) => {
                if e.is_transient() {
                    warn!("Failed to ingest {}, will retry next cycle: {}", file.name, e);
                } else {
                    error!("Failed to ingest {}: {}", file.name, e);
                }
                FileStatus::Failed {
                    kind: e.kind(),
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Rename a file so its name carries the processed prefix.
///
/// If the target name is taken the prefix is repeated until a free name is
/// found, so an existing file is never overwritten.
pub fn mark_processed(file: &SourceFile, prefix: &str) -> IngestResult<PathBuf> {
    let dir = file.path.parent().unwrap_or_else(|| Path::new("."));
    let mut marker = prefix.to_string();
    let mut target = dir.join(format!("{}{}", marker, file.name));

    while target.exists() {
        marker.push_str(prefix);
        target = dir.join(format!("{}{}", marker, file.name));
    }

    std::fs::rename(&file.path, &target).map_err(|source| IngestError::Mark {
        path: file.path.clone(),
        source,
    })?;

    info!("Marked {} as processed", file.name);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkConfig;
    use crate::testing::{write_doc, FormFeedLoader};
    use ragdrop_core::mock::{FaultyEmbedder, HashEmbedder};
    use ragdrop_core::{stop_channel, EmbeddingProvider, MemoryVectorStore};
    use std::sync::Arc;

    fn watcher(
        dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<MemoryVectorStore>,
    ) -> FolderWatcher {
        let ingestor = Ingestor::new(embedder, store, ChunkConfig::default())
            .with_loader(Arc::new(FormFeedLoader));
        FolderWatcher::new(
            WatcherConfig::new(dir).with_interval(Duration::from_millis(50)),
            ingestor,
        )
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_eligibility() {
        let config = WatcherConfig::new("/data");
        let check = |name: &str| {
            let file = SourceFile::from_path(&Path::new("/data").join(name), "_").unwrap();
            config.is_eligible(&file)
        };

        assert!(check("report.pdf"));
        assert!(check("Report.PDF"));
        assert!(!check("_report.pdf"));
        assert!(!check("__report.pdf"));
        assert!(!check("notes.txt"));
        assert!(!check("README"));
        assert!(!check("download.pdf.part"));
        assert!(!check(".hidden.pdf"));
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "_c.pdf", "notes.txt"] {
            write_doc(dir.path(), name, &["text"]);
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let w = watcher(
            dir.path(),
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryVectorStore::default()),
        );
        let found: Vec<String> = w.scan().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(found, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_extensions_without_loader_are_not_selected() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "a.pdf", &["apples grow on trees"]);
        write_doc(dir.path(), "notes.txt", &["plain notes"]);

        let mut config = WatcherConfig::new(dir.path());
        config.extensions.push("txt".to_string());
        let notes = SourceFile::from_path(&dir.path().join("notes.txt"), "_").unwrap();
        assert!(config.is_eligible(&notes));

        let ingestor = Ingestor::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryVectorStore::default()),
            ChunkConfig::default(),
        )
        .with_loader(Arc::new(FormFeedLoader));
        let mut w = FolderWatcher::new(config, ingestor);

        let report = w.run_cycle(&StopSignal::never()).await.unwrap();
        assert_eq!(report.eligible, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].file, "a.pdf");

        // Not picked up again on later cycles either.
        let again = w.run_cycle(&StopSignal::never()).await.unwrap();
        assert_eq!(again.eligible, 0);
        assert_eq!(names(dir.path()), vec!["_a.pdf", "notes.txt"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let w = watcher(
            Path::new("/nonexistent/ragdrop-watch"),
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryVectorStore::default()),
        );
        assert!(matches!(w.scan(), Err(IngestError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_only_pdfs_are_ingested_and_marked() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "a.pdf", &["apples grow on trees"]);
        write_doc(dir.path(), "notes.txt", &["not a document"]);

        let store = Arc::new(MemoryVectorStore::default());
        let mut w = watcher(dir.path(), Arc::new(HashEmbedder::default()), store.clone());

        let report = w.run_cycle(&StopSignal::never()).await.unwrap();
        assert_eq!(report.eligible, 1);
        assert_eq!(report.processed(), 1);
        assert_eq!(names(dir.path()), vec!["_a.pdf", "notes.txt"]);
        assert_eq!(w.state(), WatchState::Idle);

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].chunk.metadata.source, "a.pdf");

        // Nothing left to do on the next cycle.
        let again = w.run_cycle(&StopSignal::never()).await.unwrap();
        assert_eq!(again.eligible, 0);
        assert_eq!(store.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "1.pdf", &["first document"]);
        write_doc(dir.path(), "2.pdf", &["second document BOOM"]);
        write_doc(dir.path(), "3.pdf", &["third document"]);

        let store = Arc::new(MemoryVectorStore::default());
        let embedder = Arc::new(FaultyEmbedder::new(HashEmbedder::default(), "BOOM"));
        let mut w = watcher(dir.path(), embedder, store.clone());

        let report = w.run_cycle(&StopSignal::never()).await.unwrap();

        assert_eq!(report.processed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[1].status,
            FileStatus::Failed { kind: "provider", .. }
        ));
        assert_eq!(names(dir.path()), vec!["2.pdf", "_1.pdf", "_3.pdf"]);

        let sources: Vec<String> = store
            .entries()
            .await
            .iter()
            .map(|e| e.chunk.metadata.source.clone())
            .collect();
        assert_eq!(sources, vec!["1.pdf", "3.pdf"]);

        // The failed file is retried on the next cycle.
        let retry = w.run_cycle(&StopSignal::never()).await.unwrap();
        assert_eq!(retry.eligible, 1);
        assert_eq!(retry.failed(), 1);
    }

    #[test]
    fn test_mark_processed_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "_a.pdf", &["older"]);
        let path = write_doc(dir.path(), "a.pdf", &["newer"]);

        let file = SourceFile::from_path(&path, "_").unwrap();
        let target = mark_processed(&file, "_").unwrap();

        assert_eq!(target, dir.path().join("__a.pdf"));
        assert_eq!(names(dir.path()), vec!["__a.pdf", "_a.pdf"]);
        assert_eq!(std::fs::read_to_string(dir.path().join("_a.pdf")).unwrap(), "older");
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "newer");
    }

    #[test]
    fn test_mark_processed_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = SourceFile::from_path(&dir.path().join("gone.pdf"), "_").unwrap();
        let err = mark_processed(&file, "_").unwrap_err();
        assert_eq!(err.kind(), "mark");
    }

    #[tokio::test]
    async fn test_stop_between_files() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "a.pdf", &["alpha"]);

        let (handle, signal) = stop_channel();
        handle.stop();

        let store = Arc::new(MemoryVectorStore::default());
        let mut w = watcher(dir.path(), Arc::new(HashEmbedder::default()), store.clone());
        let report = w.run_cycle(&signal).await.unwrap();

        assert!(report.interrupted);
        assert!(report.outcomes.is_empty());
        assert_eq!(names(dir.path()), vec!["a.pdf"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_signal() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "a.pdf", &["alpha"]);

        let (handle, signal) = stop_channel();
        let store = Arc::new(MemoryVectorStore::default());
        let mut w = watcher(dir.path(), Arc::new(HashEmbedder::default()), store.clone());

        let run = tokio::spawn(async move {
            w.run(signal).await;
            w.state()
        });

        // Let the first cycle pick the file up.
        for _ in 0..100 {
            if dir.path().join("_a.pdf").exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.stop();

        let state = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, WatchState::Idle);
        assert!(dir.path().join("_a.pdf").exists());
        assert_eq!(store.entries().await.len(), 1);
    }
}
