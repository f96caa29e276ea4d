//! Content chunking for RAG retrieval.
//!
//! Splits text recursively on an ordered list of separators, then merges
//! the pieces back into windows of at most `chunk_size` characters with up
//! to `chunk_overlap` characters shared between neighbours.

use std::collections::VecDeque;
use tracing::warn;

/// Configuration for chunking.
///
/// Sizes are measured in characters, not bytes or tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum size of each chunk.
    pub chunk_size: usize,
    /// Maximum number of characters repeated at the start of the next chunk.
    pub chunk_overlap: usize,
    /// Separators tried in order, coarsest first. An empty string splits
    /// between every character.
    pub separators: Vec<String>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }
}

impl ChunkConfig {
    /// Create config from the chunking settings.
    pub fn from_config(config: &ragdrop_config::ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            separators: config.separators.clone(),
        }
    }
}

/// Content chunker for splitting text.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create a new chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Create a chunker with default configuration.
    pub fn default_chunker() -> Self {
        Self::new(ChunkConfig::default())
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split text into trimmed, non-empty chunks.
    ///
    /// Deterministic for a given text and configuration. A chunk only exceeds
    /// `chunk_size` when a single run of text contains none of the
    /// configured separators.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_spans(text)
            .into_iter()
            .map(|(_, chunk)| chunk)
            .collect()
    }

    /// Split text and report each chunk's character offset within `text`.
    pub fn split_with_offsets(&self, text: &str) -> Vec<(usize, String)> {
        let mut byte_pos = 0usize;
        let mut char_pos = 0usize;

        self.split_spans(text)
            .into_iter()
            .map(|(byte_start, chunk)| {
                if byte_start < byte_pos {
                    byte_pos = 0;
                    char_pos = 0;
                }
                char_pos += text[byte_pos..byte_start].chars().count();
                byte_pos = byte_start;
                (char_pos, chunk)
            })
            .collect()
    }

    /// Chunks paired with their byte offset in `text`.
    fn split_spans(&self, text: &str) -> Vec<(usize, String)> {
        let mut pieces = Vec::new();
        self.collect_pieces(text, 0, text.len(), &self.config.separators, &mut pieces);
        self.merge_pieces(text, &pieces)
    }

    /// Cut `text[start..end]` into contiguous pieces below `chunk_size`,
    /// descending to finer separators for pieces that are still too long.
    fn collect_pieces(
        &self,
        text: &str,
        start: usize,
        end: usize,
        separators: &[String],
        out: &mut Vec<Span>,
    ) {
        let slice = &text[start..end];
        let (separator, finer) = pick_separator(slice, separators);

        for (from, to) in split_keeping_separator(slice, separator) {
            let piece = Span::new(text, start + from, start + to);
            if piece.chars < self.config.chunk_size || finer.is_empty() {
                out.push(piece);
            } else {
                self.collect_pieces(text, piece.start, piece.end, finer, out);
            }
        }
    }

    /// Greedily pack adjacent pieces into chunks, carrying the end of each
    /// chunk forward as overlap.
    fn merge_pieces(&self, text: &str, pieces: &[Span]) -> Vec<(usize, String)> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut window: VecDeque<Span> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            if total + piece.chars > size {
                if let (Some(first), Some(last)) = (window.front().copied(), window.back().copied())
                {
                    if total > size {
                        warn!(
                            "Created a chunk of size {}, which is longer than the specified {}",
                            total, size
                        );
                    }
                    chunks.extend(trimmed_chunk(text, first.start, last.end));

                    while total > overlap || (total + piece.chars > size && total > 0) {
                        match window.pop_front() {
                            Some(front) => total -= front.chars,
                            None => break,
                        }
                    }

                    // Whole pieces were too long to carry; carry the last words instead.
                    if window.is_empty() {
                        let budget = overlap.min(size.saturating_sub(piece.chars));
                        if let Some(tail) = overlap_tail(text, first.start, last.end, budget) {
                            total += tail.chars;
                            window.push_back(tail);
                        }
                    }
                }
            }

            window.push_back(piece);
            total += piece.chars;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            chunks.extend(trimmed_chunk(text, first.start, last.end));
        }

        chunks
    }
}

/// Byte range of `text` with its length in characters.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
}

impl Span {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            chars: text[start..end].chars().count(),
        }
    }
}

/// First separator that occurs in `text`, plus the finer separators after it.
///
/// The empty separator always matches. When nothing matches, the last
/// separator is used and no finer ones remain.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return ("", &[]);
        }
        if text.contains(sep.as_str()) {
            return (sep.as_str(), &separators[i + 1..]);
        }
    }

    let last = separators.last().map(String::as_str).unwrap_or("");
    (last, &[])
}

/// Byte ranges of `text` split on `separator`, each separator attached to
/// the start of the range that follows it. The ranges cover `text` exactly.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<(usize, usize)> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| (i, i + c.len_utf8()))
            .collect();
    }

    let mut ranges = Vec::new();
    let mut start = 0usize;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            ranges.push((start, pos));
        }
        start = pos;
    }
    if start < text.len() {
        ranges.push((start, text.len()));
    }

    ranges
}

/// The last `budget` characters of `text[start..end]`, moved forward to a
/// word start when the cut lands inside a word.
fn overlap_tail(text: &str, start: usize, end: usize, budget: usize) -> Option<Span> {
    if budget == 0 {
        return None;
    }

    let region = &text[start..end];
    let mut from = region.len();
    for (i, _) in region.char_indices().rev().take(budget) {
        from = i;
    }

    if from > 0 && !region[..from].ends_with(char::is_whitespace) {
        if let Some(pos) = region[from..].find(char::is_whitespace) {
            from += pos;
        }
    }

    if region[from..].trim().is_empty() {
        return None;
    }
    Some(Span::new(text, start + from, end))
}

/// Trimmed `text[start..end]` and the byte offset where it begins.
fn trimmed_chunk(text: &str, start: usize, end: usize) -> Option<(usize, String)> {
    let raw = &text[start..end];
    let without_lead = raw.trim_start();
    let offset = start + (raw.len() - without_lead.len());
    let trimmed = without_lead.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some((offset, trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> Chunker {
        Chunker::new(ChunkConfig {
            chunk_size,
            chunk_overlap,
            ..ChunkConfig::default()
        })
    }

    fn sample_text(words: usize) -> String {
        let vocab = [
            "river", "stone", "lamp", "orchard", "pilot", "cedar", "harbor", "violet",
        ];
        (0..words)
            .map(|i| vocab[i % vocab.len()])
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = Chunker::default_chunker().split("This is a small piece of text.");
        assert_eq!(chunks, vec!["This is a small piece of text.".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        let chunker = Chunker::default_chunker();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\n  \n").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let text = sample_text(2000);
        let chunks = chunker(1000, 200).split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1000, "chunk of {}", chunk.chars().count());
            assert!(!chunk.is_empty());
            assert_eq!(chunk.trim(), chunk);
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        let text = format!("{}\n\n{}\n{}", sample_text(300), sample_text(50), sample_text(400));
        let chunker = chunker(250, 50);
        assert_eq!(chunker.split(&text), chunker.split(&text));
    }

    #[test]
    fn test_adjacent_chunks_overlap() {
        let text = sample_text(200);
        let chunks = chunker(100, 20).split(&text);
        assert!(chunks.len() > 2);

        for pair in chunks.windows(2) {
            let first_word = pair[1].split_whitespace().next().unwrap();
            let tail: String = {
                let chars: Vec<char> = pair[0].chars().collect();
                chars[chars.len().saturating_sub(20)..].iter().collect()
            };
            assert!(
                tail.contains(first_word),
                "{:?} does not start inside the tail of {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_zero_overlap_reassembles_text() {
        let text = sample_text(120);
        let chunks = chunker(60, 0).split(&text);
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_paragraphs_preferred_over_lines() {
        let text = "First paragraph here.\n\nSecond paragraph with more content.\n\nThird.";
        let chunks = chunker(40, 0).split(text);
        assert_eq!(
            chunks,
            vec![
                "First paragraph here.".to_string(),
                "Second paragraph with more content.".to_string(),
                "Third.".to_string(),
            ]
        );
    }

    #[test]
    fn test_oversized_run_kept_whole_without_fallback_separator() {
        let config = ChunkConfig {
            chunk_size: 10,
            chunk_overlap: 0,
            separators: vec!["\n\n".to_string(), " ".to_string()],
        };
        let token = "x".repeat(25);
        let chunks = Chunker::new(config).split(&format!("tiny {} end", token));

        assert_eq!(chunks, vec!["tiny".to_string(), token, "end".to_string()]);
    }

    #[test]
    fn test_oversized_run_split_by_characters() {
        let token = "y".repeat(25);
        let chunks = chunker(10, 0).split(&token);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), token);
    }

    #[test]
    fn test_utf8_text() {
        let text = "Hello ─── World! This has unicode: 日本語 and more ─ content here.";
        let chunks = chunker(20, 5).split(text);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
    }

    #[test]
    fn test_offsets_point_at_chunk_text() {
        let text = format!("Ünïcödé preface.\n\n{}", sample_text(150));
        let chars: Vec<char> = text.chars().collect();

        let chunks = chunker(80, 15).split_with_offsets(&text);
        assert!(chunks.len() > 2);
        assert_eq!(chunks[0].0, 0);

        let mut last = None;
        for (start, chunk) in &chunks {
            let len = chunk.chars().count();
            let at: String = chars[*start..*start + len].iter().collect();
            assert_eq!(&at, chunk);
            if let Some(prev) = last {
                assert!(*start > prev);
            }
            last = Some(*start);
        }
    }

    #[test]
    fn test_paragraph_boundaries_keep_overlap() {
        let text = (0..6)
            .map(|p| {
                (0..58)
                    .map(|w| format!("p{}w{:02}", p, w))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let chunks = Chunker::default_chunker().split(&text);
        assert!(chunks.len() >= 2);

        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1000);
        }
        for pair in chunks.windows(2) {
            let lead: String = pair[1].chars().take(30).collect();
            assert!(
                pair[0].contains(&lead),
                "{:?} shares nothing with the end of the previous chunk",
                lead
            );
        }
    }

    #[test]
    fn test_offsets_in_repetitive_text() {
        let chunks = chunker(7, 0).split_with_offsets("abc abc abc abc");
        assert_eq!(
            chunks,
            vec![
                (0, "abc abc".to_string()),
                (8, "abc".to_string()),
                (12, "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_offsets_with_overlap() {
        let chunks = chunker(7, 3).split_with_offsets("abc abc abc abc");
        assert_eq!(
            chunks,
            vec![
                (0, "abc abc".to_string()),
                (4, "abc abc".to_string()),
                (8, "abc abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_offsets_count_characters() {
        let chunks = chunker(5, 0).split_with_offsets("ää bb\n\ncc");
        assert_eq!(chunks, vec![(0, "ää bb".to_string()), (7, "cc".to_string())]);
    }

    #[test]
    fn test_from_config() {
        let config = ragdrop_config::ChunkingConfig::default();
        let chunk_config = ChunkConfig::from_config(&config);
        assert_eq!(chunk_config, ChunkConfig::default());
    }
}
