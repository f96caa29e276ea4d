//! Fixtures shared by the unit tests.

use crate::error::IngestResult;
use crate::parsers::{DocumentLoader, Page};
use std::path::{Path, PathBuf};

/// Loader that treats a file as form-feed separated pages of raw bytes.
pub struct FormFeedLoader;

impl DocumentLoader for FormFeedLoader {
    fn load(&self, path: &Path) -> IngestResult<Vec<Page>> {
        let bytes = std::fs::read(path)?;
        Ok(bytes
            .split(|b| *b == 0x0c)
            .enumerate()
            .map(|(i, page)| Page::new(i as u32 + 1, page.to_vec()))
            .collect())
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// Write a document readable by [`FormFeedLoader`].
pub fn write_doc(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pages.join("\x0c")).unwrap();
    path
}

/// Build a minimal PDF with one line of Helvetica text per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let font_id = 3 + 2 * pages.len();
    let mut offsets = Vec::new();
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    offsets.push(out.len());
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");

    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "2 0 obj << /Type /Pages /Kids [{}] /Count {} >> endobj\n",
            kids.join(" "),
            pages.len()
        )
        .as_bytes(),
    );

    for (i, text) in pages.iter().enumerate() {
        let page_id = 3 + 2 * i;
        let content_id = page_id + 1;

        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "{} 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R /Resources << /Font << /F1 {} 0 R >> >> >> endobj\n",
                page_id, content_id, font_id
            )
            .as_bytes(),
        );

        let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", text);
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "{} 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
                content_id,
                stream.len(),
                stream
            )
            .as_bytes(),
        );
    }

    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "{} 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
            font_id
        )
        .as_bytes(),
    );

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}
