// src/pdf_extract.rs

use lopdf::Document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

/// Which library turns PDF bytes into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfBackend {
    /// Page-by-page extraction with `lopdf`.
    #[default]
    Lopdf,
    /// Whole-document extraction with `pdf-extract`; yields a single "page".
    PdfExtract,
}

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("failed to extract text from page {page}: {message}")]
    Page { page: u32, message: String },
}

/// Text pulled out of one uploaded PDF.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    /// Hex SHA-256 of the uploaded bytes.
    pub document_id: String,
    /// Per-page text in page order.
    pub pages: Vec<String>,
    /// Always `pages.concat()`.
    pub text: String,
}

impl ExtractedDocument {
    fn from_pages(document_id: String, pages: Vec<String>) -> Self {
        let text = pages.concat();
        Self {
            document_id,
            pages,
            text,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True for scanned / image-only documents.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Fingerprint of an upload, used to correlate log lines.
pub fn document_id(pdf_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pdf_bytes);
    format!("{:x}", hasher.finalize())
}

/// Main entry point: takes raw PDF bytes and returns the concatenated page text.
///
/// Pages without a text layer contribute an empty string; that is not an error.
pub fn extract_text_from_pdf(
    pdf_bytes: &[u8],
    backend: PdfBackend,
) -> Result<ExtractedDocument, PdfError> {
    if pdf_bytes.is_empty() {
        return Err(PdfError::Empty);
    }

    let id = document_id(pdf_bytes);
    let span = tracing::info_span!("pdf", id = %&id[..12], backend = ?backend);
    let _guard = span.enter();

    let pages = match backend {
        PdfBackend::Lopdf => extract_pages_lopdf(pdf_bytes)?,
        PdfBackend::PdfExtract => vec![extract_whole_pdf_extract(pdf_bytes)?],
    };

    let doc = ExtractedDocument::from_pages(id, pages);
    if doc.is_blank() {
        info!(pages = doc.page_count(), "No text layer found, likely scanned");
    } else {
        info!(
            pages = doc.page_count(),
            chars = doc.text.chars().count(),
            "Text extracted successfully"
        );
    }
    Ok(doc)
}

fn extract_pages_lopdf(pdf_bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

    // BTreeMap, so iteration is already in page order.
    let pages = doc.get_pages();
    let mut out = Vec::with_capacity(pages.len());
    for page in pages.keys() {
        let text = doc.extract_text(&[*page]).map_err(|e| {
            warn!(page, error = %e, "Page text extraction failed");
            PdfError::Page {
                page: *page,
                message: e.to_string(),
            }
        })?;
        out.push(text);
    }
    Ok(out)
}

fn extract_whole_pdf_extract(pdf_bytes: &[u8]) -> Result<String, PdfError> {
    ::pdf_extract::extract_text_from_mem(pdf_bytes).map_err(|e| {
        warn!(error = %e, "pdf-extract failed");
        PdfError::Parse(e.to_string())
    })
}
