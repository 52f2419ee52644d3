//! PDF page-text extraction.
//!
//! The retrieval engine only ever sees already-extracted text; this
//! module is the boundary to the binary format. Extraction is per page so
//! page-mode retrieval can attribute hits ("page 7"). A page that yields
//! no text stays in the output as an empty string — page numbers must
//! keep meaning even when extraction partially fails.

use thiserror::Error;

/// Extraction failure. Never panics the pipeline; the store logs it and
/// treats the document as having no extractable text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Extract plain text from a PDF, one string per physical page, in page
/// order.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}
