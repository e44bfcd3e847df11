use std::panic::{self, AssertUnwindSafe};

use super::ExtractionError;

/// Extract the text of every page, concatenated in page order.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let text = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| ExtractionError::PdfError("parser panicked on malformed input".to_string()))?
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    // Page breaks must not leak into chunks.
    let text = text.replace('\x0C', "");

    if text.trim().is_empty() {
        tracing::warn!(
            "PDF has no text layer ({} bytes); scanned/image PDFs are not supported",
            bytes.len()
        );
    }

    Ok(text)
}
