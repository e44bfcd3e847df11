pub mod chunker;
mod pdf;
mod txt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("Text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Declared content type of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Pdf,
    PlainText,
}

impl ContentKind {
    /// Map a MIME type to a supported kind. Parameters such as `charset` are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }
}

/// Extract the full text of a document.
///
/// PDF pages are concatenated without separators; plain text must be UTF-8.
/// PDF parsing is CPU-bound, so async callers should run this on the
/// blocking pool.
pub fn extract_text(bytes: &[u8], kind: ContentKind) -> Result<String, ExtractionError> {
    match kind {
        ContentKind::Pdf => pdf::extract_pdf(bytes),
        ContentKind::PlainText => txt::extract_txt(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_mapping() {
        assert_eq!(ContentKind::from_mime("application/pdf"), Some(ContentKind::Pdf));
        assert_eq!(ContentKind::from_mime("text/plain"), Some(ContentKind::PlainText));
        assert_eq!(
            ContentKind::from_mime("text/plain; charset=utf-8"),
            Some(ContentKind::PlainText)
        );
        assert_eq!(ContentKind::from_mime("Application/PDF"), Some(ContentKind::Pdf));
        assert_eq!(ContentKind::from_mime("image/png"), None);
        assert_eq!(ContentKind::from_mime("text/markdown"), None);
        assert_eq!(ContentKind::from_mime(""), None);
    }

    #[test]
    fn plain_text_passthrough() {
        let text = extract_text(b"The sky is blue.", ContentKind::PlainText).unwrap();
        assert_eq!(text, "The sky is blue.");
    }

    #[test]
    fn pdf_pages_concatenate_without_separators() {
        let bytes = include_bytes!("../../tests/fixtures/two_pages.pdf");
        let text = extract_text(bytes, ContentKind::Pdf).unwrap();
        assert!(!text.contains('\x0C'));
        assert_eq!(text.trim(), "Alpha pageBeta page");
    }

    #[test]
    fn malformed_pdf_is_an_error() {
        let err = extract_text(b"definitely not a pdf", ContentKind::Pdf).unwrap_err();
        assert!(matches!(err, ExtractionError::PdfError(_)));
    }
}
