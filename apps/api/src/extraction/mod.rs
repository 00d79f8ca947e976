// File Extraction: upload → remote PDF/OCR conversion → text download → merge with instructions.
// All conversion calls go through an `ExtractionProvider`; `PdfCoClient` is the default backend.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod handlers;
pub mod pdf_co;
pub mod pipeline;
pub mod upload;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction provider API key is not configured")]
    MissingApiKey,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepted upload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Image,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];
const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

impl FileKind {
    /// Classifies an upload from its declared MIME type and file extension.
    /// Both must agree; anything else is rejected.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<FileKind> {
        let mime = content_type?.trim().to_ascii_lowercase();
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;

        if extension == "pdf" && mime == "application/pdf" {
            return Some(FileKind::Pdf);
        }
        if IMAGE_EXTENSIONS.contains(&extension.as_str())
            && IMAGE_MIME_TYPES.contains(&mime.as_str())
        {
            return Some(FileKind::Image);
        }
        None
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF",
            FileKind::Image => "image",
        }
    }
}

/// A remote PDF/OCR conversion service.
///
/// Carried in `AppState` as `Arc<dyn ExtractionProvider>`.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Uploads a local file and returns the provider's reference URL for it.
    async fn upload(&self, path: &Path, file_name: &str) -> Result<String, ExtractionError>;

    /// Starts PDF-to-text or OCR on an uploaded file; returns the result URL.
    async fn convert(&self, source_url: &str, kind: FileKind) -> Result<String, ExtractionError>;

    /// Downloads extracted text from a result URL.
    async fn fetch_text(&self, result_url: &str) -> Result<String, ExtractionError>;
}
