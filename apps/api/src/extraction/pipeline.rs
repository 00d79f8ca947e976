//! Extraction pipeline.
//!
//! Steps: upload the temp file → convert (PDF-to-text or OCR) → download text →
//!        merge with the user's instructions.
//!
//! The local temp file is removed once the provider round trip finishes,
//! whatever the outcome.

use tracing::info;

use super::upload::TempUpload;
use super::{ExtractionError, ExtractionProvider, FileKind};
use crate::errors::AppError;

/// Separator between extracted text and the user's instructions.
pub const INSTRUCTIONS_SEPARATOR: &str = "\n\nUser Instructions: ";

/// Characters of extracted text echoed back when no chat is attached.
pub const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct Extracted {
    pub kind: FileKind,
    pub text: String,
    /// `text` merged with the user's instructions, ready to send as a chat message.
    pub combined: String,
}

pub fn merge_with_instructions(extracted: &str, instructions: &str) -> String {
    format!("{extracted}{INSTRUCTIONS_SEPARATOR}{instructions}")
}

/// The canned reply returned when extraction is not chained into a chat.
pub fn preview_message(kind: FileKind, text: &str) -> String {
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    format!(
        "I've processed your {}. Here's what I found: {preview}...",
        kind.label()
    )
}

async fn extract_text(
    provider: &dyn ExtractionProvider,
    upload: &TempUpload,
) -> Result<String, ExtractionError> {
    let source_url = provider.upload(upload.path(), &upload.file_name).await?;
    let result_url = provider.convert(&source_url, upload.kind).await?;
    provider.fetch_text(&result_url).await
}

pub async fn run(
    provider: &dyn ExtractionProvider,
    upload: TempUpload,
    instructions: &str,
) -> Result<Extracted, AppError> {
    let kind = upload.kind;
    let size = upload.size;
    let outcome = extract_text(provider, &upload).await;
    upload.cleanup();

    let text = outcome?;
    info!(
        "Extracted {} characters from {} upload ({} bytes)",
        text.len(),
        kind.label(),
        size
    );

    Ok(Extracted {
        kind,
        combined: merge_with_instructions(&text, instructions),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{temp_upload, StubExtractor};

    #[test]
    fn test_merge_uses_fixed_separator() {
        assert_eq!(
            merge_with_instructions("Jane Doe\nRust, Go", "Review my resume"),
            "Jane Doe\nRust, Go\n\nUser Instructions: Review my resume"
        );
    }

    #[test]
    fn test_merge_with_empty_instructions() {
        assert_eq!(
            merge_with_instructions("text", ""),
            "text\n\nUser Instructions: "
        );
    }

    #[test]
    fn test_preview_truncates_to_200_chars() {
        let text = "é".repeat(500);
        let message = preview_message(FileKind::Pdf, &text);
        assert!(message.starts_with("I've processed your PDF. Here's what I found: "));
        assert_eq!(message.matches('é').count(), PREVIEW_CHARS);
        assert!(message.ends_with("..."));
    }

    #[tokio::test]
    async fn test_run_merges_and_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = temp_upload(dir.path(), FileKind::Pdf, b"%PDF-1.4");
        assert_eq!(upload.size, 8);
        let path = upload.path().to_path_buf();
        let extractor = StubExtractor::returning("Experience: 5 years Rust");

        let extracted = run(&extractor, upload, "Suggest roles").await.unwrap();

        assert_eq!(extracted.text, "Experience: 5 years Rust");
        assert_eq!(
            extracted.combined,
            "Experience: 5 years Rust\n\nUser Instructions: Suggest roles"
        );
        assert!(!path.exists());
        assert_eq!(extractor.calls(), vec!["upload", "convert:pdf", "fetch"]);
    }

    #[tokio::test]
    async fn test_upload_failure_still_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = temp_upload(dir.path(), FileKind::Image, b"\x89PNG");
        let path = upload.path().to_path_buf();
        let extractor = StubExtractor::failing_upload();

        let err = run(&extractor, upload, "").await.unwrap_err();

        assert!(matches!(err, AppError::Upload(_)));
        assert!(!path.exists());
        assert_eq!(extractor.calls(), vec!["upload"]);
    }

    #[tokio::test]
    async fn test_conversion_failure_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let upload = temp_upload(dir.path(), FileKind::Image, b"\x89PNG");
        let path = upload.path().to_path_buf();
        let extractor = StubExtractor::failing_conversion();

        let err = run(&extractor, upload, "").await.unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        assert!(!path.exists());
        assert_eq!(extractor.calls(), vec!["upload", "convert:image"]);
    }
}
