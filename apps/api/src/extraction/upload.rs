//! Multipart intake: streams the uploaded file to a temporary file on local disk.

use std::io::ErrorKind;
use std::path::Path;

use axum::extract::Multipart;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::FileKind;
use crate::errors::AppError;

const FILE_FIELDS: &[&str] = &["file", "pdf", "image"];
const INSTRUCTION_FIELDS: &[&str] = &["instructions", "message"];

/// An uploaded file held on local disk until `cleanup` runs (or it is dropped).
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
    pub file_name: String,
    pub kind: FileKind,
    pub size: usize,
}

impl TempUpload {
    pub fn new(file: NamedTempFile, file_name: String, kind: FileKind, size: usize) -> Self {
        Self {
            file,
            file_name,
            kind,
            size,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the temporary file. A file that is already gone is not an error.
    pub fn cleanup(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed temporary upload {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Temporary upload {} already removed", path.display())
            }
            Err(e) => warn!("Failed to remove temporary upload {}: {e}", path.display()),
        }
    }
}

/// Everything a processing request carries.
#[derive(Debug)]
pub struct UploadForm {
    pub file: TempUpload,
    pub instructions: String,
    pub chat_id: Option<Uuid>,
}

fn rejection(expected: FileKind) -> AppError {
    match expected {
        FileKind::Pdf => AppError::Validation("Only PDF files are allowed".to_string()),
        FileKind::Image => AppError::Validation(
            "Only image files (JPEG, PNG, GIF) are allowed".to_string(),
        ),
    }
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid upload: {e}"))
}

/// Reads the multipart body, accepting only files of kind `expected`.
/// The file is validated before a single byte is written to disk.
pub async fn receive(
    mut multipart: Multipart,
    upload_dir: &Path,
    max_bytes: usize,
    expected: FileKind,
) -> Result<UploadForm, AppError> {
    let mut file = None;
    let mut instructions = String::new();
    let mut chat_id = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if FILE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let kind = FileKind::detect(field.content_type(), &file_name)
                .filter(|k| *k == expected)
                .ok_or_else(|| rejection(expected))?;

            tokio::fs::create_dir_all(upload_dir)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
            let temp = NamedTempFile::new_in(upload_dir).map_err(|e| AppError::Internal(e.into()))?;
            let mut out = tokio::fs::File::from_std(
                temp.reopen().map_err(|e| AppError::Internal(e.into()))?,
            );

            let mut size = 0usize;
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                size += chunk.len();
                if size > max_bytes {
                    return Err(AppError::Validation(format!(
                        "File exceeds the {max_bytes} byte limit"
                    )));
                }
                out.write_all(&chunk)
                    .await
                    .map_err(|e| AppError::Internal(e.into()))?;
            }
            out.flush().await.map_err(|e| AppError::Internal(e.into()))?;

            debug!("Received {} upload '{}' ({} bytes)", kind.label(), file_name, size);
            file = Some(TempUpload::new(temp, file_name, kind, size));
        } else if INSTRUCTION_FIELDS.contains(&name.as_str()) {
            instructions = field.text().await.map_err(multipart_error)?;
        } else if name == "chatId" {
            let value = field.text().await.map_err(multipart_error)?;
            let value = value.trim();
            if !value.is_empty() {
                chat_id = Some(
                    Uuid::parse_str(value)
                        .map_err(|_| AppError::Validation("chatId must be a UUID".to_string()))?,
                );
            }
        }
    }

    let file = file.ok_or_else(|| {
        AppError::Validation(format!("No {} file uploaded", expected.label()))
    })?;

    Ok(UploadForm {
        file,
        instructions,
        chat_id,
    })
}
