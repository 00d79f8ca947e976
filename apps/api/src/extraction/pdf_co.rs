//! PDF.co backend for `ExtractionProvider`.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ExtractionError, ExtractionProvider, FileKind};

const PDF_TO_TEXT_PATH: &str = "/pdf/convert/to/text";
const OCR_PATH: &str = "/ocr/recognize";
const OCR_LANGUAGE: &str = "eng";

/// Response body shared by PDF.co's upload and conversion endpoints.
#[derive(Debug, Deserialize)]
struct PdfCoResponse {
    url: Option<String>,
    #[serde(default)]
    error: bool,
    message: Option<String>,
}

impl PdfCoResponse {
    /// The result URL, or the provider's message explaining why there is none.
    fn into_url(self) -> Result<String, String> {
        match self.url.filter(|u| !u.is_empty()) {
            Some(url) if !self.error => Ok(url),
            _ => Err(self
                .message
                .unwrap_or_else(|| "no result URL returned".to_string())),
        }
    }
}

#[derive(Clone)]
pub struct PdfCoClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PdfCoClient {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_key(&self) -> Result<&str, ExtractionError> {
        self.api_key.as_deref().ok_or(ExtractionError::MissingApiKey)
    }
}

fn conversion_request(kind: FileKind, source_url: &str) -> (&'static str, serde_json::Value) {
    match kind {
        FileKind::Pdf => (PDF_TO_TEXT_PATH, json!({ "url": source_url, "async": false })),
        FileKind::Image => (
            OCR_PATH,
            json!({ "url": source_url, "language": OCR_LANGUAGE, "output": "text" }),
        ),
    }
}

#[async_trait]
impl ExtractionProvider for PdfCoClient {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<String, ExtractionError> {
        let api_key = self.api_key()?;
        let bytes = tokio::fs::read(path).await?;
        debug!("Uploading {} ({} bytes) to PDF.co", file_name, bytes.len());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let response = self
            .client
            .post(format!("{}/file/upload", self.base_url))
            .header("x-api-key", api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Upload(format!("status {status}: {body}")));
        }

        response
            .json::<PdfCoResponse>()
            .await?
            .into_url()
            .map_err(ExtractionError::Upload)
    }

    async fn convert(&self, source_url: &str, kind: FileKind) -> Result<String, ExtractionError> {
        let api_key = self.api_key()?;
        let (path, body) = conversion_request(kind, source_url);
        debug!("Requesting {} conversion via {}", kind.label(), path);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Extraction(format!(
                "status {status}: {body}"
            )));
        }

        response
            .json::<PdfCoResponse>()
            .await?
            .into_url()
            .map_err(ExtractionError::Extraction)
    }

    async fn fetch_text(&self, result_url: &str) -> Result<String, ExtractionError> {
        let response = self.client.get(result_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Extraction(format!(
                "result download returned status {status}"
            )));
        }
        Ok(response.text().await?)
    }
}
