use std::sync::Arc;

use crate::analysis::store::AnalysisStore;
use crate::chat::store::SessionStore;
use crate::config::Config;
use crate::extraction::ExtractionProvider;
use crate::llm_client::CompletionProvider;
use crate::logs::FileLog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub analyses: Arc<dyn AnalysisStore>,
    /// Pluggable completion backend. Default: `LlmClient` against Groq.
    pub completion: Arc<dyn CompletionProvider>,
    /// Pluggable PDF/OCR backend. Default: `PdfCoClient`.
    pub extractor: Arc<dyn ExtractionProvider>,
    /// Per-exchange chat records and analysed conversation dumps.
    pub chat_log: FileLog,
    /// Raw analysis provider output.
    pub analysis_log: FileLog,
    pub config: Config,
}
