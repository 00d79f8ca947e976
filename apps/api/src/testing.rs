//! In-memory doubles for the store and provider seams, plus a ready-made `AppState`.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::{NamedTempFile, TempDir};
use uuid::Uuid;

use crate::analysis::store::AnalysisStore;
use crate::chat::store::SessionStore;
use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::upload::TempUpload;
use crate::extraction::{ExtractionError, ExtractionProvider, FileKind};
use crate::llm_client::{ChatTurn, CompletionParams, CompletionProvider, LlmError};
use crate::logs::FileLog;
use crate::models::analysis::AnalysisResult;
use crate::models::session::{Message, Role, Session, DEFAULT_TITLE};
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

pub const VALID_ANALYSIS: &str = r#"{
  "analysis": {
    "skills": {
      "Backend Development": 8,
      "Systems Design": 6,
      "Communication": 7,
      "Databases": 7,
      "Leadership": 4
    },
    "career1": { "title": "Backend Engineer", "description": "Builds and runs APIs and services." },
    "career2": { "title": "Platform Engineer", "description": "Owns the internal developer platform." },
    "career3": { "title": "Data Engineer", "description": "Designs pipelines and storage for analytics." }
  }
}"#;

const DEFAULT_REPLY: &str = "Happy to help with your career plans.";

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, owner_id: Uuid, system_prompt: &str) -> Result<Session, AppError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            owner_id,
            title: DEFAULT_TITLE.to_string(),
            messages: vec![Message::new(Role::System, system_prompt)],
            created_at: now,
            updated_at: now,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find(&self, owner_id: Uuid, session_id: Uuid) -> Result<Option<Session>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(&session_id)
            .filter(|s| s.owner_id == owner_id)
            .cloned())
    }

    async fn append(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        messages: &[Message],
    ) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&session_id)
            .filter(|s| s.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;
        session.messages.extend_from_slice(messages);
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Session>, AppError> {
        let mut owned: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn delete(&self, owner_id: Uuid, session_id: Uuid) -> Result<bool, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(&session_id) {
            Some(s) if s.owner_id == owner_id => {
                sessions.remove(&session_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryAnalysisStore {
    results: Mutex<Vec<AnalysisResult>>,
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn insert(&self, result: &AnalysisResult) -> Result<(), AppError> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn latest(&self, owner_id: Option<Uuid>) -> Result<Option<AnalysisResult>, AppError> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .filter(|r| owner_id.map_or(true, |owner| r.owner_id == owner))
            .max_by_key(|r| r.timestamp)
            .cloned())
    }
}

enum Scripted {
    Reply(String),
    Failure,
}

/// Answers from a queue of scripted replies and records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Vec<ChatTurn>>>,
}

impl ScriptedCompletion {
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(reply.into()));
    }

    pub fn push_failure(&self) {
        self.script.lock().unwrap().push_back(Scripted::Failure);
    }

    pub fn requests(&self) -> Vec<Vec<ChatTurn>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        _params: &CompletionParams,
    ) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Failure) => Err(LlmError::Api {
                status: 500,
                body: r#"{"error":{"message":"upstream exploded"}}"#.to_string(),
            }),
            None => Ok(DEFAULT_REPLY.to_string()),
        }
    }
}

enum StubMode {
    Text(String),
    FailUpload,
    FailConversion,
}

/// Extraction double that records which steps ran.
pub struct StubExtractor {
    mode: StubMode,
    calls: Mutex<Vec<String>>,
}

impl StubExtractor {
    fn with_mode(mode: StubMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(text: impl Into<String>) -> Self {
        Self::with_mode(StubMode::Text(text.into()))
    }

    pub fn failing_upload() -> Self {
        Self::with_mode(StubMode::FailUpload)
    }

    pub fn failing_conversion() -> Self {
        Self::with_mode(StubMode::FailConversion)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ExtractionProvider for StubExtractor {
    async fn upload(&self, path: &Path, _file_name: &str) -> Result<String, ExtractionError> {
        self.record("upload");
        if !path.exists() {
            return Err(ExtractionError::Upload(format!(
                "{} does not exist",
                path.display()
            )));
        }
        match self.mode {
            StubMode::FailUpload => Err(ExtractionError::Upload("quota exceeded".to_string())),
            _ => Ok("https://files.test/source".to_string()),
        }
    }

    async fn convert(&self, _source_url: &str, kind: FileKind) -> Result<String, ExtractionError> {
        let tag = match kind {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
        };
        self.record(format!("convert:{tag}"));
        match self.mode {
            StubMode::FailConversion => {
                Err(ExtractionError::Extraction("document is encrypted".to_string()))
            }
            _ => Ok("https://files.test/result.txt".to_string()),
        }
    }

    async fn fetch_text(&self, _result_url: &str) -> Result<String, ExtractionError> {
        self.record("fetch");
        match &self.mode {
            StubMode::Text(text) => Ok(text.clone()),
            _ => Err(ExtractionError::Extraction("no result".to_string())),
        }
    }
}

/// Writes `bytes` to a fresh temporary upload inside `dir`.
pub fn temp_upload(dir: &Path, kind: FileKind, bytes: &[u8]) -> TempUpload {
    let file = NamedTempFile::new_in(dir).unwrap();
    std::fs::write(file.path(), bytes).unwrap();
    let file_name = match kind {
        FileKind::Pdf => "resume.pdf",
        FileKind::Image => "resume.png",
    };
    TempUpload::new(file, file_name.to_string(), kind, bytes.len())
}

pub struct TestHarness {
    pub state: AppState,
    pub completion: Arc<ScriptedCompletion>,
    pub extractor: Arc<StubExtractor>,
    /// Root of the state's log, analysis and upload directories; removed on drop.
    pub scratch: TempDir,
}

pub fn test_config(root: &Path) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        groq_api_key: None,
        pdf_co_api_key: None,
        completion_api_url: "http://127.0.0.1:9/unused".to_string(),
        extraction_api_url: "http://127.0.0.1:9/unused".to_string(),
        log_dir: root.join("logs"),
        analysis_dir: root.join("FormattedResponse"),
        upload_dir: root.join("uploads"),
        max_upload_bytes: 5 * 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Fresh state with empty stores and its own scratch directories.
/// Bind `scratch` for as long as the state is used.
pub fn test_state() -> TestHarness {
    let scratch = tempfile::tempdir().unwrap();
    let config = test_config(scratch.path());
    let completion = Arc::new(ScriptedCompletion::default());
    let extractor = Arc::new(StubExtractor::returning("Jane Doe\nSkills: Rust, PostgreSQL"));

    let state = AppState {
        sessions: Arc::new(MemorySessionStore::default()),
        analyses: Arc::new(MemoryAnalysisStore::default()),
        completion: completion.clone(),
        extractor: extractor.clone(),
        chat_log: FileLog::new(config.log_dir.clone()),
        analysis_log: FileLog::new(config.analysis_dir.clone()),
        config,
    };

    TestHarness {
        state,
        completion,
        extractor,
        scratch,
    }
}
