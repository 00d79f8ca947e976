//! Flat-file event records: chat exchanges, analysed conversations, raw analysis output.
//!
//! Every record gets its own file keyed by chat id, timestamp and a random nonce,
//! so concurrent requests never overwrite each other.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileLog {
    dir: PathBuf,
}

impl FileLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `contents` to a fresh file and returns its file name.
    pub async fn write_record(
        &self,
        prefix: &str,
        chat_id: Uuid,
        at: DateTime<Utc>,
        contents: &str,
    ) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = record_filename(prefix, chat_id, at);
        tokio::fs::write(self.dir.join(&filename), contents).await?;

        debug!("Wrote {} bytes to {}", contents.len(), filename);
        Ok(filename)
    }
}

/// `<prefix>_<chat_id>_<timestamp>_<nonce>.txt`, with `:` and `.` kept out of the timestamp.
pub fn record_filename(prefix: &str, chat_id: Uuid, at: DateTime<Utc>) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}_{chat_id}_{}_{}.txt",
        file_timestamp(at),
        &nonce[..8]
    )
}

pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// One chat exchange as written to the chat log.
pub fn format_exchange(chat_id: Uuid, at: DateTime<Utc>, user: &str, assistant: &str) -> String {
    format!(
        "=== Chat ID: {chat_id} ===\nTimestamp: {}\nUser: {user}\nAssistant: {assistant}\n===================================\n\n",
        at.to_rfc3339()
    )
}
