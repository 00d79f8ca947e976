use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_COMPLETION_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_EXTRACTION_API_URL: &str = "https://api.pdf.co/v1";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing. Provider credentials are
/// optional here and checked at call time instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub groq_api_key: Option<String>,
    pub pdf_co_api_key: Option<String>,
    pub completion_api_url: String,
    pub extraction_api_url: String,
    pub log_dir: PathBuf,
    pub analysis_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            groq_api_key: optional_env("GROQ_API_KEY"),
            pdf_co_api_key: optional_env("PDF_CO_API_KEY"),
            completion_api_url: optional_env("COMPLETION_API_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_API_URL.to_string()),
            extraction_api_url: optional_env("EXTRACTION_API_URL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_API_URL.to_string()),
            log_dir: optional_env("LOG_DIR")
                .unwrap_or_else(|| "logs".to_string())
                .into(),
            analysis_dir: optional_env("ANALYSIS_DIR")
                .unwrap_or_else(|| "FormattedResponse".to_string())
                .into(),
            upload_dir: optional_env("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
