//! HTTP collaborators for the assistant backend

mod http;

pub use http::BackendClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("upload rejected: {0}")]
    UploadRejected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dashboard counters. Every field is optional on the wire; absence means
/// the backend had nothing to report, not an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub queries_today: Option<u64>,
    #[serde(default)]
    pub docs: Option<u64>,
}

/// One indexed document as listed by the sources endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    #[serde(default)]
    pub chunks: u64,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PingStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub vector_ready: bool,
    #[serde(default)]
    pub queries_today: u64,
}

/// The question-answering seam the conversation engine depends on.
///
/// `ask` returns `Ok(None)` when the response parsed but carried no
/// `answer` field; only transport, status, and decode problems are errors.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<Option<String>, ApiError>;

    async fn stats(&self) -> Result<DashboardStats, ApiError>;
}
