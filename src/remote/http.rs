//! reqwest client for the assistant backend

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AnswerService, ApiError, DashboardStats, PingStatus, SourceEntry};

pub struct BackendClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct IngestRequest<'a> {
    path: &'a str,
    chunk_size: u32,
    overlap: u32,
}

#[derive(Debug, Deserialize)]
struct UploadReceipt {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a local file for ingestion. Returns the server-side path the
    /// ingestion run should be pointed at.
    pub async fn upload(&self, file: &Path) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(file).await?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(name));
        let response = self
            .client
            .post(self.url("/api/ingest/upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let receipt: UploadReceipt = response.json().await?;
        if !receipt.ok {
            return Err(ApiError::UploadRejected(
                receipt.error.unwrap_or_else(|| "Upload failed".to_string()),
            ));
        }
        receipt
            .path
            .ok_or_else(|| ApiError::UploadRejected("no upload path returned".to_string()))
    }

    /// Kick off ingestion of an uploaded file. Chunking parameters are
    /// passed through untouched; the backend owns validation.
    pub async fn run_ingestion(
        &self,
        path: &str,
        chunk_size: u32,
        overlap: u32,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/ingest/run"))
            .json(&IngestRequest {
                path,
                chunk_size,
                overlap,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(())
    }

    pub async fn sources(&self) -> Result<Vec<SourceEntry>, ApiError> {
        let response = self.client.get(self.url("/api/sources")).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn ping(&self) -> Result<PingStatus, ApiError> {
        let response = self.client.get(self.url("/api/ping")).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AnswerService for BackendClient {
    async fn ask(&self, question: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&AskRequest { question })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let payload: AskResponse = response.json().await?;
        Ok(payload.answer)
    }

    async fn stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .client
            .get(self.url("/api/dashboard/stats"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_field_is_optional() {
        let with: AskResponse = serde_json::from_str(r#"{"answer":"drink water"}"#).unwrap();
        assert_eq!(with.answer.as_deref(), Some("drink water"));

        let without: AskResponse = serde_json::from_str(r#"{"sources":[]}"#).unwrap();
        assert!(without.answer.is_none());
    }

    #[test]
    fn stats_tolerate_partial_payloads() {
        let stats: DashboardStats = serde_json::from_str(r#"{"queries_today":7}"#).unwrap();
        assert_eq!(stats.queries_today, Some(7));
        assert_eq!(stats.docs, None);

        let empty: DashboardStats = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.queries_today, None);
    }

    #[test]
    fn upload_receipt_carries_error_detail() {
        let receipt: UploadReceipt =
            serde_json::from_str(r#"{"ok":false,"error":"disk full"}"#).unwrap();
        assert!(!receipt.ok);
        assert_eq!(receipt.error.as_deref(), Some("disk full"));

        let ok: UploadReceipt =
            serde_json::from_str(r#"{"ok":true,"path":"/data/raw/notes.pdf"}"#).unwrap();
        assert!(ok.ok);
        assert_eq!(ok.path.as_deref(), Some("/data/raw/notes.pdf"));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.url("/api/chat"), "http://localhost:8000/api/chat");
    }
}
