//! The four server endpoints the client consumes, as a trait.
//!
//! `docflow-plugins` provides the HTTP implementation; tests script their own.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::scenario::Scenario;
use crate::task::{StatusReport, TaskId};
use crate::upload::UploadFile;

pub const BODY_PREVIEW_LIMIT: usize = 512;

/// Trimmed response body for logs and error messages, cut at
/// [`BODY_PREVIEW_LIMIT`] characters.
pub fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// Multipart body of `POST /upload`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: UploadFile,
    pub task_id: TaskId,
    pub scenario_id: String,
    pub provider: String,
}

/// Unparsed upload response; classification happens in [`crate::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            reason: String::new(),
            content_type: Some("application/json".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn html(status: u16, reason: &str, body: &str) -> Self {
        Self {
            status,
            reason: reason.to_string(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn preview(&self) -> String {
        preview_body(&String::from_utf8_lossy(&self.body))
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusLookup {
    Found(StatusReport),
    /// HTTP 404: the server does not (or no longer) know the task.
    NotFound,
}

/// Reply of `POST /api/status/{task_id}/cancel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReply {
    pub status: u16,
    pub success: bool,
    pub message: Option<String>,
}

impl CancelReply {
    pub fn accepted(&self) -> bool {
        (200..300).contains(&self.status) && self.success
    }
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<RawResponse, ApiError>;

    async fn get_status(&self, task_id: &TaskId) -> Result<StatusLookup, ApiError>;

    async fn cancel(&self, task_id: &TaskId) -> Result<CancelReply, ApiError>;

    async fn fetch_scenario(&self, scenario_id: &str) -> Result<Scenario, ApiError>;
}
