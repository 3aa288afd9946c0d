//! Interpretation of the `POST /upload` response.

use serde::{Deserialize, Serialize};

use crate::api::RawResponse;
use crate::error::UploadError;


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// `results.main`: the JSON output and, optionally, the Excel workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainResult {
    pub json_file: String,
    pub json_url: String,
    #[serde(default)]
    pub json_size: u64,
    #[serde(default)]
    pub excel_file: Option<String>,
    #[serde(default)]
    pub excel_url: Option<String>,
    #[serde(default)]
    pub excel_size: Option<u64>,
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

pub struct ExcelDownload<'a> {
    pub file: &'a str,
    pub url: &'a str,
    pub size: u64,
    pub sheets: &'a [String],
}

impl MainResult {
    /// The Excel descriptor, only when both a file name and a URL are present.
    pub fn excel(&self) -> Option<ExcelDownload<'_>> {
        let file = self.excel_file.as_deref().filter(|s| !s.is_empty())?;
        let url = self.excel_url.as_deref().filter(|s| !s.is_empty())?;
        Some(ExcelDownload {
            file,
            url,
            size: self.excel_size.unwrap_or(0),
            sheets: &self.sheets,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UploadResults {
    #[serde(default)]
    main: Option<MainResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct UploadResponseBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Option<UploadResults>,
}

/// Terminal success payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub message: String,
    /// `None` when the outcome was observed by polling rather than by the upload response.
    pub main: Option<MainResult>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// User-facing message for a response that could not be read as JSON.
pub fn classify_status(status: u16, reason: &str, max_file_bytes: u64) -> String {
    match status {
        500 => "Internal server error. Check the server logs.".to_string(),
        404 => "Route not found. The server may not be running.".to_string(),
        413 => format!(
            "File is too large. Maximum size: {} MB.",
            max_file_bytes / (1024 * 1024)
        ),
        s if s >= 400 => format!("Error {s}: {reason}").trim_end().to_string(),
        _ => "Server error: the response was not in the expected format.".to_string(),
    }
}

pub fn interpret_upload_response(
    raw: &RawResponse,
    max_file_bytes: u64,
) -> Result<UploadResult, UploadError> {
    let parsed = if raw.is_json() {
        match serde_json::from_slice::<UploadResponseBody>(&raw.body) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!(
                    target: "docflow.upload",
                    stage = "upload.response.decode",
                    status = raw.status,
                    error = %e,
                    body = %raw.preview()
                );
                None
            }
        }
    } else {
        tracing::error!(
            target: "docflow.upload",
            stage = "upload.response.not_json",
            status = raw.status,
            content_type = ?raw.content_type,
            body = %raw.preview()
        );
        None
    };

    let Some(body) = parsed else {
        return Err(UploadError::ServerResponse {
            status: raw.status,
            message: classify_status(raw.status, &raw.reason, max_file_bytes),
        });
    };

    if raw.is_success() && body.success {
        return Ok(UploadResult {
            message: non_blank(body.message)
                .unwrap_or_else(|| "Document processed successfully".to_string()),
            main: body.results.and_then(|r| r.main),
        });
    }

    let message = non_blank(body.error)
        .or_else(|| non_blank(body.message))
        .unwrap_or_else(|| "An error occurred during processing".to_string());
    if raw.is_success() {
        Err(UploadError::TaskFailed { message })
    } else {
        Err(UploadError::ServerResponse {
            status: raw.status,
            message,
        })
    }
}

/// Human-readable size: KB below one MiB, MB above, two decimals.
pub fn format_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b > MIB {
        format!("{:.2} MB", b / MIB)
    } else {
        format!("{:.2} KB", b / 1024.0)
    }
}
