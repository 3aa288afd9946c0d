use std::time::Duration;

use async_trait::async_trait;
use docflow_core::{
    preview_body, ApiError, CancelReply, RawResponse, Scenario, StatusLookup, StatusReport,
    TaskApi, TaskId, UploadRequest,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

fn from_reqwest(err: reqwest::Error, url: String) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout { url }
    } else if err.is_connect() {
        ApiError::Connect {
            url,
            message: err.to_string(),
        }
    } else {
        ApiError::Transport {
            url,
            message: err.to_string(),
        }
    }
}

async fn read_text(resp: reqwest::Response, url: &str) -> Result<(StatusCode, String), ApiError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|err| from_reqwest(err, url.to_string()))?;
    Ok((status, body))
}

fn decode<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    url: &str,
    body: &str,
) -> Result<T, ApiError> {
    serde_json::from_str::<T>(body).map_err(|err| ApiError::Decode {
        status: status.as_u16(),
        url: url.to_string(),
        message: format!("{err} | body={}", preview_body(body)),
    })
}

#[derive(Debug, Default, Deserialize)]
struct CancelBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `TaskApi` over the processing server's HTTP endpoints.
#[derive(Clone)]
pub struct HttpTaskApi {
    http: reqwest::Client,
    request_timeout: Duration,
    base_url: String,
    url_upload: String,
}

impl HttpTaskApi {
    /// Uploads only get the connect timeout: the server may hold the
    /// request open until processing ends.
    pub fn new(
        base_url: &str,
        connect_timeout_ms: u64,
        request_timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            request_timeout: Duration::from_millis(request_timeout_ms),
            url_upload: format!("{}/upload", normalized),
            base_url: normalized,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn status_url(&self, task_id: &TaskId) -> String {
        format!("{}/api/status/{}", self.base_url, task_id)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn upload(&self, request: UploadRequest) -> Result<RawResponse, ApiError> {
        let url = &self.url_upload;
        tracing::debug!(
            target: "docflow.http",
            stage = "http.upload.in",
            url = %url,
            task_id = %request.task_id,
            bytes = request.file.len()
        );
        let file = Part::bytes(request.file.content).file_name(request.file.file_name);
        let form = Form::new()
            .part("file", file)
            .text("task_id", request.task_id.to_string())
            .text("scenario_id", request.scenario_id)
            .text("ai_provider", request.provider);

        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| from_reqwest(err, url.clone()))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|err| from_reqwest(err, url.clone()))?;
        tracing::debug!(
            target: "docflow.http",
            stage = "http.upload.out",
            status = %status,
            content_type = ?content_type,
            bytes = body.len()
        );
        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body: body.to_vec(),
        })
    }

    async fn get_status(&self, task_id: &TaskId) -> Result<StatusLookup, ApiError> {
        let url = self.status_url(task_id);
        let resp = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| from_reqwest(err, url.clone()))?;
        let (status, body) = read_text(resp, &url).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(StatusLookup::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
                body: preview_body(&body),
            });
        }
        let report: StatusReport = decode(status, &url, &body)?;
        tracing::trace!(
            target: "docflow.http",
            stage = "http.status.out",
            task_id = %task_id,
            status = %report.status
        );
        Ok(StatusLookup::Found(report))
    }

    async fn cancel(&self, task_id: &TaskId) -> Result<CancelReply, ApiError> {
        let url = format!("{}/cancel", self.status_url(task_id));
        tracing::debug!(target: "docflow.http", stage = "http.cancel.in", url = %url);
        let resp = self
            .http
            .post(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| from_reqwest(err, url.clone()))?;
        let (status, body) = read_text(resp, &url).await?;

        // Error pages are a rejection, not a transport failure.
        let parsed: CancelBody = serde_json::from_str(&body).unwrap_or_else(|_| CancelBody {
            message: Some(preview_body(&body)),
            ..CancelBody::default()
        });
        let message = parsed
            .error
            .filter(|m| !m.trim().is_empty())
            .or(parsed.message.filter(|m| !m.trim().is_empty()));
        Ok(CancelReply {
            status: status.as_u16(),
            success: parsed.success,
            message,
        })
    }

    async fn fetch_scenario(&self, scenario_id: &str) -> Result<Scenario, ApiError> {
        let url = format!("{}/api/scenarios/{}", self.base_url, scenario_id);
        let resp = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| from_reqwest(err, url.clone()))?;
        let (status, body) = read_text(resp, &url).await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
                body: preview_body(&body),
            });
        }
        decode(status, &url, &body)
    }
}
