use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

/// Client-generated identifier of one upload-processing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-reported task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Cancelled,
    /// Any value this client does not know; treated as still running.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Terminal statuses are never followed by another transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric counters attached to a status report (bytes, tokens, seconds).
pub type Metrics = BTreeMap<String, f64>;

/// Body of `GET /api/status/{task_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default, deserialize_with = "numeric_metrics")]
    pub metrics: Metrics,
}

impl StatusReport {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            task_id: None,
            status,
            stage: None,
            message: None,
            progress: None,
            metrics: Metrics::new(),
        }
    }

    pub fn with_stage(mut self, stage: &str) -> Self {
        self.stage = Some(stage.to_string());
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Message text, ignoring blank strings.
    pub fn message_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

// The server mixes counters with e.g. an ISO `start_time`; keep numbers only.
fn numeric_metrics<'de, D>(deserializer: D) -> Result<Metrics, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.as_f64().map(|n| (k, n)))
        .collect())
}

/// What survives a restart: the id and when the task was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTask {
    pub id: TaskId,
    /// Epoch milliseconds.
    pub start_time_ms: i64,
}

impl PersistedTask {
    pub fn started_now(id: TaskId) -> Self {
        Self {
            id,
            start_time_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Wall-clock time elapsed since the task was started, zero if the clock went backwards.
    pub fn elapsed(&self) -> std::time::Duration {
        let now = Utc::now().timestamp_millis();
        std::time::Duration::from_millis(now.saturating_sub(self.start_time_ms).max(0) as u64)
    }
}
