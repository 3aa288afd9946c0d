use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::poller::PollSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Applies to status, cancel and scenario calls. The upload itself has no total timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// How long repeated 404s are tolerated after the task started.
    #[serde(default = "default_not_found_grace_ms")]
    pub not_found_grace_ms: u64,
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_not_found_grace_ms() -> u64 {
    30_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            not_found_grace_ms: default_not_found_grace_ms(),
        }
    }
}

impl PollingConfig {
    pub fn settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.interval_ms.max(1)),
            not_found_grace: Duration::from_millis(self.not_found_grace_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_scenario")]
    pub default_scenario: String,

    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Server-side upload limit, only used to word the "too large" message.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Once polling saw `completed`, how long to wait for the upload's own payload.
    #[serde(default = "default_result_wait_ms")]
    pub result_wait_ms: u64,
}

fn default_scenario() -> String {
    "default".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_result_wait_ms() -> u64 {
    30_000
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            default_scenario: default_scenario(),
            default_provider: default_provider(),
            max_file_bytes: default_max_file_bytes(),
            result_wait_ms: default_result_wait_ms(),
        }
    }
}

impl UploadConfig {
    pub fn result_wait(&self) -> Duration {
        Duration::from_millis(self.result_wait_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,

    /// JSON file holding the in-flight task. Empty means `~/.docflow/state.json`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_enabled")]
    pub enabled: bool,

    #[serde(default = "default_notify_duration_ms")]
    pub duration_ms: u64,
}

fn default_notify_enabled() -> bool {
    true
}

fn default_notify_duration_ms() -> u64 {
    5_000
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_notify_enabled(),
            duration_ms: default_notify_duration_ms(),
        }
    }
}

impl NotifyConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "docflow_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}
