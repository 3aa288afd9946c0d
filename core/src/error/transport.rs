use thiserror::Error;

/// Failures raised by a [`crate::api::TaskApi`] implementation.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("failed to decode response from {url} (status {status}): {message}")]
    Decode {
        status: u16,
        url: String,
        message: String,
    },
}

impl ApiError {
    /// True when the server could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the durable key-value store holding the in-flight task.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage content is not valid: {0}")]
    Serde(#[from] serde_json::Error),
}
