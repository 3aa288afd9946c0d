use thiserror::Error;

use super::transport::ApiError;

/// Everything that can end a submission or a resumed task unsuccessfully.
///
/// Every variant maps to exactly one line of user-facing text through
/// [`UploadError::user_message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("server responded with status {status}: {message}")]
    ServerResponse { status: u16, message: String },

    #[error("network error: {message}")]
    Network { unreachable: bool, message: String },

    #[error("task {task_id} is unknown to the server")]
    TaskNotFound { task_id: String },

    #[error("task was cancelled: {message}")]
    Cancelled { message: String },

    #[error("processing failed: {message}")]
    TaskFailed { message: String },

    #[error("a submission is already in progress")]
    Busy,
}

impl UploadError {
    pub fn no_file() -> Self {
        Self::Validation("Please choose a file".to_string())
    }

    /// Converts a transport failure of the upload request itself.
    pub fn from_transport(err: &ApiError) -> Self {
        Self::Network {
            unreachable: err.is_unreachable(),
            message: err.to_string(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::ServerResponse { message, .. } => message.clone(),
            Self::Network {
                unreachable: true, ..
            } => "Could not connect to the server. Make sure it is running.".to_string(),
            Self::Network { message, .. } => format!("Network error: {message}"),
            Self::TaskNotFound { .. } => {
                "The server no longer knows this task; it has probably already finished."
                    .to_string()
            }
            Self::Cancelled { message } => message.clone(),
            Self::TaskFailed { message } => message.clone(),
            Self::Busy => "A file is already being processed.".to_string(),
        }
    }
}

/// Why a cancellation request did not take effect.
#[derive(Error, Debug)]
pub enum CancelError {
    #[error("no task is currently being processed")]
    NoCurrentTask,

    #[error("server rejected cancellation (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("cancel request failed: {0}")]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_message_distinguishes_unreachable_server() {
        let refused = ApiError::Connect {
            url: "http://127.0.0.1:1/upload".to_string(),
            message: "connection refused".to_string(),
        };
        let err = UploadError::from_transport(&refused);
        assert_eq!(
            err.user_message(),
            "Could not connect to the server. Make sure it is running."
        );

        let reset = ApiError::Transport {
            url: "http://127.0.0.1:5000/upload".to_string(),
            message: "connection reset".to_string(),
        };
        let err = UploadError::from_transport(&reset);
        assert!(err.user_message().starts_with("Network error: "));
        assert!(err.user_message().contains("connection reset"));
    }

    #[test]
    fn server_messages_are_surfaced_verbatim() {
        let err = UploadError::TaskFailed {
            message: "Scenario not found: basic".to_string(),
        };
        assert_eq!(err.user_message(), "Scenario not found: basic");
    }
}
