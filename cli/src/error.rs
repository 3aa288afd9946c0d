use docflow_core::{ApiError, CancelError, UploadError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Cancel(#[from] CancelError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("task {0} is unknown to the server")]
    TaskNotFound(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    // 0: success
    // 2: validation
    // 11: config error
    // 20: network
    // 30: server-reported failure or cancellation
    // 50: internal/uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Logging(_) => 11,
            Self::Validation(_) => 2,
            Self::Cancel(CancelError::NoCurrentTask) => 2,
            Self::Cancel(CancelError::Rejected { .. }) => 30,
            Self::Cancel(CancelError::Api(_)) => 20,
            Self::Api(_) => 20,
            Self::TaskNotFound(_) => 30,
            Self::Anyhow(_) => 50,
        }
    }
}

/// Exit code for a submission outcome that has already been rendered.
pub fn upload_exit_code(err: &UploadError) -> i32 {
    match err {
        UploadError::Validation(_) => 2,
        UploadError::Network { .. } => 20,
        UploadError::ServerResponse { .. }
        | UploadError::TaskNotFound { .. }
        | UploadError::Cancelled { .. }
        | UploadError::TaskFailed { .. } => 30,
        UploadError::Busy => 50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::Config("bad toml".into()).exit_code(), 11);
        assert_eq!(CliError::Cancel(CancelError::NoCurrentTask).exit_code(), 2);
        assert_eq!(
            CliError::Api(ApiError::Timeout {
                url: "http://127.0.0.1:5000/api/status/x".into()
            })
            .exit_code(),
            20
        );
        assert_eq!(upload_exit_code(&UploadError::no_file()), 2);
        assert_eq!(
            upload_exit_code(&UploadError::ServerResponse {
                status: 413,
                message: "File is too large. Maximum size: 50 MB.".into()
            }),
            30
        );
    }
}
