#[allow(clippy::module_inception)]
pub mod error;
pub mod transport;

pub use error::{CancelError, UploadError};
pub use transport::{ApiError, StoreError};
