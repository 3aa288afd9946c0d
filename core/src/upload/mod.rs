mod attempt;
pub mod controller;
pub mod file;
pub mod result;

pub use controller::{ControllerPhase, ControllerSettings, UploadController};
pub use file::UploadFile;
pub use result::{
    classify_status, format_size, interpret_upload_response, MainResult, TokenUsage,
    UploadResult,
};
