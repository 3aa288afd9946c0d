//! docflow-core: client-side lifecycle of one upload-and-process task.
//!
//! The crate owns the state machine (submit, poll, cancel, restore) and
//! leaves transport, persistence and rendering to the collaborator traits
//! in [`api`], [`storage`] and [`ui`].

pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod progress;
pub mod scenario;
pub mod storage;
pub mod task;
pub mod ui;
pub mod upload;

pub use api::{
    preview_body, CancelReply, RawResponse, StatusLookup, TaskApi, UploadRequest,
    BODY_PREVIEW_LIMIT,
};
pub use error::{ApiError, CancelError, StoreError, UploadError};
pub use poller::{PollCallback, PollEvent, PollSettings, StatusPoller};
pub use progress::{DisplayState, ProgressView, StepId};
pub use scenario::Scenario;
pub use storage::{KeyValueStore, MemoryKvStore};
pub use task::{PersistedTask, StatusReport, TaskId, TaskSession, TaskStatus};
pub use ui::{Notifier, ToastLevel, UploadUi};
pub use upload::{
    ControllerPhase, ControllerSettings, MainResult, UploadController, UploadFile, UploadResult,
};
