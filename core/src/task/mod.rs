pub mod id_gen;
pub mod session;
pub mod types;

pub use id_gen::generate_task_id;
pub use session::{TaskSession, CURRENT_TASK_KEY, TASK_START_KEY};
pub use types::{Metrics, PersistedTask, StatusReport, TaskId, TaskStatus};
