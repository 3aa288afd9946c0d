pub mod load;
pub mod types;

pub use load::{get_docflow_data_dir, load_default, load_from};
pub use types::{
    AppConfig, LoggingConfig, NotifyConfig, PollingConfig, ServerConfig, StorageConfig,
    StorageKind, UploadConfig,
};
