pub mod api;
pub mod factory;
pub mod storage;

pub use api::HttpTaskApi;
pub use storage::FileKvStore;
