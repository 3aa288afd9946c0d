use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use docflow_core::config::{get_docflow_data_dir, AppConfig, StorageKind};
use docflow_core::{KeyValueStore, MemoryKvStore, TaskApi};

use crate::api::HttpTaskApi;
use crate::storage::FileKvStore;

pub fn build_api(cfg: &AppConfig) -> Result<Arc<dyn TaskApi>> {
    Ok(Arc::new(HttpTaskApi::new(
        &cfg.server.base_url,
        cfg.server.connect_timeout_ms,
        cfg.server.request_timeout_ms,
    )?))
}

pub fn build_store(cfg: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    match cfg.storage.kind {
        StorageKind::Memory => Ok(Arc::new(MemoryKvStore::new())),
        StorageKind::File => {
            let path = match cfg.storage.path.as_deref().filter(|p| !p.trim().is_empty()) {
                Some(p) => PathBuf::from(p),
                None => get_docflow_data_dir()?.join("state.json"),
            };
            tracing::debug!(target: "docflow.store", stage = "store.open", path = %path.display());
            Ok(Arc::new(FileKvStore::new(path)))
        }
    }
}
