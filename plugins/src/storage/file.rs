//! JSON-file key-value store, the durable home of the in-flight task.
//!
//! The whole map is rewritten on every change through a temp file and a
//! rename, so a crash never leaves half of a key pair on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use docflow_core::{KeyValueStore, StoreError};

pub struct FileKvStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within the process.
    lock: Mutex<()>,
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_error(&self.path, e)),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(map)?;
        fs::write(&tmp, body).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;
        tracing::trace!(target: "docflow.store", stage = "store.save", path = %self.path.display(), keys = map.len());
        Ok(())
    }

    fn update(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?;
        f(&mut map);
        self.save(&map)
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::task::{CURRENT_TASK_KEY, TASK_START_KEY};
    use pretty_assertions::assert_eq;

    #[test]
    fn pair_survives_reopen_and_is_removed_together() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileKvStore::new(&path);
        store
            .set_many(&[(CURRENT_TASK_KEY, "task-1-abc"), (TASK_START_KEY, "1700000000000")])
            .unwrap();

        let reopened = FileKvStore::new(&path);
        assert_eq!(
            reopened.get(CURRENT_TASK_KEY).unwrap().as_deref(),
            Some("task-1-abc")
        );
        assert_eq!(
            reopened.get(TASK_START_KEY).unwrap().as_deref(),
            Some("1700000000000")
        );

        reopened.remove_many(&[CURRENT_TASK_KEY, TASK_START_KEY]).unwrap();
        assert_eq!(store.get(CURRENT_TASK_KEY).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_reads_empty_and_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("state.json"));
        assert_eq!(store.get(CURRENT_TASK_KEY).unwrap(), None);
        store.remove(CURRENT_TASK_KEY).unwrap();
        store.remove(CURRENT_TASK_KEY).unwrap();
    }

    #[test]
    fn unrelated_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("state.json"));
        store.set("theme", "dark").unwrap();
        store.set(CURRENT_TASK_KEY, "task-1-abc").unwrap();
        store.remove(CURRENT_TASK_KEY).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileKvStore::new(&path);
        assert!(matches!(
            store.get(CURRENT_TASK_KEY),
            Err(StoreError::Serde(_))
        ));
    }
}
