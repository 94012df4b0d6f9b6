//! Durable key-value storage for the draft and the pending queue.
//!
//! One small interface so the persistence mechanism is swappable without
//! touching queue logic: the file-backed store is the production path, the
//! in-memory store backs tests and embedders that manage durability
//! themselves.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{CivicError, Result};

/// Overwrite-only key-value storage with single-writer semantics.
///
/// Values are opaque strings (the offline module stores JSON documents).
/// `put` must be durable by the time it returns; that is the "commit" step
/// the offline queue relies on across process restarts.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` document per key under a root
/// directory (the app data dir in production).
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                CivicError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to create data directory {}: {e}", root.display()),
                ))
            })?;
        }
        Ok(FileStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CivicError::Io(e)),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        // Write-then-rename so a crash mid-write cannot truncate the
        // previous committed value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CivicError::Io(e)),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.map.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path().join("data")).unwrap();

        assert_eq!(store.get("draft").unwrap(), None);

        store.put("draft", r#"{"title": "pothole"}"#).unwrap();
        assert_eq!(
            store.get("draft").unwrap().as_deref(),
            Some(r#"{"title": "pothole"}"#)
        );

        store.put("draft", r#"{"title": "streetlight"}"#).unwrap();
        assert_eq!(
            store.get("draft").unwrap().as_deref(),
            Some(r#"{"title": "streetlight"}"#)
        );

        store.delete("draft").unwrap();
        assert_eq!(store.get("draft").unwrap(), None);
        // deleting a missing key is not an error
        store.delete("draft").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");

        {
            let store = FileStore::open(&root).unwrap();
            store.put("pending_queue", "[]").unwrap();
        }

        let store = FileStore::open(&root).unwrap();
        assert_eq!(store.get("pending_queue").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_no_tmp_leftover() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path().join("data")).unwrap();
        store.put("draft", "{}").unwrap();

        let entries: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["draft.json".to_string()]);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
