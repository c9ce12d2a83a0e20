//! Durable key-value storage behind the result cache.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/cache/
//!   kv_3f9a0c21…e65.json       # one file per key, full SHA-256 in hex
//!   kv_3f9a0c21…e65.json.tmp   # only while a write is in flight
//! ```
//!
//! File names are the full SHA-256 of the key so arbitrary URLs map to safe,
//! fixed-length names. Writes go through a temp file and a rename.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{Error, Result};

/// String-keyed text storage.
///
/// Implementations must tolerate removing keys that do not exist.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Delete `key` if present.
    fn remove(&self, key: &str) -> Result<()>;
    /// Delete every key, returning how many were removed.
    fn clear(&self) -> Result<usize>;
}

/// Filesystem-backed store: one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily on first write.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the entry files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(key)))
    }

    /// Number of entries currently on disk.
    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.entry_files()?.len())
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>> {
        self.files_matching(Self::is_entry_file)
    }

    fn files_matching(&self, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root)
            .map_err(|e| Error::Storage(format!("Failed to read cache directory: {e}")))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::Storage(format!("Failed to read directory entry: {e}")))?
                .path();
            if keep(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn is_entry_file(path: &Path) -> bool {
        Self::has_name(path, |name| name.starts_with("kv_") && name.ends_with(".json"))
    }

    fn is_leftover_temp(path: &Path) -> bool {
        Self::has_name(path, |name| name.starts_with("kv_") && name.ends_with(".json.tmp"))
    }

    fn has_name(path: &Path, pred: impl Fn(&str) -> bool) -> bool {
        path.file_name().and_then(|s| s.to_str()).is_some_and(pred)
    }
}

/// `kv_` followed by the hex SHA-256 of the key.
fn file_stem(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest
        .iter()
        .fold(String::from("kv_"), |mut acc, b| {
            // write! to String is infallible
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read cache entry {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| Error::Storage(format!("Failed to create cache directory: {e}")))?;

        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .map_err(|e| Error::Storage(format!("Failed to write temp cache file: {e}")))?;

        // Windows refuses to rename over an existing file
        #[cfg(target_os = "windows")]
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                let _ = fs::remove_file(&tmp_path);
                return Err(Error::Storage(format!("Failed to replace cache entry: {e}")));
            }
        }

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::Storage(format!("Failed to commit cache entry: {e}")));
        }

        debug!("Stored cache entry {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed cache entry {}", path.display());
                Ok(())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove cache entry {}: {e}",
                path.display()
            ))),
        }
    }

    fn clear(&self) -> Result<usize> {
        for path in self.files_matching(Self::is_leftover_temp)? {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove leftover {}: {}", path.display(), e);
            }
        }

        let files = self.entry_files()?;
        for path in &files {
            fs::remove_file(path).map_err(|e| {
                Error::Storage(format!("Failed to remove {}: {e}", path.display()))
            })?;
        }

        debug!("Cleared {} cache entries from {}", files.len(), self.root.display());
        Ok(files.len())
    }
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |map| map.len())
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Storage("Memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<usize> {
        let mut map = self.lock()?;
        let count = map.len();
        map.clear();
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_set_and_get() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("cache"));

        assert_eq!(store.get("pagespeed_https://example.com/").unwrap(), None);
        store
            .set("pagespeed_https://example.com/", "{\"a\":1}")
            .unwrap();
        assert_eq!(
            store.get("pagespeed_https://example.com/").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_file_store_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        assert!(store.remove("never-stored").is_ok());
    }

    #[test]
    fn test_file_store_leaves_no_tmp_files() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.set("k", "v").unwrap();

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("kv_"));
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn test_file_store_clear_only_touches_entries() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        fs::write(temp.path().join("notes.txt"), "keep me").unwrap();
        assert_eq!(store.entry_count().unwrap(), 2);

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.entry_count().unwrap(), 0);
        assert_eq!(store.get("a").unwrap(), None);
        assert!(temp.path().join("notes.txt").exists());
    }

    #[test]
    fn test_file_store_clear_sweeps_interrupted_writes() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.set("a", "1").unwrap();
        let leftover = temp.path().join(format!("{}.json.tmp", file_stem("b")));
        fs::write(&leftover, "half written").unwrap();

        assert_eq!(store.entry_count().unwrap(), 1);
        assert_eq!(store.clear().unwrap(), 1);
        assert!(!leftover.exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_commit_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        // A directory at the entry path makes the rename fail
        fs::create_dir(store.entry_path("k")).unwrap();
        fs::write(store.entry_path("k").join("inner"), "x").unwrap();

        assert!(store.set("k", "v").is_err());
        assert!(!store.entry_path("k").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_clear_missing_root() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("absent"));
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_distinct_keys_get_distinct_files() {
        assert_ne!(
            file_stem("pagespeed_https://a.example/"),
            file_stem("pagespeed_https://b.example/")
        );
        assert_eq!(file_stem("x"), file_stem("x"));
        assert_eq!(file_stem("x").len(), 3 + 64);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
