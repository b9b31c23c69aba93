use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const STORE_FILE: &str = "store.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// String key-value persistence used by the todo state.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Read errors count as absent.
    fn contains(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }
}

/// In-process store. Clones share the same values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.values.lock().expect("store poisoned");
        Ok(guard.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self.values.lock().expect("store poisoned");
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.values.lock().expect("store poisoned");
        guard.remove(key);
        Ok(())
    }
}

/// All keys live in one JSON object file, rewritten atomically on every change.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            values: HashMap::new(),
        }
    }

    /// Opens the store under `root`, creating the directory if needed.
    /// A missing file is an empty store.
    pub fn open(root: PathBuf) -> Result<Self, StorageError> {
        let mut store = Self::new(root);
        store.ensure_dirs()?;
        store.values = store.load()?;
        Ok(store)
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(STORE_FILE)
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        let mut file = match File::open(self.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(err.into()),
        };
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic(&self, path: &Path) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(&self.values)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(err) = self.write_atomic(&self.path()) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(previous) => self.values.insert(key.to_string(), previous),
                None => self.values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let Some(previous) = self.values.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.write_atomic(&self.path()) {
            self.values.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        assert!(!store.contains("a"));

        store.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert!(store.contains("a"));

        store.set("a", "2".to_string()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store.remove("a").unwrap();
        assert!(!store.contains("a"));
        // Removing a missing key is fine.
        store.remove("a").unwrap();
    }

    #[test]
    fn memory_store_clones_share_values() {
        let mut store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v".to_string()).unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("Scheduled").unwrap(), None);
        assert!(dir.path().join("nested").is_dir());
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path().to_path_buf()).unwrap();
            store.set("Anytime", "[]".to_string()).unwrap();
            store.set("isFirstLaunch", "false".to_string()).unwrap();
            store.remove("isFirstLaunch").unwrap();
        }

        let store = FileStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.get("Anytime").unwrap().as_deref(), Some("[]"));
        assert!(!store.contains("isFirstLaunch"));
        assert!(!dir.path().join("store.tmp").exists());
    }

    #[test]
    fn file_store_open_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "not json").unwrap();
        let result = FileStore::open(dir.path().to_path_buf());
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn file_store_write_failure_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        let mut store = FileStore::open(root.clone()).unwrap();
        fs::remove_dir_all(&root).unwrap();

        let result = store.set("a", "1".to_string());
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn storage_error_display() {
        let err = StorageError::from(std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "io error: boom");
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(StorageError::from(json_err)
            .to_string()
            .starts_with("json error:"));
    }
}
