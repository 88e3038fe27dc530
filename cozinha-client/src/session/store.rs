// cozinha-client/src/session/store.rs
// Key/value session storage - in-memory and JSON file backends

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{ClientError, ClientResult};

/// One change of a batch: `Some` sets the key, `None` removes it
pub type Change<'a> = (&'a str, Option<&'a str>);

/// String key/value storage with the semantics of a browser session store.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;

    /// Applies every change or none of them.
    ///
    /// The default goes key by key and puts the previous values back when a
    /// write fails.
    fn write_batch(&self, changes: &[Change<'_>]) -> ClientResult<()> {
        let previous: Vec<(&str, Option<String>)> =
            changes.iter().map(|(key, _)| (*key, self.get(key))).collect();

        for (done, (key, value)) in changes.iter().enumerate() {
            let result = match value {
                Some(value) => self.set(key, value),
                None => self.remove(key),
            };
            if let Err(e) = result {
                for (key, old) in previous[..done].iter().rev() {
                    let undo = match old {
                        Some(old) => self.set(key, old),
                        None => self.remove(key),
                    };
                    if let Err(undo_err) = undo {
                        tracing::warn!(key = *key, "Failed to roll back session key: {}", undo_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

fn apply_changes(entries: &mut BTreeMap<String, String>, changes: &[Change<'_>]) {
    for (key, value) in changes {
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(*key);
            }
        }
    }
}

/// Store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("session store lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn write_batch(&self, changes: &[Change<'_>]) -> ClientResult<()> {
        apply_changes(&mut *self.lock()?, changes);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk
///
/// Every write rewrites the whole file; the file is removed once the last
/// key is gone.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(json) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "Ignoring corrupt session file: {}", e);
            BTreeMap::new()
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| ClientError::Storage(e.to_string()))?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).map_err(|e| ClientError::Storage(e.to_string()))
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> ClientResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ClientError::Storage("session file lock poisoned".into()))?;
        let mut entries = self.read_all();
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    /// One read and one rewrite of the file for the whole batch
    fn write_batch(&self, changes: &[Change<'_>]) -> ClientResult<()> {
        self.update(|entries| apply_changes(entries, changes))
    }
}
