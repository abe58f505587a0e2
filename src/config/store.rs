//! JSON key/value store for application settings edited at runtime.
//!
//! # Design Decisions
//! - Backed by one JSON object file; loaded eagerly on open
//! - A corrupt or non-object file is copied to `<file>.bak` and the store starts empty
//! - Reading a missing key stores the supplied default
//! - Writes are explicit via `save()`, which backs up the previous file first

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

/// A thread-safe JSON store shared by handlers.
#[derive(Clone, Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: Arc<DashMap<String, Value>>,
    edited: Arc<AtomicBool>,
}

impl JsonStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = DashMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => {
                    for (key, value) in map {
                        data.insert(key, value);
                    }
                }
                _ => {
                    let backup = backup_path(&path);
                    fs::copy(&path, &backup)?;
                    tracing::warn!(
                        path = %path.display(),
                        backup = %backup.display(),
                        "Store file is not a JSON object, starting empty"
                    );
                }
            }
        }

        tracing::debug!(path = %path.display(), entries = data.len(), "Store opened");
        Ok(Self {
            path,
            data: Arc::new(data),
            edited: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Value under `key`; when absent, `default` is stored and returned.
    pub fn get(&self, key: &str, default: Value) -> Value {
        if let Some(value) = self.data.get(key) {
            return value.clone();
        }
        self.set(key, default.clone());
        default
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
        self.edited.store(true, Ordering::Release);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether there are unsaved changes.
    pub fn is_edited(&self) -> bool {
        self.edited.load(Ordering::Acquire)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write pending changes, keeping the previous file as `<file>.bak`.
    pub fn save(&self) -> io::Result<()> {
        if !self.edited.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        if self.path.exists() {
            fs::copy(&self.path, backup_path(&self.path))?;
        }

        let mut entries: Vec<(String, Value)> = self
            .data
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let map: Map<String, Value> = entries.into_iter().collect();

        let written = serde_json::to_string(&map)
            .map_err(io::Error::from)
            .and_then(|json| fs::write(&self.path, json));
        if let Err(e) = written {
            self.edited.store(true, Ordering::Release);
            return Err(e);
        }

        tracing::info!(path = %self.path.display(), entries = map.len(), "Store saved");
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
