// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Byte-level object storage addressed by `(container, key)`.  The engine
//! only needs `get`; the binaries use `put` to publish results.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {container}/{key}")]
    NotFound { container: String, key: String },
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait ObjectStore: Send + Sync {
    fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError>;
    fn put(&self, container: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Store rooted at a directory: containers are sub-directories and keys are
/// relative paths beneath them.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, container: &str, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for part in [container, key] {
            for component in Path::new(part).components() {
                match component {
                    Component::Normal(segment) => path.push(segment),
                    Component::CurDir => {}
                    _ => return Err(StoreError::InvalidKey(format!("{container}/{key}"))),
                }
            }
        }
        Ok(path)
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(container, key)?;
        debug!(path = %path.display(), "reading object");
        fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            },
            _ => StoreError::Io(err),
        })
    }

    fn put(&self, container: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(container, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), bytes = bytes.len(), "writing object");
        fs::write(&path, bytes)?;
        Ok(())
    }
}

/// In-memory store, mostly useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, container: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        self.lock()
            .insert((container.to_string(), key.to_string()), bytes.into());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Vec<u8>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.lock()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }

    fn put(&self, container: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.insert(container, key, bytes);
        Ok(())
    }
}
