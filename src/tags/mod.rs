//! Tags
//!
//! Mutable name to CID pointers that give stable names to DAG roots. Tags are not
//! content-addressed and keep no history: the last `set` wins.

pub mod persistence;

pub use persistence::SledTagStore;

use crate::cid::Cid;
use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tag store interface
pub trait TagStore: Send + Sync {
    fn set(&self, name: &str, cid: &Cid) -> Result<(), StorageError>;

    /// Current target of `name`; unknown names are `StorageError::TagNotFound`
    fn get(&self, name: &str) -> Result<Cid, StorageError>;

    /// All tags, sorted by name
    fn list(&self) -> Result<Vec<(String, Cid)>, StorageError>;
}

impl<T: TagStore + ?Sized> TagStore for std::sync::Arc<T> {
    fn set(&self, name: &str, cid: &Cid) -> Result<(), StorageError> {
        (**self).set(name, cid)
    }

    fn get(&self, name: &str) -> Result<Cid, StorageError> {
        (**self).get(name)
    }

    fn list(&self) -> Result<Vec<(String, Cid)>, StorageError> {
        (**self).list()
    }
}

/// Tag names double as file names, so anything that could escape the directory is refused
pub fn validate_tag_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidTagName(name.to_string()));
    }
    Ok(())
}

/// One file per tag, holding the CID string
#[derive(Debug)]
pub struct FileTagStore {
    root: PathBuf,
}

impl FileTagStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| StorageError::io(format!("Failed to create tag directory {:?}", root), e))?;
        Ok(Self { root })
    }

    fn tag_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl TagStore for FileTagStore {
    fn set(&self, name: &str, cid: &Cid) -> Result<(), StorageError> {
        validate_tag_name(name)?;
        let path = self.tag_path(name);
        let temp_path = self.root.join(format!(".{}.tmp", name));

        fs::write(&temp_path, cid.to_string())
            .and_then(|_| fs::rename(&temp_path, &path))
            .map_err(|e| StorageError::io(format!("Failed to write tag {:?}", name), e))?;

        debug!(tag = name, cid = %cid, "Tag set");
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Cid, StorageError> {
        validate_tag_name(name)?;
        match fs::read_to_string(self.tag_path(name)) {
            Ok(contents) => Ok(Cid::decode(contents.trim())?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::TagNotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::io(format!("Failed to read tag {:?}", name), e)),
        }
    }

    fn list(&self) -> Result<Vec<(String, Cid)>, StorageError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| StorageError::io(format!("Failed to list tags in {:?}", self.root), e))?;

        let mut tags = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io("Failed to list tags", e))?;
            if !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            // Temporary files from an interrupted `set`.
            if name.starts_with('.') {
                continue;
            }
            let cid = self.get(&name)?;
            tags.push((name, cid));
        }

        tags.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(tags)
    }
}

/// In-memory implementation of TagStore
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    tags: RwLock<BTreeMap<String, Cid>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TagStore for MemoryTagStore {
    fn set(&self, name: &str, cid: &Cid) -> Result<(), StorageError> {
        validate_tag_name(name)?;
        self.tags.write().insert(name.to_string(), *cid);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Cid, StorageError> {
        self.tags
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| StorageError::TagNotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<(String, Cid)>, StorageError> {
        Ok(self
            .tags
            .read()
            .iter()
            .map(|(name, cid)| (name.clone(), *cid))
            .collect())
    }
}
