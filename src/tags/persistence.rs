//! Sled-backed tag store

use crate::cid::Cid;
use crate::error::StorageError;
use crate::tags::{validate_tag_name, TagStore};
use std::path::Path;
use tracing::debug;

/// Sled-based implementation of TagStore: key = tag name, value = binary CID
pub struct SledTagStore {
    db: sled::Db,
}

impl SledTagStore {
    /// Open (or create) the database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)
            .map_err(|e| StorageError::io("Failed to open sled database", e))?;
        Ok(Self { db })
    }

    fn decode_value(name: &str, value: &[u8]) -> Result<Cid, StorageError> {
        Cid::from_bytes(value).map_err(|e| {
            debug!(tag = name, "Undecodable tag value: {}", e);
            StorageError::Decode(e)
        })
    }
}

impl TagStore for SledTagStore {
    fn set(&self, name: &str, cid: &Cid) -> Result<(), StorageError> {
        validate_tag_name(name)?;
        self.db
            .insert(name.as_bytes(), cid.to_bytes())
            .map_err(|e| StorageError::io(format!("Failed to set tag {:?}", name), e))?;
        self.db
            .flush()
            .map_err(|e| StorageError::io("Failed to flush tag database", e))?;
        debug!(tag = name, cid = %cid, "Tag set");
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Cid, StorageError> {
        match self
            .db
            .get(name.as_bytes())
            .map_err(|e| StorageError::io(format!("Failed to get tag {:?}", name), e))?
        {
            Some(value) => Self::decode_value(name, &value),
            None => Err(StorageError::TagNotFound(name.to_string())),
        }
    }

    fn list(&self) -> Result<Vec<(String, Cid)>, StorageError> {
        let mut tags = Vec::new();
        for item in self.db.iter() {
            let (key, value) = item.map_err(|e| StorageError::io("Failed to list tags", e))?;
            let name = String::from_utf8_lossy(&key).into_owned();
            let cid = Self::decode_value(&name, &value)?;
            tags.push((name, cid));
        }
        // Sled iterates in key byte order, which is name order for UTF-8 keys.
        Ok(tags)
    }
}
