//! Filesystem-rooted blob store: one file per blob, named by the CID string

use crate::cid::Cid;
use crate::error::StorageError;
use crate::store::{decode_verified, BlobStore};
use crate::tree::node::Node;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Directory-backed implementation of BlobStore
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    temp_counter: AtomicU64,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| StorageError::io(format!("Failed to create blob directory {:?}", root), e))?;
        Ok(Self {
            root,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, cid: &Cid) -> PathBuf {
        self.root.join(cid.to_string())
    }

    /// Write to a unique temporary name, then rename into place so readers never see
    /// a partial blob.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let sequence = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let temp_path = self
            .root
            .join(format!(".tmp-{}-{}", std::process::id(), sequence));

        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&temp_path, path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::io(format!("Failed to write blob {:?}", path), e));
        }
        Ok(())
    }
}

impl BlobStore for FileStore {
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        match fs::metadata(self.blob_path(cid)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(format!("Failed to stat blob {}", cid), e)),
        }
    }

    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        let bytes = match fs::read(self.blob_path(cid)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(cid = %cid, "Blob not found");
                return Err(StorageError::NotFound(*cid));
            }
            Err(e) => return Err(StorageError::io(format!("Failed to read blob {}", cid), e)),
        };
        decode_verified(cid, bytes)
    }

    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        let bytes = node.encode();
        let cid = Cid::hash(node.content_type(), &bytes);
        if self.has(&cid)? {
            trace!(cid = %cid, "Blob already present");
            return Ok(cid);
        }
        self.write_atomic(&self.blob_path(&cid), &bytes)?;
        debug!(cid = %cid, size = bytes.len(), "Stored blob");
        Ok(cid)
    }
}
