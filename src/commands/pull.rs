//! Materialize a stored tree onto the local filesystem

use crate::cid::Cid;
use crate::error::{ApiError, StorageError};
use crate::store::BlobStore;
use crate::tree::mirror::traverse_remote;
use crate::tree::node::Node;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullReport {
    pub files: usize,
    pub directories: usize,
}

/// Write the tree rooted at `cid` into `target`
///
/// `target` must be absent or an empty directory. A leaf root is written as a single
/// file at `target`. The tree is built in a staging directory next to `target` and moved
/// into place only once every blob has been written, so a failed pull leaves `target`
/// as it was.
pub fn pull<S>(store: &S, cid: &Cid, target: &Path) -> Result<PullReport, ApiError>
where
    S: BlobStore + ?Sized,
{
    ensure_empty_target(target)?;

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|e| StorageError::io(format!("Failed to create directory {:?}", parent), e))?;
    let staging = tempfile::Builder::new()
        .prefix(".multiverse-pull-")
        .tempdir_in(&parent)
        .map_err(|e| StorageError::io(format!("Failed to create staging directory in {:?}", parent), e))?;
    let staged_root = staging.path().join("root");

    let mut report = PullReport::default();
    let mut materialize = |path: &Path, _: &Cid, node: &Node| -> Result<(), StorageError> {
        // Joining an empty path would add a trailing separator.
        let full = if path.as_os_str().is_empty() {
            staged_root.clone()
        } else {
            staged_root.join(path)
        };
        match node {
            Node::Tree(_) => {
                fs::create_dir_all(&full).map_err(|e| {
                    StorageError::io(format!("Failed to create directory {:?}", full), e)
                })?;
                report.directories += 1;
            }
            Node::Leaf(data) => {
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        StorageError::io(format!("Failed to create directory {:?}", parent), e)
                    })?;
                }
                fs::write(&full, data)
                    .map_err(|e| StorageError::io(format!("Failed to write {:?}", full), e))?;
                report.files += 1;
            }
        }
        debug!(path = %path.display(), "Materialized");
        Ok(())
    };

    if let Err(e) = traverse_remote(store, cid, &mut materialize) {
        warn!(root = %cid, "Pull failed, discarding staged files: {}", e);
        return Err(e.into());
    }
    commit(&staged_root, target)?;

    info!(
        root = %cid,
        target = %target.display(),
        files = report.files,
        directories = report.directories,
        "Pull completed"
    );
    Ok(report)
}

/// Move the staged tree onto `target`
///
/// An existing empty directory stays in place and receives the staged entries, so
/// pulling into the current directory works.
fn commit(staged_root: &Path, target: &Path) -> Result<(), StorageError> {
    if target.is_dir() && staged_root.is_dir() {
        let entries = fs::read_dir(staged_root)
            .map_err(|e| StorageError::io(format!("Failed to read {:?}", staged_root), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io("Failed to read staged entry", e))?;
            let destination = target.join(entry.file_name());
            fs::rename(entry.path(), &destination).map_err(|e| {
                StorageError::io(format!("Failed to move pulled entry to {:?}", destination), e)
            })?;
        }
        return Ok(());
    }
    if target.is_dir() {
        fs::remove_dir(target)
            .map_err(|e| StorageError::io(format!("Failed to replace {:?}", target), e))?;
    }
    fs::rename(staged_root, target)
        .map_err(|e| StorageError::io(format!("Failed to move pulled tree to {:?}", target), e))
}

fn ensure_empty_target(target: &Path) -> Result<(), ApiError> {
    match fs::read_dir(target) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                return Err(ApiError::TargetNotEmpty(target.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(_) if target.is_file() => Err(ApiError::TargetNotEmpty(target.to_path_buf())),
        Err(e) => Err(StorageError::io(format!("Failed to read {:?}", target), e).into()),
    }
}
