//! Directory listing for traversal

use crate::error::StorageError;
use crate::tree::path;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Kind of a directory entry that takes part in hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a directory
#[derive(Debug, Clone)]
pub struct Entry {
    /// NFC-normalized link name
    pub name: String,
    /// Absolute (or root-relative) filesystem path
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// List the immediate children of `dir`, sorted by file name
///
/// Symlinks are never followed: they are skipped, which keeps hashes portable and
/// rules out cycles. Sockets, FIFOs and other special files are skipped too.
pub fn list_children(dir: &Path) -> Result<Vec<Entry>, StorageError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry
            .map_err(|e| StorageError::io(format!("Failed to read directory {:?}", dir), e))?;

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            debug!(path = %entry.path().display(), "Skipping symlink or special file");
            continue;
        };

        entries.push(Entry {
            name: path::link_name(entry.file_name())?,
            path: entry.into_path(),
            kind,
        });
    }

    // NFC normalization can change byte order relative to the on-disk names.
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    // Distinct on-disk names can normalize to one link name.
    if let Some(pair) = entries.windows(2).find(|pair| pair[0].name == pair[1].name) {
        return Err(StorageError::InvalidPath(format!(
            "{:?} and {:?} normalize to the same name {:?}",
            pair[0].path, pair[1].path, pair[0].name
        )));
    }

    Ok(entries)
}
