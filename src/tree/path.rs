//! Link name normalization and validation

use crate::error::StorageError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Normalize a filesystem entry name into a link name
///
/// Names are normalized to Unicode NFC so that the same tree hashes identically on
/// filesystems that store decomposed names. Names that are not valid UTF-8 cannot be
/// represented portably and are rejected.
pub fn link_name(file_name: &OsStr) -> Result<String, StorageError> {
    let name = file_name.to_str().ok_or_else(|| {
        StorageError::InvalidPath(format!("Non UTF-8 file name: {:?}", file_name))
    })?;
    Ok(name.nfc().collect())
}

/// Reject link names that would escape or alias a directory when materialized
pub fn validate_link_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StorageError::InvalidPath(format!(
            "Unsafe link name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Absolute, symlink-free form of a user-supplied root
///
/// Uses `dunce` so Windows paths keep their familiar form instead of the `\\?\` prefix.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path)
        .map_err(|e| StorageError::InvalidPath(format!("Failed to canonicalize {:?}: {}", path, e)))
}

/// Render a relative path the way status and pull report it ("." for the root)
pub fn display_relative(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.to_string_lossy().to_string()
    }
}
