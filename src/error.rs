//! Error types for the content-addressed file tree engine.

use crate::cid::Cid;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed identifiers or node bytes. Never retried: the data is corrupt or foreign.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid multibase string: {0}")]
    Multibase(String),

    #[error("Unsupported multibase encoding {0:?}, expected base32 lower")]
    UnsupportedBase(String),

    #[error("Non-canonical CID string")]
    NonCanonical,

    #[error("Unexpected end of input")]
    Truncated,

    #[error("Varint overflows 64 bits or is not minimally encoded")]
    InvalidVarint,

    #[error("Unsupported CID version: {0}")]
    UnsupportedVersion(u64),

    #[error("Unknown content type code: {0:#x}")]
    UnknownContentType(u64),

    #[error("Unknown hash algorithm code: {0:#x}")]
    UnknownHashAlgorithm(u64),

    #[error("Digest length mismatch: expected {expected}, got {actual}")]
    DigestLength { expected: usize, actual: usize },

    #[error("{0} trailing bytes after CID")]
    TrailingBytes(usize),

    #[error("Malformed tree node: {0}")]
    MalformedTree(String),

    #[error("Tree links are not strictly sorted by name at {0:?}")]
    NonCanonicalTree(String),
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(Cid),

    #[error("Link not found: {0:?}")]
    LinkNotFound(String),

    #[error("Tag not found: {0:?}")]
    TagNotFound(String),

    #[error("Integrity violation: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Not a tree node at {0:?}")]
    NotATree(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),

    #[error("Multiplex store has no inner stores")]
    NoBackend,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    /// Recoverable misses: a fallback store or an auto-vivifying caller may carry on.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_) | StorageError::LinkNotFound(_) | StorageError::TagNotFound(_)
        )
    }

    pub(crate) fn io(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{}: {}", context, err),
        ))
    }
}

/// Errors surfaced at the command and CLI boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown remote: {0:?}")]
    UnknownRemote(String),

    #[error("No remote selected; pass --remote or set default_remote in the config")]
    NoRemote,

    #[error("Remote {0:?} has no tag store")]
    NoTagStore(String),

    #[error("Invalid reference {0:?}: not an existing path, a CID or a known tag")]
    InvalidReference(String),

    #[error("Cannot pull into non-empty directory {0}")]
    TargetNotEmpty(PathBuf),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::StorageError(StorageError::Decode(err))
    }
}
