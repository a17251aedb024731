//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StorageError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StorageError(StorageError::Integrity { expected, actual }) => format!(
            "Integrity violation: expected {}, got {}. The local and remote hash functions \
             disagree or the data was corrupted in transit.",
            expected, actual
        ),
        _ => e.to_string(),
    }
}
