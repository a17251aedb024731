//! Configuration System
//!
//! Named remotes and logging settings, merged from built-in defaults, the global config
//! file and the workspace config file.
//!
//! ```toml
//! default_remote = "local"
//!
//! [remotes.local]
//! path = "/srv/multiverse"
//! tags = "sled"
//!
//! [remotes.shared]
//! url = "blobs.example.com:8080"
//! ```

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::store::{BlobStore, FileStore, RemoteStore};
use crate::tags::{FileTagStore, SledTagStore, TagStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::{workspace_config_path, WORKSPACE_CONFIG_FILE};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiverseConfig {
    /// Remote used when none is named on the command line
    #[serde(default)]
    pub default_remote: Option<String>,

    #[serde(default)]
    pub remotes: BTreeMap<String, RemoteConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tag store backend for a path remote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagBackend {
    #[default]
    File,
    Sled,
}

/// A named remote: a local directory or an HTTP server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Directory holding `blobs/` and the tag store
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// `host:port` or full URL of a blob server
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub tags: TagBackend,
}

/// Stores opened for one remote
#[derive(Clone)]
pub struct RemoteStores {
    pub blobs: Arc<dyn BlobStore>,
    /// HTTP remotes carry no tag store
    pub tags: Option<Arc<dyn TagStore>>,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Remote(String, String),
    DefaultRemote(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Remote(name, msg) => write!(f, "Remote '{}': {}", name, msg),
            ValidationError::DefaultRemote(msg) => write!(f, "default_remote: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RemoteConfig {
    pub fn validate(&self) -> Result<(), String> {
        match (&self.path, &self.url) {
            (Some(_), Some(_)) => Err("Set either 'path' or 'url', not both".to_string()),
            (None, None) => Err("One of 'path' or 'url' is required".to_string()),
            (Some(path), None) if path.as_os_str().is_empty() => {
                Err("Path cannot be empty".to_string())
            }
            (None, Some(url)) if url.trim().is_empty() => Err("URL cannot be empty".to_string()),
            _ => Ok(()),
        }
    }

    /// Open the blob store and tag store this remote describes
    ///
    /// A path remote keeps blobs under `<path>/blobs` and tags under `<path>/tags`
    /// (`<path>/tags.db` for sled).
    pub fn open(&self) -> Result<RemoteStores, ApiError> {
        self.validate().map_err(ApiError::ConfigError)?;

        if let Some(root) = &self.path {
            debug!(path = %root.display(), tags = ?self.tags, "Opening path remote");
            let blobs: Arc<dyn BlobStore> = Arc::new(FileStore::open(root.join("blobs"))?);
            let tags: Arc<dyn TagStore> = match self.tags {
                TagBackend::File => Arc::new(FileTagStore::open(root.join("tags"))?),
                TagBackend::Sled => Arc::new(SledTagStore::new(root.join("tags.db"))?),
            };
            return Ok(RemoteStores {
                blobs,
                tags: Some(tags),
            });
        }

        match &self.url {
            Some(url) => {
                debug!(url = %url, "Opening HTTP remote");
                Ok(RemoteStores {
                    blobs: Arc::new(RemoteStore::new(url)?),
                    tags: None,
                })
            }
            None => Err(ApiError::ConfigError(
                "One of 'path' or 'url' is required".to_string(),
            )),
        }
    }
}

impl MultiverseConfig {
    /// Validate the entire configuration, reporting every problem at once
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (name, remote) in &self.remotes {
            if let Err(e) = remote.validate() {
                errors.push(ValidationError::Remote(name.clone(), e));
            }
        }

        if let Some(default) = &self.default_remote {
            if !self.remotes.contains_key(default) {
                errors.push(ValidationError::DefaultRemote(format!(
                    "Unknown remote '{}'",
                    default
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Pick a remote: the explicit name, else `default_remote`, else the only remote
    pub fn resolve_remote(
        &self,
        explicit: Option<&str>,
    ) -> Result<(&str, &RemoteConfig), ApiError> {
        let name = match explicit.or(self.default_remote.as_deref()) {
            Some(name) => name,
            None if self.remotes.len() == 1 => {
                return self
                    .remotes
                    .iter()
                    .next()
                    .map(|(name, remote)| (name.as_str(), remote))
                    .ok_or(ApiError::NoRemote);
            }
            None => return Err(ApiError::NoRemote),
        };

        self.remotes
            .get_key_value(name)
            .map(|(name, remote)| (name.as_str(), remote))
            .ok_or_else(|| ApiError::UnknownRemote(name.to_string()))
    }

    /// Validate, then fold every problem into one `ApiError::ConfigError`
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
