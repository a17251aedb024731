//! CLI route: single route table and run context. Dispatches to commands and presentation.

use crate::cid::Cid;
use crate::cli::parse::{Commands, TagCommands};
use crate::cli::presentation::{
    format_diff, format_pull_report, format_push_report, format_status, format_tag_list_json,
    format_tag_list_text,
};
use crate::commands::{diff_references, pull, push, status, Reference};
use crate::config::{ConfigLoader, MultiverseConfig, RemoteStores};
use crate::error::{ApiError, StorageError};
use crate::ignore::IgnoreRules;
use crate::store::{BlobStore, MemoryStore};
use crate::tags::TagStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded config and the selected remote name
pub struct RunContext {
    config: MultiverseConfig,
    remote: Option<String>,
    color: bool,
}

impl RunContext {
    /// Load and validate configuration. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        remote: Option<String>,
    ) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::from_config(config, remote))
    }

    /// Build a context around an already loaded config
    pub fn from_config(config: MultiverseConfig, remote: Option<String>) -> Self {
        Self {
            config,
            remote,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &MultiverseConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Push { path, tag } => self.handle_push(path, tag.as_deref()),
            Commands::Pull { reference, dir } => self.handle_pull(reference, dir),
            Commands::Status { path } => self.handle_status(path),
            Commands::Diff { from, to } => self.handle_diff(from, to),
            Commands::Tag { command } => self.handle_tag(command),
        }
    }

    fn open_remote(&self) -> Result<(String, RemoteStores), ApiError> {
        self.config.ensure_valid()?;
        let (name, remote) = self.config.resolve_remote(self.remote.as_deref())?;
        info!(remote = name, "Using remote");
        Ok((name.to_string(), remote.open()?))
    }

    fn tag_store(&self) -> Result<Arc<dyn TagStore>, ApiError> {
        let (name, stores) = self.open_remote()?;
        stores.tags.ok_or(ApiError::NoTagStore(name))
    }

    fn handle_push(&self, path: &Path, tag: Option<&str>) -> Result<String, ApiError> {
        let (name, stores) = self.open_remote()?;
        // Fail before uploading anything if the tag cannot be recorded.
        let tags = match tag {
            Some(_) => Some(stores.tags.clone().ok_or(ApiError::NoTagStore(name))?),
            None => None,
        };

        let report = push(path, IgnoreRules::for_root(path), &stores.blobs)?;

        if let (Some(tags), Some(tag)) = (tags, tag) {
            tags.set(tag, &report.root)?;
        }
        Ok(format_push_report(&report, tag))
    }

    fn handle_pull(&self, reference: &str, dir: &Path) -> Result<String, ApiError> {
        let (_, stores) = self.open_remote()?;
        let cid = resolve_cid(reference, stores.tags.as_deref())?;
        let report = pull(&stores.blobs, &cid, dir)?;
        Ok(format_pull_report(&report, dir))
    }

    fn handle_status(&self, path: &Path) -> Result<String, ApiError> {
        let (_, stores) = self.open_remote()?;
        let entries = status(path, IgnoreRules::for_root(path), &stores.blobs)?;
        Ok(format_status(&entries, self.color))
    }

    fn handle_diff(&self, from: &str, to: &str) -> Result<String, ApiError> {
        // Two local paths can be diffed without any remote configured.
        let stores = match self.open_remote() {
            Ok((_, stores)) => Some(stores),
            Err(ApiError::NoRemote) => None,
            Err(e) => return Err(e),
        };
        let tags = stores.as_ref().and_then(|s| s.tags.clone());

        let from = Reference::resolve(from, tags.as_deref())?;
        let to = Reference::resolve(to, tags.as_deref())?;
        debug!(from = %from, to = %to, "Resolved diff references");

        let store: Arc<dyn BlobStore> = match stores {
            Some(stores) => stores.blobs,
            None => Arc::new(MemoryStore::new()),
        };
        let entries = diff_references(store, &from, &to)?;
        Ok(format_diff(&entries, self.color))
    }

    fn handle_tag(&self, command: &TagCommands) -> Result<String, ApiError> {
        let tags = self.tag_store()?;
        match command {
            TagCommands::Set { name, target } => {
                let cid = resolve_cid(target, Some(tags.as_ref()))?;
                tags.set(name, &cid)?;
                Ok(format!("{} -> {}", name, cid))
            }
            TagCommands::Get { name } => Ok(tags.get(name)?.to_string()),
            TagCommands::List { format } => {
                let list = tags.list()?;
                if format == "json" {
                    format_tag_list_json(&list)
                } else {
                    Ok(format_tag_list_text(&list))
                }
            }
        }
    }
}

/// A CID string, else a tag name looked up in `tags`
fn resolve_cid(input: &str, tags: Option<&dyn TagStore>) -> Result<Cid, ApiError> {
    if let Ok(cid) = Cid::decode(input) {
        return Ok(cid);
    }
    match tags.map(|tags| tags.get(input)) {
        Some(Ok(cid)) => Ok(cid),
        Some(Err(e)) if !e.is_not_found() && !matches!(e, StorageError::InvalidTagName(_)) => {
            Err(e.into())
        }
        _ => Err(ApiError::InvalidReference(input.to_string())),
    }
}
