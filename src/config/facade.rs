//! Configuration loader: merges defaults, global file and workspace file

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, workspace_file};
use crate::config::MultiverseConfig;
use crate::error::ApiError;
use config::{File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace
    ///
    /// Precedence, lowest to highest: built-in defaults, the global file, then
    /// `<workspace_root>/.multiverse.toml`.
    pub fn load(workspace_root: &Path) -> Result<MultiverseConfig, ApiError> {
        let global = global_file::global_config_path();
        Self::load_layers(global.as_deref(), workspace_root)
    }

    /// Same as `load`, with an explicit global file location
    pub fn load_layers(
        global: Option<&Path>,
        workspace_root: &Path,
    ) -> Result<MultiverseConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;

        let config: MultiverseConfig = builder.build()?.try_deserialize()?;
        debug!(remotes = config.remotes.len(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single TOML file over the defaults, ignoring global and workspace files
    pub fn load_from_file(path: &Path) -> Result<MultiverseConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Built-in defaults only
    pub fn default() -> MultiverseConfig {
        MultiverseConfig::default()
    }
}
