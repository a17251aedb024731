//! Global config file source: `<user config dir>/multiverse/config.toml`
//! ($XDG_CONFIG_HOME/multiverse/config.toml on Linux)

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global config file, if the platform has a home directory
pub fn global_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| {
        dirs.config_dir()
            .join("multiverse")
            .join("config.toml")
    })
}

/// Add the global config file at `path` to the builder if it exists
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = path {
        if path.is_file() {
            builder = builder.add_source(File::from(path).required(false));
        } else {
            debug!(config_path = %path.display(), "No global configuration file");
        }
    }
    Ok(builder)
}
