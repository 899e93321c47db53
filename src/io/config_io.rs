use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse taskdeck.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Load `taskdeck.toml` from the given directory. A missing file yields
/// the default config; a present but malformed file is an error.
pub fn read_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = dir.join("taskdeck.toml");
    if !config_path.exists() {
        return Ok(AppConfig::default());
    }
    let config_text = fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: AppConfig = toml::from_str(&config_text)?;
    Ok(config)
}
