//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from the local project directory or the platform config directory.

use std::{fs, path::Path};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use dcr2jolie::{Dcr2JolieError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),
}

impl From<ConfigError> for Dcr2JolieError {
    fn from(err: ConfigError) -> Self {
        Dcr2JolieError::Io(std::io::Error::other(err.to_string()))
    }
}

/// Find and load configuration
///
/// Search order:
/// 1. Local project directory (dcr2jolie/config.toml)
/// 2. Platform-specific config directory
/// 3. Default config if none found
///
/// # Errors
///
/// Returns error if a config file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig, Dcr2JolieError> {
    // 1. Try the local project directory
    let local_config = Path::new("dcr2jolie/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 2. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "dcr2jolie", "dcr2jolie") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(&system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 3. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, Dcr2JolieError> {
    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}
