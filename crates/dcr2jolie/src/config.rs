use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output configuration section
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the generated skeleton files are written to
    #[serde(default = "OutputConfig::default_directory")]
    directory: PathBuf,
}

impl OutputConfig {
    /// Create an output configuration with an explicit directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn default_directory() -> PathBuf {
        PathBuf::from("output")
    }

    /// Get the configured output directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
        }
    }
}
