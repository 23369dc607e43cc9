//! User configuration loaded from `config.toml`

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::walker::ExtensionFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the fingerprint database
    pub store_path: PathBuf,
    /// Extensions (with leading dot) never scanned
    pub exclude_extensions: Vec<String>,
    /// How long a store operation waits on a locked database
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_data_dir().join("fingerprints.db"),
            exclude_extensions: Vec::new(),
            busy_timeout_ms: 2000,
        }
    }
}

impl Config {
    /// Load the user config, falling back to defaults
    ///
    /// A missing file is not an error. An unreadable or malformed file is
    /// logged and ignored.
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Excluded extensions from config plus any given on the command line
    pub fn extension_filter(&self, extra: &[String]) -> ExtensionFilter {
        ExtensionFilter::new(self.exclude_extensions.iter().chain(extra))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Path of the user config file, if a home directory can be resolved
pub fn config_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "changescan")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".changescan"))
}
