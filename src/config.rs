//! Settings resolution.
//!
//! Priority, highest first:
//! 1. Command-line flag or environment variable (resolved by clap)
//! 2. TOML config file (`--config`, else `stage-tracker.toml` if present)
//! 3. Compiled defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "stage-tracker.toml";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            snapshot_dir: None,
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
    pub snapshot_dir: Option<PathBuf>,
}

/// Where the snapshot is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Snapshot(PathBuf),
    Postgres(String),
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the config file (if any) and apply overrides on top.
    pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut settings = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Settings::from_toml(&content)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    debug!(path = %default_path.display(), "using default config file");
                    Settings::from_toml(&std::fs::read_to_string(default_path)?)?
                } else {
                    Settings::default()
                }
            }
        };

        settings.apply(overrides);
        Ok(settings)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.database_url {
            self.database_url = Some(url);
        }
        if let Some(max) = overrides.max_connections {
            self.max_connections = max;
        }
        if let Some(dir) = overrides.snapshot_dir {
            self.snapshot_dir = Some(dir);
        }
    }

    /// A snapshot directory wins over a database URL.
    pub fn data_source(&self) -> Result<DataSource> {
        if let Some(dir) = &self.snapshot_dir {
            return Ok(DataSource::Snapshot(dir.clone()));
        }
        if let Some(url) = &self.database_url {
            return Ok(DataSource::Postgres(url.clone()));
        }
        Err(Error::Config(
            "set DATABASE_URL or --snapshot-dir to choose a data source".to_string(),
        ))
    }
}
