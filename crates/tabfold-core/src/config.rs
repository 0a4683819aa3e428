//! Host configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabfold_tabs::TabSetSpec;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Path to the database file holding tab preferences
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Tab sets attached on startup
    #[serde(default)]
    pub tab_sets: Vec<TabSetSpec>,
}

fn default_database_path() -> PathBuf {
    Config::data_dir().join("tabfold.db")
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("tabfold.db"),
            tab_sets: Vec::new(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("tabfold"))
            .unwrap_or_else(|| PathBuf::from(".tabfold"))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            tab_sets = config.tab_sets.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Tab sets share one document, so their generated ids must not collide.
    fn validate(&self) -> Result<()> {
        for (index, set) in self.tab_sets.iter().enumerate() {
            if self.tab_sets[..index]
                .iter()
                .any(|other| other.tab_prefix == set.tab_prefix)
            {
                return Err(CoreError::Config(format!(
                    "tab prefix '{}' used by more than one tab set",
                    set.tab_prefix
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
