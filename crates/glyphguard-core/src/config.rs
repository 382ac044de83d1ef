use etcetera::BaseStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::table::{ConfusableEntry, ConfusableTable, TableError};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GLYPHGUARD_CONFIG";

/// Try both `.yaml` and `.yml` extensions in a directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    let yaml = dir.join("config.yaml");
    if yaml.exists() {
        return Some(yaml);
    }
    let yml = dir.join("config.yml");
    if yml.exists() {
        return Some(yml);
    }
    None
}

/// Table configuration loaded from YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path this config was loaded from.
    #[serde(skip)]
    pub path: Option<String>,

    /// Extra confusables (extends the built-in table, overriding on conflict).
    pub additional_confusables: Vec<ExtraConfusable>,
}

/// A confusable written as literal text, e.g. `source: "ꞵ"`, `target: "B"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraConfusable {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse yaml config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("additional confusable #{index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },
    #[error("invalid confusable table: {0}")]
    Table(#[from] TableError),
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str::<Config>(content)?)
    }

    /// Load a config file, recording where it came from.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        config.path = Some(path.display().to_string());
        Ok(config)
    }

    /// Discover and load config: `$GLYPHGUARD_CONFIG` first, then the user
    /// config directory. Falls back to defaults when nothing usable is found.
    ///
    /// This is for callers that want a user-tunable table. The engine itself
    /// never reads files or the environment: [`ConfusableTable::builtin`] and
    /// the crate-level functions always use the compiled-in table, and a
    /// discovered config only takes effect through [`Config::build_table`].
    pub fn discover() -> Self {
        // Check env override first
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_or_default(Path::new(&path));
        }

        match user_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Config::default(),
        }
    }

    fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::debug!(
                    target: "glyphguard::config",
                    path = %path.display(),
                    extra = config.additional_confusables.len(),
                    "loaded config"
                );
                config
            }
            Err(e) => {
                tracing::warn!(
                    target: "glyphguard::config",
                    path = %path.display(),
                    error = %e,
                    "ignoring config, using defaults"
                );
                Config::default()
            }
        }
    }

    /// The built-in table extended with [`Config::additional_confusables`].
    ///
    /// Both sides are decomposed first so entries written with precomposed
    /// characters still match.
    pub fn build_table(&self) -> Result<ConfusableTable, ConfigError> {
        let mut extra = Vec::with_capacity(self.additional_confusables.len());
        for (index, item) in self.additional_confusables.iter().enumerate() {
            let pattern: Vec<char> = item.source.nfd().collect();
            let replacement: Vec<char> = item.target.nfd().collect();
            if pattern.is_empty() {
                return Err(ConfigError::EmptyField {
                    index,
                    field: "source",
                });
            }
            if replacement.is_empty() {
                return Err(ConfigError::EmptyField {
                    index,
                    field: "target",
                });
            }
            extra.push(ConfusableEntry::new(pattern, replacement));
        }

        if extra.is_empty() {
            return Ok(ConfusableTable::builtin().clone());
        }
        Ok(ConfusableTable::builtin().extended(extra)?)
    }
}

/// Get user-level config path.
fn user_config_path() -> Option<PathBuf> {
    find_config_in_dir(&config_dir()?)
}

/// Get glyphguard config directory.
pub fn config_dir() -> Option<PathBuf> {
    let base = etcetera::choose_base_strategy().ok()?;
    Some(base.config_dir().join("glyphguard"))
}
