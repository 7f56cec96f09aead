//! User configuration: file format, location, and edit operations.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::core::constants::DEFAULT_BASE_URL;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// API root; defaults to the OpenRouter endpoint when unset.
    pub base_url: Option<String>,

    /// Render every stored turn after an answer instead of the answer
    /// alone. Defaults to on.
    pub full_history: Option<bool>,

    /// Render answers through the Markdown formatter. Defaults to on.
    pub markdown: Option<bool>,

    /// Fixed model override: new conversations start on this model instead
    /// of a random free one. Retries still rotate through free models.
    pub model: Option<String>,
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A `set`/`unset` named a key the config does not carry.
    UnknownKey(String),
    /// A `set` value did not parse for its key.
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {source}", path.display())
            }
            ConfigError::Write { path, source } => {
                write!(f, "Failed to write config at {}: {source}", path.display())
            }
            ConfigError::UnknownKey(key) => write!(f, "Unknown configuration key: {key}"),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {key}: {value}")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_path(&Self::config_path())
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::config_path())
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: config_path.to_path_buf(),
            source,
        };

        let parent = config_path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|source| ConfigError::Write {
            path: config_path.to_path_buf(),
            source: std::io::Error::other(source),
        })?;

        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file.write_all(contents.as_bytes()).map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(config_path)
            .map_err(|err| ConfigError::Write {
                path: config_path.to_path_buf(),
                source: err.error,
            })?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "gratis")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn full_history(&self) -> bool {
        self.full_history.unwrap_or(true)
    }

    pub fn markdown(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "base-url" => self.base_url = Some(value.to_string()),
            "model" => self.model = Some(value.to_string()),
            "full-history" => self.full_history = Some(parse_bool(key, value)?),
            "markdown" => self.markdown = Some(parse_bool(key, value)?),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "base-url" => self.base_url = None,
            "model" => self.model = None,
            "full-history" => self.full_history = None,
            "markdown" => self.markdown = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = Config::load_from_path(&dir.path().join("config.toml")).expect("load");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.full_history());
        assert!(config.markdown());
        assert!(config.model.is_none());
    }

    #[test]
    fn values_round_trip_through_toml() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("base-url", "http://localhost:8080/v1").expect("set");
        config.set("full-history", "off").expect("set");
        config.set("model", "vendor/picked-model").expect("set");
        config.save_to_path(&path).expect("save");

        let loaded = Config::load_from_path(&path).expect("load");
        assert_eq!(loaded.base_url(), "http://localhost:8080/v1");
        assert!(!loaded.full_history());
        assert_eq!(loaded.model.as_deref(), Some("vendor/picked-model"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.unset("theme"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn boolean_values_are_validated() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("markdown", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        config.set("markdown", "no").expect("set");
        assert!(!config.markdown());
    }

    #[test]
    fn unset_restores_the_default() {
        let mut config = Config::default();
        config.set("full-history", "off").expect("set");
        config.unset("full-history").expect("unset");
        assert!(config.full_history());
    }
}
