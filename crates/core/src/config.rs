//! Application configuration.
//!
//! A single JSON file under the user's config directory, layered with
//! `TIMESTUI_*` environment overrides. A missing file is written out with
//! defaults on startup so players have something to edit.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::game::Difficulty;

/// Directory under the platform config root holding our files.
pub const CONFIG_DIR: &str = "timestui";
/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

const ENV_PREFIX: &str = "TIMESTUI";

/// Errors raised while loading or bootstrapping configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file or environment layers could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    /// The default config file could not be written.
    #[error("failed to write default configuration to {path}: {source}")]
    Write {
        /// Path we attempted to create.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The default config could not be serialized.
    #[error("failed to serialize default configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Settings applied when the application starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Difficulty the first session starts at.
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl AppConfig {
    /// Load configuration from the default path with `TIMESTUI_*`
    /// environment overrides on top.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_layered(default_config_path(), ENV_PREFIX)
    }

    /// Load from an explicit path and environment prefix. Defaults apply
    /// for anything the file and environment leave unset; a missing file
    /// is fine, a malformed one is not.
    pub fn load_layered(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("difficulty", "easy")?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Absolute path of the config file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a default config file if none exists yet, returning its path.
pub fn ensure_default_config() -> Result<PathBuf, ConfigError> {
    let path = default_config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

fn ensure_default_config_at(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let serialized = serde_json::to_vec_pretty(&AppConfig::default())?;
    fs::write(path, serialized).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_when_file_is_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let cfg = AppConfig::load_layered(&path, "TIMESTUI_TEST_NONE").unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Easy);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "difficulty": "hard" }"#).unwrap();
        let cfg = AppConfig::load_layered(&path, "TIMESTUI_TEST_NONE").unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Hard);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "difficulty": "easy" }"#).unwrap();
        std::env::set_var("TIMESTUI_TEST_ENV_DIFFICULTY", "medium");
        let cfg = AppConfig::load_layered(&path, "TIMESTUI_TEST_ENV").unwrap();
        std::env::remove_var("TIMESTUI_TEST_ENV_DIFFICULTY");
        assert_eq!(cfg.difficulty, Difficulty::Medium);
    }

    #[test]
    fn malformed_difficulty_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "difficulty": "brutal" }"#).unwrap();
        assert!(AppConfig::load_layered(&path, "TIMESTUI_TEST_NONE").is_err());
    }

    #[test]
    fn ensure_writes_default_file_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        ensure_default_config_at(&path).unwrap();
        assert!(path.exists());

        let cfg = AppConfig::load_layered(&path, "TIMESTUI_TEST_NONE").unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Easy);

        // Second call must leave an edited file alone.
        fs::write(&path, r#"{ "difficulty": "hard" }"#).unwrap();
        ensure_default_config_at(&path).unwrap();
        let cfg = AppConfig::load_layered(&path, "TIMESTUI_TEST_NONE").unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Hard);
    }
}
