use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Confusion dictionary file; `None` disables dictionary substitution.
    pub confusion_path: Option<PathBuf>,

    /// Ensemble participants in merge order, weakest to strongest.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Model used when the caller does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_models() -> Vec<String> {
    vec!["confusion".to_string()]
}

fn default_model() -> String {
    "confusion".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confusion_path: Self::default_confusion_path(),
            models: default_models(),
            default_model: default_model(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(confusion_path: Option<PathBuf>, models: Vec<String>) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".ccorrect.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        // Apply CLI overrides
        if let Some(path) = confusion_path {
            config.confusion_path = Some(path);
        }
        if !models.is_empty() {
            config.models = models;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        if other.confusion_path.is_some() {
            self.confusion_path = other.confusion_path;
        }
        if other.models != default_models() {
            self.models = other.models;
        }
        if other.default_model != default_model() {
            self.default_model = other.default_model;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ccorrect").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Default on-disk location for the confusion dictionary, when one has
    /// been installed there.
    pub fn default_confusion_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ccorrect").map(|dirs| dirs.data_dir().join("confusions.txt"))
    }
}
