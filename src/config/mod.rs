//! Search settings loaded from a JSON file
//!
//! Lookup order: an explicit path, then `<config dir>/vidsearch/config.json`,
//! then built-in defaults. Missing keys in the file fall back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Relevance weight applied to each indexed field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBoosts {
    pub title: f32,
    pub speaker: f32,
    pub tags: f32,
    pub channel_title: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            title: 2.0,
            speaker: 1.5,
            tags: 1.0,
            channel_title: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the corpus of `.json` documents
    pub docs_dir: Option<PathBuf>,
    pub hits_per_page: usize,
    pub max_hits_per_query: usize,
    /// Field results are sorted on (descending)
    pub sort_property: String,
    pub boosts: FieldBoosts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: None,
            hits_per_page: 20,
            max_hits_per_query: 20,
            sort_property: "satisfaction".to_string(),
            boosts: FieldBoosts::default(),
        }
    }
}

impl Config {
    /// Default config location (~/.config/vidsearch/config.json on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vidsearch").join("config.json"))
    }

    /// Load config from `path`, or from the default location if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
