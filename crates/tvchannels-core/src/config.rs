use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::category::{CategoryCeilings, BUILTIN_CEILINGS};
use crate::error::CatalogError;
use crate::lineup::GenerateOptions;
use crate::search::SearchOptions;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub catalog: SourceConfig,
    pub search: SearchConfig,
    pub lineup: LineupConfig,
    pub ceilings: CeilingsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupConfig {
    pub limit: usize,
    pub min_per_category: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingsConfig {
    pub default: u8,
    #[serde(default)]
    pub categories: BTreeMap<String, u8>,
}

impl CatalogConfig {
    /// Load config: user file (if exists) replaces built-in defaults.
    pub fn load() -> Result<Self, CatalogError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("tvchannels.toml"))
    }

    /// Catalog root: the configured directory, else the platform data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.catalog
            .data_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|d| d.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ceiling table. An empty `categories` table means the built-in one.
    pub fn ceilings(&self) -> CategoryCeilings {
        if self.ceilings.categories.is_empty() {
            CategoryCeilings::new(
                BUILTIN_CEILINGS
                    .entries()
                    .map(|(name, ceiling)| (name.to_string(), *ceiling)),
                self.ceilings.default,
            )
        } else {
            CategoryCeilings::new(self.ceilings.categories.clone(), self.ceilings.default)
        }
    }

    /// Search options seeded with the configured limit.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.search.limit,
            ..Default::default()
        }
    }

    /// Lineup options seeded with the configured limit and minimum.
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            limit: self.lineup.limit,
            min_per_category: self.lineup.min_per_category,
            ..Default::default()
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "tvchannels")
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
