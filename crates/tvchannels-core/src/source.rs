//! Catalog sources: where raw per-country catalogs come from.
//!
//! The core never touches storage directly. It asks a [`CatalogSource`] for a
//! raw category map and the list of known country codes, and normalizes and
//! caches the results itself.

use std::collections::BTreeMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use walkdir::WalkDir;

use crate::error::SourceError;
use crate::models::RawCategoryMap;

/// File listing every known country code, inside the `channels/` directory.
const COUNTRIES_FILE: &str = "countries.json";

/// Directory under the source root holding one JSON file per country.
const CHANNELS_DIR: &str = "channels";

/// Loader interface consumed by [`Catalog`](crate::catalog::Catalog).
pub trait CatalogSource: Send + Sync {
    /// Load the raw catalog for a lowercased country code.
    ///
    /// Must fail with [`SourceError::NotFound`] when no catalog exists for `code`.
    fn load_country(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<RawCategoryMap, SourceError>> + Send;

    /// Load the sorted list of all known country codes.
    fn load_country_list(&self) -> impl Future<Output = Result<Vec<String>, SourceError>> + Send;

    /// Human-readable location of `code`'s catalog, for error messages.
    fn locate(&self, code: &str) -> String;

    /// Point the source at a different storage root.
    fn set_root(&self, _root: &Path) -> Result<(), SourceError> {
        Err(SourceError::Unsupported)
    }
}

/// Reads `<root>/channels/<code>.json` and `<root>/channels/countries.json`.
#[derive(Debug)]
pub struct FsSource {
    root: RwLock<PathBuf>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: RwLock::new(root.into()),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.root
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn channels_dir(&self) -> PathBuf {
        self.root().join(CHANNELS_DIR)
    }

    pub fn country_path(&self, code: &str) -> PathBuf {
        self.channels_dir().join(format!("{code}.json"))
    }

    /// Country codes that have a catalog file, sorted. Ignores `countries.json`.
    pub fn country_files(&self) -> Result<Vec<String>, SourceError> {
        let dir = self.channels_dir();
        let mut codes = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("json")
                || path.file_name().and_then(|n| n.to_str()) == Some(COUNTRIES_FILE)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                codes.push(stem.to_string());
            }
        }
        codes.sort();
        Ok(codes)
    }

    /// Overwrite `code`'s catalog file with `raw`, pretty-printed.
    pub async fn write_country(&self, code: &str, raw: &RawCategoryMap) -> Result<(), SourceError> {
        let path = self.country_path(code);
        let mut content = serde_json::to_string_pretty(raw).map_err(|e| SourceError::Parse {
            location: path.display().to_string(),
            source: e,
        })?;
        content.push('\n');
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
        let location = path.display().to_string();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound { location });
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse { location, source })
    }
}

/// Codes are used as file names; anything that could leave the directory is unknown.
fn is_plain_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

impl CatalogSource for FsSource {
    async fn load_country(&self, code: &str) -> Result<RawCategoryMap, SourceError> {
        let path = self.country_path(code);
        if !is_plain_code(code) {
            return Err(SourceError::NotFound {
                location: path.display().to_string(),
            });
        }
        Self::read_json(&path).await
    }

    async fn load_country_list(&self) -> Result<Vec<String>, SourceError> {
        let path = self.channels_dir().join(COUNTRIES_FILE);
        Self::read_json(&path).await
    }

    fn locate(&self, code: &str) -> String {
        self.country_path(code).display().to_string()
    }

    fn set_root(&self, root: &Path) -> Result<(), SourceError> {
        let resolved = std::fs::canonicalize(root).map_err(|_| SourceError::InvalidRoot {
            path: root.to_path_buf(),
        })?;
        if !resolved.is_dir() {
            return Err(SourceError::InvalidRoot { path: resolved });
        }
        *self
            .root
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = resolved;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum MemoryEntry {
    Catalog(RawCategoryMap),
    Broken(String),
}

/// In-memory source, for embedding a catalog without files and for tests.
///
/// Counts how many times a country catalog was loaded.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: BTreeMap<String, MemoryEntry>,
    loads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, code: impl Into<String>, raw: RawCategoryMap) -> Self {
        self.entries.insert(code.into(), MemoryEntry::Catalog(raw));
        self
    }

    /// Register a code whose load fails with an IO error carrying `message`.
    pub fn with_broken(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.entries
            .insert(code.into(), MemoryEntry::Broken(message.into()));
        self
    }

    /// Number of `load_country` calls that reached this source.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl CatalogSource for MemorySource {
    async fn load_country(&self, code: &str) -> Result<RawCategoryMap, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.entries.get(code) {
            Some(MemoryEntry::Catalog(raw)) => Ok(raw.clone()),
            Some(MemoryEntry::Broken(message)) => Err(std::io::Error::other(message.clone()).into()),
            None => Err(SourceError::NotFound {
                location: self.locate(code),
            }),
        }
    }

    async fn load_country_list(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn locate(&self, code: &str) -> String {
        format!("memory://{code}")
    }
}
