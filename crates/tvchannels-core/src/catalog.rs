//! Country code to normalized catalog, with an in-process cache.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::category::CategoryCeilings;
use crate::error::{CatalogError, Result, SourceError};
use crate::models::{normalize_catalog, CountryCatalog};
use crate::source::CatalogSource;

/// Options for [`Catalog::channels`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelsOptions {
    /// Report an unknown country as [`CatalogError::MissingCountry`] instead of `None`.
    pub fail_on_missing: bool,
}

/// Normalized, cached access to a [`CatalogSource`].
///
/// Each country is loaded and normalized once; later calls with the same code
/// (in any letter case) return the same `Arc`. The cache lives as long as the
/// `Catalog` and is only emptied by [`Catalog::clear_cache`] or
/// [`Catalog::set_source_root`].
pub struct Catalog<S> {
    source: S,
    ceilings: CategoryCeilings,
    cache: RwLock<HashMap<String, Arc<CountryCatalog>>>,
    /// Bumped on every cache clear, under the cache write lock.
    generation: AtomicU64,
}

impl<S: CatalogSource> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            ceilings: CategoryCeilings::builtin(),
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Use a different ceiling table. Only affects countries loaded afterwards.
    pub fn with_ceilings(mut self, ceilings: CategoryCeilings) -> Self {
        self.ceilings = ceilings;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ceilings(&self) -> &CategoryCeilings {
        &self.ceilings
    }

    /// Shorthand for [`Catalog::channels`] with default options.
    pub async fn get(&self, country: &str) -> Result<Option<Arc<CountryCatalog>>> {
        self.channels(country, ChannelsOptions::default()).await
    }

    /// Normalized catalog for `country`, or `None` if the code is empty or unknown.
    ///
    /// Source failures other than "not found" are returned unchanged.
    pub async fn channels(
        &self,
        country: &str,
        options: ChannelsOptions,
    ) -> Result<Option<Arc<CountryCatalog>>> {
        let code = country.trim().to_lowercase();
        if code.is_empty() {
            return Ok(None);
        }

        if let Some(hit) = self.cache.read().await.get(&code) {
            tracing::debug!(country = %code, "Catalog cache hit");
            return Ok(Some(Arc::clone(hit)));
        }

        // The lock is not held across the load; concurrent misses may load twice.
        let generation = self.generation.load(Ordering::Acquire);
        let raw = match self.source.load_country(&code).await {
            Ok(raw) => raw,
            Err(SourceError::NotFound { location }) => {
                if options.fail_on_missing {
                    return Err(CatalogError::MissingCountry { location });
                }
                tracing::debug!(country = %code, %location, "No catalog for country");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let catalog = Arc::new(normalize_catalog(raw, &self.ceilings));
        tracing::debug!(
            country = %code,
            categories = catalog.len(),
            channels = catalog.values().map(Vec::len).sum::<usize>(),
            "Catalog loaded"
        );
        let mut cache = self.cache.write().await;
        if self.generation.load(Ordering::Acquire) != generation {
            // Cleared while loading: the result may come from a previous root.
            tracing::debug!(country = %code, "Cache cleared during load, not caching");
            return Ok(Some(catalog));
        }
        // A concurrent load may have finished first; keep whichever landed first.
        Ok(Some(Arc::clone(cache.entry(code).or_insert(catalog))))
    }

    /// All known country codes, sorted, as reported by the source.
    pub async fn countries(&self) -> Result<Vec<String>> {
        Ok(self.source.load_country_list().await?)
    }

    /// Redirect the source to a new root and drop every cached country.
    ///
    /// On failure neither the source nor the cache change.
    pub async fn set_source_root(&self, root: &Path) -> Result<()> {
        self.source.set_root(root)?;
        self.clear_cache().await;
        tracing::info!(root = %root.display(), "Catalog source redirected");
        Ok(())
    }

    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        cache.clear();
    }

    /// Number of countries currently cached.
    pub async fn cached_countries(&self) -> usize {
        self.cache.read().await.len()
    }
}
