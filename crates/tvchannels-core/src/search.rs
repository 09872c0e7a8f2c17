//! Keyword search across one or more country catalogs.

use std::cmp::Reverse;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{Channel, RetransmitFilter, SearchHit};
use crate::normalize::normalize_keyword;
use crate::source::CatalogSource;

/// Default maximum number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Countries to scan, in order. `None` scans every known country.
    pub countries: Option<Vec<String>>,
    /// Category names to include. `None` includes all.
    pub categories: Option<Vec<String>>,
    pub retransmits: RetransmitFilter,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            countries: None,
            categories: None,
            retransmits: RetransmitFilter::All,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl<S: CatalogSource> Catalog<S> {
    /// Channels whose keywords or name contain `keywords`, ignoring case and accents.
    ///
    /// Results are ordered by descending priority (stable) and hold at most
    /// `limit` entries. Scanning stops once `limit` raw matches were collected,
    /// so later countries are only visited while the budget is not spent.
    /// Unknown countries are skipped.
    #[tracing::instrument(name = "search", skip(self, options), fields(limit = options.limit))]
    pub async fn search(&self, keywords: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        let countries = match &options.countries {
            Some(countries) => countries.clone(),
            None => self.countries().await?,
        };
        let needle = normalize_keyword(keywords);
        let limit = options.limit;
        let mut results: Vec<SearchHit> = Vec::new();

        'countries: for country in &countries {
            if results.len() >= limit {
                break;
            }
            let Some(data) = self.get(country).await? else {
                tracing::debug!(%country, "Skipping unknown country");
                continue;
            };
            let code = country.trim().to_lowercase();

            for category in self.ceilings().visit_order(data.keys().map(String::as_str)) {
                if !category_allowed(options.categories.as_deref(), category) {
                    continue;
                }
                let mut matching: Vec<&Channel> = data[category]
                    .iter()
                    .filter(|ch| options.retransmits.accepts(ch) && matches_needle(ch, &needle))
                    .collect();
                sort_by_priority(&mut matching, |ch| ch.priority);

                for ch in matching {
                    if results.len() >= limit {
                        break 'countries;
                    }
                    results.push(SearchHit {
                        channel: ch.clone(),
                        country: code.clone(),
                    });
                }
            }
        }

        sort_by_priority(&mut results, |hit| hit.channel.priority);
        results.truncate(limit);
        tracing::debug!(needle = %needle, results = results.len(), "Search finished");
        Ok(results)
    }
}

/// Needle containment in the normalized "keywords name" haystack.
fn matches_needle(channel: &Channel, needle: &str) -> bool {
    let haystack = normalize_keyword(&format!("{} {}", channel.keywords, channel.name));
    haystack.contains(needle)
}

pub(crate) fn category_allowed(filter: Option<&[String]>, category: &str) -> bool {
    filter.map_or(true, |allowed| allowed.iter().any(|c| c == category))
}

/// Stable sort by descending priority; equal priorities keep their order.
pub(crate) fn sort_by_priority<T>(items: &mut [T], priority: impl Fn(&T) -> u8) {
    items.sort_by_key(|item| Reverse(priority(item)));
}
