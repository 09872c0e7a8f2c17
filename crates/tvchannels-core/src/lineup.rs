//! Lineup generation: a bounded channel list blended from several countries.
//!
//! Three phases:
//! 1. With `main_country_full`, every eligible channel of the first country.
//! 2. Each remaining country, in order, tops categories up to
//!    `min_per_category`. Eligible channels that do not fit go to a backfill
//!    pool, scored by `priority / (country_index + 1)`.
//! 3. The pool fills the remaining budget, best score first.
//!
//! The result is sorted by descending priority and cut to `limit`.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, ChannelsOptions};
use crate::error::Result;
use crate::models::{Channel, LineupEntry, RetransmitFilter};
use crate::search::{category_allowed, sort_by_priority};
use crate::source::CatalogSource;

pub const DEFAULT_LINEUP_LIMIT: usize = 256;
pub const DEFAULT_MIN_PER_CATEGORY: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Country codes in priority order.
    pub countries: Vec<String>,
    /// Category names to include. `None` includes all.
    pub categories: Option<Vec<String>>,
    pub retransmits: RetransmitFilter,
    /// Take every eligible channel of the first country before supplementing.
    pub main_country_full: bool,
    pub limit: usize,
    pub min_per_category: usize,
    /// Keep only free-to-air channels.
    pub free_only: bool,
    /// Abort with [`CatalogError::MissingCountry`](crate::CatalogError::MissingCountry)
    /// on an unknown country instead of skipping it.
    pub fail_on_missing: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            categories: None,
            retransmits: RetransmitFilter::All,
            main_country_full: false,
            limit: DEFAULT_LINEUP_LIMIT,
            min_per_category: DEFAULT_MIN_PER_CATEGORY,
            free_only: false,
            fail_on_missing: false,
        }
    }
}

impl GenerateOptions {
    pub fn for_countries<I, C>(countries: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            countries: countries.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Retransmit and free-only filters, sorted by descending priority.
    fn eligible<'a>(&self, channels: &'a [Channel]) -> Vec<&'a Channel> {
        let mut eligible: Vec<&Channel> = channels
            .iter()
            .filter(|ch| self.retransmits.accepts(ch) && (!self.free_only || ch.is_free))
            .collect();
        sort_by_priority(&mut eligible, |ch| ch.priority);
        eligible
    }
}

/// A channel that did not fit its category's minimum, waiting for backfill.
#[derive(Debug)]
struct Candidate {
    channel: Channel,
    country: String,
    category: String,
    country_index: usize,
    weighted_priority: f64,
}

/// Accumulates entries per category, in first-insertion order, without duplicates.
struct LineupBuilder {
    limit: usize,
    categories: Vec<(String, Vec<LineupEntry>)>,
    positions: HashMap<String, usize>,
    seen: HashSet<(String, String, String)>,
    total: usize,
}

impl LineupBuilder {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            categories: Vec::new(),
            positions: HashMap::new(),
            seen: HashSet::new(),
            total: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.total >= self.limit
    }

    fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.total)
    }

    fn count(&self, category: &str) -> usize {
        self.positions
            .get(category)
            .map_or(0, |&i| self.categories[i].1.len())
    }

    fn contains(&self, channel: &Channel, country: &str, category: &str) -> bool {
        self.seen
            .contains(&(country.to_string(), category.to_string(), channel.name.clone()))
    }

    /// Add an entry unless (country, category, name) is already present.
    fn add(&mut self, channel: &Channel, country: &str, category: &str) -> bool {
        let key = (country.to_string(), category.to_string(), channel.name.clone());
        if !self.seen.insert(key) {
            return false;
        }
        let position = match self.positions.get(category) {
            Some(&i) => i,
            None => {
                self.categories.push((category.to_string(), Vec::new()));
                self.positions
                    .insert(category.to_string(), self.categories.len() - 1);
                self.categories.len() - 1
            }
        };
        self.categories[position].1.push(LineupEntry {
            channel: channel.clone(),
            country: country.to_string(),
            category: category.to_string(),
        });
        self.total += 1;
        true
    }

    fn finish(self) -> Vec<LineupEntry> {
        let mut out: Vec<LineupEntry> = self
            .categories
            .into_iter()
            .flat_map(|(_, entries)| entries)
            .collect();
        sort_by_priority(&mut out, |entry| entry.channel.priority);
        out.truncate(self.limit);
        out
    }
}

fn canonical(code: &str) -> String {
    code.trim().to_lowercase()
}

impl<S: CatalogSource> Catalog<S> {
    /// Build a lineup from `options.countries`. See the module docs for the phases.
    ///
    /// Unknown countries are skipped unless `fail_on_missing` is set.
    #[tracing::instrument(
        name = "generate",
        skip(self, options),
        fields(countries = ?options.countries, limit = options.limit)
    )]
    pub async fn generate(&self, options: &GenerateOptions) -> Result<Vec<LineupEntry>> {
        let load = ChannelsOptions {
            fail_on_missing: options.fail_on_missing,
        };
        let categories = options.categories.as_deref();
        let mut lineup = LineupBuilder::new(options.limit);
        let mut pool: Vec<Candidate> = Vec::new();

        let mut country_index: HashMap<String, usize> = HashMap::new();
        for (i, code) in options.countries.iter().enumerate() {
            country_index.entry(canonical(code)).or_insert(i);
        }

        let (main, others) = match options.countries.split_first() {
            Some((first, rest)) if options.main_country_full => (Some(first), rest),
            _ => (None, options.countries.as_slice()),
        };

        // Phase 1: main country in full.
        if let Some(main) = main {
            if let Some(data) = self.channels(main, load).await? {
                let code = canonical(main);
                for category in self.ceilings().visit_order(data.keys().map(String::as_str)) {
                    if !category_allowed(categories, category) {
                        continue;
                    }
                    for ch in options.eligible(&data[category]) {
                        lineup.add(ch, &code, category);
                    }
                }
                tracing::debug!(country = %code, added = lineup.total, "Main country seeded");
            }
        }

        // Phase 2: top categories up to the minimum, pool the rest.
        'countries: for country in others {
            if lineup.is_full() {
                break;
            }
            let Some(data) = self.channels(country, load).await? else {
                tracing::debug!(%country, "Skipping unknown country");
                continue;
            };
            let code = canonical(country);
            let index = country_index.get(&code).copied().unwrap_or(options.countries.len());
            let divisor = (index + 1) as f64;

            for category in self.ceilings().visit_order(data.keys().map(String::as_str)) {
                if !category_allowed(categories, category) {
                    continue;
                }
                if lineup.is_full() {
                    break 'countries;
                }
                let eligible = options.eligible(&data[category]);
                let needed = options
                    .min_per_category
                    .saturating_sub(lineup.count(category));
                let take = needed.min(lineup.remaining()).min(eligible.len());

                for (i, ch) in eligible.into_iter().enumerate() {
                    if i < take {
                        lineup.add(ch, &code, category);
                        if lineup.is_full() {
                            break 'countries;
                        }
                    } else if !lineup.contains(ch, &code, category) {
                        pool.push(Candidate {
                            channel: ch.clone(),
                            country: code.clone(),
                            category: category.to_string(),
                            country_index: index,
                            weighted_priority: f64::from(ch.priority) / divisor,
                        });
                    }
                }
            }
        }

        // Phase 3: greedy backfill.
        if !lineup.is_full() && !pool.is_empty() {
            tracing::debug!(
                candidates = pool.len(),
                remaining = lineup.remaining(),
                "Backfilling lineup"
            );
            pool.sort_by(|a, b| {
                b.weighted_priority
                    .total_cmp(&a.weighted_priority)
                    .then_with(|| b.channel.priority.cmp(&a.channel.priority))
                    .then_with(|| a.country_index.cmp(&b.country_index))
            });
            for candidate in &pool {
                if lineup.is_full() {
                    break;
                }
                lineup.add(&candidate.channel, &candidate.country, &candidate.category);
            }
        }

        let out = lineup.finish();
        tracing::debug!(entries = out.len(), "Lineup generated");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::CatalogError;
    use crate::models::{RawCategoryMap, RawChannel};
    use crate::source::MemorySource;
    use crate::test_support::fixture_catalog;

    fn raw(entries: Vec<(&str, Vec<(&str, i64)>)>) -> RawCategoryMap {
        entries
            .into_iter()
            .map(|(category, channels)| {
                let channels = channels
                    .into_iter()
                    .map(|(name, priority)| RawChannel {
                        priority: Some(priority),
                        ..RawChannel::named(name)
                    })
                    .collect();
                (category.to_string(), channels)
            })
            .collect()
    }

    /// Two small countries with hand-checked outcomes.
    fn small_catalog() -> Catalog<MemorySource> {
        let a = raw(vec![
            ("News", vec![("Alpha News", 9), ("Alpha 24", 7), ("Alpha Local", 5)]),
            ("Shop", vec![("Alpha Shop", 4)]),
        ]);
        let b = raw(vec![
            ("News", vec![("Beta News", 9), ("Beta 24", 8)]),
            ("Sports", vec![("Beta Sports", 10)]),
        ]);
        Catalog::new(MemorySource::new().with_country("a", a).with_country("b", b))
    }

    fn names(entries: &[LineupEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.channel.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_supplement_then_backfill() {
        let catalog = small_catalog();
        let options = GenerateOptions {
            limit: 4,
            min_per_category: 1,
            ..GenerateOptions::for_countries(["a", "b"])
        };
        let out = catalog.generate(&options).await.unwrap();
        // Minimums: Alpha News, Alpha Shop, Beta Sports. Backfill: Alpha 24 (7/1)
        // beats Alpha Local (5/1), Beta News (9/2) and Beta 24 (8/2).
        assert_eq!(names(&out), vec!["Beta Sports", "Alpha News", "Alpha 24", "Alpha Shop"]);
    }

    #[tokio::test]
    async fn test_main_country_full_then_supplement() {
        let catalog = small_catalog();
        let options = GenerateOptions {
            main_country_full: true,
            limit: 10,
            min_per_category: 2,
            ..GenerateOptions::for_countries(["a", "b"])
        };
        let out = catalog.generate(&options).await.unwrap();
        assert_eq!(
            names(&out),
            vec![
                "Beta Sports",
                "Alpha News",
                "Beta News",
                "Beta 24",
                "Alpha 24",
                "Alpha Local",
                "Alpha Shop",
            ]
        );
        assert!(out.iter().all(|e| !e.country.is_empty() && !e.category.is_empty()));
    }

    #[tokio::test]
    async fn test_zero_minimum_routes_everything_through_backfill() {
        let catalog = small_catalog();
        let options = GenerateOptions {
            limit: 3,
            min_per_category: 0,
            ..GenerateOptions::for_countries(["a", "b"])
        };
        let out = catalog.generate(&options).await.unwrap();
        // Scores: Alpha News 9, Alpha 24 7, Alpha Local 5, Beta Sports 5, ...
        // Alpha Local and Beta Sports tie at 5; raw priority 10 wins.
        assert_eq!(names(&out), vec!["Beta Sports", "Alpha News", "Alpha 24"]);
    }

    #[tokio::test]
    async fn test_empty_countries_yield_empty() {
        let catalog = fixture_catalog();
        let out = catalog.generate(&GenerateOptions::default()).await.unwrap();
        assert!(out.is_empty());

        let full = GenerateOptions {
            main_country_full: true,
            ..Default::default()
        };
        assert!(catalog.generate(&full).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_respects_limit_and_tags() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            limit: 10,
            min_per_category: 2,
            ..GenerateOptions::for_countries(["br", "us"])
        };
        let out = catalog.generate(&options).await.unwrap();
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|e| e.country == "br" || e.country == "us"));
        assert!(out.iter().all(|e| !e.category.is_empty()));
        for pair in out.windows(2) {
            assert!(pair[0].channel.priority >= pair[1].channel.priority);
        }
    }

    #[tokio::test]
    async fn test_main_country_full_takes_whole_category() {
        let catalog = fixture_catalog();
        let br = catalog.get("br").await.unwrap().unwrap();
        let us = catalog.get("us").await.unwrap().unwrap();
        let options = GenerateOptions {
            main_country_full: true,
            categories: Some(vec!["Shop".into()]),
            limit: 500,
            min_per_category: 10,
            ..GenerateOptions::for_countries(["br", "us"])
        };
        let out = catalog.generate(&options).await.unwrap();

        let br_count = out.iter().filter(|e| e.country == "br").count();
        let us_count = out.iter().filter(|e| e.country == "us").count();
        assert_eq!(br_count, br["Shop"].len());
        assert_eq!(us_count, us["Shop"].len());
        assert!(out.iter().all(|e| e.category == "Shop"));
    }

    #[tokio::test]
    async fn test_main_country_exceeding_limit_is_truncated() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            main_country_full: true,
            limit: 5,
            ..GenerateOptions::for_countries(["br", "us"])
        };
        let out = catalog.generate(&options).await.unwrap();
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|e| e.country == "br"));
    }

    async fn eligible_parents(catalog: &Catalog<MemorySource>, countries: &[&str]) -> usize {
        let mut total = 0;
        for code in countries {
            let data = catalog.get(code).await.unwrap().unwrap();
            total += data
                .values()
                .flatten()
                .filter(|ch| RetransmitFilter::Parents.accepts(ch))
                .count();
        }
        total
    }

    #[tokio::test]
    async fn test_backfill_fills_to_limit() {
        let catalog = fixture_catalog();
        let eligible = eligible_parents(&catalog, &["br", "us"]).await;

        for limit in [12, 64] {
            let options = GenerateOptions {
                retransmits: RetransmitFilter::Parents,
                limit,
                min_per_category: 1,
                ..GenerateOptions::for_countries(["br", "us"])
            };
            let out = catalog.generate(&options).await.unwrap();
            assert_eq!(out.len(), limit.min(eligible), "limit {limit}");
            assert!(out.iter().all(|e| !e.channel.is_affiliate()));
        }
    }

    #[tokio::test]
    async fn test_weighted_priority_favors_earlier_countries() {
        let catalog = fixture_catalog();
        let countries = ["br", "us"];
        let limit = 20;

        let mut scored: Vec<(f64, u8, usize)> = Vec::new();
        for (index, code) in countries.iter().enumerate() {
            let data = catalog.get(code).await.unwrap().unwrap();
            for ch in data.values().flatten() {
                scored.push((f64::from(ch.priority) / (index + 1) as f64, ch.priority, index));
            }
        }
        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        let mut expected: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, _, index) in scored.iter().take(limit) {
            *expected.entry(countries[*index]).or_default() += 1;
        }

        let options = GenerateOptions {
            limit,
            min_per_category: 0,
            ..GenerateOptions::for_countries(countries)
        };
        let out = catalog.generate(&options).await.unwrap();
        let mut actual: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &out {
            *actual.entry(entry.country.as_str()).or_default() += 1;
        }
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_respects_category_filter() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            categories: Some(vec!["Shop".into()]),
            limit: 50,
            min_per_category: 5,
            ..GenerateOptions::for_countries(["br", "us"])
        };
        let out = catalog.generate(&options).await.unwrap();
        assert!(!out.is_empty());
        assert!(out.iter().all(|e| e.category == "Shop"));
    }

    #[tokio::test]
    async fn test_respects_free_only() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            free_only: true,
            limit: 50,
            min_per_category: 5,
            ..GenerateOptions::for_countries(["br", "us"])
        };
        let out = catalog.generate(&options).await.unwrap();
        assert!(!out.is_empty());
        assert!(out.iter().all(|e| e.channel.is_free));
    }

    #[tokio::test]
    async fn test_affiliates_only() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            retransmits: RetransmitFilter::Affiliates,
            limit: 30,
            min_per_category: 5,
            ..GenerateOptions::for_countries(["br"])
        };
        let out = catalog.generate(&options).await.unwrap();
        assert!(!out.is_empty());
        assert!(out.iter().all(|e| e.channel.is_affiliate()));
    }

    #[tokio::test]
    async fn test_deterministic() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            limit: 25,
            min_per_category: 3,
            ..GenerateOptions::for_countries(["us", "br", "mx"])
        };
        let first = catalog.generate(&options).await.unwrap();
        let second = catalog.generate(&options).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_no_duplicate_entries() {
        let catalog = fixture_catalog();
        let options = GenerateOptions {
            limit: 256,
            min_per_category: 2,
            ..GenerateOptions::for_countries(["br", "BR", "us"])
        };
        let out = catalog.generate(&options).await.unwrap();
        let mut keys = HashSet::new();
        for e in &out {
            assert!(keys.insert((&e.country, &e.category, &e.channel.name)), "{e:?}");
        }
        let br = catalog.get("br").await.unwrap().unwrap();
        let us = catalog.get("us").await.unwrap().unwrap();
        let everything = br.values().flatten().count() + us.values().flatten().count();
        assert_eq!(out.len(), everything);
    }

    #[tokio::test]
    async fn test_unknown_country_skipped_or_fatal() {
        let catalog = fixture_catalog();
        let lenient = GenerateOptions {
            limit: 15,
            min_per_category: 2,
            ..GenerateOptions::for_countries(["zz", "br"])
        };
        let with_unknown = catalog.generate(&lenient).await.unwrap();
        assert_eq!(with_unknown.len(), 15);
        assert!(with_unknown.iter().all(|e| e.country == "br"));

        let strict = GenerateOptions {
            fail_on_missing: true,
            ..lenient
        };
        assert!(matches!(
            catalog.generate(&strict).await,
            Err(CatalogError::MissingCountry { .. })
        ));
    }
}
