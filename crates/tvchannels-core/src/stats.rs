//! Per-country catalog counts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::source::CatalogSource;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountryStats {
    pub country: String,
    pub total: usize,
    pub free: usize,
    pub affiliates: usize,
    pub categories: BTreeMap<String, usize>,
}

impl<S: CatalogSource> Catalog<S> {
    /// Channel counts for every listed country, largest catalog first.
    ///
    /// A listed country without a catalog counts as empty.
    pub async fn stats(&self) -> Result<Vec<CountryStats>> {
        let mut rows = Vec::new();
        for code in self.countries().await? {
            let mut row = CountryStats {
                country: code.clone(),
                ..Default::default()
            };
            if let Some(data) = self.get(&code).await? {
                for (category, channels) in data.iter() {
                    row.categories.insert(category.clone(), channels.len());
                    row.total += channels.len();
                    row.free += channels.iter().filter(|ch| ch.is_free).count();
                    row.affiliates += channels.iter().filter(|ch| ch.is_affiliate()).count();
                }
            } else {
                tracing::warn!(country = %code, "Listed country has no catalog");
            }
            rows.push(row);
        }
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.country.cmp(&b.country)));
        Ok(rows)
    }
}
