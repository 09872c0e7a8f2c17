//! Per-category priority ceilings.
//!
//! A channel's `priority` is relative to its country and category, but not all
//! categories are worth the same: a shopping channel should never outrank a
//! national news network. Each category therefore has a ceiling that
//! normalized priorities are clamped to, and the same ceilings decide the order
//! in which categories are visited by search and lineup generation.

use std::cmp::Reverse;
use std::collections::HashMap;

use phf::phf_map;

/// Ceiling for categories missing from the table.
pub const DEFAULT_CEILING: u8 = 5;

/// Upper bound of the priority scale.
pub const MAX_PRIORITY: u8 = 10;

/// Built-in ceiling table.
pub static BUILTIN_CEILINGS: phf::Map<&'static str, u8> = phf_map! {
    "Entertainment" => 10,
    "Sports" => 10,
    "News" => 9,
    "Kids" => 9,
    "Music" => 8,
    "Lifestyle" => 8,
    "General" => 8,
    "Movies" => 8,
    "Series" => 8,
    "Documentary" => 7,
    "Educational" => 7,
    "Shop" => 4,
    "Business" => 4,
    "Religious" => 4,
    "Radio" => 4,
    "Other" => 4,
};

/// Runtime ceiling table, built from [`BUILTIN_CEILINGS`] or from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCeilings {
    table: HashMap<String, u8>,
    default: u8,
}

impl Default for CategoryCeilings {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryCeilings {
    pub fn builtin() -> Self {
        Self {
            table: BUILTIN_CEILINGS
                .entries()
                .map(|(name, ceiling)| (name.to_string(), *ceiling))
                .collect(),
            default: DEFAULT_CEILING,
        }
    }

    /// Build a table from explicit entries. Values above [`MAX_PRIORITY`] are capped.
    pub fn new(entries: impl IntoIterator<Item = (String, u8)>, default: u8) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(name, ceiling)| (name, ceiling.min(MAX_PRIORITY)))
                .collect(),
            default: default.min(MAX_PRIORITY),
        }
    }

    /// Ceiling for `category`, falling back to the default ceiling.
    pub fn ceiling(&self, category: &str) -> u8 {
        self.table.get(category).copied().unwrap_or(self.default)
    }

    pub fn default_ceiling(&self) -> u8 {
        self.default
    }

    /// Sort category names into visitation order: descending ceiling, then name.
    ///
    /// The order never depends on how the catalog happened to store its keys.
    pub fn visit_order<'a, I>(&self, categories: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&str> = categories.into_iter().collect();
        names.sort_by_key(|name| (Reverse(self.ceiling(name)), *name));
        names
    }
}
