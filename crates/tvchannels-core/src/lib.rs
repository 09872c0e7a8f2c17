//! Per-country TV channel catalogs: loading, keyword search and lineup generation.

pub mod catalog;
pub mod category;
pub mod compact;
pub mod config;
pub mod error;
pub mod lineup;
pub mod models;
pub mod normalize;
pub mod search;
pub mod source;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, ChannelsOptions};
pub use category::CategoryCeilings;
pub use error::{CatalogError, SourceError};
pub use lineup::GenerateOptions;
pub use models::{Channel, CountryCatalog, LineupEntry, RetransmitFilter, SearchHit};
pub use search::SearchOptions;
pub use source::{CatalogSource, FsSource, MemorySource};
