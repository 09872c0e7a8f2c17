//! Catalog compaction: drop stored fields that equal their normalization default.
//!
//! Compaction only removes what normalization would put back, so a compacted
//! record always normalizes to the same [`Channel`](crate::models::Channel)
//! as the uncompacted one.

use serde::Serialize;

use crate::error::SourceError;
use crate::models::{RawCategoryMap, RawChannel, DEFAULT_PRIORITY};
use crate::normalize::derive_keywords;
use crate::source::{CatalogSource, FsSource};

/// Outcome of compacting one country file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactReport {
    pub country: String,
    pub channels: usize,
    pub fields_removed: usize,
}

/// Drop fields equal to their defaults. Returns the record and how many fields went.
pub fn compact_channel(raw: RawChannel) -> (RawChannel, usize) {
    let mut removed = 0;
    let mut out = raw;

    if out
        .keywords
        .as_deref()
        .is_some_and(|kw| kw == derive_keywords(&out.name))
    {
        out.keywords = None;
        removed += 1;
    }
    if out.short_name.as_deref() == Some(out.name.as_str()) {
        out.short_name = None;
        removed += 1;
    }
    if out.priority == Some(i64::from(DEFAULT_PRIORITY)) {
        out.priority = None;
        removed += 1;
    }
    (out, removed)
}

/// Compact every record of a raw country catalog.
pub fn compact_catalog(raw: RawCategoryMap) -> (RawCategoryMap, usize) {
    let mut removed = 0;
    let compacted = raw
        .into_iter()
        .map(|(category, channels)| {
            let channels = channels
                .into_iter()
                .map(|ch| {
                    let (ch, n) = compact_channel(ch);
                    removed += n;
                    ch
                })
                .collect();
            (category, channels)
        })
        .collect();
    (compacted, removed)
}

/// Compact every country file under the source's `channels/` directory.
///
/// With `dry_run` nothing is written.
pub async fn compact_source(
    source: &FsSource,
    dry_run: bool,
) -> Result<Vec<CompactReport>, SourceError> {
    let mut reports = Vec::new();
    for code in source.country_files()? {
        let raw = source.load_country(&code).await?;
        let channels = raw.values().map(Vec::len).sum();
        let (compacted, fields_removed) = compact_catalog(raw);
        if fields_removed > 0 && !dry_run {
            source.write_country(&code, &compacted).await?;
        }
        tracing::info!(country = %code, channels, fields_removed, dry_run, "Compacted");
        reports.push(CompactReport {
            country: code,
            channels,
            fields_removed,
        });
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryCeilings;
    use crate::models::Channel;
    use crate::test_support::{affiliate, channel, paid};

    #[test]
    fn test_drops_defaults() {
        let raw = RawChannel {
            keywords: Some("record news".into()),
            short_name: Some("Record News".into()),
            priority: Some(5),
            is_free: Some(true),
            ..RawChannel::named("Record News")
        };
        let (compacted, removed) = compact_channel(raw);
        assert_eq!(removed, 3);
        assert_eq!(
            compacted,
            RawChannel {
                is_free: Some(true),
                ..RawChannel::named("Record News")
            }
        );
    }

    #[test]
    fn test_keeps_meaningful_values() {
        let raw = RawChannel {
            keywords: Some("Record News".into()),
            short_name: Some("Record".into()),
            priority: Some(7),
            ..RawChannel::named("Record News")
        };
        let (compacted, removed) = compact_channel(raw.clone());
        assert_eq!(removed, 0);
        assert_eq!(compacted, raw);
    }

    #[test]
    fn test_normalization_unchanged_by_compaction() {
        let ceilings = CategoryCeilings::builtin();
        let records = vec![
            RawChannel {
                keywords: Some("tv globo".into()),
                short_name: Some("TV Globo".into()),
                ..channel("TV Globo", 5)
            },
            paid("SporTV", 10),
            affiliate("Globo Minas", "TV Globo", 5),
            RawChannel {
                keywords: Some(String::new()),
                ..RawChannel::named("Sem Palavras")
            },
        ];
        for raw in records {
            let before = Channel::normalize(raw.clone(), "Entertainment", &ceilings);
            let (compacted, _) = compact_channel(raw);
            let after = Channel::normalize(compacted, "Entertainment", &ceilings);
            assert_eq!(before, after);
        }
    }

    #[tokio::test]
    async fn test_compacts_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let channels = tmp.path().join("channels");
        std::fs::create_dir_all(&channels).unwrap();
        std::fs::write(channels.join("countries.json"), r#"["br", "us"]"#).unwrap();
        std::fs::write(
            channels.join("br.json"),
            r#"{"News": [{"name": "Band News", "keywords": "band news", "priority": 5}]}"#,
        )
        .unwrap();
        std::fs::write(channels.join("us.json"), r#"{"News": [{"name": "CNN", "priority": 9}]}"#)
            .unwrap();

        let source = FsSource::new(tmp.path());
        let dry = compact_source(&source, true).await.unwrap();
        assert_eq!(dry[0].fields_removed, 2);
        let untouched = std::fs::read_to_string(channels.join("br.json")).unwrap();
        assert!(untouched.contains("keywords"));

        let reports = compact_source(&source, false).await.unwrap();
        assert_eq!(
            reports,
            vec![
                CompactReport {
                    country: "br".into(),
                    channels: 1,
                    fields_removed: 2,
                },
                CompactReport {
                    country: "us".into(),
                    channels: 1,
                    fields_removed: 0,
                },
            ]
        );
        let br = source.load_country("br").await.unwrap();
        assert_eq!(br["News"][0], RawChannel::named("Band News"));
    }
}
