//! Shared fixture catalog for unit tests.

use crate::catalog::Catalog;
use crate::models::{RawCategoryMap, RawChannel};
use crate::source::MemorySource;

pub(crate) fn channel(name: &str, priority: i64) -> RawChannel {
    RawChannel {
        priority: Some(priority),
        ..RawChannel::named(name)
    }
}

pub(crate) fn paid(name: &str, priority: i64) -> RawChannel {
    RawChannel {
        is_free: Some(false),
        ..channel(name, priority)
    }
}

pub(crate) fn affiliate(name: &str, parent: &str, priority: i64) -> RawChannel {
    RawChannel {
        retransmits: Some(parent.to_string()),
        ..channel(name, priority)
    }
}

fn country(categories: Vec<(&str, Vec<RawChannel>)>) -> RawCategoryMap {
    categories
        .into_iter()
        .map(|(name, channels)| (name.to_string(), channels))
        .collect()
}

fn br() -> RawCategoryMap {
    country(vec![
        (
            "Entertainment",
            vec![
                RawChannel {
                    keywords: Some("globo|rede globo|plim plim".into()),
                    ..channel("TV Globo", 10)
                },
                affiliate("Globo Minas", "TV Globo", 6),
                affiliate("Globo Nordeste", "TV Globo", 9),
                channel("SBT", 9),
                channel("Record TV", 8),
                channel("Band", 7),
            ],
        ),
        (
            "News",
            vec![
                paid("GloboNews", 9),
                channel("CNN Brasil", 8),
                channel("Band News", 7),
                channel("Record News", 6),
                channel("Jovem Pan Notícias", 5),
            ],
        ),
        (
            "Sports",
            vec![
                paid("SporTV", 10),
                paid("ESPN Brasil", 9),
                paid("BandSports", 6),
            ],
        ),
        (
            "Shop",
            vec![channel("Shoptime", 4), channel("Polishop", 7), channel("Canal Compras", 3)],
        ),
        (
            "Religious",
            vec![
                channel("Rede Vida", 4),
                channel("TV Aparecida", 6),
                affiliate("Rede Vida Sul", "Rede Vida", 2),
            ],
        ),
        (
            "Kids",
            vec![channel("TV Rá Tim Bum", 8), paid("Gloob", 9)],
        ),
    ])
}

fn us() -> RawCategoryMap {
    country(vec![
        (
            "Entertainment",
            vec![
                channel("NBC", 10),
                channel("CBS", 10),
                channel("ABC", 9),
                channel("FOX", 9),
                channel("The CW", 7),
                affiliate("WNBC New York", "NBC", 6),
            ],
        ),
        (
            "News",
            vec![
                channel("CNN", 9),
                channel("Fox News", 9),
                channel("MSNBC", 8),
                channel("NBC News Now", 7),
                affiliate("CNN en Español", "CNN", 5),
            ],
        ),
        (
            "Sports",
            vec![paid("ESPN", 10), paid("Fox Sports 1", 9), paid("NBA TV", 7)],
        ),
        (
            "Shop",
            vec![channel("QVC", 4), channel("HSN", 4), channel("ShopHQ", 3)],
        ),
        ("Religious", vec![channel("TBN", 4), channel("Daystar", 4)]),
    ])
}

fn mx() -> RawCategoryMap {
    country(vec![
        (
            "Entertainment",
            vec![channel("Las Estrellas", 7), channel("Azteca Uno", 7)],
        ),
        ("News", vec![channel("Milenio Televisión", 6)]),
    ])
}

pub(crate) fn fixture_source() -> MemorySource {
    MemorySource::new()
        .with_country("br", br())
        .with_country("us", us())
        .with_country("mx", mx())
}

pub(crate) fn fixture_catalog() -> Catalog<MemorySource> {
    Catalog::new(fixture_source())
}
