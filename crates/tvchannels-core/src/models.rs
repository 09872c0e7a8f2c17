mod channel;

pub use channel::{
    normalize_catalog, Channel, CountryCatalog, LineupEntry, RawCategoryMap, RawChannel,
    RetransmitFilter, SearchHit, DEFAULT_PRIORITY, PAID_CAP, RETRANSMIT_FLOOR,
};
