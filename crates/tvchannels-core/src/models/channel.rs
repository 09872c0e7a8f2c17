use std::collections::BTreeMap;
use std::convert::Infallible;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::{CategoryCeilings, MAX_PRIORITY};
use crate::normalize::derive_keywords;

/// Priority assumed when the stored record omits it.
pub const DEFAULT_PRIORITY: u8 = 5;

/// Minimum priority of a channel that retransmits a parent network.
pub const RETRANSMIT_FLOOR: u8 = 8;

/// Maximum priority of a paid channel.
pub const PAID_CAP: u8 = 8;

/// Raw per-country catalog as stored: category name to channel records.
pub type RawCategoryMap = BTreeMap<String, Vec<RawChannel>>;

/// Normalized per-country catalog.
pub type CountryCatalog = BTreeMap<String, Vec<Channel>>;

/// A channel record as stored on disk.
///
/// Storage is compact: every optional field may be omitted and takes its
/// default at normalization time. Optional fields of the wrong JSON type are
/// read as absent; only `name` is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub retransmits: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl RawChannel {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Integers pass through, fractional numbers are rounded, anything else is absent.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)))
}

/// A channel in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    pub keywords: String,
    pub retransmits: Option<String>,
    pub short_name: String,
    pub is_free: bool,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub priority: u8,
}

impl Channel {
    /// Convert a stored record into canonical form.
    ///
    /// Priority rules, in order:
    /// 1. clamp to the category ceiling
    /// 2. raise to [`RETRANSMIT_FLOOR`] if the channel retransmits a parent
    /// 3. cap at [`PAID_CAP`] if the channel is not free
    pub fn normalize(raw: RawChannel, category: &str, ceilings: &CategoryCeilings) -> Self {
        let is_free = raw.is_free.unwrap_or(true);
        let retransmits = raw.retransmits;

        let mut priority = raw
            .priority
            .unwrap_or(i64::from(DEFAULT_PRIORITY))
            .clamp(0, i64::from(MAX_PRIORITY)) as u8;
        priority = priority.min(ceilings.ceiling(category));
        if is_non_blank(retransmits.as_deref()) {
            priority = priority.max(RETRANSMIT_FLOOR);
        }
        if !is_free {
            priority = priority.min(PAID_CAP);
        }

        Self {
            keywords: raw.keywords.unwrap_or_else(|| derive_keywords(&raw.name)),
            short_name: raw.short_name.unwrap_or_else(|| raw.name.clone()),
            name: raw.name,
            retransmits,
            is_free,
            logo: raw.logo,
            website: raw.website,
            priority,
        }
    }

    /// Whether this channel relays a parent network.
    pub fn is_affiliate(&self) -> bool {
        is_non_blank(self.retransmits.as_deref())
    }
}

fn is_non_blank(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.trim().is_empty())
}

/// Normalize every category of a raw country catalog.
pub fn normalize_catalog(raw: RawCategoryMap, ceilings: &CategoryCeilings) -> CountryCatalog {
    raw.into_iter()
        .map(|(category, channels)| {
            let normalized = channels
                .into_iter()
                .map(|ch| Channel::normalize(ch, &category, ceilings))
                .collect();
            (category, normalized)
        })
        .collect()
}

/// Which channels to keep based on their `retransmits` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetransmitFilter {
    #[default]
    All,
    /// Originals only: no (or blank) `retransmits`.
    Parents,
    /// Retransmitters only.
    Affiliates,
}

impl RetransmitFilter {
    pub fn accepts(self, channel: &Channel) -> bool {
        match self {
            Self::All => true,
            Self::Parents => !channel.is_affiliate(),
            Self::Affiliates => channel.is_affiliate(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Parents => "parents",
            Self::Affiliates => "affiliates",
        }
    }

    /// Case-insensitive mode name; unrecognized modes fall back to `All`.
    pub fn from_mode(mode: &str) -> Self {
        match mode.trim().to_ascii_lowercase().as_str() {
            "parents" => Self::Parents,
            "affiliates" => Self::Affiliates,
            _ => Self::All,
        }
    }
}

impl FromStr for RetransmitFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_mode(s))
    }
}

impl<'de> Deserialize<'de> for RetransmitFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mode = String::deserialize(deserializer)?;
        Ok(Self::from_mode(&mode))
    }
}

impl std::fmt::Display for RetransmitFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search match, tagged with the country it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub channel: Channel,
    pub country: String,
}

/// A lineup entry, tagged with its country and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineupEntry {
    #[serde(flatten)]
    pub channel: Channel,
    pub country: String,
    pub category: String,
}
