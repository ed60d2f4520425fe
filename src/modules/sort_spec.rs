// Sort-spec registry: the static mapping from a string key to a comparator.
// UI layers enumerate `SortSpec::ALL` and invoke passes by key.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SortError};
use crate::modules::comparators::{self, SortKey, SortOrder, SortValue};
use crate::state::TabRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortSpec {
    UrlAsc,
    UrlDesc,
    DomainAsc,
    DomainDesc,
    TitleAsc,
    TitleDesc,
    LastAccessAsc,
    LastAccessDesc,
}

impl SortSpec {
    pub const ALL: [SortSpec; 8] = [
        SortSpec::UrlAsc,
        SortSpec::UrlDesc,
        SortSpec::DomainAsc,
        SortSpec::DomainDesc,
        SortSpec::TitleAsc,
        SortSpec::TitleDesc,
        SortSpec::LastAccessAsc,
        SortSpec::LastAccessDesc,
    ];

    /// Stable identifier, persisted as the last-used comparator.
    pub fn key(&self) -> &'static str {
        match self {
            Self::UrlAsc => "sort-by-url-asc",
            Self::UrlDesc => "sort-by-url-desc",
            Self::DomainAsc => "sort-by-domain-asc",
            Self::DomainDesc => "sort-by-domain-desc",
            Self::TitleAsc => "sort-by-title-asc",
            Self::TitleDesc => "sort-by-title-desc",
            Self::LastAccessAsc => "sort-by-last-access-asc",
            Self::LastAccessDesc => "sort-by-last-access-desc",
        }
    }

    /// Menu label for UI layers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UrlAsc => "URL (A to Z)",
            Self::UrlDesc => "URL (Z to A)",
            Self::DomainAsc => "Domain (A to Z)",
            Self::DomainDesc => "Domain (Z to A)",
            Self::TitleAsc => "Title (A to Z)",
            Self::TitleDesc => "Title (Z to A)",
            Self::LastAccessAsc => "Last Access (oldest first)",
            Self::LastAccessDesc => "Last Access (newest first)",
        }
    }

    pub fn sort_key(&self) -> SortKey {
        match self {
            Self::UrlAsc | Self::UrlDesc => SortKey::Url,
            Self::DomainAsc | Self::DomainDesc => SortKey::Domain,
            Self::TitleAsc | Self::TitleDesc => SortKey::Title,
            Self::LastAccessAsc | Self::LastAccessDesc => SortKey::LastAccess,
        }
    }

    pub fn order(&self) -> SortOrder {
        match self {
            Self::UrlAsc | Self::DomainAsc | Self::TitleAsc | Self::LastAccessAsc => SortOrder::Ascending,
            Self::UrlDesc | Self::DomainDesc | Self::TitleDesc | Self::LastAccessDesc => {
                SortOrder::Descending
            }
        }
    }

    pub fn compare(&self, a: &TabRecord, b: &TabRecord) -> Result<Ordering> {
        comparators::compare(self.sort_key(), self.order(), a, b)
    }

    /// Stable sort of `records` under this spec.
    ///
    /// Keys are extracted up front so a malformed URL fails the whole sort
    /// before anything is reordered.
    pub fn sorted<'a>(&self, records: &[&'a TabRecord]) -> Result<Vec<&'a TabRecord>> {
        let key = self.sort_key();
        let mut keyed: Vec<(SortValue, &'a TabRecord)> = records
            .iter()
            .map(|r| key.extract(r).map(|v| (v, *r)))
            .collect::<Result<_>>()?;

        let order = self.order();
        keyed.sort_by(|(a, _), (b, _)| order.apply(a.cmp(b)));
        Ok(keyed.into_iter().map(|(_, r)| r).collect())
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortSpec {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|spec| spec.key() == s)
            .ok_or_else(|| SortError::UnknownComparator(s.to_string()))
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}
