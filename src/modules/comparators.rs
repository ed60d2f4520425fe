// Pure comparator logic - no host or storage imports allowed.
// Every comparator is a total order over two tab records.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::error::{Result, SortError};
use crate::state::TabRecord;

/// The tab field a comparator orders by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Parsed hostname only.
    Url,
    /// Last two dot-separated labels of the hostname.
    Domain,
    Title,
    LastAccess,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Text in collation order: base letters first, then accents, then case.
///
/// The primary key is the NFD decomposition with combining marks stripped
/// and case folded, so `Émile` sorts among the `e`s rather than after `z`.
/// The raw tiebreak keeps the order total and antisymmetric.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollatedText {
    base: String,
    folded: String,
    raw: String,
}

impl CollatedText {
    pub fn new(raw: &str) -> Self {
        let folded = raw.to_lowercase();
        let base = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();
        Self {
            base,
            folded,
            raw: raw.to_string(),
        }
    }
}

/// An extracted sort key value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Text(CollatedText),
    Millis(i64),
}

/// Hostname of a tab's URL. URLs without a host (`about:blank`) yield "".
pub fn hostname(record: &TabRecord) -> Result<String> {
    let parsed = Url::parse(&record.url).map_err(|source| SortError::MalformedUrl {
        tab: record.id.clone(),
        url: record.url.clone(),
        source,
    })?;
    Ok(parsed.host_str().unwrap_or("").to_string())
}

/// Naive registrable domain: the last two labels of `host`.
///
/// No public-suffix list is consulted, so `example.co.uk` reduces to `co.uk`.
/// A fully-qualified trailing dot is ignored.
pub fn registrable_domain(host: &str) -> &str {
    let host = host.strip_suffix('.').unwrap_or(host);
    let mut dots = host.rmatch_indices('.');
    dots.next();
    match dots.next() {
        Some((i, _)) => &host[i + 1..],
        None => host,
    }
}

impl SortKey {
    pub fn extract(&self, record: &TabRecord) -> Result<SortValue> {
        Ok(match self {
            SortKey::Url => SortValue::Text(CollatedText::new(&hostname(record)?)),
            SortKey::Domain => {
                let host = hostname(record)?;
                SortValue::Text(CollatedText::new(registrable_domain(&host)))
            }
            SortKey::Title => SortValue::Text(CollatedText::new(&record.title)),
            SortKey::LastAccess => SortValue::Millis(record.last_accessed.timestamp_millis()),
        })
    }
}

impl SortOrder {
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

/// Compares two records by `key` in the given `order`.
pub fn compare(key: SortKey, order: SortOrder, a: &TabRecord, b: &TabRecord) -> Result<Ordering> {
    let left = key.extract(a)?;
    let right = key.extract(b)?;
    Ok(order.apply(left.cmp(&right)))
}
