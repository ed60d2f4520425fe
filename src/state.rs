// Shared data structs for the reordering engine.
// These are snapshots handed over by the host and can be tested independently.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque tab identifier, unique within a window.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub String);

impl TabId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TabId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A snapshot of one tab as reported by the host's query primitive.
///
/// The engine never mutates these fields; it only issues move requests.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub url: String,
    pub title: String,
    /// Epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_accessed: DateTime<Utc>,
    pub pinned: bool,
    /// Position in the live strip at query time.
    pub index: usize,
}

/// One request to relocate a contiguous block of tabs.
///
/// `destination_index` is an absolute strip position and assumes every
/// earlier op of the same batch has already been applied.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveOp {
    pub moving_ids: Vec<TabId>,
    pub destination_index: usize,
}

/// Which half of the strip a partition covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionKind {
    Pinned,
    Normal,
}

/// The pinned or non-pinned subset of one snapshot, in strip order.
#[derive(Clone, Debug)]
pub struct Partition<'a> {
    pub kind: PartitionKind,
    pub tabs: Vec<&'a TabRecord>,
}

impl<'a> Partition<'a> {
    /// Splits a snapshot into its pinned and normal partitions.
    ///
    /// Records are ordered by `index` first so callers may pass the host's
    /// snapshot in any order.
    pub fn split(tabs: &'a [TabRecord]) -> (Partition<'a>, Partition<'a>) {
        let mut ordered: Vec<&TabRecord> = tabs.iter().collect();
        ordered.sort_by_key(|t| t.index);

        let (pinned, normal): (Vec<_>, Vec<_>) = ordered.into_iter().partition(|t| t.pinned);
        (
            Partition { kind: PartitionKind::Pinned, tabs: pinned },
            Partition { kind: PartitionKind::Normal, tabs: normal },
        )
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Strip index of the partition's first tab. Fixed for one pass.
    pub fn offset(&self) -> usize {
        self.tabs.first().map(|t| t.index).unwrap_or(0)
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id.clone()).collect()
    }
}
