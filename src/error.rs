// Error taxonomy for reordering passes.
// Every failure is local to one pass: nothing here is fatal to the host.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::TabId;

/// Failure reported by a host primitive (tab query or tab move).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The targeted tab no longer exists (closed between query and move).
    #[error("no tab with id '{0}'")]
    UnknownTab(TabId),

    #[error("host unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SortError {
    /// A tab's URL could not be parsed, so its sort key is undefined.
    #[error("tab '{tab}' has a malformed url '{url}': {source}")]
    MalformedUrl {
        tab: TabId,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A sort-spec key has no registered comparator.
    #[error("unknown comparator key '{0}'")]
    UnknownComparator(String),

    /// The move primitive failed; ops before `op_index` stay applied.
    #[error("move {op_index} of batch failed: {source}")]
    Move {
        op_index: usize,
        #[source]
        source: HostError,
    },

    #[error("tab query failed: {0}")]
    Query(#[source] HostError),

    #[error("settings store error: {0}")]
    Settings(String),

    #[error("settings file '{path}' could not be written: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings could not be serialized: {0}")]
    SettingsFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SortError>;
