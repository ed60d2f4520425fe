// Host collaborator contracts plus an in-process tab strip.
//
// The engine only talks to the host through `TabHost` and `TabEvents`.
// `MemoryTabStrip` keeps the strip in a `Mutex<Vec<TabRecord>>` the same way
// the browser shell keeps its tab list, and is what embedders without a
// native strip (and the tests) use.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::HostError;
use crate::modules::reorder::move_block;
use crate::state::{TabId, TabRecord};

const EVENT_CAPACITY: usize = 64;

/// Tab query and move primitives.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Live snapshot of the window's tabs; `index` reflects strip order.
    async fn query(&self) -> Result<Vec<TabRecord>, HostError>;

    /// Moves `ids` as one contiguous block so the first lands at `index`
    /// (clamped to the end of the strip).
    async fn move_tabs(&self, ids: &[TabId], index: usize) -> Result<(), HostError>;
}

/// Notification that a reorder may now be warranted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "tabId")]
pub enum TabEvent {
    Created(TabId),
    Updated(TabId),
}

/// Source of tab-created / tab-updated notifications.
pub trait TabEvents: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<TabEvent>;
}

pub struct MemoryTabStrip {
    tabs: Mutex<Vec<TabRecord>>,
    events: broadcast::Sender<TabEvent>,
}

impl MemoryTabStrip {
    pub fn new(mut tabs: Vec<TabRecord>) -> Self {
        tabs.sort_by_key(|t| t.index);
        renumber(&mut tabs);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tabs: Mutex::new(tabs),
            events,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<TabRecord>>, HostError> {
        self.tabs
            .lock()
            .map_err(|e| HostError::Unavailable(e.to_string()))
    }

    fn emit(&self, event: TabEvent) {
        // No subscribers is fine: nobody wants to react.
        let _ = self.events.send(event);
    }

    /// Opens a tab. Pinned tabs join the end of the pinned block, others
    /// the end of the strip.
    pub fn open_tab(&self, id: &str, url: &str, title: &str, pinned: bool) -> Result<(), HostError> {
        let tab_id = TabId::from(id);
        {
            let mut tabs = self.lock()?;
            let at = if pinned {
                tabs.iter().take_while(|t| t.pinned).count()
            } else {
                tabs.len()
            };
            tabs.insert(
                at,
                TabRecord {
                    id: tab_id.clone(),
                    url: url.to_string(),
                    title: title.to_string(),
                    last_accessed: Utc::now(),
                    pinned,
                    index: at,
                },
            );
            renumber(&mut tabs);
        }
        log::debug!("[TabStrip] Opened tab '{}' at {}", id, url);
        self.emit(TabEvent::Created(tab_id));
        Ok(())
    }

    /// Navigates an existing tab, touching its last-access time.
    pub fn update_tab(&self, id: &TabId, url: &str, title: &str) -> Result<(), HostError> {
        {
            let mut tabs = self.lock()?;
            let tab = tabs
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| HostError::UnknownTab(id.clone()))?;
            tab.url = url.to_string();
            tab.title = title.to_string();
            tab.last_accessed = Utc::now();
        }
        self.emit(TabEvent::Updated(id.clone()));
        Ok(())
    }

    pub fn close_tab(&self, id: &TabId) -> Result<TabRecord, HostError> {
        let mut tabs = self.lock()?;
        let pos = tabs
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| HostError::UnknownTab(id.clone()))?;
        let closed = tabs.remove(pos);
        renumber(&mut tabs);
        Ok(closed)
    }

    /// Current strip order. Empty if the strip lock is poisoned.
    pub fn ids(&self) -> Vec<TabId> {
        self.snapshot().into_iter().map(|t| t.id).collect()
    }

    pub fn snapshot(&self) -> Vec<TabRecord> {
        self.lock().map(|tabs| tabs.clone()).unwrap_or_default()
    }
}

fn renumber(tabs: &mut [TabRecord]) {
    for (i, tab) in tabs.iter_mut().enumerate() {
        tab.index = i;
    }
}

#[async_trait]
impl TabHost for MemoryTabStrip {
    async fn query(&self) -> Result<Vec<TabRecord>, HostError> {
        Ok(self.lock()?.clone())
    }

    async fn move_tabs(&self, ids: &[TabId], index: usize) -> Result<(), HostError> {
        let mut tabs = self.lock()?;
        if let Some(missing) = ids.iter().find(|id| !tabs.iter().any(|t| &t.id == *id)) {
            return Err(HostError::UnknownTab(missing.clone()));
        }
        move_block(&mut *tabs, ids, index, |t| &t.id);
        renumber(&mut tabs);
        Ok(())
    }
}

impl TabEvents for MemoryTabStrip {
    fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.events.subscribe()
    }
}
