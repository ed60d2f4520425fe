// Settings-driven auto-sort.
//
// Holds the listener state explicitly: `enable` subscribes to the host's tab
// events and spawns one listener task, `disable` aborts it. Both are
// idempotent. Each event's pass runs as its own detached task, so aborting
// the listener never cuts a move batch short. Passes are not serialized,
// neither against each other nor against manual passes.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::host::{TabEvent, TabEvents, TabHost};
use crate::modules::tabs;
use crate::settings::SettingsStore;
use crate::state::MoveOp;

pub struct AutoSorter<H, S> {
    host: Arc<H>,
    store: Arc<S>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// Runs the pass a single tab event asks for, if auto-sort is on.
///
/// Errors never escape: they are logged and the event is dropped.
async fn on_tab_event<H, S>(host: &H, store: &S, event: &TabEvent) -> Option<Vec<MoveOp>>
where
    H: TabHost + ?Sized,
    S: SettingsStore + ?Sized,
{
    let settings = match store.get().await {
        Ok(s) => s,
        Err(e) => {
            log::error!("[AutoSort] Could not read settings for {:?}: {}", event, e);
            return None;
        }
    };

    if !settings.auto_sort_enabled {
        return None;
    }

    match tabs::run_last_pass(host, &settings).await {
        Ok(applied) => applied,
        Err(e) => {
            log::error!("[AutoSort] Pass after {:?} failed: {}", event, e);
            None
        }
    }
}

impl<H, S> AutoSorter<H, S>
where
    H: TabHost + TabEvents + 'static,
    S: SettingsStore + 'static,
{
    pub fn new(host: Arc<H>, store: Arc<S>) -> Self {
        Self {
            host,
            store,
            listener: Mutex::new(None),
        }
    }

    /// Starts listening for tab events. Returns false if already listening.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enable(&self) -> bool {
        let Ok(mut listener) = self.listener.lock() else {
            return false;
        };
        if listener.is_some() {
            return false;
        }

        let mut events = self.host.subscribe();
        let host = self.host.clone();
        let store = self.store.clone();

        *listener = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let host = host.clone();
                        let store = store.clone();
                        tokio::spawn(async move {
                            on_tab_event(host.as_ref(), store.as_ref(), &event).await;
                        });
                    }
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("[AutoSort] Missed {} tab events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            log::debug!("[AutoSort] Event source closed, listener stopped");
        }));

        log::info!("[AutoSort] Enabled");
        true
    }

    /// Stops listening. Returns false if not listening.
    pub fn disable(&self) -> bool {
        let Ok(mut listener) = self.listener.lock() else {
            return false;
        };
        match listener.take() {
            Some(handle) => {
                handle.abort();
                log::info!("[AutoSort] Disabled");
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.listener
            .lock()
            .map(|l| l.is_some())
            .unwrap_or(false)
    }

    /// Brings the listener in line with the persisted flag.
    pub async fn sync_with_settings(&self) -> Result<bool> {
        let enabled = self.store.get().await?.auto_sort_enabled;
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
        Ok(enabled)
    }

    /// User action: persists the auto-sort flag and toggles the listener.
    pub async fn set_auto_sort(&self, enabled: bool) -> Result<()> {
        let mut settings = self.store.get().await?;
        settings.auto_sort_enabled = enabled;
        self.store.set(settings).await?;
        self.sync_with_settings().await.map(|_| ())
    }

    /// User action: persists the sort-pinned flag for later passes.
    pub async fn set_sort_pinned(&self, enabled: bool) -> Result<()> {
        let mut settings = self.store.get().await?;
        settings.sort_pinned_enabled = enabled;
        self.store.set(settings).await
    }

    pub async fn handle_event(&self, event: TabEvent) -> Option<Vec<MoveOp>> {
        on_tab_event(self.host.as_ref(), self.store.as_ref(), &event).await
    }
}

impl<H, S> Drop for AutoSorter<H, S> {
    fn drop(&mut self) {
        if let Ok(mut listener) = self.listener.lock() {
            if let Some(handle) = listener.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::MemoryTabStrip;
    use crate::modules::sort_spec::SortSpec;
    use crate::settings::{MemorySettingsStore, Settings};
    use crate::state::{TabId, TabRecord};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::broadcast;

    /// Strip whose move primitive takes a while to answer.
    struct SlowStrip {
        inner: MemoryTabStrip,
        delay: Duration,
    }

    #[async_trait]
    impl TabHost for SlowStrip {
        async fn query(&self) -> std::result::Result<Vec<TabRecord>, HostError> {
            self.inner.query().await
        }

        async fn move_tabs(&self, ids: &[TabId], index: usize) -> std::result::Result<(), HostError> {
            tokio::time::sleep(self.delay).await;
            self.inner.move_tabs(ids, index).await
        }
    }

    impl TabEvents for SlowStrip {
        fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
            self.inner.subscribe()
        }
    }

    fn strip(titles: &[&str]) -> Arc<MemoryTabStrip> {
        let strip = MemoryTabStrip::new(Vec::new());
        for t in titles {
            strip.open_tab(t, "https://example.com/", t, false).unwrap();
        }
        Arc::new(strip)
    }

    fn strs(strip: &MemoryTabStrip) -> Vec<String> {
        strip.ids().into_iter().map(|id| id.0).collect()
    }

    fn auto_settings(spec: Option<SortSpec>) -> Settings {
        Settings {
            auto_sort_enabled: true,
            sort_pinned_enabled: false,
            last_comparator_key: spec.map(|s| s.key().to_string()),
        }
    }

    async fn wait_for(strip: &MemoryTabStrip, expected: &[&str]) -> bool {
        for _ in 0..100 {
            if strs(strip) == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_enable_disable_idempotent() {
        let sorter = AutoSorter::new(strip(&[]), Arc::new(MemorySettingsStore::default()));

        assert!(!sorter.is_enabled());
        assert!(sorter.enable());
        assert!(!sorter.enable());
        assert!(sorter.is_enabled());
        assert!(sorter.disable());
        assert!(!sorter.disable());
        assert!(!sorter.is_enabled());
    }

    #[tokio::test]
    async fn test_disable_lets_running_batch_finish() {
        let inner = MemoryTabStrip::new(Vec::new());
        for t in ["b", "a", "d", "c", "f", "e"] {
            inner.open_tab(t, "https://example.com/", t, false).unwrap();
        }
        let host = Arc::new(SlowStrip {
            inner,
            delay: Duration::from_millis(50),
        });
        let store = Arc::new(MemorySettingsStore::new(auto_settings(Some(SortSpec::TitleAsc))));
        let sorter = AutoSorter::new(host.clone(), store);
        assert!(sorter.enable());

        host.inner.update_tab(&"a".into(), "https://example.com/", "a").unwrap();
        tokio::time::sleep(Duration::from_millis(75)).await;
        assert!(sorter.disable());
        drop(sorter);

        // Three moves were planned; all of them still land.
        assert!(wait_for(&host.inner, &["a", "b", "c", "d", "e", "f"]).await);
    }

    #[tokio::test]
    async fn test_new_tab_triggers_sort() {
        let strip = strip(&["b", "c"]);
        let store = Arc::new(MemorySettingsStore::new(auto_settings(Some(SortSpec::TitleAsc))));
        let sorter = AutoSorter::new(strip.clone(), store);
        assert!(sorter.sync_with_settings().await.unwrap());

        strip.open_tab("a", "https://example.com/", "a", false).unwrap();

        assert!(wait_for(&strip, &["a", "b", "c"]).await);
    }

    #[tokio::test]
    async fn test_handle_event_skips_when_disabled() {
        let strip = strip(&["b", "a"]);
        let mut settings = auto_settings(Some(SortSpec::TitleAsc));
        settings.auto_sort_enabled = false;
        let sorter = AutoSorter::new(strip.clone(), Arc::new(MemorySettingsStore::new(settings)));

        assert!(sorter.handle_event(TabEvent::Created("a".into())).await.is_none());
        assert_eq!(strs(&strip), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_handle_event_without_comparator_is_skipped() {
        let strip = strip(&["b", "a"]);
        let sorter = AutoSorter::new(strip.clone(), Arc::new(MemorySettingsStore::new(auto_settings(None))));

        assert!(sorter.handle_event(TabEvent::Updated("a".into())).await.is_none());
        assert_eq!(strs(&strip), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_handle_event_swallows_pass_errors() {
        let strip = strip(&["a"]);
        strip.open_tab("bad", "not a url", "bad", false).unwrap();
        let sorter = AutoSorter::new(
            strip.clone(),
            Arc::new(MemorySettingsStore::new(auto_settings(Some(SortSpec::UrlAsc)))),
        );

        assert!(sorter.handle_event(TabEvent::Created("bad".into())).await.is_none());
    }

    #[tokio::test]
    async fn test_set_auto_sort_persists_and_toggles() {
        let store = Arc::new(MemorySettingsStore::default());
        let sorter = AutoSorter::new(strip(&[]), store.clone());

        sorter.set_auto_sort(true).await.unwrap();
        assert!(store.get().await.unwrap().auto_sort_enabled);
        assert!(sorter.is_enabled());

        sorter.set_sort_pinned(true).await.unwrap();
        assert!(store.get().await.unwrap().sort_pinned_enabled);

        sorter.set_auto_sort(false).await.unwrap();
        assert!(!store.get().await.unwrap().auto_sort_enabled);
        assert!(!sorter.is_enabled());
    }
}
