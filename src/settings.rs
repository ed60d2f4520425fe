// Persisted sorting settings and the stores that hold them.
// The engine only reads these; user actions write them.

use std::fs;
use std::path::{Path, PathBuf};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SortError};
use crate::modules::sort_spec::SortSpec;

/// Persisted flags. Read once at the start of every pass and only changed
/// by explicit user action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_sort_enabled: bool,
    pub sort_pinned_enabled: bool,
    pub last_comparator_key: Option<String>,
}

impl Settings {
    /// Resolves the recorded comparator key.
    ///
    /// `Ok(None)` when nothing was recorded yet.
    pub fn last_spec(&self) -> Result<Option<SortSpec>> {
        self.last_comparator_key
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    pub fn with_last_spec(mut self, spec: SortSpec) -> Self {
        self.last_comparator_key = Some(spec.key().to_string());
        self
    }
}

/// Process-wide settings storage.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self) -> Result<Settings>;
    async fn set(&self, settings: Settings) -> Result<()>;
}

/// Settings persisted as pretty JSON in a single file.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `settings.json` inside an app data directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Settings {
        if !self.path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                Settings::default()
            }),
            Err(e) => {
                log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let io_err = |source| SortError::SettingsIo {
            path: self.path.clone(),
            source,
        };
        let tmp_path = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(settings)?;

        // Atomic write: tmp + rename, so a crash never leaves half a file.
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn get(&self) -> Result<Settings> {
        Ok(self.load())
    }

    async fn set(&self, settings: Settings) -> Result<()> {
        self.save(&settings)
    }
}

/// In-memory store; reads are lock-free snapshots.
pub struct MemorySettingsStore {
    current: ArcSwap<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: ArcSwap::from_pointee(settings),
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self) -> Result<Settings> {
        Ok(Settings::clone(&self.current.load()))
    }

    async fn set(&self, settings: Settings) -> Result<()> {
        self.current.store(std::sync::Arc::new(settings));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.auto_sort_enabled);
        assert!(!settings.sort_pinned_enabled);
        assert_eq!(settings.last_spec().unwrap(), None);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"autoSortEnabled": true}"#).unwrap();
        assert!(settings.auto_sort_enabled);
        assert!(!settings.sort_pinned_enabled);
        assert!(settings.last_comparator_key.is_none());
    }

    #[test]
    fn test_last_spec_resolution() {
        let settings = Settings::default().with_last_spec(SortSpec::DomainAsc);
        assert_eq!(settings.last_comparator_key.as_deref(), Some("sort-by-domain-asc"));
        assert_eq!(settings.last_spec().unwrap(), Some(SortSpec::DomainAsc));

        let stale = Settings {
            last_comparator_key: Some("sort-by-color".to_string()),
            ..Settings::default()
        };
        assert!(matches!(stale.last_spec(), Err(SortError::UnknownComparator(_))));
    }

    #[tokio::test]
    async fn test_json_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::in_dir(&dir.path().join("nested"));

        assert_eq!(store.get().await.unwrap(), Settings::default());

        let settings = Settings {
            auto_sort_enabled: true,
            sort_pinned_enabled: true,
            last_comparator_key: Some("sort-by-title-desc".to_string()),
        };
        store.set(settings.clone()).await.unwrap();

        assert_eq!(store.get().await.unwrap(), settings);
        assert!(!store.path().with_extension("tmp").exists());

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"lastComparatorKey\""));
    }

    #[test]
    fn test_corrupt_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), Settings::default());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySettingsStore::default();
        let updated = Settings {
            auto_sort_enabled: true,
            ..Settings::default()
        };
        store.set(updated.clone()).await.unwrap();
        assert_eq!(store.get().await.unwrap(), updated);
    }
}
