// Tab Sorter Library Entry Point
// Exposes the reordering engine and its host-facing contracts so embedders
// can wire them to a real tab strip and test them independently.

// Core modules
pub mod error;
pub mod host;
pub mod settings;

// Shared state
pub mod state;

// Pure logic modules (no host I/O apart from the traits in `host`)
pub mod modules;

pub use error::{HostError, Result, SortError};
pub use host::{MemoryTabStrip, TabEvent, TabEvents, TabHost};
pub use modules::auto_sort::AutoSorter;
pub use modules::sort_spec::SortSpec;
pub use settings::{JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore};
pub use state::{MoveOp, TabId, TabRecord};

/// Installs the `env_logger` backend for the `log` facade.
///
/// Info level in debug builds, warnings otherwise; `RUST_LOG` overrides
/// both. Calling it again is a no-op.
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
