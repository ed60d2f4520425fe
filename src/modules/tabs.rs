// Tab sorting passes - the commands a UI layer or event handler invokes.
// Settings are read once per pass and handed down explicitly.

use crate::error::{Result, SortError};
use crate::host::TabHost;
use crate::modules::reorder;
use crate::modules::sort_spec::SortSpec;
use crate::settings::{Settings, SettingsStore};
use crate::state::MoveOp;

/// Runs one reordering pass with explicit settings.
pub async fn run_pass<H: TabHost + ?Sized>(
    host: &H,
    settings: &Settings,
    spec: SortSpec,
) -> Result<Vec<MoveOp>> {
    let tabs = host.query().await.map_err(SortError::Query)?;
    let applied = reorder::apply(host, &tabs, spec, settings.sort_pinned_enabled).await?;

    if applied.is_empty() {
        log::debug!("[TabSort] {} tabs already ordered by {}", tabs.len(), spec);
    } else {
        log::info!(
            "[TabSort] Sorted {} tabs by {} with {} move(s)",
            tabs.len(),
            spec,
            applied.len()
        );
    }

    Ok(applied)
}

/// Runs a pass with the last comparator recorded in `settings`.
///
/// Returns `Ok(None)` when no comparator has been chosen yet.
pub async fn run_last_pass<H: TabHost + ?Sized>(
    host: &H,
    settings: &Settings,
) -> Result<Option<Vec<MoveOp>>> {
    let Some(spec) = settings.last_spec()? else {
        log::warn!("[TabSort] No comparator recorded yet, skipping pass");
        return Ok(None);
    };
    run_pass(host, settings, spec).await.map(Some)
}

/// Manual "sort by ..." action.
///
/// Records `spec` as the last-used comparator before sorting, so later
/// automatic passes reuse it.
pub async fn sort_tabs<H, S>(host: &H, store: &S, spec: SortSpec) -> Result<Vec<MoveOp>>
where
    H: TabHost + ?Sized,
    S: SettingsStore + ?Sized,
{
    let settings = store.get().await?.with_last_spec(spec);
    store.set(settings.clone()).await?;
    run_pass(host, &settings, spec).await
}
