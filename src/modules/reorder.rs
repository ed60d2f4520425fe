// Minimal-move reordering engine.
//
// Each partition is diffed against its sorted order and only the runs that
// fall outside the longest common subsequence are moved. Planning is pure;
// `apply` drives the host's move primitive one op at a time.

use std::ops::Range;

use crate::error::{Result, SortError};
use crate::host::TabHost;
use crate::modules::diff::{self, Change};
use crate::modules::sort_spec::SortSpec;
use crate::state::{MoveOp, Partition, PartitionKind, TabId, TabRecord};

/// Ranges of `after` that must be moved, in left-to-right order.
///
/// Insert runs not separated by a kept element are merged: they land at the
/// same point of the common subsequence and share one anchor.
fn moved_runs(before: &[TabId], after: &[TabId]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut pending: Option<usize> = None;
    let mut j = 0;

    for change in diff::diff(before, after) {
        match change {
            Change::Insert(run) => {
                pending.get_or_insert(j);
                j += run.len();
            }
            Change::Keep(run) => {
                if let Some(start) = pending.take() {
                    runs.push(start..j);
                }
                j += run.len();
            }
            Change::Remove(_) => {}
        }
    }
    if let Some(start) = pending {
        runs.push(start..j);
    }

    runs
}

/// Removes `moving` from `items` and reinserts them, in `moving` order, as a
/// block starting at `index` of the remaining list (clamped to its end).
///
/// This is the move primitive's contract; ids absent from `items` are skipped.
pub fn move_block<T>(items: &mut Vec<T>, moving: &[TabId], index: usize, id_of: impl Fn(&T) -> &TabId) {
    let mut block = Vec::with_capacity(moving.len());
    for id in moving {
        if let Some(pos) = items.iter().position(|item| id_of(item) == id) {
            block.push(items.remove(pos));
        }
    }

    let at = index.min(items.len());
    items.splice(at..at, block);
}

/// Replays `ops` against `ids` using the move primitive's semantics.
pub fn simulate(ids: &[TabId], ops: &[MoveOp]) -> Vec<TabId> {
    let mut current = ids.to_vec();
    for op in ops {
        move_block(&mut current, &op.moving_ids, op.destination_index, |id| id);
    }
    current
}

/// Plans the move batch for one partition.
///
/// Destinations are absolute strip positions: the partition's `offset` is
/// added to every op.
pub fn plan_partition(partition: &Partition<'_>, spec: SortSpec) -> Result<Vec<MoveOp>> {
    if partition.is_empty() {
        return Ok(Vec::new());
    }

    let before = partition.ids();
    let offset = partition.offset();
    let after: Vec<TabId> = spec
        .sorted(&partition.tabs)?
        .into_iter()
        .map(|t| t.id.clone())
        .collect();

    let mut current = before.clone();
    let mut ops = Vec::new();

    for run in moved_runs(&before, &after) {
        let moving_ids = after[run.clone()].to_vec();

        // The anchor is the kept tab right after the run; without one the
        // run goes to the end.
        let slot = after
            .get(run.end)
            .and_then(|anchor| current.iter().position(|id| id == anchor))
            .unwrap_or(before.len());

        // Every run member sitting before the slot vacates a position the
        // move itself closes up.
        let vacated = moving_ids
            .iter()
            .filter(|id| current.iter().position(|c| c == *id).is_some_and(|p| p < slot))
            .count();
        let destination = slot - vacated;

        move_block(&mut current, &moving_ids, destination, |id| id);
        ops.push(MoveOp {
            moving_ids,
            destination_index: destination + offset,
        });
    }

    log::debug!(
        "[TabSort] {} tabs at offset {}: {} move(s) for {}",
        before.len(),
        offset,
        ops.len(),
        spec
    );

    Ok(ops)
}

fn partitions(tabs: &[TabRecord], sort_pinned: bool) -> Vec<Partition<'_>> {
    let (pinned, normal) = Partition::split(tabs);
    if sort_pinned {
        vec![pinned, normal]
    } else {
        vec![normal]
    }
}

/// Plans every partition of a snapshot without touching the host.
///
/// The pinned partition is only considered when `sort_pinned` is set; pinned
/// tabs are otherwise never referenced.
pub fn plan(tabs: &[TabRecord], spec: SortSpec, sort_pinned: bool) -> Result<Vec<MoveOp>> {
    let mut ops = Vec::new();
    for partition in partitions(tabs, sort_pinned) {
        ops.extend(plan_partition(&partition, spec)?);
    }
    Ok(ops)
}

/// Sends one batch to the host, strictly in order.
///
/// Stops at the first failing op; earlier ops stay applied.
pub async fn apply_batch<H: TabHost + ?Sized>(host: &H, batch: &[MoveOp]) -> Result<()> {
    for (op_index, op) in batch.iter().enumerate() {
        host.move_tabs(&op.moving_ids, op.destination_index)
            .await
            .map_err(|source| SortError::Move { op_index, source })?;
    }
    Ok(())
}

/// Plans and applies each partition in turn, returning the applied ops.
///
/// A partition is planned only after the previous one has been applied, so a
/// malformed URL in the normal partition leaves a sorted pinned partition
/// behind.
pub async fn apply<H: TabHost + ?Sized>(
    host: &H,
    tabs: &[TabRecord],
    spec: SortSpec,
    sort_pinned: bool,
) -> Result<Vec<MoveOp>> {
    let mut applied = Vec::new();
    for partition in partitions(tabs, sort_pinned) {
        let batch = plan_partition(&partition, spec)?;
        apply_batch(host, &batch).await?;
        if partition.kind == PartitionKind::Pinned && !batch.is_empty() {
            log::debug!("[TabSort] Pinned partition reordered with {} move(s)", batch.len());
        }
        applied.extend(batch);
    }
    Ok(applied)
}
